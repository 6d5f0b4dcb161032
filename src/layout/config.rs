//! Configuration for the relative layout algorithm

use serde::Deserialize;

use crate::dimension::ScaleProperty;

/// Configuration options for layout computation
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Density scales used by every length conversion
    #[serde(flatten)]
    pub scale: ScaleProperty,

    /// Record the visiting order and loop nodes on the pattern after each pass
    pub debug: bool,

    /// Reuse the visiting order while the topology is unchanged
    pub use_topological_cache: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            scale: ScaleProperty::default(),
            debug: false,
            use_topological_cache: true,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vp-to-px factor
    pub fn with_vp_scale(mut self, vp_scale: f64) -> Self {
        self.scale.vp_scale = vp_scale;
        self
    }

    /// Set the font scale applied on top of the vp scale for fp lengths
    pub fn with_fp_scale(mut self, fp_scale: f64) -> Self {
        self.scale.fp_scale = fp_scale;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_topological_cache(mut self, enabled: bool) -> Self {
        self.use_topological_cache = enabled;
        self
    }
}
