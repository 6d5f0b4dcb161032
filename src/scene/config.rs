//! TOML schema of scene files
//!
//! ```toml
//! [viewport]
//! width = 360
//! height = 640
//!
//! [container]
//! width = 300
//! height = "auto"
//! padding = 10
//!
//! [[container.guidelines]]
//! id = "gl"
//! direction = "vertical"
//! start = "50vp"
//!
//! [[children]]
//! id = "title"
//! width = 100
//! height = 40
//! align_rules.left = { anchor = "gl", align = "start" }
//! align_rules.top = { anchor = "__container__", align = "top" }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::dimension::{CalcLength, Dimension, ScaleProperty};
use crate::geometry::PaddingPropertyF;
use crate::layout::{
    BarrierDirection, ChainStyle, LayoutConfig, LineDirection, TextDirection,
    VisibleType,
};

/// Root of a scene file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneFile {
    #[serde(default)]
    pub viewport: ViewportDef,
    #[serde(default)]
    pub config: LayoutConfig,
    #[serde(default)]
    pub container: ContainerDef,
    #[serde(default)]
    pub children: Vec<NodeDef>,
}

/// Space offered to the root container, in px
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewportDef {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportDef {
    fn default() -> Self {
        Self {
            width: 360.0,
            height: 640.0,
        }
    }
}

/// The root relative container
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContainerDef {
    pub id: Option<String>,
    pub width: Option<CalcLength>,
    pub height: Option<CalcLength>,
    pub padding: Option<EdgesDef>,
    pub border: Option<EdgesDef>,
    #[serde(default)]
    pub direction: TextDirection,
    #[serde(default)]
    pub guidelines: Vec<GuidelineDef>,
    #[serde(default)]
    pub barriers: Vec<BarrierDef>,
}

/// Padding, border or margin: one length for all sides, or per side
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EdgesDef {
    Uniform(Dimension),
    Sides {
        #[serde(default)]
        left: Option<Dimension>,
        #[serde(default)]
        right: Option<Dimension>,
        #[serde(default)]
        top: Option<Dimension>,
        #[serde(default)]
        bottom: Option<Dimension>,
    },
}

impl EdgesDef {
    /// Resolve to px; percentages refer to the given width, as for CSS margins
    pub fn resolve(&self, scale: &ScaleProperty, reference_width: f64) -> PaddingPropertyF {
        let px = |d: Option<Dimension>| {
            d.and_then(|d| d.convert_to_px(scale, Some(reference_width)))
                .unwrap_or(0.0)
        };
        match *self {
            EdgesDef::Uniform(d) => PaddingPropertyF::uniform(px(Some(d))),
            EdgesDef::Sides {
                left,
                right,
                top,
                bottom,
            } => PaddingPropertyF::new(px(left), px(right), px(top), px(bottom)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuidelineDef {
    pub id: String,
    pub direction: LineDirection,
    pub start: Option<Dimension>,
    pub end: Option<Dimension>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BarrierDef {
    pub id: String,
    pub direction: BarrierDirection,
    #[serde(default)]
    pub referenced_ids: Vec<String>,
}

/// Anchor line named in a scene file; checked against the rule's axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignName {
    Start,
    Center,
    End,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDef {
    pub anchor: String,
    pub align: AlignName,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BiasDef {
    #[serde(default = "default_bias")]
    pub horizontal: f64,
    #[serde(default = "default_bias")]
    pub vertical: f64,
}

fn default_bias() -> f64 {
    crate::layout::DEFAULT_BIAS
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightDef {
    pub horizontal: Option<f64>,
    pub vertical: Option<f64>,
}

/// A child; with `children` set it is itself a relative container
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeDef {
    pub id: Option<String>,
    pub tag: Option<String>,
    pub width: Option<CalcLength>,
    pub height: Option<CalcLength>,
    pub margin: Option<EdgesDef>,
    #[serde(default)]
    pub visibility: VisibleType,
    /// Intrinsic content size in px, used when no size is imposed
    pub content: Option<[f64; 2]>,
    /// Keyed by direction name (`left`, `middle`, `top`, `start`, ...)
    #[serde(default)]
    pub align_rules: BTreeMap<String, RuleDef>,
    pub bias: Option<BiasDef>,
    pub chain_weight: Option<WeightDef>,
    pub horizontal_chain: Option<ChainStyle>,
    pub vertical_chain: Option<ChainStyle>,

    pub padding: Option<EdgesDef>,
    pub border: Option<EdgesDef>,
    pub direction: Option<TextDirection>,
    #[serde(default)]
    pub guidelines: Vec<GuidelineDef>,
    #[serde(default)]
    pub barriers: Vec<BarrierDef>,
    pub children: Option<Vec<NodeDef>>,
}

impl NodeDef {
    pub fn is_container(&self) -> bool {
        self.children.is_some()
    }

    /// True when any relative-layout property is declared
    pub fn has_flex_item(&self) -> bool {
        !self.align_rules.is_empty()
            || self.bias.is_some()
            || self.chain_weight.is_some()
            || self.horizontal_chain.is_some()
            || self.vertical_chain.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_scene() {
        let file: SceneFile = toml::from_str("").unwrap();
        assert_eq!(file.viewport, ViewportDef::default());
        assert!(file.children.is_empty());
        assert!(file.config.use_topological_cache);
    }

    #[test]
    fn test_edges_forms() {
        #[derive(Deserialize)]
        struct Holder {
            uniform: EdgesDef,
            sides: EdgesDef,
        }
        let holder: Holder =
            toml::from_str("uniform = 4\nsides = { left = \"2px\", top = \"10%\" }").unwrap();
        let scale = ScaleProperty::default();
        assert_eq!(holder.uniform.resolve(&scale, 100.0), PaddingPropertyF::uniform(4.0));
        assert_eq!(
            holder.sides.resolve(&scale, 100.0),
            PaddingPropertyF::new(2.0, 0.0, 10.0, 0.0)
        );
    }

    #[test]
    fn test_node_with_rules() {
        let node: NodeDef = toml::from_str(
            r#"
            id = "a"
            width = 100
            height = "auto"
            horizontal_chain = "spread_inside"
            align_rules.left = { anchor = "__container__", align = "start" }
            align_rules.middle = { anchor = "b", align = "center" }
            "#,
        )
        .unwrap();
        assert!(node.has_flex_item());
        assert!(!node.is_container());
        assert_eq!(node.align_rules.len(), 2);
        assert_eq!(node.horizontal_chain, Some(ChainStyle::SpreadInside));
        assert_eq!(node.height, Some(CalcLength::Auto));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result: Result<NodeDef, _> = toml::from_str("id = \"a\"\ncolour = \"red\"");
        assert!(result.is_err());
    }
}
