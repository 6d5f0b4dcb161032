//! Options of the SVG preview

/// What the preview draws and how the markup is formatted
#[derive(Debug, Clone)]
pub struct SvgConfig {
    /// Space kept around the root frame in the viewBox
    pub viewbox_padding: f64,

    /// Emit the `<?xml ...?>` declaration
    pub standalone: bool,

    /// One element per line, nested groups indented
    pub pretty_print: bool,

    /// Prepended to every class name (`rl-node`, `rl-barrier`, ...)
    pub class_prefix: Option<String>,

    /// Draw the root container's guidelines and barriers
    pub show_lines: bool,

    /// Write each node's id in its top-left corner
    pub show_labels: bool,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            viewbox_padding: 10.0,
            standalone: true,
            pretty_print: true,
            class_prefix: Some("rl-".to_string()),
            show_lines: true,
            show_labels: true,
        }
    }
}

impl SvgConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewbox_padding(mut self, padding: f64) -> Self {
        self.viewbox_padding = padding.max(0.0);
        self
    }

    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = Some(prefix.into());
        self
    }

    pub fn without_class_prefix(mut self) -> Self {
        self.class_prefix = None;
        self
    }

    pub fn with_lines(mut self, show: bool) -> Self {
        self.show_lines = show;
        self
    }

    pub fn with_labels(mut self, show: bool) -> Self {
        self.show_labels = show;
        self
    }

    /// Class name with the configured prefix
    pub fn class(&self, name: &str) -> String {
        match &self.class_prefix {
            Some(prefix) => format!("{}{}", prefix, name),
            None => name.to_string(),
        }
    }
}
