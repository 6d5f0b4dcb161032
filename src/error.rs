//! Error types for loading scenes

use std::path::PathBuf;

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Malformed TOML, including bad length literals
    #[error("invalid scene: {message}")]
    Parse { message: String, span: Option<Span> },

    /// An align value that does not belong to the rule's axis
    #[error("rule '{direction}' of '{node}' cannot align to '{align}'")]
    InvalidAlign {
        node: String,
        direction: String,
        align: String,
    },

    #[error("'{node}': {message}")]
    UnknownDirection { node: String, message: String },

    #[error("child #{index} has an empty id")]
    EmptyId { index: usize },
}

impl From<toml::de::Error> for SceneError {
    fn from(err: toml::de::Error) -> Self {
        SceneError::Parse {
            message: err.message().to_string(),
            span: err.span(),
        }
    }
}

impl SceneError {
    /// Get the source span if available
    pub fn span(&self) -> Option<&Span> {
        match self {
            SceneError::Parse { span, .. } => span.as_ref(),
            _ => None,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let Some(span) = self.span().cloned() else {
            return format!("Error: {}", self);
        };
        let message = self.to_string();
        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span))
                    .with_message(&message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);
        if written.is_err() {
            return format!("Error: {}", message);
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_error_keeps_span() {
        let err: SceneError = toml::from_str::<toml::Table>("a = [1,").unwrap_err().into();
        assert!(err.span().is_some());
        assert!(err.to_string().starts_with("invalid scene"));
    }

    #[test]
    fn test_format_without_span() {
        let err = SceneError::EmptyId { index: 2 };
        assert_eq!(err.format("", "scene.toml"), "Error: child #2 has an empty id");
    }

    #[test]
    fn test_format_points_at_source() {
        let source = "[container]\nwidth = \n";
        let err: SceneError = toml::from_str::<toml::Table>(source).unwrap_err().into();
        let rendered = err.format(source, "scene.toml");
        assert!(rendered.contains("scene.toml"));
    }
}
