//! Error types for strict layout callers
//!
//! The algorithm itself never fails: loops degrade the pass and malformed
//! references are ignored. These errors exist for callers that want such
//! findings to stop them.

use thiserror::Error;

use super::lint::LintWarning;

#[derive(Debug, Error)]
pub enum LayoutError {
    /// Children whose rules depend on each other in a loop
    #[error("circular dependency among [{}]", nodes.join(", "))]
    CircularDependency { nodes: Vec<String> },

    /// Lint findings promoted to errors
    #[error("{} lint finding(s): {}", warnings.len(), format_warnings(warnings))]
    Lint { warnings: Vec<LintWarning> },
}

fn format_warnings(warnings: &[LintWarning]) -> String {
    warnings
        .iter()
        .map(|w| w.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl LayoutError {
    /// Create a circular dependency error
    pub fn circular(nodes: Vec<String>) -> Self {
        Self::CircularDependency { nodes }
    }

    /// Create an error from lint findings
    pub fn lint(warnings: Vec<LintWarning>) -> Self {
        Self::Lint { warnings }
    }

    /// Nodes involved in the failure
    pub fn nodes(&self) -> Vec<&str> {
        match self {
            Self::CircularDependency { nodes } => nodes.iter().map(String::as_str).collect(),
            Self::Lint { warnings } => warnings.iter().map(|w| w.subject.as_str()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::lint::LintCategory;

    #[test]
    fn test_circular_display() {
        let err = LayoutError::circular(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "circular dependency among [a, b]");
        assert_eq!(err.nodes(), vec!["a", "b"]);
    }

    #[test]
    fn test_lint_display() {
        let err = LayoutError::lint(vec![LintWarning::new(
            LintCategory::UnknownAnchor,
            "title",
            "left rule anchors to unknown id 'ghost'",
        )]);
        assert_eq!(
            err.to_string(),
            "1 lint finding(s): [unknown-anchor] title: left rule anchors to unknown id 'ghost'"
        );
    }
}
