//! Relative container layout
//!
//! Children are positioned by align rules against the container, guidelines,
//! barriers and each other. The algorithm orders children by their
//! dependencies, sizes each one from its rules, distributes chains and can
//! grow an `auto`-sized container around its content.

pub mod algorithm;
pub mod chain;
pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod guideline;
pub mod lint;
pub mod measure;
pub mod pattern;
pub mod types;
pub mod wrapper;

pub use algorithm::{ChainSummary, MeasureReport, ReferenceLine, RelativeContainerLayoutAlgorithm};
pub use config::LayoutConfig;
pub use error::LayoutError;
pub use lint::{LintCategory, LintWarning};
pub use pattern::RelativeContainerPattern;
pub use types::*;
pub use wrapper::{ContainerWrapper, LayoutWrapper};
