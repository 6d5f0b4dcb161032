//! Relative Layout - constraint-based positioning of children inside a container
//!
//! Children declare align rules against the container, guidelines, barriers
//! and each other; the layout algorithm orders them by dependency, sizes and
//! places each one, distributes chains and can size the container around its
//! content. The [`scene`] module provides a TOML-loadable host tree and the
//! [`renderer`] draws the result as SVG.
//!
//! # Example
//!
//! ```rust
//! use relative_layout::Scene;
//!
//! let mut scene = Scene::from_toml(r#"
//!     [container]
//!     width = 200
//!     height = 100
//!
//!     [[children]]
//!     id = "badge"
//!     width = 20
//!     height = 20
//!     align_rules.right = { anchor = "__container__", align = "end" }
//!     align_rules.top = { anchor = "__container__", align = "top" }
//! "#).unwrap();
//! scene.run();
//! assert_eq!(scene.frame("badge").unwrap().x, 180.0);
//! ```

pub mod dimension;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod renderer;
pub mod scene;

pub use dimension::{CalcLength, Dimension, DimensionError, DimensionUnit, ScaleProperty};
pub use error::SceneError;
pub use geometry::{OffsetF, RectF, SizeF};
pub use layout::{
    LayoutConfig, LayoutError, LintWarning, MeasureReport, RelativeContainerLayoutAlgorithm,
    RelativeContainerPattern,
};
pub use renderer::{render_svg, SvgConfig};
pub use scene::Scene;
