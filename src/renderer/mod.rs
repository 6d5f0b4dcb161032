//! SVG preview of a laid-out scene
//!
//! Every node becomes a rectangle at its absolute frame, nested containers
//! become groups, and the root container's guidelines and barriers can be
//! drawn as dashed lines.

pub mod config;
pub mod svg;

pub use config::SvgConfig;
pub use svg::render_svg;
