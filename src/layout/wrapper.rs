//! Capabilities the algorithm needs from a host tree
//!
//! A host implements [`LayoutWrapper`] for each child and [`ContainerWrapper`]
//! for the relative container. The algorithm never sees anything else of the
//! host.

use super::pattern::RelativeContainerPattern;
use super::types::{ContainerLayoutProperty, GeometryNode, LayoutConstraint, LayoutProperty};

/// A child of a relative container
pub trait LayoutWrapper {
    fn layout_property(&self) -> &LayoutProperty;

    fn geometry_node(&self) -> &GeometryNode;

    fn geometry_node_mut(&mut self) -> &mut GeometryNode;

    /// Measure the child (and its subtree) under a constraint.
    ///
    /// The result is read back through [`LayoutWrapper::geometry_node`].
    fn measure(&mut self, constraint: &LayoutConstraint);

    /// Lay out the child's subtree after its own offset was committed
    fn layout(&mut self);

    fn set_active(&mut self, active: bool);

    fn is_active(&self) -> bool;
}

/// The relative container itself
pub trait ContainerWrapper {
    type Child: LayoutWrapper;

    fn layout_property(&self) -> &ContainerLayoutProperty;

    fn geometry_node_mut(&mut self) -> &mut GeometryNode;

    /// Children in render order
    fn children_with_build(&mut self) -> &mut [Self::Child];

    /// Long-lived per-container state
    fn pattern_mut(&mut self) -> &mut RelativeContainerPattern;
}
