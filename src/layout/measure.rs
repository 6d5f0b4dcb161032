//! Per-child size and offset resolution
//!
//! Offsets are recorded as margin-frame positions relative to the content
//! origin. Three flavours of anchor line are used:
//! - *anchor values* (chains and bias): frame extent plus the anchor's
//!   leading margin
//! - *align values* (two-rule sizing): margin-frame extent
//! - *offsets*: the first legal rule per axis places the child's own edge or
//!   center on the anchor line

use log::trace;

use crate::geometry::OffsetF;

use super::chain::{calc_offset_in_chain, record_size_in_chain};
use super::context::{AnchorKind, SolverContext};
use super::types::{AlignDirection, AlignRule, Axis};
use super::wrapper::LayoutWrapper;

/// Position of an anchor line, as used by chains and bias
pub fn anchor_value<C: LayoutWrapper>(
    ctx: &SolverContext,
    children: &[C],
    rule: &AlignRule,
    axis: Axis,
) -> f64 {
    match ctx.classify(&rule.anchor) {
        AnchorKind::Guideline(_) | AnchorKind::Barrier(_) => {
            axis.of_offset(ctx.record_offset(&rule.anchor))
        }
        AnchorKind::Container => rule.align.fraction() * ctx.container_extent(axis),
        AnchorKind::Sibling(index) => {
            let geometry = children[index].geometry_node();
            let margin = geometry
                .margin
                .map(|m| axis.leading_margin(&m, false))
                .unwrap_or(0.0);
            rule.align.fraction() * axis.of_size(geometry.frame_size)
                + axis.of_offset(ctx.record_offset(&rule.anchor))
                + margin
        }
        AnchorKind::Unknown => 0.0,
    }
}

/// Position of an anchor line, as used for two-rule sizing.
///
/// A line anchor referenced from the other axis contributes 0.
fn align_value<C: LayoutWrapper>(ctx: &SolverContext, children: &[C], rule: &AlignRule, axis: Axis) -> f64 {
    let kind = ctx.classify(&rule.anchor);
    match kind {
        AnchorKind::Guideline(_) | AnchorKind::Barrier(_) => {
            if kind.line_axis() == Some(axis) {
                axis.of_offset(ctx.record_offset(&rule.anchor))
            } else {
                0.0
            }
        }
        AnchorKind::Container => rule.align.fraction() * ctx.container_extent(axis),
        AnchorKind::Sibling(index) => {
            let size = children[index].geometry_node().margin_frame_size();
            rule.align.fraction() * axis.of_size(size) + axis.of_offset(ctx.record_offset(&rule.anchor))
        }
        AnchorKind::Unknown => 0.0,
    }
}

/// Offset of a child placed by a single rule
fn calc_offset<C: LayoutWrapper>(
    ctx: &SolverContext,
    children: &[C],
    child_index: usize,
    direction: AlignDirection,
    rule: &AlignRule,
) -> f64 {
    let axis = direction.axis();
    let item = axis.of_size(children[child_index].geometry_node().margin_frame_size());
    let kind = ctx.classify(&rule.anchor);
    let (anchor_extent, anchor_position) = match kind {
        AnchorKind::Container => (ctx.container_extent(axis), 0.0),
        AnchorKind::Guideline(_) | AnchorKind::Barrier(_) => {
            (0.0, axis.of_offset(ctx.record_offset(&rule.anchor)))
        }
        AnchorKind::Sibling(index) => {
            let geometry = children[index].geometry_node();
            let margin = geometry
                .margin
                .map(|m| axis.leading_margin(&m, ctx.rtl))
                .unwrap_or(0.0);
            (
                axis.of_size(geometry.frame_size),
                axis.of_offset(ctx.record_offset(&rule.anchor)) + margin,
            )
        }
        AnchorKind::Unknown => (0.0, 0.0),
    };
    rule.align.fraction() * anchor_extent - direction.fraction() * item + anchor_position
}

/// First two align values on one axis, in direction order
#[derive(Debug, Default)]
struct AlignValues {
    values: Vec<(AlignDirection, f64)>,
}

impl AlignValues {
    fn push(&mut self, direction: AlignDirection, value: f64) {
        if self.values.len() < 2 {
            self.values.push((direction, value));
        }
    }

    fn is_full(&self) -> bool {
        self.values.len() == 2
    }

    fn get(&self, direction: AlignDirection) -> Option<f64> {
        self.values
            .iter()
            .find(|(d, _)| *d == direction)
            .map(|(_, v)| *v)
    }

    fn first_two(&self) -> Option<(f64, f64)> {
        match self.values.as_slice() {
            [(_, a), (_, b)] => Some((*a, *b)),
            _ => None,
        }
    }

    /// Size spanned by two rules on an axis, never negative
    fn spanned_size(&self, axis: Axis) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        let leading = self.get(AlignDirection::leading(axis));
        let trailing = self.get(AlignDirection::trailing(axis));
        let size = match self.get(AlignDirection::middle(axis)) {
            Some(middle) => match (leading, trailing) {
                (Some(leading), _) => 2.0 * (middle - leading).max(0.0),
                (None, Some(trailing)) => 2.0 * (trailing - middle).max(0.0),
                (None, None) => 0.0,
            },
            None => (trailing.unwrap_or(0.0) - leading.unwrap_or(0.0)).max(0.0),
        };
        Some(size)
    }
}

/// Measure a child, deriving its size from two opposing rules where it has
/// no explicit size on that axis.
pub fn calc_size_param<C: LayoutWrapper>(ctx: &mut SolverContext, children: &mut [C], id: &str) {
    let Some(node) = ctx.node(id) else {
        return;
    };
    if !node.has_rules() {
        return;
    }
    let index = node.index;
    let has_ideal_width = node.has_ideal_width;
    let has_ideal_height = node.has_ideal_height;

    let mut horizontal = AlignValues::default();
    let mut vertical = AlignValues::default();
    for (direction, rule) in &node.rules {
        if !ctx.is_anchor_legal(&rule.anchor) {
            continue;
        }
        let axis = direction.axis();
        let values = match axis {
            Axis::Horizontal => &mut horizontal,
            Axis::Vertical => &mut vertical,
        };
        if !values.is_full() {
            values.push(*direction, align_value(ctx, children, rule, axis));
        }
    }

    let in_horizontal_chain = ctx.is_in_chain(id, Axis::Horizontal);
    let in_vertical_chain = ctx.is_in_chain(id, Axis::Vertical);
    let mut constraint = ctx.child_constraint();
    let ideal_width = horizontal.spanned_size(Axis::Horizontal);
    let ideal_height = vertical.spanned_size(Axis::Vertical);

    let collapsed = (ideal_width.is_some_and(|w| w <= 0.0) && !in_horizontal_chain)
        || (ideal_height.is_some_and(|h| h <= 0.0) && !in_vertical_chain);
    if collapsed {
        trace!("'{}' spans no space, measured at zero size", id);
        constraint.self_ideal_size.set_width(0.0);
        constraint.self_ideal_size.set_height(0.0);
        children[index].measure(&constraint);
        record_size_in_chain(ctx, children, id);
        return;
    }

    if !(has_ideal_width && has_ideal_height) {
        if let Some(width) = ideal_width.filter(|_| !has_ideal_width && !in_horizontal_chain) {
            constraint.self_ideal_size.set_width(width);
        }
        if let Some(height) = ideal_height.filter(|_| !has_ideal_height && !in_vertical_chain) {
            constraint.self_ideal_size.set_height(height);
        }
    }
    children[index].measure(&constraint);
    trace!(
        "'{}' measured {:?}",
        id,
        children[index].geometry_node().frame_size
    );
    record_size_in_chain(ctx, children, id);
}

/// Resolve and record a child's offset from its chain or its first rule per
/// axis, plus bias.
pub fn calc_offset_param<C: LayoutWrapper>(ctx: &mut SolverContext, children: &[C], id: &str) {
    let mut offset = OffsetF::zero();
    let mut calculated_x = false;
    let mut calculated_y = false;

    for axis in [Axis::Horizontal, Axis::Vertical] {
        let Some(head) = ctx.chain_of(id, axis).map(str::to_string) else {
            continue;
        };
        if calc_offset_in_chain(ctx, children, &head, axis) {
            offset = axis.with_offset(offset, axis.of_offset(ctx.record_offset(id)));
        }
        match axis {
            Axis::Horizontal => calculated_x = true,
            Axis::Vertical => calculated_y = true,
        }
    }

    let Some(node) = ctx.node(id) else {
        return;
    };
    for (direction, rule) in &node.rules {
        if !ctx.is_anchor_legal(&rule.anchor) {
            continue;
        }
        let calculated = match direction.axis() {
            Axis::Horizontal => &mut calculated_x,
            Axis::Vertical => &mut calculated_y,
        };
        if *calculated {
            continue;
        }
        let value = calc_offset(ctx, children, node.index, *direction, rule);
        offset = direction.axis().with_offset(offset, value);
        *calculated = true;
    }

    let bias = calc_bias(ctx, children, id);
    let record = offset + bias;
    trace!("'{}' recorded at {:?}", id, record);
    ctx.set_record_offset(id, record);
}

/// Bias shift for a child with an explicit size and two rules on an axis
pub fn calc_bias<C: LayoutWrapper>(ctx: &SolverContext, children: &[C], id: &str) -> OffsetF {
    let in_horizontal_chain = ctx.is_in_chain(id, Axis::Horizontal);
    let in_vertical_chain = ctx.is_in_chain(id, Axis::Vertical);
    if in_horizontal_chain && in_vertical_chain {
        return OffsetF::zero();
    }
    let Some(node) = ctx.node(id) else {
        return OffsetF::zero();
    };
    let Some(bias) = node.flex_item.as_ref().and_then(|item| item.bias) else {
        return OffsetF::zero();
    };
    if !node.has_rules() {
        return OffsetF::zero();
    }

    let size = children[node.index].geometry_node().margin_frame_size();
    let ideal_width = node.has_ideal_width.then_some(size.width);
    let ideal_height = node.has_ideal_height.then_some(size.height);
    if ideal_width.is_none() && ideal_height.is_none() {
        return OffsetF::zero();
    }

    let mut horizontal = AlignValues::default();
    let mut vertical = AlignValues::default();
    for (direction, rule) in &node.rules {
        if horizontal.is_full() && vertical.is_full() {
            break;
        }
        if !ctx.is_anchor_legal(&rule.anchor) {
            continue;
        }
        match direction.axis() {
            Axis::Horizontal if ideal_width.is_some() => {
                horizontal.push(*direction, anchor_value(ctx, children, rule, Axis::Horizontal));
            }
            Axis::Vertical if ideal_height.is_some() => {
                vertical.push(*direction, anchor_value(ctx, children, rule, Axis::Vertical));
            }
            _ => {}
        }
    }

    let shift = |values: &AlignValues, ideal: Option<f64>, axis: Axis| -> f64 {
        match (values.first_two(), ideal) {
            (Some((a, b)), Some(ideal)) => ((a - b).abs() - ideal) * bias.on(axis),
            _ => 0.0,
        }
    };
    let x = if in_horizontal_chain {
        0.0
    } else {
        shift(&horizontal, ideal_width, Axis::Horizontal)
    };
    let y = if in_vertical_chain {
        0.0
    } else {
        shift(&vertical, ideal_height, Axis::Vertical)
    };
    OffsetF::new(x, y)
}
