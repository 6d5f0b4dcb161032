//! Chains: runs of children linked edge-to-edge on one axis
//!
//! A chain starts at a child carrying a chain style whose leading and
//! trailing rules are both set. It extends while each member's trailing edge
//! is aligned to the next member's leading line and that member's leading
//! edge points back at the trailing line of the current one. Free space
//! between the head and tail anchors is then distributed by the chain style,
//! and weighted members share what the others leave over.

use indexmap::IndexMap;
use log::{debug, trace};

use super::context::{AnchorKind, SolverContext};
use super::measure::anchor_value;
use super::types::{AlignDirection, AlignRule, Axis, ChainStyle, DEFAULT_BIAS};
use super::wrapper::LayoutWrapper;

/// A discovered chain and its per-pass distribution state
#[derive(Debug, Clone, PartialEq)]
pub struct ChainParam {
    /// Members from head to tail
    pub ids: Vec<String>,
    /// Leading rule of the head
    pub anchor_head: AlignRule,
    /// Trailing rule of the last member
    pub anchor_tail: AlignRule,
    pub style: ChainStyle,
    pub bias: f64,
    pub total_chain_weight: f64,
    pub remaining_space: f64,
    /// Margin-frame size of each member along the chain, once known
    pub item_size: IndexMap<String, Option<f64>>,
    pub is_calculated: bool,
    pub is_weight_calculated: bool,
}

/// Discover every chain on both axes
pub fn check_chains(ctx: &mut SolverContext) {
    ctx.horizontal_chains.clear();
    ctx.vertical_chains.clear();
    ctx.horizontal_chain_node_map.clear();
    ctx.vertical_chain_node_map.clear();
    ctx.chain_weight_mode = false;

    let ids: Vec<String> = ctx.nodes.keys().cloned().collect();
    for id in &ids {
        for axis in [Axis::Horizontal, Axis::Vertical] {
            let declares_chain = ctx.node(id).is_some_and(|node| {
                node.has_rules()
                    && node
                        .flex_item
                        .as_ref()
                        .is_some_and(|item| item.chain(axis).is_some())
            });
            if !declares_chain || ctx.is_in_chain(id, axis) {
                continue;
            }
            if let Some((chain, weighted)) = discover_chain(ctx, id, axis) {
                register_chain(ctx, id, axis, chain, weighted);
            }
        }
    }
}

/// Walk from `head_id` along `axis`; `None` when the run is not a chain
fn discover_chain(ctx: &SolverContext, head_id: &str, axis: Axis) -> Option<(ChainParam, bool)> {
    let leading = AlignDirection::leading(axis);
    let trailing = AlignDirection::trailing(axis);

    let head = ctx.node(head_id)?;
    let info = head.flex_item.as_ref()?.chain(axis)?;
    let head_rule = head.rules.get(&leading)?.clone();
    let mut tail_rule = head.rules.get(&trailing)?.clone();
    if !ctx.is_anchor_legal(&head_rule.anchor) {
        return None;
    }

    let mut ids = vec![head_id.to_string()];
    let mut total_chain_weight = 0.0;
    let mut weighted = false;
    if !head.is_gone() {
        let weight = head.chain_weight(axis);
        weighted |= weight > 0.0;
        total_chain_weight += weight.max(0.0);
    }

    let mut current = head_id.to_string();
    while let Some(next) = ctx.node(&tail_rule.anchor) {
        if !tail_rule.align.is_leading() || next.flex_item.is_none() {
            break;
        }
        let (Some(next_leading), Some(next_trailing)) =
            (next.rules.get(&leading), next.rules.get(&trailing))
        else {
            break;
        };
        if next_leading.anchor != current || !next_leading.align.is_trailing() {
            break;
        }
        if ids.contains(&next.id) {
            debug!("{} chain at '{}' loops back into itself, ignored", axis, head_id);
            return None;
        }
        ids.push(next.id.clone());
        if !next.is_gone() {
            let weight = next.chain_weight(axis);
            if weight > 0.0 {
                weighted = true;
                total_chain_weight += weight;
            }
        }
        current = next.id.clone();
        tail_rule = next_trailing.clone();
    }

    if !ctx.is_anchor_legal(&tail_rule.anchor) || ids.len() <= 1 {
        return None;
    }
    if ids.contains(&tail_rule.anchor) || ids.contains(&head_rule.anchor) {
        debug!("{} chain at '{}' is anchored to its own member, ignored", axis, head_id);
        return None;
    }

    // chains take the head's bias unclamped; a negative value pushes a
    // packed chain past its head anchor
    let bias = head
        .flex_item
        .as_ref()
        .and_then(|item| item.bias)
        .map(|bias| bias.raw(axis))
        .unwrap_or(DEFAULT_BIAS);
    let item_size = ids.iter().map(|id| (id.clone(), None)).collect();

    Some((
        ChainParam {
            ids,
            anchor_head: head_rule,
            anchor_tail: tail_rule,
            style: info.style,
            bias,
            total_chain_weight,
            remaining_space: 0.0,
            item_size,
            is_calculated: false,
            is_weight_calculated: false,
        },
        weighted,
    ))
}

fn register_chain(ctx: &mut SolverContext, head_id: &str, axis: Axis, chain: ChainParam, weighted: bool) {
    for anchor in [&chain.anchor_head.anchor, &chain.anchor_tail.anchor] {
        if matches!(
            ctx.classify(anchor),
            AnchorKind::Container | AnchorKind::Guideline(_)
        ) {
            ctx.set_rely_on_container(axis);
        }
    }
    ctx.chain_weight_mode |= weighted;

    debug!(
        "{} {} chain: [{}]",
        axis,
        chain.style,
        chain.ids.join(", ")
    );
    for id in &chain.ids {
        if id != head_id {
            ctx.chains_mut(axis).shift_remove(id);
        }
        ctx.chain_node_map_mut(axis)
            .insert(id.clone(), head_id.to_string());
    }
    ctx.chains_mut(axis).insert(head_id.to_string(), chain);
}

/// Record a non-weighted member's measured size in its chains
pub fn record_size_in_chain<C: LayoutWrapper>(ctx: &mut SolverContext, children: &[C], id: &str) {
    let Some(node) = ctx.node(id) else {
        return;
    };
    let size = children[node.index].geometry_node().margin_frame_size();
    let weighted = [
        node.has_weight(Axis::Horizontal),
        node.has_weight(Axis::Vertical),
    ];

    for (axis, weighted) in [Axis::Horizontal, Axis::Vertical].into_iter().zip(weighted) {
        if weighted {
            continue;
        }
        let Some(head) = ctx.chain_of(id, axis).map(str::to_string) else {
            continue;
        };
        let extent = axis.of_size(size);
        if let Some(chain) = ctx.chains_mut(axis).get_mut(&head) {
            chain.item_size.insert(id.to_string(), Some(extent));
            chain.remaining_space -= extent;
        }
    }
}

/// Space between members and offset of the first member from the head.
///
/// `item_count` excludes gone members. When the content overflows the anchor
/// distance every style centers the overflow, except `Packed` which uses its
/// bias.
pub fn calc_offset_in_chain_get_start(
    anchor_distance: f64,
    content_size: f64,
    item_count: usize,
    style: ChainStyle,
    bias: f64,
) -> (f64, f64) {
    let free = anchor_distance - content_size;
    if free >= 0.0 {
        match style {
            ChainStyle::Spread => {
                let space = free / (item_count + 1) as f64;
                (space, space)
            }
            ChainStyle::SpreadInside => {
                let space = if item_count > 1 {
                    free / (item_count - 1) as f64
                } else {
                    free
                };
                (space, 0.0)
            }
            ChainStyle::Packed => (0.0, free * bias),
        }
    } else {
        match style {
            ChainStyle::Spread | ChainStyle::SpreadInside => (0.0, free * 0.5),
            ChainStyle::Packed => (0.0, free * bias),
        }
    }
}

/// Place every member of a chain once all member sizes are known.
///
/// Returns `false` while some visible member is still unmeasured.
pub fn calc_offset_in_chain<C: LayoutWrapper>(
    ctx: &mut SolverContext,
    children: &[C],
    head: &str,
    axis: Axis,
) -> bool {
    let Some(chain) = ctx.chains(axis).get(head) else {
        return false;
    };
    if chain.is_calculated {
        return true;
    }

    let mut item_count = chain.ids.len();
    let mut content_size = 0.0;
    for (id, size) in &chain.item_size {
        if ctx.is_gone(id) {
            item_count -= 1;
            continue;
        }
        match size {
            Some(size) => content_size += size,
            None => return false,
        }
    }

    let start = anchor_value(ctx, children, &chain.anchor_head, axis);
    let end = anchor_value(ctx, children, &chain.anchor_tail, axis);
    let (space, lead) =
        calc_offset_in_chain_get_start(end - start, content_size, item_count, chain.style, chain.bias);
    trace!(
        "{} chain '{}': distance {} content {} space {} start {}",
        axis,
        head,
        end - start,
        content_size,
        space,
        start + lead
    );

    let placements: Vec<(String, f64)> = {
        let mut offset = start + lead;
        let mut placed = Vec::with_capacity(chain.ids.len());
        for id in &chain.ids {
            if ctx.is_gone(id) {
                continue;
            }
            placed.push((id.clone(), offset));
            let size = chain.item_size.get(id).copied().flatten().unwrap_or(0.0);
            offset += size + space;
        }
        placed
    };
    for (id, value) in placements {
        let current = ctx.record_offset(&id);
        ctx.set_record_offset(&id, axis.with_offset(current, value));
    }
    if let Some(chain) = ctx.chains_mut(axis).get_mut(head) {
        chain.is_calculated = true;
    }
    true
}

/// Add the anchor distance to the space left by non-weighted members, once
pub fn init_remaining_space<C: LayoutWrapper>(ctx: &mut SolverContext, children: &[C], head: &str, axis: Axis) {
    let Some(chain) = ctx.chains(axis).get(head) else {
        return;
    };
    if chain.is_weight_calculated {
        return;
    }
    let start = anchor_value(ctx, children, &chain.anchor_head, axis);
    let end = anchor_value(ctx, children, &chain.anchor_tail, axis);
    if let Some(chain) = ctx.chains_mut(axis).get_mut(head) {
        chain.remaining_space += end - start;
        chain.is_weight_calculated = true;
    }
}

/// Size of a weighted member: its share of the remaining space
pub fn calc_chain_weight_size<C: LayoutWrapper>(
    ctx: &mut SolverContext,
    children: &[C],
    id: &str,
    head: &str,
    axis: Axis,
) -> f64 {
    init_remaining_space(ctx, children, head, axis);
    let weight = ctx.node(id).map(|n| n.chain_weight(axis)).unwrap_or(0.0);
    let Some(chain) = ctx.chains(axis).get(head) else {
        return 0.0;
    };
    if chain.remaining_space <= 0.0 || chain.total_chain_weight <= 0.0 {
        return 0.0;
    }
    chain.remaining_space * weight / chain.total_chain_weight
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < EPSILON && (a.1 - b.1).abs() < EPSILON
    }

    #[test]
    fn test_spread_gaps_everywhere() {
        let r = calc_offset_in_chain_get_start(300.0, 240.0, 3, ChainStyle::Spread, 0.5);
        assert!(approx(r, (15.0, 15.0)));
    }

    #[test]
    fn test_spread_inside_gaps_between() {
        let r = calc_offset_in_chain_get_start(300.0, 240.0, 3, ChainStyle::SpreadInside, 0.5);
        assert!(approx(r, (30.0, 0.0)));
        let single = calc_offset_in_chain_get_start(300.0, 240.0, 1, ChainStyle::SpreadInside, 0.5);
        assert!(approx(single, (60.0, 0.0)));
    }

    #[test]
    fn test_packed_uses_bias() {
        let r = calc_offset_in_chain_get_start(300.0, 240.0, 3, ChainStyle::Packed, 0.0);
        assert!(approx(r, (0.0, 0.0)));
        let r = calc_offset_in_chain_get_start(300.0, 240.0, 3, ChainStyle::Packed, 0.25);
        assert!(approx(r, (0.0, 15.0)));
    }

    #[test]
    fn test_overflow_is_centered_or_biased() {
        let spread = calc_offset_in_chain_get_start(200.0, 240.0, 3, ChainStyle::Spread, 0.0);
        assert!(approx(spread, (0.0, -20.0)));
        let inside = calc_offset_in_chain_get_start(200.0, 240.0, 3, ChainStyle::SpreadInside, 0.0);
        assert!(approx(inside, (0.0, -20.0)));
        let packed = calc_offset_in_chain_get_start(200.0, 240.0, 3, ChainStyle::Packed, 1.0);
        assert!(approx(packed, (0.0, -40.0)));
    }

    #[test]
    fn test_no_visible_members() {
        let r = calc_offset_in_chain_get_start(100.0, 0.0, 0, ChainStyle::Spread, 0.5);
        assert!(approx(r, (100.0, 100.0)));
    }
}
