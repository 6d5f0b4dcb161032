//! Dependency graph and visiting order
//!
//! Align rules become edges `anchor -> node` in the relied-on map, and every
//! node and barrier gets an incoming degree: the number of distinct siblings
//! and barriers it waits for. Kahn's algorithm over that graph either yields a
//! complete visiting order or leaves the nodes caught in a dependency loop.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};

use super::context::{AnchorKind, SolverContext};
use super::types::{AlignDirection, AlignRule, Axis};

/// Anchor a rule effectively waits for.
///
/// Edge rules of chain members wait for the chain's head or tail anchor
/// instead of their neighbours.
fn effective_anchor<'a>(
    ctx: &'a SolverContext,
    node: &str,
    direction: AlignDirection,
    rule: &'a AlignRule,
) -> &'a str {
    let axis = direction.axis();
    let Some(head) = ctx.chain_of(node, axis) else {
        return &rule.anchor;
    };
    let Some(chain) = ctx.chains(axis).get(head) else {
        return &rule.anchor;
    };
    if direction == AlignDirection::leading(axis) {
        &chain.anchor_head.anchor
    } else if direction == AlignDirection::trailing(axis) {
        &chain.anchor_tail.anchor
    } else {
        &rule.anchor
    }
}

/// True when waiting on `anchor` means waiting for something to be solved
fn is_dependency(ctx: &SolverContext, anchor: &str) -> bool {
    matches!(
        ctx.classify(anchor),
        AnchorKind::Barrier(_) | AnchorKind::Sibling(_)
    )
}

fn insert_relied_on(ctx: &mut SolverContext, anchor: &str, node: &str) {
    ctx.relied_on_map
        .entry(anchor.to_string())
        .or_default()
        .insert(node.to_string());
}

/// Build the relied-on map from every child's rules and every barrier
pub fn build_dependencies(ctx: &mut SolverContext) {
    ctx.relied_on_map.clear();
    let mut edges: Vec<(String, String)> = Vec::new();

    for (id, node) in &ctx.nodes {
        if !node.has_rules() {
            continue;
        }
        for (direction, rule) in &node.rules {
            let axis = direction.axis();
            let is_chain_edge = *direction == AlignDirection::leading(axis)
                || *direction == AlignDirection::trailing(axis);
            if is_chain_edge {
                if let Some(chain) = ctx.chain_of(id, axis).and_then(|head| ctx.chains(axis).get(head)) {
                    for anchor in [&chain.anchor_head.anchor, &chain.anchor_tail.anchor] {
                        if is_dependency(ctx, anchor) {
                            edges.push((anchor.clone(), id.clone()));
                        }
                    }
                    continue;
                }
            }
            if is_dependency(ctx, &rule.anchor) {
                edges.push((rule.anchor.clone(), id.clone()));
            }
        }
    }

    for (barrier, (_, referenced)) in &ctx.barriers {
        for name in referenced {
            edges.push((name.clone(), barrier.clone()));
        }
    }

    for (anchor, node) in edges {
        insert_relied_on(ctx, &anchor, &node);
    }
}

/// Flag the axes on which some child hangs off the container or a guideline
pub fn mark_container_reliance(ctx: &mut SolverContext) {
    let mut axes: IndexSet<Axis> = IndexSet::new();
    for (id, node) in &ctx.nodes {
        if !node.has_rules() {
            continue;
        }
        for (direction, rule) in &node.rules {
            let axis = direction.axis();
            if ctx.is_in_chain(id, axis)
                && (*direction == AlignDirection::leading(axis)
                    || *direction == AlignDirection::trailing(axis))
            {
                continue;
            }
            if matches!(
                ctx.classify(&rule.anchor),
                AnchorKind::Container | AnchorKind::Guideline(_)
            ) {
                axes.insert(axis);
            }
        }
    }
    for axis in axes {
        ctx.set_rely_on_container(axis);
    }
}

/// Count the distinct anchors each node and barrier waits for
pub fn compute_incoming_degrees(ctx: &mut SolverContext) {
    let mut degrees: IndexMap<String, usize> = IndexMap::new();

    for (id, node) in &ctx.nodes {
        if !node.has_rules() {
            continue;
        }
        let anchors: IndexSet<&str> = node
            .rules
            .iter()
            .map(|(direction, rule)| effective_anchor(ctx, id, *direction, rule))
            .filter(|anchor| is_dependency(ctx, anchor))
            .collect();
        degrees.insert(id.clone(), anchors.len());
    }

    for (barrier, (_, referenced)) in &ctx.barriers {
        let anchors: IndexSet<&str> = referenced
            .iter()
            .map(String::as_str)
            .filter(|name| is_dependency(ctx, name))
            .collect();
        degrees.insert(barrier.clone(), anchors.len());
    }

    ctx.incoming_degree_map = degrees;
}

/// Outcome of one Kahn pass
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KahnResult {
    pub order: Vec<String>,
    /// Nodes whose degree never reached zero, in declaration order
    pub unresolved: Vec<String>,
}

/// Kahn's algorithm over the relied-on map and a copy of the degrees.
///
/// Seeds are taken in child order, then barriers, so independent nodes keep
/// their declaration order.
fn kahn(ctx: &SolverContext) -> KahnResult {
    let mut remaining = ctx.incoming_degree_map.clone();
    let mut queue: VecDeque<String> = VecDeque::new();

    for (id, node) in &ctx.nodes {
        if !node.has_rules() || remaining.get(id).copied() == Some(0) {
            queue.push_back(id.clone());
        }
    }
    for barrier in ctx.barriers.keys() {
        if remaining.get(barrier).copied() == Some(0) {
            queue.push_back(barrier.clone());
        }
    }

    let mut order = Vec::with_capacity(ctx.nodes.len() + ctx.barriers.len());
    while let Some(current) = queue.pop_front() {
        if let Some(relied) = ctx.relied_on_map.get(&current) {
            for node in relied {
                if let Some(degree) = remaining.get_mut(node) {
                    if *degree == 0 {
                        continue;
                    }
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(node.clone());
                    }
                }
            }
        }
        remaining.shift_remove(&current);
        order.push(current);
    }

    KahnResult {
        order,
        unresolved: remaining.into_keys().collect(),
    }
}

/// Compute degrees and check that every node can be visited.
///
/// Returns the nodes caught in (or behind) a dependency loop, sorted.
pub fn pre_topological_loop_detection(ctx: &mut SolverContext) -> Result<(), Vec<String>> {
    compute_incoming_degrees(ctx);
    let result = kahn(ctx);
    if result.unresolved.is_empty() {
        return Ok(());
    }
    let mut loop_nodes = result.unresolved;
    loop_nodes.sort();
    warn!("dependency loop among [{}]", loop_nodes.join(", "));
    Err(loop_nodes)
}

/// Visiting order over nodes and barriers, assuming no loop
pub fn topological_sort(ctx: &SolverContext) -> Vec<String> {
    let order = kahn(ctx).order;
    debug!("topological order: [{}]", order.join(", "));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::context::ChildNode;
    use crate::layout::types::{
        BarrierDirection, FlexItemProperty, HorizontalAlign, VerticalAlign, VisibleType,
    };
    use pretty_assertions::assert_eq;

    fn add_node(ctx: &mut SolverContext, id: &str, item: Option<FlexItemProperty>) {
        let rules = item
            .as_ref()
            .map(|i| i.normalized_rules())
            .unwrap_or_default();
        let index = ctx.nodes.len();
        ctx.nodes.insert(
            id.to_string(),
            ChildNode {
                id: id.to_string(),
                index,
                flex_item: item,
                rules,
                visibility: VisibleType::Visible,
                has_ideal_width: true,
                has_ideal_height: true,
            },
        );
    }

    fn left_of(anchor: &str) -> FlexItemProperty {
        FlexItemProperty::new().with_rule(
            AlignDirection::Left,
            AlignRule::horizontal(anchor, HorizontalAlign::End),
        )
    }

    #[test]
    fn test_order_follows_dependencies() {
        let mut ctx = SolverContext::default();
        add_node(&mut ctx, "c", Some(left_of("b")));
        add_node(&mut ctx, "b", Some(left_of("a")));
        add_node(&mut ctx, "a", Some(left_of("__container__")));
        add_node(&mut ctx, "free", None);

        build_dependencies(&mut ctx);
        assert_eq!(pre_topological_loop_detection(&mut ctx), Ok(()));
        assert_eq!(topological_sort(&ctx), vec!["a", "free", "b", "c"]);
    }

    #[test]
    fn test_two_cycle_is_reported() {
        let mut ctx = SolverContext::default();
        add_node(&mut ctx, "y", Some(left_of("x")));
        add_node(&mut ctx, "x", Some(left_of("y")));
        add_node(&mut ctx, "z", Some(left_of("__container__")));

        build_dependencies(&mut ctx);
        assert_eq!(
            pre_topological_loop_detection(&mut ctx),
            Err(vec!["x".to_string(), "y".to_string()])
        );
    }

    #[test]
    fn test_downstream_of_loop_is_unresolved() {
        let mut ctx = SolverContext::default();
        add_node(&mut ctx, "x", Some(left_of("y")));
        add_node(&mut ctx, "y", Some(left_of("x")));
        add_node(&mut ctx, "after", Some(left_of("x")));

        build_dependencies(&mut ctx);
        let err = pre_topological_loop_detection(&mut ctx).unwrap_err();
        assert_eq!(err, vec!["after", "x", "y"]);
    }

    #[test]
    fn test_same_anchor_counts_once() {
        let mut ctx = SolverContext::default();
        add_node(&mut ctx, "a", None);
        let item = FlexItemProperty::new()
            .with_rule(
                AlignDirection::Left,
                AlignRule::horizontal("a", HorizontalAlign::Start),
            )
            .with_rule(AlignDirection::Top, AlignRule::vertical("a", VerticalAlign::Bottom));
        add_node(&mut ctx, "b", Some(item));

        build_dependencies(&mut ctx);
        compute_incoming_degrees(&mut ctx);
        assert_eq!(ctx.incoming_degree_map["b"], 1);
    }

    #[test]
    fn test_barrier_waits_for_references() {
        let mut ctx = SolverContext::default();
        add_node(&mut ctx, "after", Some(left_of("wall")));
        add_node(&mut ctx, "a", Some(left_of("__container__")));
        ctx.barriers.insert(
            "wall".to_string(),
            (
                BarrierDirection::Right,
                vec!["a".to_string(), "missing".to_string()],
            ),
        );

        build_dependencies(&mut ctx);
        assert_eq!(pre_topological_loop_detection(&mut ctx), Ok(()));
        assert_eq!(topological_sort(&ctx), vec!["a", "wall", "after"]);
    }

    #[test]
    fn test_empty_barrier_is_seeded() {
        let mut ctx = SolverContext::default();
        ctx.barriers
            .insert("lonely".to_string(), (BarrierDirection::Left, vec![]));
        build_dependencies(&mut ctx);
        assert_eq!(pre_topological_loop_detection(&mut ctx), Ok(()));
        assert_eq!(topological_sort(&ctx), vec!["lonely"]);
    }

    #[test]
    fn test_container_reliance() {
        let mut ctx = SolverContext::default();
        add_node(&mut ctx, "a", Some(left_of("__container__")));
        add_node(&mut ctx, "b", Some(left_of("a")));
        mark_container_reliance(&mut ctx);
        assert!(ctx.horizontal_rely_on_container);
        assert!(!ctx.vertical_rely_on_container);
    }
}
