//! Lint checks for relative container configuration.
//!
//! The algorithm silently ignores what it cannot use: rules pointing at
//! unknown ids, guidelines or barriers whose id is already taken, chain
//! declarations that do not form a chain. These checks report each of those,
//! plus dependency loops, without measuring anything.

use std::fmt;

use indexmap::IndexSet;

use crate::dimension::ScaleProperty;

use super::chain::check_chains;
use super::context::SolverContext;
use super::graph::{build_dependencies, pre_topological_loop_detection};
use super::guideline::{calc_barriers, calc_guidelines};
use super::types::{is_anchor_container, Axis, ContainerLayoutProperty};
use super::wrapper::LayoutWrapper;

/// A lint warning about the container's configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintWarning {
    pub category: LintCategory,
    /// Id of the child, guideline or barrier the warning is about
    pub subject: String,
    pub message: String,
}

impl LintWarning {
    pub fn new(category: LintCategory, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.category, self.subject, self.message)
    }
}

/// Category of lint finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LintCategory {
    UnknownAnchor,
    DuplicateId,
    MalformedChain,
    DependencyLoop,
}

impl fmt::Display for LintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintCategory::UnknownAnchor => write!(f, "unknown-anchor"),
            LintCategory::DuplicateId => write!(f, "duplicate-id"),
            LintCategory::MalformedChain => write!(f, "malformed-chain"),
            LintCategory::DependencyLoop => write!(f, "dependency-loop"),
        }
    }
}

/// Run all lint checks on a container and its children.
pub fn check<C: LayoutWrapper>(property: &ContainerLayoutProperty, children: &[C]) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    let mut ctx = SolverContext::new(property, ScaleProperty::default());
    ctx.snapshot_nodes(children);

    check_ids(&ctx, property, children, &mut warnings);
    calc_guidelines(&mut ctx, property);
    calc_barriers(&mut ctx, property);
    check_anchors(&ctx, &mut warnings);
    check_chains(&mut ctx);
    check_chain_declarations(&ctx, &mut warnings);

    build_dependencies(&mut ctx);
    if let Err(nodes) = pre_topological_loop_detection(&mut ctx) {
        for node in nodes {
            warnings.push(LintWarning::new(
                LintCategory::DependencyLoop,
                node,
                "caught in or behind a dependency loop",
            ));
        }
    }
    warnings
}

// ── Ids ───────────────────────────────────────────────────────────

fn check_ids<C: LayoutWrapper>(
    ctx: &SolverContext,
    property: &ContainerLayoutProperty,
    children: &[C],
    warnings: &mut Vec<LintWarning>,
) {
    for index in &ctx.duplicates {
        let id = children[*index].layout_property().id();
        warnings.push(LintWarning::new(
            LintCategory::DuplicateId,
            id,
            format!("child #{} reuses an id, it is placed at the content origin", index + 1),
        ));
    }

    let mut guideline_ids: IndexSet<&str> = IndexSet::new();
    for guideline in &property.guidelines {
        if guideline.id.is_empty() {
            warnings.push(LintWarning::new(
                LintCategory::DuplicateId,
                "<guideline>",
                "guideline without an id is ignored",
            ));
        } else if ctx.nodes.contains_key(&guideline.id) {
            warnings.push(LintWarning::new(
                LintCategory::DuplicateId,
                &guideline.id,
                "guideline id is taken by a child, the guideline is ignored",
            ));
        } else {
            guideline_ids.insert(&guideline.id);
        }
    }

    for barrier in &property.barriers {
        if barrier.id.is_empty() {
            warnings.push(LintWarning::new(
                LintCategory::DuplicateId,
                "<barrier>",
                "barrier without an id is ignored",
            ));
        } else if ctx.nodes.contains_key(&barrier.id) || guideline_ids.contains(barrier.id.as_str()) {
            warnings.push(LintWarning::new(
                LintCategory::DuplicateId,
                &barrier.id,
                "barrier id is taken by a child or guideline, the barrier is ignored",
            ));
        }
    }
}

// ── Anchors ───────────────────────────────────────────────────────

fn check_anchors(ctx: &SolverContext, warnings: &mut Vec<LintWarning>) {
    for (id, node) in &ctx.nodes {
        for (direction, rule) in &node.rules {
            if !ctx.is_anchor_legal(&rule.anchor) {
                warnings.push(LintWarning::new(
                    LintCategory::UnknownAnchor,
                    id,
                    format!("{} rule anchors to unknown id '{}'", direction, rule.anchor),
                ));
            } else if rule.anchor == *id {
                warnings.push(LintWarning::new(
                    LintCategory::UnknownAnchor,
                    id,
                    format!("{} rule anchors to the child itself", direction),
                ));
            }
        }
    }

    for (id, (_, referenced)) in &ctx.barriers {
        for name in referenced {
            let known = !is_anchor_container(name) && ctx.is_anchor_legal(name);
            if !known {
                warnings.push(LintWarning::new(
                    LintCategory::UnknownAnchor,
                    id,
                    format!("barrier references unknown id '{}'", name),
                ));
            }
        }
    }
}

// ── Chains ────────────────────────────────────────────────────────

fn check_chain_declarations(ctx: &SolverContext, warnings: &mut Vec<LintWarning>) {
    for (id, node) in &ctx.nodes {
        let Some(item) = &node.flex_item else {
            continue;
        };
        for axis in [Axis::Horizontal, Axis::Vertical] {
            if item.chain(axis).is_some() && !ctx.is_in_chain(id, axis) {
                warnings.push(LintWarning::new(
                    LintCategory::MalformedChain,
                    id,
                    format!("declares a {} chain but no chain starts here", axis),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SizeF;
    use crate::layout::types::{
        AlignDirection, AlignRule, BarrierDirection, BarrierInfo, ChainStyle, FlexItemProperty,
        GeometryNode, HorizontalAlign, LayoutConstraint, LayoutProperty,
    };

    struct Leaf {
        property: LayoutProperty,
        geometry: GeometryNode,
    }

    impl LayoutWrapper for Leaf {
        fn layout_property(&self) -> &LayoutProperty {
            &self.property
        }
        fn geometry_node(&self) -> &GeometryNode {
            &self.geometry
        }
        fn geometry_node_mut(&mut self) -> &mut GeometryNode {
            &mut self.geometry
        }
        fn measure(&mut self, _constraint: &LayoutConstraint) {}
        fn layout(&mut self) {}
        fn set_active(&mut self, _active: bool) {}
        fn is_active(&self) -> bool {
            true
        }
    }

    fn leaf(id: &str, item: Option<FlexItemProperty>) -> Leaf {
        Leaf {
            property: LayoutProperty {
                inspector_id: Some(id.to_string()),
                flex_item: item,
                ..Default::default()
            },
            geometry: GeometryNode::default(),
        }
    }

    fn left_to(anchor: &str, align: HorizontalAlign) -> FlexItemProperty {
        FlexItemProperty::new().with_rule(AlignDirection::Left, AlignRule::horizontal(anchor, align))
    }

    fn container() -> ContainerLayoutProperty {
        ContainerLayoutProperty {
            layout_constraint: Some(LayoutConstraint::exact(SizeF::new(100.0, 100.0))),
            ..Default::default()
        }
    }

    fn categories(warnings: &[LintWarning]) -> Vec<String> {
        warnings.iter().map(|w| w.category.to_string()).collect()
    }

    #[test]
    fn test_clean_configuration() {
        let children = vec![
            leaf("a", Some(left_to("__container__", HorizontalAlign::Start))),
            leaf("b", Some(left_to("a", HorizontalAlign::End))),
        ];
        let warnings = check(&container(), &children);
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    }

    #[test]
    fn test_unknown_anchor() {
        let children = vec![leaf("a", Some(left_to("ghost", HorizontalAlign::Start)))];
        let warnings = check(&container(), &children);
        assert_eq!(categories(&warnings), vec!["unknown-anchor"]);
        assert_eq!(
            warnings[0].to_string(),
            "[unknown-anchor] a: left rule anchors to unknown id 'ghost'"
        );
    }

    #[test]
    fn test_duplicate_ids() {
        let mut property = container();
        property.barriers.push(BarrierInfo::new("a", BarrierDirection::Left, vec![]));
        let children = vec![leaf("a", None), leaf("a", None)];
        let warnings = check(&property, &children);
        assert_eq!(categories(&warnings), vec!["duplicate-id", "duplicate-id"]);
    }

    #[test]
    fn test_malformed_chain() {
        let head = left_to("__container__", HorizontalAlign::Start)
            .with_horizontal_chain(ChainStyle::Spread);
        let children = vec![leaf("solo", Some(head))];
        let warnings = check(&container(), &children);
        assert_eq!(categories(&warnings), vec!["malformed-chain"]);
    }

    #[test]
    fn test_dependency_loop() {
        let children = vec![
            leaf("x", Some(left_to("y", HorizontalAlign::End))),
            leaf("y", Some(left_to("x", HorizontalAlign::End))),
        ];
        let warnings = check(&container(), &children);
        assert_eq!(categories(&warnings), vec!["dependency-loop", "dependency-loop"]);
        assert_eq!(warnings[0].subject, "x");
    }
}
