//! Per-pass scratch state of the relative layout algorithm
//!
//! Everything here is rebuilt at the start of every measure pass. Child
//! properties are snapshotted once so later stages only touch the host for
//! geometry and measuring.

use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::dimension::ScaleProperty;
use crate::geometry::{OffsetF, PaddingPropertyF, SizeF};

use super::chain::ChainParam;
use super::types::{
    is_anchor_container, AlignRulesItem, Axis, BarrierDirection, ContainerLayoutProperty,
    FlexItemProperty, LayoutConstraint, LineDirection, VisibleType,
};
use super::wrapper::LayoutWrapper;

/// What an anchor id resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    Container,
    Guideline(LineDirection),
    Barrier(BarrierDirection),
    /// A child, by index into the host's children
    Sibling(usize),
    Unknown,
}

impl AnchorKind {
    /// Guidelines and barriers are lines: zero extent, position recorded
    pub fn is_line(self) -> bool {
        matches!(self, AnchorKind::Guideline(_) | AnchorKind::Barrier(_))
    }

    pub fn is_legal(self) -> bool {
        self != AnchorKind::Unknown
    }

    /// Axis along which a line anchor's position is meaningful
    pub fn line_axis(self) -> Option<Axis> {
        match self {
            AnchorKind::Guideline(direction) => Some(direction.axis()),
            AnchorKind::Barrier(direction) => Some(direction.axis()),
            _ => None,
        }
    }
}

/// Static snapshot of one child
#[derive(Debug, Clone)]
pub struct ChildNode {
    pub id: String,
    /// Index into the host's children
    pub index: usize,
    pub flex_item: Option<FlexItemProperty>,
    /// Align rules with `Start`/`End` folded into `Left`/`Right`
    pub rules: AlignRulesItem,
    pub visibility: VisibleType,
    pub has_ideal_width: bool,
    pub has_ideal_height: bool,
}

impl ChildNode {
    pub fn is_gone(&self) -> bool {
        self.visibility == VisibleType::Gone
    }

    /// True when the child takes part in rule solving
    pub fn has_rules(&self) -> bool {
        self.flex_item.is_some() && !self.rules.is_empty()
    }

    pub fn has_ideal(&self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.has_ideal_width,
            Axis::Vertical => self.has_ideal_height,
        }
    }

    /// Declared chain weight on an axis, zero when absent
    pub fn chain_weight(&self, axis: Axis) -> f64 {
        self.flex_item
            .as_ref()
            .map(|item| item.chain_weight.on(axis))
            .unwrap_or(0.0)
    }

    pub fn has_weight(&self, axis: Axis) -> bool {
        self.chain_weight(axis) > 0.0
    }
}

/// Scratch state for one measure pass
#[derive(Debug, Default)]
pub struct SolverContext {
    pub scale: ScaleProperty,
    pub rtl: bool,
    /// Working size of the container, padding included
    pub frame_size: SizeF,
    /// Working size minus padding and border
    pub container_size: SizeF,
    pub padding: PaddingPropertyF,
    /// Children by id in render order; the first child wins a duplicate id
    pub nodes: IndexMap<String, ChildNode>,
    /// Indices of children whose id was already taken
    pub duplicates: Vec<usize>,
    pub guidelines: IndexMap<String, (LineDirection, f64)>,
    pub barriers: IndexMap<String, (BarrierDirection, Vec<String>)>,
    pub record_offset_map: FxHashMap<String, OffsetF>,
    /// anchor -> nodes waiting for it
    pub relied_on_map: FxHashMap<String, IndexSet<String>>,
    pub incoming_degree_map: IndexMap<String, usize>,
    pub horizontal_chains: IndexMap<String, ChainParam>,
    pub vertical_chains: IndexMap<String, ChainParam>,
    /// member -> chain head
    pub horizontal_chain_node_map: FxHashMap<String, String>,
    pub vertical_chain_node_map: FxHashMap<String, String>,
    pub horizontal_rely_on_container: bool,
    pub vertical_rely_on_container: bool,
    pub chain_weight_mode: bool,
    pub render_list: Vec<String>,
}

impl SolverContext {
    /// Resolve the container's working size and padding
    pub fn new(property: &ContainerLayoutProperty, scale: ScaleProperty) -> Self {
        let constraint = property.layout_constraint.unwrap_or_default();
        let width = constraint.self_ideal_size.width.unwrap_or_else(|| {
            constraint
                .percent_reference
                .width
                .min(constraint.max_size.width)
                .max(constraint.min_size.width)
        });
        let height = constraint.self_ideal_size.height.unwrap_or_else(|| {
            constraint
                .percent_reference
                .height
                .min(constraint.max_size.height)
                .max(constraint.min_size.height)
        });
        let frame_size = SizeF::new(width, height);
        let padding = property.padding_and_border();

        Self {
            scale,
            rtl: property.is_rtl(),
            frame_size,
            container_size: frame_size.minus_padding(&padding),
            padding,
            ..Default::default()
        }
    }

    /// Reactivate every child for this pass and snapshot it
    pub fn collect_nodes<C: LayoutWrapper>(&mut self, children: &mut [C]) {
        for child in children.iter_mut() {
            child.set_active(true);
        }
        self.snapshot_nodes(children);
    }

    /// Snapshot every child's properties by id
    pub fn snapshot_nodes<C: LayoutWrapper>(&mut self, children: &[C]) {
        self.nodes.clear();
        self.duplicates.clear();
        for (index, child) in children.iter().enumerate() {
            let property = child.layout_property();
            let id = property.id();
            if self.nodes.contains_key(&id) {
                warn!("duplicate child id '{}', only the first one is solved", id);
                self.duplicates.push(index);
                continue;
            }
            let rules = property
                .flex_item
                .as_ref()
                .map(|item| item.normalized_rules())
                .unwrap_or_default();
            let node = ChildNode {
                id: id.clone(),
                index,
                flex_item: property.flex_item.clone(),
                rules,
                visibility: property.visibility,
                has_ideal_width: property.calc_size.has_width(),
                has_ideal_height: property.calc_size.has_height(),
            };
            self.nodes.insert(id, node);
        }
        debug!("collected {} children", self.nodes.len());
    }

    /// Classify an anchor id; lines take precedence over siblings
    pub fn classify(&self, id: &str) -> AnchorKind {
        if is_anchor_container(id) {
            return AnchorKind::Container;
        }
        if let Some((direction, _)) = self.guidelines.get(id) {
            return AnchorKind::Guideline(*direction);
        }
        if let Some((direction, _)) = self.barriers.get(id) {
            return AnchorKind::Barrier(*direction);
        }
        match self.nodes.get(id) {
            Some(node) => AnchorKind::Sibling(node.index),
            None => AnchorKind::Unknown,
        }
    }

    pub fn is_anchor_legal(&self, id: &str) -> bool {
        self.classify(id).is_legal()
    }

    pub fn is_guideline(&self, id: &str) -> bool {
        self.guidelines.contains_key(id)
    }

    pub fn is_barrier(&self, id: &str) -> bool {
        self.barriers.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&ChildNode> {
        self.nodes.get(id)
    }

    pub fn is_gone(&self, id: &str) -> bool {
        self.nodes.get(id).is_some_and(|n| n.is_gone())
    }

    /// Recorded margin-frame offset, zero when nothing was recorded yet
    pub fn record_offset(&self, id: &str) -> OffsetF {
        self.record_offset_map.get(id).copied().unwrap_or_default()
    }

    pub fn set_record_offset(&mut self, id: &str, offset: OffsetF) {
        self.record_offset_map.insert(id.to_string(), offset);
    }

    pub fn chains(&self, axis: Axis) -> &IndexMap<String, ChainParam> {
        match axis {
            Axis::Horizontal => &self.horizontal_chains,
            Axis::Vertical => &self.vertical_chains,
        }
    }

    pub fn chains_mut(&mut self, axis: Axis) -> &mut IndexMap<String, ChainParam> {
        match axis {
            Axis::Horizontal => &mut self.horizontal_chains,
            Axis::Vertical => &mut self.vertical_chains,
        }
    }

    pub fn chain_node_map_mut(&mut self, axis: Axis) -> &mut FxHashMap<String, String> {
        match axis {
            Axis::Horizontal => &mut self.horizontal_chain_node_map,
            Axis::Vertical => &mut self.vertical_chain_node_map,
        }
    }

    /// Head of the chain `id` belongs to on an axis
    pub fn chain_of(&self, id: &str, axis: Axis) -> Option<&str> {
        let map = match axis {
            Axis::Horizontal => &self.horizontal_chain_node_map,
            Axis::Vertical => &self.vertical_chain_node_map,
        };
        map.get(id).map(String::as_str)
    }

    pub fn is_in_chain(&self, id: &str, axis: Axis) -> bool {
        self.chain_of(id, axis).is_some()
    }

    pub fn set_rely_on_container(&mut self, axis: Axis) {
        match axis {
            Axis::Horizontal => self.horizontal_rely_on_container = true,
            Axis::Vertical => self.vertical_rely_on_container = true,
        }
    }

    pub fn rely_on_container(&self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.horizontal_rely_on_container,
            Axis::Vertical => self.vertical_rely_on_container,
        }
    }

    /// Content-size extent of the container on an axis
    pub fn container_extent(&self, axis: Axis) -> f64 {
        axis.of_size(self.container_size)
    }

    /// Constraint template every child is measured from
    pub fn child_constraint(&self) -> LayoutConstraint {
        LayoutConstraint::up_to(self.container_size)
    }
}
