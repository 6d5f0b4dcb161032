//! A concrete host tree for the relative container
//!
//! Scenes are loaded from TOML (see [`config`]). Every node is either a leaf
//! with an intrinsic content size or a nested relative container. The root is
//! a relative container offered the viewport.

pub mod config;

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, info};

use crate::dimension::{CalcLength, ScaleProperty};
use crate::error::SceneError;
use crate::geometry::{OffsetF, PaddingPropertyF, RectF, SizeF};
use crate::layout::{
    lint, AlignDirection, AlignRule, Axis, BarrierInfo, BiasPair, CalcSize, ChainInfo,
    ChainWeightPair, ContainerLayoutProperty, ContainerWrapper, FlexItemProperty, GeometryNode,
    GuidelineInfo, HorizontalAlign, LayoutConfig, LayoutConstraint, LayoutProperty, LayoutWrapper,
    LintWarning, MeasureReport, ReferenceLine, RelativeContainerLayoutAlgorithm, RelativeContainerPattern,
    RuleAlign, TextDirection, VerticalAlign, CONTAINER_ID,
};

use self::config::{AlignName, ContainerDef, EdgesDef, NodeDef, SceneFile};

/// A loaded scene
#[derive(Debug)]
pub struct Scene {
    viewport: SizeF,
    config: LayoutConfig,
    root: SceneNode,
}

impl Scene {
    /// Parse a scene from TOML source
    pub fn from_toml(source: &str) -> Result<Self, SceneError> {
        let file: SceneFile = toml::from_str(source)?;
        Self::from_def(file)
    }

    /// Read and parse a scene file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source)
    }

    fn from_def(file: SceneFile) -> Result<Self, SceneError> {
        let viewport = SizeF::new(file.viewport.width, file.viewport.height);
        let config = file.config;
        let mut builder = Builder {
            config,
            next_node_id: 0,
        };
        let root = builder.root(&file.container, &file.children, viewport)?;
        debug!("loaded scene with {} top-level children", root.children().len());
        Ok(Self {
            viewport,
            config,
            root,
        })
    }

    /// Override the writing direction of the root container
    pub fn with_direction(mut self, direction: TextDirection) -> Self {
        if let Some(container) = self.root.container.as_mut() {
            container.property.direction = direction;
        }
        self
    }

    /// Record debug strings on every container's pattern
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.config = self.config.with_debug(debug);
        self.root.reconfigure(self.config);
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn viewport(&self) -> SizeF {
        self.viewport
    }

    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    /// Measure the whole tree within the viewport
    pub fn measure(&mut self) -> MeasureReport {
        self.root.measure(&LayoutConstraint::up_to(self.viewport));
        let report = self.report().cloned().unwrap_or_default();
        info!(
            "measured root at {:?}, {} nodes ordered",
            self.root.geometry.frame_size,
            report.order.len()
        );
        report
    }

    /// Commit positions computed by the last measure
    pub fn layout(&mut self) {
        self.root.geometry.frame_offset = OffsetF::zero();
        self.root.layout();
    }

    /// Measure then lay out
    pub fn run(&mut self) -> MeasureReport {
        let report = self.measure();
        self.layout();
        report
    }

    /// Report of the root container's last measure pass
    pub fn report(&self) -> Option<&MeasureReport> {
        self.root.pattern().and_then(|p| p.last_report())
    }

    pub fn pattern(&self) -> Option<&RelativeContainerPattern> {
        self.root.pattern()
    }

    /// Absolute frames of every node, keyed by id path (`outer/inner` for
    /// nested children); the root is keyed `__container__`. A duplicate id
    /// keeps the first child's frame.
    pub fn frames(&self) -> IndexMap<String, RectF> {
        let mut frames = IndexMap::new();
        frames.insert(CONTAINER_ID.to_string(), self.root.frame());
        self.root.collect_frames(OffsetF::zero(), None, &mut frames);
        frames
    }

    /// Frame of a top-level child, or of a nested one by `outer/inner` path
    pub fn frame(&self, path: &str) -> Option<RectF> {
        self.frames().get(path).copied()
    }

    /// Guidelines and barriers of the root container, in absolute positions
    pub fn reference_lines(&self) -> Vec<ReferenceLine> {
        self.root.reference_lines()
    }

    /// Lint every container in the tree
    pub fn lint(&self) -> Vec<LintWarning> {
        let mut warnings = Vec::new();
        self.root.lint_into(&mut warnings);
        warnings
    }
}

/// State of a node that is itself a relative container
#[derive(Debug)]
struct NestedContainer {
    property: ContainerLayoutProperty,
    children: Vec<SceneNode>,
    pattern: RelativeContainerPattern,
    algorithm: RelativeContainerLayoutAlgorithm,
}

/// A node of the scene tree
#[derive(Debug)]
pub struct SceneNode {
    property: LayoutProperty,
    geometry: GeometryNode,
    active: bool,
    /// Size used when nothing else determines the frame
    content: SizeF,
    scale: ScaleProperty,
    container: Option<NestedContainer>,
}

impl SceneNode {
    pub fn id(&self) -> String {
        self.property.id()
    }

    pub fn property(&self) -> &LayoutProperty {
        &self.property
    }

    pub fn geometry(&self) -> &GeometryNode {
        &self.geometry
    }

    pub fn is_container(&self) -> bool {
        self.container.is_some()
    }

    pub fn children(&self) -> &[SceneNode] {
        self.container
            .as_ref()
            .map(|c| c.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn pattern(&self) -> Option<&RelativeContainerPattern> {
        self.container.as_ref().map(|c| &c.pattern)
    }

    fn reconfigure(&mut self, config: LayoutConfig) {
        let Some(container) = self.container.as_mut() else {
            return;
        };
        container.algorithm = RelativeContainerLayoutAlgorithm::new(config);
        for child in &mut container.children {
            child.reconfigure(config);
        }
    }

    /// Frame relative to the parent's frame
    pub fn frame(&self) -> RectF {
        RectF::from_offset_size(self.geometry.frame_offset, self.geometry.frame_size)
    }

    fn collect_frames(
        &self,
        origin: OffsetF,
        prefix: Option<&str>,
        frames: &mut IndexMap<String, RectF>,
    ) {
        let origin = origin + self.geometry.frame_offset;
        for child in self.children() {
            let id = child.id();
            let key = match prefix {
                Some(prefix) => format!("{}/{}", prefix, id),
                None => id,
            };
            let rect = RectF::from_offset_size(
                origin + child.geometry.frame_offset,
                child.geometry.frame_size,
            );
            if frames.contains_key(&key) {
                continue;
            }
            frames.insert(key.clone(), rect);
            if child.is_container() {
                child.collect_frames(origin, Some(&key), frames);
            }
        }
    }

    fn reference_lines(&self) -> Vec<ReferenceLine> {
        let Some(container) = &self.container else {
            return Vec::new();
        };
        let origin = self.geometry.frame_offset + container.property.padding_and_border().origin();
        container
            .algorithm
            .reference_lines()
            .into_iter()
            .map(|line| ReferenceLine {
                position: line.position + line.axis.of_offset(origin),
                ..line
            })
            .collect()
    }

    fn lint_into(&self, warnings: &mut Vec<LintWarning>) {
        let Some(container) = &self.container else {
            return;
        };
        warnings.extend(lint::check(&container.property, &container.children));
        for child in &container.children {
            child.lint_into(warnings);
        }
    }

    /// Size of a leaf on one axis
    fn leaf_extent(&self, axis: Axis, constraint: &LayoutConstraint) -> f64 {
        let (ideal, declared, reference, content, min, max) = match axis {
            Axis::Horizontal => (
                constraint.self_ideal_size.width,
                self.property.calc_size.width,
                constraint.percent_reference.width,
                self.content.width,
                constraint.min_size.width,
                constraint.max_size.width,
            ),
            Axis::Vertical => (
                constraint.self_ideal_size.height,
                self.property.calc_size.height,
                constraint.percent_reference.height,
                self.content.height,
                constraint.min_size.height,
                constraint.max_size.height,
            ),
        };
        if let Some(ideal) = ideal {
            return ideal.max(0.0);
        }
        let declared = declared
            .and_then(|length| length.dimension())
            .and_then(|d| d.convert_to_px(&self.scale, Some(reference)));
        declared.unwrap_or(content).min(max).max(min)
    }

    /// Constraint handed to a nested container's algorithm
    fn nested_constraint(&self, constraint: &LayoutConstraint) -> LayoutConstraint {
        let mut own = *constraint;
        let fixed = |length: Option<CalcLength>, reference: f64| {
            length
                .and_then(|l| l.dimension())
                .and_then(|d| d.convert_to_px(&self.scale, Some(reference)))
        };
        if own.self_ideal_size.width.is_none() {
            own.self_ideal_size.width = fixed(self.property.calc_size.width, constraint.percent_reference.width);
        }
        if own.self_ideal_size.height.is_none() {
            own.self_ideal_size.height =
                fixed(self.property.calc_size.height, constraint.percent_reference.height);
        }
        own
    }
}

impl LayoutWrapper for SceneNode {
    fn layout_property(&self) -> &LayoutProperty {
        &self.property
    }

    fn geometry_node(&self) -> &GeometryNode {
        &self.geometry
    }

    fn geometry_node_mut(&mut self) -> &mut GeometryNode {
        &mut self.geometry
    }

    fn measure(&mut self, constraint: &LayoutConstraint) {
        if self.property.is_gone() {
            self.geometry.set_frame_size(SizeF::zero());
            return;
        }
        if self.container.is_none() {
            let size = SizeF::new(
                self.leaf_extent(Axis::Horizontal, constraint),
                self.leaf_extent(Axis::Vertical, constraint),
            );
            self.geometry.set_frame_size(size);
            return;
        }

        let nested = self.nested_constraint(constraint);
        let Some(container) = self.container.as_mut() else {
            return;
        };
        container.property.layout_constraint = Some(nested);
        let NestedContainer {
            property,
            children,
            pattern,
            algorithm,
        } = container;
        let mut view = ContainerView {
            property,
            geometry: &mut self.geometry,
            children,
            pattern,
        };
        algorithm.measure(&mut view);
    }

    fn layout(&mut self) {
        let Some(container) = self.container.as_mut() else {
            return;
        };
        let NestedContainer {
            property,
            children,
            pattern,
            algorithm,
        } = container;
        let mut view = ContainerView {
            property,
            geometry: &mut self.geometry,
            children,
            pattern,
        };
        algorithm.layout(&mut view);
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Borrowed view of a container node handed to the algorithm
struct ContainerView<'a> {
    property: &'a ContainerLayoutProperty,
    geometry: &'a mut GeometryNode,
    children: &'a mut Vec<SceneNode>,
    pattern: &'a mut RelativeContainerPattern,
}

impl ContainerWrapper for ContainerView<'_> {
    type Child = SceneNode;

    fn layout_property(&self) -> &ContainerLayoutProperty {
        self.property
    }

    fn geometry_node_mut(&mut self) -> &mut GeometryNode {
        &mut *self.geometry
    }

    fn children_with_build(&mut self) -> &mut [SceneNode] {
        self.children.as_mut_slice()
    }

    fn pattern_mut(&mut self) -> &mut RelativeContainerPattern {
        &mut *self.pattern
    }
}

/// Turns scene definitions into nodes, numbering them as it goes
struct Builder {
    config: LayoutConfig,
    next_node_id: u64,
}

impl Builder {
    fn root(&mut self, def: &ContainerDef, children: &[NodeDef], viewport: SizeF) -> Result<SceneNode, SceneError> {
        let scale = self.config.scale;
        let property = LayoutProperty {
            inspector_id: def.id.clone(),
            tag: "RelativeContainer".to_string(),
            node_id: self.node_id(),
            flex_item: None,
            calc_size: CalcSize::new(def.width, def.height),
            visibility: Default::default(),
        };
        let container = ContainerLayoutProperty {
            guidelines: def.guidelines.iter().map(guideline).collect(),
            barriers: def.barriers.iter().map(barrier).collect(),
            calc_size: property.calc_size,
            padding: edges(def.padding.as_ref(), &scale, viewport.width),
            border: edges(def.border.as_ref(), &scale, viewport.width),
            direction: def.direction,
            layout_constraint: None,
        };
        let children = self.children(children, viewport)?;
        Ok(self.container_node(property, container, children, GeometryNode::default()))
    }

    fn node_id(&mut self) -> u64 {
        let id = self.next_node_id;
        self.next_node_id += 1;
        id
    }

    fn children(&mut self, defs: &[NodeDef], reference: SizeF) -> Result<Vec<SceneNode>, SceneError> {
        defs.iter()
            .enumerate()
            .map(|(index, def)| self.node(index, def, reference))
            .collect()
    }

    fn node(&mut self, index: usize, def: &NodeDef, reference: SizeF) -> Result<SceneNode, SceneError> {
        if def.id.as_deref() == Some("") {
            return Err(SceneError::EmptyId { index: index + 1 });
        }
        let scale = self.config.scale;
        let tag = def.tag.clone().unwrap_or_else(|| {
            if def.is_container() {
                "RelativeContainer".to_string()
            } else {
                "Node".to_string()
            }
        });
        let node_id = self.node_id();
        let name = def.id.clone().unwrap_or_else(|| format!("child #{}", index + 1));
        let flex_item = if def.has_flex_item() {
            Some(flex_item(&name, def)?)
        } else {
            None
        };
        let property = LayoutProperty {
            inspector_id: def.id.clone(),
            tag,
            node_id,
            flex_item,
            calc_size: CalcSize::new(def.width, def.height),
            visibility: def.visibility,
        };
        let geometry = GeometryNode {
            margin: def.margin.as_ref().map(|m| m.resolve(&scale, reference.width)),
            ..Default::default()
        };

        let Some(children) = &def.children else {
            let content = def
                .content
                .map(|[w, h]| SizeF::new(w, h))
                .unwrap_or_default();
            return Ok(SceneNode {
                property,
                geometry,
                active: true,
                content,
                scale,
                container: None,
            });
        };

        let container = ContainerLayoutProperty {
            guidelines: def.guidelines.iter().map(guideline).collect(),
            barriers: def.barriers.iter().map(barrier).collect(),
            calc_size: property.calc_size,
            padding: edges(def.padding.as_ref(), &scale, reference.width),
            border: edges(def.border.as_ref(), &scale, reference.width),
            direction: def.direction.unwrap_or_default(),
            layout_constraint: None,
        };
        let children = self.children(children, reference)?;
        Ok(self.container_node(property, container, children, geometry))
    }

    fn container_node(
        &self,
        property: LayoutProperty,
        container: ContainerLayoutProperty,
        children: Vec<SceneNode>,
        geometry: GeometryNode,
    ) -> SceneNode {
        SceneNode {
            property,
            geometry,
            active: true,
            content: SizeF::zero(),
            scale: self.config.scale,
            container: Some(NestedContainer {
                property: container,
                children,
                pattern: RelativeContainerPattern::new(),
                algorithm: RelativeContainerLayoutAlgorithm::new(self.config),
            }),
        }
    }
}

fn edges(def: Option<&EdgesDef>, scale: &ScaleProperty, reference_width: f64) -> PaddingPropertyF {
    def.map(|e| e.resolve(scale, reference_width))
        .unwrap_or_default()
}

fn guideline(def: &config::GuidelineDef) -> GuidelineInfo {
    GuidelineInfo {
        id: def.id.clone(),
        direction: def.direction,
        start: def.start,
        end: def.end,
    }
}

fn barrier(def: &config::BarrierDef) -> BarrierInfo {
    BarrierInfo::new(def.id.clone(), def.direction, def.referenced_ids.clone())
}

fn flex_item(name: &str, def: &NodeDef) -> Result<FlexItemProperty, SceneError> {
    let mut item = FlexItemProperty::new();
    for (key, rule) in &def.align_rules {
        let direction: AlignDirection = key.parse().map_err(|message| SceneError::UnknownDirection {
            node: name.to_string(),
            message,
        })?;
        let align = rule_align(direction, rule.align).ok_or_else(|| SceneError::InvalidAlign {
            node: name.to_string(),
            direction: direction.to_string(),
            align: format!("{:?}", rule.align).to_lowercase(),
        })?;
        item = item.with_rule(
            direction,
            AlignRule {
                anchor: rule.anchor.clone(),
                align,
            },
        );
    }
    item.bias = def.bias.map(|b| BiasPair::new(b.horizontal, b.vertical));
    if let Some(weight) = def.chain_weight {
        item.chain_weight = ChainWeightPair::new(weight.horizontal, weight.vertical);
    }
    item.horizontal_chain = def.horizontal_chain.map(ChainInfo::horizontal);
    item.vertical_chain = def.vertical_chain.map(ChainInfo::vertical);
    Ok(item)
}

/// Anchor line for a rule, `None` when the name belongs to the other axis
fn rule_align(direction: AlignDirection, name: AlignName) -> Option<RuleAlign> {
    match (direction.axis(), name) {
        (Axis::Horizontal, AlignName::Start) => Some(RuleAlign::Horizontal(HorizontalAlign::Start)),
        (Axis::Horizontal, AlignName::Center) => Some(RuleAlign::Horizontal(HorizontalAlign::Center)),
        (Axis::Horizontal, AlignName::End) => Some(RuleAlign::Horizontal(HorizontalAlign::End)),
        (Axis::Vertical, AlignName::Top) => Some(RuleAlign::Vertical(VerticalAlign::Top)),
        (Axis::Vertical, AlignName::Center) => Some(RuleAlign::Vertical(VerticalAlign::Center)),
        (Axis::Vertical, AlignName::Bottom) => Some(RuleAlign::Vertical(VerticalAlign::Bottom)),
        _ => None,
    }
}
