//! Core types for the relative layout engine
//!
//! The constraint model attached to children (align rules, bias, chains) and
//! to the container (guidelines, barriers), plus the property and geometry
//! records a host tree exposes to the algorithm.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::dimension::{CalcLength, Dimension};
use crate::geometry::{MarginPropertyF, OffsetF, OptionalSizeF, PaddingPropertyF, SizeF};

/// Reserved anchor id naming the container itself
pub const CONTAINER_ID: &str = "__container__";

/// Prefix of ids generated for children without an inspector id
pub const CONCAT_ID_PREFIX: &str = "@concat";

/// Bias used when none is declared or the declared one is negative
pub const DEFAULT_BIAS: f64 = 0.5;

/// Check whether an anchor id names the container
pub fn is_anchor_container(anchor: &str) -> bool {
    anchor == CONTAINER_ID
}

/// Layout axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Pick the component of an offset along this axis
    pub fn of_offset(self, offset: OffsetF) -> f64 {
        match self {
            Axis::Horizontal => offset.x,
            Axis::Vertical => offset.y,
        }
    }

    /// Pick the extent of a size along this axis
    pub fn of_size(self, size: SizeF) -> f64 {
        match self {
            Axis::Horizontal => size.width,
            Axis::Vertical => size.height,
        }
    }

    /// Same offset with this axis' component replaced
    pub fn with_offset(self, offset: OffsetF, value: f64) -> OffsetF {
        match self {
            Axis::Horizontal => offset.with_x(value),
            Axis::Vertical => offset.with_y(value),
        }
    }

    /// Leading margin of the anchor edge on this axis
    pub fn leading_margin(self, margin: &MarginPropertyF, rtl: bool) -> f64 {
        match (self, rtl) {
            (Axis::Horizontal, false) => margin.left,
            (Axis::Horizontal, true) => margin.right,
            (Axis::Vertical, _) => margin.top,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Horizontal => write!(f, "horizontal"),
            Axis::Vertical => write!(f, "vertical"),
        }
    }
}

/// Edge or center line of a child that an align rule positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignDirection {
    Left,
    Middle,
    Right,
    Top,
    Center,
    Bottom,
    /// Leading edge; solved as `Left`, mirrored afterwards under RTL
    Start,
    /// Trailing edge; solved as `Right`, mirrored afterwards under RTL
    End,
}

impl AlignDirection {
    pub fn axis(self) -> Axis {
        match self {
            AlignDirection::Left
            | AlignDirection::Middle
            | AlignDirection::Right
            | AlignDirection::Start
            | AlignDirection::End => Axis::Horizontal,
            AlignDirection::Top | AlignDirection::Center | AlignDirection::Bottom => Axis::Vertical,
        }
    }

    /// Map writing-direction-relative directions onto physical ones
    pub fn normalized(self) -> AlignDirection {
        match self {
            AlignDirection::Start => AlignDirection::Left,
            AlignDirection::End => AlignDirection::Right,
            other => other,
        }
    }

    /// Which part of the child's own extent sits on the anchor line
    pub fn fraction(self) -> f64 {
        match self.normalized() {
            AlignDirection::Left | AlignDirection::Top => 0.0,
            AlignDirection::Middle | AlignDirection::Center => 0.5,
            _ => 1.0,
        }
    }

    /// Leading edge of the axis (`Left` or `Top`)
    pub fn leading(axis: Axis) -> AlignDirection {
        match axis {
            Axis::Horizontal => AlignDirection::Left,
            Axis::Vertical => AlignDirection::Top,
        }
    }

    /// Center line of the axis (`Middle` or `Center`)
    pub fn middle(axis: Axis) -> AlignDirection {
        match axis {
            Axis::Horizontal => AlignDirection::Middle,
            Axis::Vertical => AlignDirection::Center,
        }
    }

    /// Trailing edge of the axis (`Right` or `Bottom`)
    pub fn trailing(axis: Axis) -> AlignDirection {
        match axis {
            Axis::Horizontal => AlignDirection::Right,
            Axis::Vertical => AlignDirection::Bottom,
        }
    }
}

impl FromStr for AlignDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(AlignDirection::Left),
            "middle" => Ok(AlignDirection::Middle),
            "right" => Ok(AlignDirection::Right),
            "top" => Ok(AlignDirection::Top),
            "center" => Ok(AlignDirection::Center),
            "bottom" => Ok(AlignDirection::Bottom),
            "start" => Ok(AlignDirection::Start),
            "end" => Ok(AlignDirection::End),
            other => Err(format!("unknown align direction '{}'", other)),
        }
    }
}

impl fmt::Display for AlignDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlignDirection::Left => "left",
            AlignDirection::Middle => "middle",
            AlignDirection::Right => "right",
            AlignDirection::Top => "top",
            AlignDirection::Center => "center",
            AlignDirection::Bottom => "bottom",
            AlignDirection::Start => "start",
            AlignDirection::End => "end",
        };
        write!(f, "{}", name)
    }
}

/// Line of a horizontal anchor to align with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Start,
    Center,
    End,
}

/// Line of a vertical anchor to align with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

/// Anchor line an align rule targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleAlign {
    Horizontal(HorizontalAlign),
    Vertical(VerticalAlign),
}

impl RuleAlign {
    /// Position of the anchor line as a fraction of the anchor's extent
    pub fn fraction(self) -> f64 {
        match self {
            RuleAlign::Horizontal(HorizontalAlign::Start) | RuleAlign::Vertical(VerticalAlign::Top) => 0.0,
            RuleAlign::Horizontal(HorizontalAlign::Center) | RuleAlign::Vertical(VerticalAlign::Center) => 0.5,
            RuleAlign::Horizontal(HorizontalAlign::End) | RuleAlign::Vertical(VerticalAlign::Bottom) => 1.0,
        }
    }

    /// True for the leading line (`start` / `top`)
    pub fn is_leading(self) -> bool {
        self.fraction() == 0.0
    }

    /// True for the trailing line (`end` / `bottom`)
    pub fn is_trailing(self) -> bool {
        self.fraction() == 1.0
    }
}

impl fmt::Display for RuleAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleAlign::Horizontal(HorizontalAlign::Start) => "start",
            RuleAlign::Horizontal(HorizontalAlign::Center) => "center",
            RuleAlign::Horizontal(HorizontalAlign::End) => "end",
            RuleAlign::Vertical(VerticalAlign::Top) => "top",
            RuleAlign::Vertical(VerticalAlign::Center) => "center",
            RuleAlign::Vertical(VerticalAlign::Bottom) => "bottom",
        };
        write!(f, "{}", name)
    }
}

/// Positions one edge or center line of a child against an anchor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlignRule {
    pub anchor: String,
    pub align: RuleAlign,
}

impl AlignRule {
    pub fn horizontal(anchor: impl Into<String>, align: HorizontalAlign) -> Self {
        Self {
            anchor: anchor.into(),
            align: RuleAlign::Horizontal(align),
        }
    }

    pub fn vertical(anchor: impl Into<String>, align: VerticalAlign) -> Self {
        Self {
            anchor: anchor.into(),
            align: RuleAlign::Vertical(align),
        }
    }
}

/// At most one rule per direction, iterated in direction order
pub type AlignRulesItem = BTreeMap<AlignDirection, AlignRule>;

/// Orientation of a guideline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDirection {
    /// A vertical line, positioned along x
    Vertical,
    /// A horizontal line, positioned along y
    Horizontal,
}

impl LineDirection {
    /// Axis along which the line's position is measured
    pub fn axis(self) -> Axis {
        match self {
            LineDirection::Vertical => Axis::Horizontal,
            LineDirection::Horizontal => Axis::Vertical,
        }
    }
}

/// A fixed reference line declared on the container
#[derive(Debug, Clone, PartialEq)]
pub struct GuidelineInfo {
    pub id: String,
    pub direction: LineDirection,
    /// Distance from the leading edge
    pub start: Option<Dimension>,
    /// Distance from the trailing edge, used when `start` is absent
    pub end: Option<Dimension>,
}

impl GuidelineInfo {
    pub fn from_start(id: impl Into<String>, direction: LineDirection, start: Dimension) -> Self {
        Self {
            id: id.into(),
            direction,
            start: Some(start),
            end: None,
        }
    }

    pub fn from_end(id: impl Into<String>, direction: LineDirection, end: Dimension) -> Self {
        Self {
            id: id.into(),
            direction,
            start: None,
            end: Some(end),
        }
    }
}

/// Which extreme edge of its referenced set a barrier follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarrierDirection {
    Left,
    Right,
    Top,
    Bottom,
    Start,
    End,
}

impl BarrierDirection {
    /// Map writing-direction-relative directions onto physical ones
    pub fn normalized(self) -> BarrierDirection {
        match self {
            BarrierDirection::Start => BarrierDirection::Left,
            BarrierDirection::End => BarrierDirection::Right,
            other => other,
        }
    }

    /// Axis along which the barrier's position is measured
    pub fn axis(self) -> Axis {
        match self.normalized() {
            BarrierDirection::Top | BarrierDirection::Bottom => Axis::Vertical,
            _ => Axis::Horizontal,
        }
    }
}

/// A computed line at the extreme edge of a set of referenced ids
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BarrierInfo {
    pub id: String,
    pub direction: BarrierDirection,
    pub referenced_ids: Vec<String>,
}

impl BarrierInfo {
    pub fn new(id: impl Into<String>, direction: BarrierDirection, referenced_ids: Vec<String>) -> Self {
        Self {
            id: id.into(),
            direction,
            referenced_ids,
        }
    }
}

/// How free space is distributed along a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainStyle {
    Spread,
    SpreadInside,
    Packed,
}

impl fmt::Display for ChainStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainStyle::Spread => write!(f, "spread"),
            ChainStyle::SpreadInside => write!(f, "spread_inside"),
            ChainStyle::Packed => write!(f, "packed"),
        }
    }
}

/// Chain declaration carried by the head of a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainInfo {
    pub direction: LineDirection,
    pub style: ChainStyle,
}

impl ChainInfo {
    pub fn horizontal(style: ChainStyle) -> Self {
        Self {
            direction: LineDirection::Horizontal,
            style,
        }
    }

    pub fn vertical(style: ChainStyle) -> Self {
        Self {
            direction: LineDirection::Vertical,
            style,
        }
    }
}

/// A (horizontal, vertical) bias pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiasPair {
    pub horizontal: f64,
    pub vertical: f64,
}

impl BiasPair {
    pub fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Bias on an axis as declared, negative values included
    pub fn raw(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
    }

    /// Bias on an axis, negative values falling back to the default
    pub fn on(&self, axis: Axis) -> f64 {
        let bias = match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        };
        if bias >= 0.0 {
            bias
        } else {
            DEFAULT_BIAS
        }
    }
}

impl Default for BiasPair {
    fn default() -> Self {
        Self::new(DEFAULT_BIAS, DEFAULT_BIAS)
    }
}

/// Per-axis chain weights
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChainWeightPair {
    pub horizontal: Option<f64>,
    pub vertical: Option<f64>,
}

impl ChainWeightPair {
    pub fn new(horizontal: Option<f64>, vertical: Option<f64>) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn on(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
        .unwrap_or(0.0)
    }
}

/// Relative-layout properties of a child
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlexItemProperty {
    pub align_rules: AlignRulesItem,
    pub bias: Option<BiasPair>,
    pub chain_weight: ChainWeightPair,
    pub horizontal_chain: Option<ChainInfo>,
    pub vertical_chain: Option<ChainInfo>,
}

impl FlexItemProperty {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an align rule, replacing any rule for the same direction
    pub fn with_rule(mut self, direction: AlignDirection, rule: AlignRule) -> Self {
        self.align_rules.insert(direction, rule);
        self
    }

    pub fn with_bias(mut self, horizontal: f64, vertical: f64) -> Self {
        self.bias = Some(BiasPair::new(horizontal, vertical));
        self
    }

    pub fn with_chain_weight(mut self, horizontal: Option<f64>, vertical: Option<f64>) -> Self {
        self.chain_weight = ChainWeightPair::new(horizontal, vertical);
        self
    }

    pub fn with_horizontal_chain(mut self, style: ChainStyle) -> Self {
        self.horizontal_chain = Some(ChainInfo::horizontal(style));
        self
    }

    pub fn with_vertical_chain(mut self, style: ChainStyle) -> Self {
        self.vertical_chain = Some(ChainInfo::vertical(style));
        self
    }

    pub fn has_align_rules(&self) -> bool {
        !self.align_rules.is_empty()
    }

    pub fn chain(&self, axis: Axis) -> Option<&ChainInfo> {
        match axis {
            Axis::Horizontal => self.horizontal_chain.as_ref(),
            Axis::Vertical => self.vertical_chain.as_ref(),
        }
    }

    /// Rules with `Start`/`End` folded into `Left`/`Right`.
    ///
    /// A `Start` or `End` rule wins over an explicit `Left` or `Right`.
    pub fn normalized_rules(&self) -> AlignRulesItem {
        let mut rules: AlignRulesItem = self
            .align_rules
            .iter()
            .filter(|(direction, _)| direction.normalized() == **direction)
            .map(|(direction, rule)| (*direction, rule.clone()))
            .collect();
        for (direction, rule) in &self.align_rules {
            if direction.normalized() != *direction {
                rules.insert(direction.normalized(), rule.clone());
            }
        }
        rules
    }
}

/// Visibility of a child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibleType {
    #[default]
    Visible,
    Invisible,
    /// Takes no space and is skipped by chains, barriers and self-sizing
    Gone,
}

/// Writing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
    /// Inherit; resolved to `Ltr` when nothing is inherited
    Auto,
}

impl TextDirection {
    pub fn is_rtl(self) -> bool {
        self == TextDirection::Rtl
    }
}

/// Size limits handed from a parent to a child for one measure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConstraint {
    pub min_size: SizeF,
    pub max_size: SizeF,
    /// Reference for percent lengths and match-parent sizing
    pub percent_reference: SizeF,
    /// Exact size imposed by the parent, per axis
    pub self_ideal_size: OptionalSizeF,
}

impl LayoutConstraint {
    /// A constraint that allows any size up to `max`
    pub fn up_to(max: SizeF) -> Self {
        Self {
            min_size: SizeF::zero(),
            max_size: max,
            percent_reference: max,
            self_ideal_size: OptionalSizeF::default(),
        }
    }

    /// A constraint that imposes an exact size
    pub fn exact(size: SizeF) -> Self {
        Self {
            self_ideal_size: OptionalSizeF::from_size(size),
            ..Self::up_to(size)
        }
    }

    /// Ideal size falling back to the percent reference on each axis
    pub fn ideal_or_percent_reference(&self) -> SizeF {
        SizeF::new(
            self.self_ideal_size.width.unwrap_or(self.percent_reference.width),
            self.self_ideal_size.height.unwrap_or(self.percent_reference.height),
        )
    }

    /// Clamp a size into `[min_size, max_size]`
    pub fn constrain(&self, size: SizeF) -> SizeF {
        SizeF::new(
            size.width.min(self.max_size.width).max(self.min_size.width),
            size.height.min(self.max_size.height).max(self.min_size.height),
        )
    }
}

impl Default for LayoutConstraint {
    fn default() -> Self {
        Self::up_to(SizeF::new(f64::INFINITY, f64::INFINITY))
    }
}

/// User-declared width and height
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalcSize {
    pub width: Option<CalcLength>,
    pub height: Option<CalcLength>,
}

impl CalcSize {
    pub fn new(width: Option<CalcLength>, height: Option<CalcLength>) -> Self {
        Self { width, height }
    }

    pub fn fixed(width: Dimension, height: Dimension) -> Self {
        Self::new(Some(CalcLength::Fixed(width)), Some(CalcLength::Fixed(height)))
    }

    pub fn has_width(&self) -> bool {
        self.width.is_some()
    }

    pub fn has_height(&self) -> bool {
        self.height.is_some()
    }

    pub fn is_width_auto(&self) -> bool {
        self.width.is_some_and(|w| w.is_auto())
    }

    pub fn is_height_auto(&self) -> bool {
        self.height.is_some_and(|h| h.is_auto())
    }

    /// True when either axis is `auto`
    pub fn is_auto(&self) -> bool {
        self.is_width_auto() || self.is_height_auto()
    }

    pub fn is_axis_auto(&self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.is_width_auto(),
            Axis::Vertical => self.is_height_auto(),
        }
    }
}

/// Measured size and committed position of a node
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeometryNode {
    pub frame_size: SizeF,
    /// Offset of the frame (inside the margin) relative to the parent
    pub frame_offset: OffsetF,
    pub margin: Option<MarginPropertyF>,
}

impl GeometryNode {
    pub fn set_frame_size(&mut self, size: SizeF) {
        self.frame_size = size;
    }

    fn margin_or_zero(&self) -> MarginPropertyF {
        self.margin.unwrap_or_default()
    }

    /// Frame size including margins
    pub fn margin_frame_size(&self) -> SizeF {
        let margin = self.margin_or_zero();
        SizeF::new(
            self.frame_size.width + margin.horizontal(),
            self.frame_size.height + margin.vertical(),
        )
    }

    pub fn margin_frame_offset(&self) -> OffsetF {
        let margin = self.margin_or_zero();
        OffsetF::new(self.frame_offset.x - margin.left, self.frame_offset.y - margin.top)
    }

    /// Position the margin box; the frame follows inside the margins
    pub fn set_margin_frame_offset(&mut self, offset: OffsetF) {
        let margin = self.margin_or_zero();
        self.frame_offset = OffsetF::new(offset.x + margin.left, offset.y + margin.top);
    }
}

/// Identity and layout properties of a child, as read by the algorithm
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutProperty {
    /// User-assigned id, used as the anchor name
    pub inspector_id: Option<String>,
    /// Component kind, used for generated ids
    pub tag: String,
    pub node_id: u64,
    pub flex_item: Option<FlexItemProperty>,
    pub calc_size: CalcSize,
    pub visibility: VisibleType,
}

impl LayoutProperty {
    /// Anchor name of this child: its inspector id, or a generated one
    pub fn id(&self) -> String {
        match &self.inspector_id {
            Some(id) => id.clone(),
            None => format!("{}{}{}", CONCAT_ID_PREFIX, self.tag, self.node_id),
        }
    }

    pub fn is_gone(&self) -> bool {
        self.visibility == VisibleType::Gone
    }
}

/// Properties of a relative container
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContainerLayoutProperty {
    pub guidelines: Vec<GuidelineInfo>,
    pub barriers: Vec<BarrierInfo>,
    pub calc_size: CalcSize,
    pub padding: PaddingPropertyF,
    pub border: PaddingPropertyF,
    pub direction: TextDirection,
    /// Constraint set by the parent before measuring
    pub layout_constraint: Option<LayoutConstraint>,
}

impl ContainerLayoutProperty {
    /// Padding and border combined
    pub fn padding_and_border(&self) -> PaddingPropertyF {
        self.padding.merged(&self.border)
    }

    pub fn is_rtl(&self) -> bool {
        self.direction.is_rtl()
    }
}
