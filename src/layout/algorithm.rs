//! Relative container measure and layout entry points
//!
//! A measure pass snapshots the children, resolves guidelines, barriers and
//! chains, orders the children by their dependencies and then sizes and
//! places each one in that order. Positions are kept until the following
//! layout pass commits them.

use std::sync::{Mutex, PoisonError};

use log::{debug, warn};

use crate::geometry::{OffsetF, RectF, SizeF};

use super::chain::{calc_chain_weight_size, check_chains};
use super::config::LayoutConfig;
use super::context::SolverContext;
use super::error::LayoutError;
use super::graph::{
    build_dependencies, mark_container_reliance, pre_topological_loop_detection, topological_sort,
};
use super::guideline::{calc_barriers, calc_guidelines, measure_barrier};
use super::measure::{calc_offset_param, calc_size_param};
use super::pattern::topology_key;
use super::types::{Axis, ChainStyle, ContainerLayoutProperty};
use super::wrapper::{ContainerWrapper, LayoutWrapper};

/// A chain found during a pass
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSummary {
    pub axis: Axis,
    pub style: ChainStyle,
    pub ids: Vec<String>,
}

/// What happened during one measure pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasureReport {
    /// Visiting order over children and barriers
    pub order: Vec<String>,
    /// Nodes caught in or behind a dependency loop, sorted
    pub loop_nodes: Vec<String>,
    /// Every child was measured at zero size because of a loop
    pub degraded: bool,
    pub cache_hit: bool,
    pub chains: Vec<ChainSummary>,
}

impl MeasureReport {
    /// Turn a degraded pass into an error
    pub fn into_result(self) -> Result<MeasureReport, LayoutError> {
        if self.degraded {
            return Err(LayoutError::circular(self.loop_nodes));
        }
        Ok(self)
    }
}

/// A guideline or barrier as resolved by the last pass.
///
/// `position` is measured from the content origin along `axis`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    pub id: String,
    pub axis: Axis,
    pub position: f64,
    pub is_barrier: bool,
}

#[derive(Debug, Default)]
pub struct RelativeContainerLayoutAlgorithm {
    config: LayoutConfig,
    /// State of the last measure pass, consumed by layout
    pass: Mutex<Option<SolverContext>>,
}

impl RelativeContainerLayoutAlgorithm {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            pass: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Measure the container and every child, recording child positions
    pub fn measure<W: ContainerWrapper>(&self, container: &mut W) -> MeasureReport {
        let mut pass = self.pass.lock().unwrap_or_else(PoisonError::into_inner);
        let property = container.layout_property().clone();
        let mut ctx = SolverContext::new(&property, self.config.scale);

        if container.children_with_build().is_empty() {
            let size = empty_container_size(&ctx, &property);
            debug!("no children, container sized {:?}", size);
            container.geometry_node_mut().set_frame_size(size);
            let report = MeasureReport::default();
            container.pattern_mut().set_last_report(report.clone());
            *pass = Some(ctx);
            return report;
        }
        container.geometry_node_mut().set_frame_size(ctx.frame_size);

        ctx.collect_nodes(container.children_with_build());
        calc_guidelines(&mut ctx, &property);
        calc_barriers(&mut ctx, &property);
        check_chains(&mut ctx);
        mark_container_reliance(&mut ctx);

        let key = topology_key(&ctx);
        let cached = if self.config.use_topological_cache {
            container
                .pattern_mut()
                .cached_order(key)
                .map(<[String]>::to_vec)
                .filter(|order| is_cache_valid(&ctx, order))
        } else {
            None
        };
        let cache_hit = cached.is_some();

        let mut loop_nodes = Vec::new();
        match cached {
            Some(order) => {
                debug!("topological order reused from cache");
                ctx.render_list = order;
            }
            None => {
                build_dependencies(&mut ctx);
                match pre_topological_loop_detection(&mut ctx) {
                    Ok(()) => ctx.render_list = topological_sort(&ctx),
                    Err(nodes) => {
                        degrade(&ctx, container.children_with_build());
                        loop_nodes = nodes;
                    }
                }
            }
        }
        let degraded = !loop_nodes.is_empty();

        if self.config.debug {
            let pattern = container.pattern_mut();
            pattern.set_topological_result(&ctx.render_list);
            pattern.set_loop_dependent_nodes(&loop_nodes);
        }

        let children = container.children_with_build();
        measure_child(&mut ctx, children);
        measure_chain_weight(&mut ctx, children);
        let size = measure_self(&ctx, &property, children);
        adjust_offset_rtl(&mut ctx, children, size.width);
        container.geometry_node_mut().set_frame_size(size);

        let pattern = container.pattern_mut();
        if degraded {
            pattern.clear_cache();
        } else if self.config.use_topological_cache && !cache_hit {
            pattern.store_order(key, ctx.render_list.clone());
        }

        let report = MeasureReport {
            order: ctx.render_list.clone(),
            loop_nodes,
            degraded,
            cache_hit,
            chains: chain_summaries(&ctx),
        };
        pattern.set_last_report(report.clone());
        *pass = Some(ctx);
        report
    }

    /// Guidelines then barriers resolved by the last measure pass
    pub fn reference_lines(&self) -> Vec<ReferenceLine> {
        let pass = self.pass.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(ctx) = pass.as_ref() else {
            return Vec::new();
        };
        let guidelines = ctx.guidelines.iter().map(|(id, (direction, position))| ReferenceLine {
            id: id.clone(),
            axis: direction.axis(),
            position: *position,
            is_barrier: false,
        });
        let barriers = ctx
            .barriers
            .iter()
            .filter(|(id, _)| ctx.record_offset_map.contains_key(*id))
            .map(|(id, (direction, _))| {
                let axis = direction.axis();
                ReferenceLine {
                    id: id.clone(),
                    axis,
                    position: axis.of_offset(ctx.record_offset(id)),
                    is_barrier: true,
                }
            });
        guidelines.chain(barriers).collect()
    }

    /// Commit the positions recorded by the last measure pass
    pub fn layout<W: ContainerWrapper>(&self, container: &mut W) {
        let pass = self.pass.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(ctx) = pass.as_ref() else {
            warn!("layout requested before any measure pass");
            return;
        };
        let origin = ctx.padding.origin();

        for (index, child) in container.children_with_build().iter_mut().enumerate() {
            if ctx.duplicates.contains(&index) {
                child.geometry_node_mut().set_margin_frame_offset(origin);
                child.layout();
                continue;
            }
            let property = child.layout_property();
            if property.flex_item.is_none() && !ctx.rtl {
                child.geometry_node_mut().set_margin_frame_offset(origin);
                child.layout();
                continue;
            }
            let Some(record) = ctx.record_offset_map.get(&property.id()).copied() else {
                continue;
            };
            child
                .geometry_node_mut()
                .set_margin_frame_offset(record + origin);
            child.layout();
        }
    }
}

/// Frame of a container without children
fn empty_container_size(ctx: &SolverContext, property: &ContainerLayoutProperty) -> SizeF {
    let mut size = if ctx.frame_size.is_positive() {
        ctx.frame_size
    } else {
        SizeF::zero()
    };
    if property.calc_size.is_width_auto() {
        size.width = ctx.padding.horizontal();
    }
    if property.calc_size.is_height_auto() {
        size.height = ctx.padding.vertical();
    }
    size
}

/// A cached order must still cover exactly the current children and barriers
fn is_cache_valid(ctx: &SolverContext, order: &[String]) -> bool {
    order.len() == ctx.nodes.len() + ctx.barriers.len()
        && order
            .iter()
            .all(|id| ctx.nodes.contains_key(id) || ctx.is_barrier(id))
}

/// Deactivate every child and measure it at zero size
fn degrade<C: LayoutWrapper>(ctx: &SolverContext, children: &mut [C]) {
    warn!("dependency loop, every child is measured at zero size");
    let mut constraint = ctx.child_constraint();
    constraint.self_ideal_size.set_width(0.0);
    constraint.self_ideal_size.set_height(0.0);
    for child in children.iter_mut() {
        child.set_active(false);
        child.measure(&constraint);
    }
}

fn measure_child<C: LayoutWrapper>(ctx: &mut SolverContext, children: &mut [C]) {
    let order = ctx.render_list.clone();
    for id in &order {
        if ctx.is_barrier(id) {
            measure_barrier(ctx, children, id);
            continue;
        }
        let Some(node) = ctx.node(id) else {
            continue;
        };
        let index = node.index;
        let has_rules = node.has_rules();
        let constraint = ctx.child_constraint();
        if !children[index].is_active() {
            children[index].measure(&constraint);
            continue;
        }
        if !has_rules {
            children[index].measure(&constraint);
            ctx.set_record_offset(id, OffsetF::zero());
            continue;
        }
        calc_size_param(ctx, children, id);
        calc_offset_param(ctx, children, id);
    }

    let constraint = ctx.child_constraint();
    for index in ctx.duplicates.iter().copied() {
        if children[index].is_active() {
            children[index].measure(&constraint);
        }
    }
}

/// Second pass sizing weighted chain members from the space left over
fn measure_chain_weight<C: LayoutWrapper>(ctx: &mut SolverContext, children: &mut [C]) {
    if !ctx.chain_weight_mode {
        return;
    }
    debug!("distributing chain weights");
    let order = ctx.render_list.clone();
    for id in &order {
        let Some(node) = ctx.node(id) else {
            continue;
        };
        let index = node.index;
        if !children[index].is_active() || !node.has_rules() {
            continue;
        }
        let weighted = [node.has_weight(Axis::Horizontal), node.has_weight(Axis::Vertical)];
        let heads = [
            ctx.chain_of(id, Axis::Horizontal).map(str::to_string),
            ctx.chain_of(id, Axis::Vertical).map(str::to_string),
        ];
        if heads.iter().all(Option::is_none) {
            calc_size_param(ctx, children, id);
            calc_offset_param(ctx, children, id);
            continue;
        }

        let mut constraint = ctx.child_constraint();
        let frame = children[index].geometry_node().frame_size;
        for ((axis, head), weighted) in [Axis::Horizontal, Axis::Vertical]
            .into_iter()
            .zip(&heads)
            .zip(weighted)
        {
            let size = match head {
                Some(head) if weighted => calc_chain_weight_size(ctx, children, id, head, axis),
                _ => axis.of_size(frame),
            };
            match axis {
                Axis::Horizontal => constraint.self_ideal_size.set_width(size),
                Axis::Vertical => constraint.self_ideal_size.set_height(size),
            }
        }
        children[index].measure(&constraint);

        let measured = children[index].geometry_node().margin_frame_size();
        for (axis, head) in [Axis::Horizontal, Axis::Vertical].into_iter().zip(&heads) {
            let Some(head) = head else {
                continue;
            };
            if let Some(chain) = ctx.chains_mut(axis).get_mut(head) {
                chain.item_size.insert(id.clone(), Some(axis.of_size(measured)));
            }
        }
        calc_offset_param(ctx, children, id);
    }
}

/// Final container size, growing `auto` axes around the placed children
fn measure_self<C: LayoutWrapper>(
    ctx: &SolverContext,
    property: &ContainerLayoutProperty,
    children: &[C],
) -> SizeF {
    let mut size = ctx.frame_size;
    let calc_size = &property.calc_size;
    if !calc_size.is_auto() {
        return size;
    }

    let mut bounds = RectF::default();
    for id in &ctx.render_list {
        let Some(node) = ctx.node(id) else {
            continue;
        };
        if node.is_gone() {
            continue;
        }
        let rect = RectF::from_offset_size(
            ctx.record_offset(id),
            children[node.index].geometry_node().margin_frame_size(),
        );
        bounds = bounds.combine(&rect);
    }
    bounds = bounds.intersect(&RectF::new(0.0, 0.0, f64::INFINITY, f64::INFINITY));

    let constraint = property.layout_constraint.unwrap_or_default();
    if calc_size.is_width_auto() && !ctx.rely_on_container(Axis::Horizontal) {
        size.width = (bounds.width + ctx.padding.horizontal())
            .min(constraint.max_size.width)
            .max(constraint.min_size.width);
    }
    if calc_size.is_height_auto() && !ctx.rely_on_container(Axis::Vertical) {
        size.height = (bounds.height + ctx.padding.vertical())
            .min(constraint.max_size.height)
            .max(constraint.min_size.height);
    }
    debug!("auto-sized container to {:?}", size);
    size
}

/// Mirror recorded x positions inside the content box
fn adjust_offset_rtl<C: LayoutWrapper>(ctx: &mut SolverContext, children: &[C], frame_width: f64) {
    if !ctx.rtl {
        return;
    }
    let padding = ctx.padding.horizontal();
    let mirrored: Vec<(String, OffsetF)> = ctx
        .render_list
        .iter()
        .filter_map(|id| {
            let node = ctx.node(id)?;
            let record = ctx.record_offset_map.get(id)?;
            let width = children[node.index].geometry_node().margin_frame_size().width;
            let x = frame_width - width - record.x - padding;
            Some((id.clone(), record.with_x(x)))
        })
        .collect();
    for (id, offset) in mirrored {
        ctx.set_record_offset(&id, offset);
    }
}

fn chain_summaries(ctx: &SolverContext) -> Vec<ChainSummary> {
    [Axis::Horizontal, Axis::Vertical]
        .into_iter()
        .flat_map(|axis| {
            ctx.chains(axis).values().map(move |chain| ChainSummary {
                axis,
                style: chain.style,
                ids: chain.ids.clone(),
            })
        })
        .collect()
}
