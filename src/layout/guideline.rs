//! Guideline and barrier resolution
//!
//! Guidelines are fixed once per pass from the container size. Barriers are
//! resolved lazily, when the visiting order reaches them, from whatever their
//! referenced ids have recorded so far.

use log::{debug, trace};

use crate::geometry::OffsetF;

use super::context::SolverContext;
use super::types::{Axis, BarrierDirection, ContainerLayoutProperty, GuidelineInfo, LineDirection};
use super::wrapper::LayoutWrapper;

/// Resolve every declared guideline and record its position.
///
/// Guidelines with an empty id or an id taken by a child are dropped.
pub fn calc_guidelines(ctx: &mut SolverContext, property: &ContainerLayoutProperty) {
    ctx.guidelines.clear();
    for info in &property.guidelines {
        if info.id.is_empty() || ctx.nodes.contains_key(&info.id) {
            debug!("guideline '{}' ignored: id is empty or taken by a child", info.id);
            continue;
        }
        let position = guideline_position(ctx, property, info);
        ctx.guidelines
            .insert(info.id.clone(), (info.direction, position));
    }

    let records: Vec<(String, OffsetF)> = ctx
        .guidelines
        .iter()
        .map(|(id, (direction, position))| {
            let offset = match direction {
                LineDirection::Horizontal => OffsetF::new(0.0, *position),
                LineDirection::Vertical => OffsetF::new(*position, 0.0),
            };
            (id.clone(), offset)
        })
        .collect();
    for (id, offset) in records {
        trace!("guideline '{}' at {:?}", id, offset);
        ctx.record_offset_map.insert(id, offset);
    }
}

fn guideline_position(
    ctx: &SolverContext,
    property: &ContainerLayoutProperty,
    info: &GuidelineInfo,
) -> f64 {
    let axis = info.direction.axis();
    let extent = axis.of_size(ctx.frame_size);
    let auto = property.calc_size.is_axis_auto(axis);

    if let Some(start) = info.start {
        if start.is_percent() && auto {
            return 0.0;
        }
        return start.convert_to_px(&ctx.scale, Some(extent)).unwrap_or(0.0);
    }
    if let Some(end) = info.end {
        if auto {
            return 0.0;
        }
        return extent - end.convert_to_px(&ctx.scale, Some(extent)).unwrap_or(0.0);
    }
    0.0
}

/// Register every declared barrier.
///
/// Barriers with an empty id or an id taken by a guideline or a child are
/// dropped. `Start`/`End` are mapped to `Left`/`Right`.
pub fn calc_barriers(ctx: &mut SolverContext, property: &ContainerLayoutProperty) {
    ctx.barriers.clear();
    for info in &property.barriers {
        if info.id.is_empty() || ctx.is_guideline(&info.id) || ctx.nodes.contains_key(&info.id) {
            debug!("barrier '{}' ignored: id is empty or already taken", info.id);
            continue;
        }
        ctx.barriers.insert(
            info.id.clone(),
            (info.direction.normalized(), info.referenced_ids.clone()),
        );
    }
}

/// Extreme edges over a barrier's referenced ids
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BarrierRect {
    pub min_left: Option<f64>,
    pub min_top: Option<f64>,
    pub max_right: Option<f64>,
    pub max_bottom: Option<f64>,
}

impl BarrierRect {
    fn min_left(&mut self, x: f64) {
        self.min_left = Some(self.min_left.map_or(x, |v| v.min(x)));
    }

    fn min_top(&mut self, y: f64) {
        self.min_top = Some(self.min_top.map_or(y, |v| v.min(y)));
    }

    fn max_right(&mut self, x: f64) {
        self.max_right = Some(self.max_right.map_or(x, |v| v.max(x)));
    }

    fn max_bottom(&mut self, y: f64) {
        self.max_bottom = Some(self.max_bottom.map_or(y, |v| v.max(y)));
    }
}

/// Union of everything a barrier references, skipping unknown and gone ids
pub fn barrier_rect<C: LayoutWrapper>(
    ctx: &SolverContext,
    children: &[C],
    referenced_ids: &[String],
) -> BarrierRect {
    let mut rect = BarrierRect::default();
    for name in referenced_ids {
        let offset = ctx.record_offset(name);
        if let Some((direction, _)) = ctx.guidelines.get(name) {
            match direction.axis() {
                Axis::Horizontal => {
                    rect.min_left(offset.x);
                    rect.max_right(offset.x);
                }
                Axis::Vertical => {
                    rect.min_top(offset.y);
                    rect.max_bottom(offset.y);
                }
            }
            continue;
        }
        if let Some((direction, _)) = ctx.barriers.get(name) {
            match direction {
                BarrierDirection::Left => rect.min_left(offset.x),
                BarrierDirection::Right => rect.max_right(offset.x),
                BarrierDirection::Top => rect.min_top(offset.y),
                BarrierDirection::Bottom => rect.max_bottom(offset.y),
                BarrierDirection::Start | BarrierDirection::End => {}
            }
            continue;
        }
        let Some(node) = ctx.node(name) else {
            continue;
        };
        if node.is_gone() {
            continue;
        }
        let size = children[node.index].geometry_node().margin_frame_size();
        rect.min_left(offset.x);
        rect.min_top(offset.y);
        rect.max_right(offset.x + size.width);
        rect.max_bottom(offset.y + size.height);
    }
    rect
}

/// Resolve a barrier's position once its referenced ids are placed.
///
/// A barrier with nothing resolvable to follow sits at 0.
pub fn measure_barrier<C: LayoutWrapper>(ctx: &mut SolverContext, children: &[C], name: &str) {
    let Some((direction, referenced)) = ctx.barriers.get(name).cloned() else {
        return;
    };
    let rect = barrier_rect(ctx, children, &referenced);
    let offset = match direction {
        BarrierDirection::Left => OffsetF::new(rect.min_left.unwrap_or(0.0), 0.0),
        BarrierDirection::Right => OffsetF::new(rect.max_right.unwrap_or(0.0), 0.0),
        BarrierDirection::Top => OffsetF::new(0.0, rect.min_top.unwrap_or(0.0)),
        BarrierDirection::Bottom => OffsetF::new(0.0, rect.max_bottom.unwrap_or(0.0)),
        BarrierDirection::Start | BarrierDirection::End => return,
    };
    trace!("barrier '{}' at {:?}", name, offset);
    ctx.set_record_offset(name, offset);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{CalcLength, Dimension};
    use crate::geometry::SizeF;
    use crate::layout::types::{BarrierInfo, CalcSize};

    fn ctx_with_size(width: f64, height: f64) -> SolverContext {
        SolverContext {
            frame_size: SizeF::new(width, height),
            ..Default::default()
        }
    }

    #[test]
    fn test_guideline_start_and_end() {
        let property = ContainerLayoutProperty {
            guidelines: vec![
                GuidelineInfo::from_start("g1", LineDirection::Vertical, Dimension::vp(50.0)),
                GuidelineInfo::from_end("g2", LineDirection::Horizontal, Dimension::px(20.0)),
                GuidelineInfo::from_start("g3", LineDirection::Vertical, Dimension::percent(25.0)),
            ],
            ..Default::default()
        };
        let mut ctx = ctx_with_size(300.0, 200.0);
        calc_guidelines(&mut ctx, &property);

        assert_eq!(ctx.record_offset("g1"), OffsetF::new(50.0, 0.0));
        assert_eq!(ctx.record_offset("g2"), OffsetF::new(0.0, 180.0));
        assert_eq!(ctx.record_offset("g3"), OffsetF::new(75.0, 0.0));
    }

    #[test]
    fn test_guideline_on_auto_axis() {
        let property = ContainerLayoutProperty {
            calc_size: CalcSize::new(Some(CalcLength::Auto), None),
            guidelines: vec![
                GuidelineInfo::from_start("pct", LineDirection::Vertical, Dimension::percent(50.0)),
                GuidelineInfo::from_end("end", LineDirection::Vertical, Dimension::vp(10.0)),
                GuidelineInfo::from_start("abs", LineDirection::Vertical, Dimension::vp(10.0)),
            ],
            ..Default::default()
        };
        let mut ctx = ctx_with_size(300.0, 200.0);
        calc_guidelines(&mut ctx, &property);

        assert_eq!(ctx.record_offset("pct").x, 0.0);
        assert_eq!(ctx.record_offset("end").x, 0.0);
        assert_eq!(ctx.record_offset("abs").x, 10.0);
    }

    #[test]
    fn test_guideline_without_position_is_zero() {
        let property = ContainerLayoutProperty {
            guidelines: vec![GuidelineInfo {
                id: "empty".to_string(),
                direction: LineDirection::Horizontal,
                start: None,
                end: None,
            }],
            ..Default::default()
        };
        let mut ctx = ctx_with_size(300.0, 200.0);
        calc_guidelines(&mut ctx, &property);
        assert!(ctx.is_guideline("empty"));
        assert_eq!(ctx.record_offset("empty"), OffsetF::zero());
    }

    #[test]
    fn test_barrier_ids_must_be_unique() {
        let property = ContainerLayoutProperty {
            guidelines: vec![GuidelineInfo::from_start(
                "line",
                LineDirection::Vertical,
                Dimension::vp(1.0),
            )],
            barriers: vec![
                BarrierInfo::new("", BarrierDirection::Left, vec![]),
                BarrierInfo::new("line", BarrierDirection::Left, vec![]),
                BarrierInfo::new("ok", BarrierDirection::End, vec!["line".to_string()]),
            ],
            ..Default::default()
        };
        let mut ctx = ctx_with_size(300.0, 200.0);
        calc_guidelines(&mut ctx, &property);
        calc_barriers(&mut ctx, &property);

        assert_eq!(ctx.barriers.len(), 1);
        assert_eq!(ctx.barriers["ok"].0, BarrierDirection::Right);
    }
}
