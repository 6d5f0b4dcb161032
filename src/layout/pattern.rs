//! Long-lived per-container state
//!
//! The algorithm is rebuilt for every pass; the pattern outlives it and keeps
//! the memoized visiting order and the debug strings of the last pass.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use super::algorithm::MeasureReport;
use super::context::SolverContext;
use super::types::Axis;

/// Memoized visiting order keyed by the topology it was computed for
#[derive(Debug, Clone, PartialEq, Eq)]
struct OrderCache {
    key: u64,
    order: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RelativeContainerPattern {
    cache: Option<OrderCache>,
    topological_result: String,
    loop_dependent_nodes: String,
    last_report: Option<MeasureReport>,
}

impl RelativeContainerPattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached visiting order, if it was computed for the same topology
    pub fn cached_order(&self, key: u64) -> Option<&[String]> {
        self.cache
            .as_ref()
            .filter(|cache| cache.key == key)
            .map(|cache| cache.order.as_slice())
    }

    pub fn store_order(&mut self, key: u64, order: Vec<String>) {
        self.cache = Some(OrderCache { key, order });
    }

    pub fn clear_cache(&mut self) {
        self.cache = None;
    }

    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    pub fn set_topological_result(&mut self, order: &[String]) {
        self.topological_result = list_to_string(order);
    }

    pub fn set_loop_dependent_nodes(&mut self, nodes: &[String]) {
        self.loop_dependent_nodes = list_to_string(nodes);
    }

    /// Visiting order of the last debug-enabled pass, as `[a, b, c]`
    pub fn topological_result(&self) -> &str {
        &self.topological_result
    }

    /// Nodes caught in a dependency loop in the last debug-enabled pass
    pub fn loop_dependent_nodes(&self) -> &str {
        &self.loop_dependent_nodes
    }

    pub fn set_last_report(&mut self, report: MeasureReport) {
        self.last_report = Some(report);
    }

    pub fn last_report(&self) -> Option<&MeasureReport> {
        self.last_report.as_ref()
    }

    /// Human-readable summary of the last pass
    pub fn dump_info(&self) -> String {
        let mut out = String::new();
        push_field(&mut out, "topological order", &self.topological_result);
        push_field(&mut out, "loop dependent nodes", &self.loop_dependent_nodes);
        let Some(report) = &self.last_report else {
            out.push_str("no measure pass yet\n");
            return out;
        };
        out.push_str(&format!(
            "cache: {}\n",
            if report.cache_hit { "hit" } else { "miss" }
        ));
        if report.degraded {
            out.push_str("degraded: every child measured at zero size\n");
        }
        for chain in &report.chains {
            out.push_str(&format!(
                "{} {} chain: {}\n",
                chain.axis,
                chain.style,
                list_to_string(&chain.ids)
            ));
        }
        out
    }
}

fn push_field(out: &mut String, label: &str, value: &str) {
    if value.is_empty() {
        out.push_str(&format!("{}:\n", label));
    } else {
        out.push_str(&format!("{}: {}\n", label, value));
    }
}

/// Format ids as `[a, b, c]`
pub fn list_to_string(ids: &[String]) -> String {
    format!("[{}]", ids.join(", "))
}

/// Hash of everything the visiting order depends on
pub fn topology_key(ctx: &SolverContext) -> u64 {
    let mut hasher = FxHasher::default();
    for (id, node) in &ctx.nodes {
        id.hash(&mut hasher);
        node.rules.hash(&mut hasher);
        if let Some(item) = &node.flex_item {
            item.horizontal_chain.hash(&mut hasher);
            item.vertical_chain.hash(&mut hasher);
        }
    }
    for (id, (direction, _)) in &ctx.guidelines {
        id.hash(&mut hasher);
        direction.hash(&mut hasher);
    }
    for (id, barrier) in &ctx.barriers {
        id.hash(&mut hasher);
        barrier.hash(&mut hasher);
    }
    for axis in [Axis::Horizontal, Axis::Vertical] {
        for (head, chain) in ctx.chains(axis) {
            head.hash(&mut hasher);
            chain.ids.hash(&mut hasher);
        }
    }
    hasher.finish()
}
