//! Structural metrics over a control flow graph.

use serde::{Deserialize, Serialize};

use crate::cfg::types::Cfg;

/// Node, edge, and cyclomatic-complexity counts of one CFG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMetrics {
    /// Number of basic blocks.
    pub nodes: usize,
    /// Number of edges, duplicates included.
    pub edges: usize,
    /// Cyclomatic complexity `E - N + 2`.
    pub cyclomatic: usize,
}

/// Compute graph metrics for a CFG.
///
/// Cyclomatic complexity is `E - N + 2`, clamped so a single isolated block
/// yields 1 rather than underflowing.
pub fn graph_metrics(cfg: &Cfg) -> GraphMetrics {
    let nodes = cfg.node_count();
    let edges = cfg.edge_count();
    GraphMetrics {
        nodes,
        edges,
        cyclomatic: (edges + 2).saturating_sub(nodes),
    }
}
