//! Control flow graph construction.
//!
//! [`builder`] turns a classified statement stream into basic blocks and
//! edges; [`types`] holds the graph model shared with the dataflow stages.

pub mod builder;
pub mod types;

pub use builder::{build_cfg, find_leaders, form_blocks};
pub use types::{AdjacencyCache, BasicBlock, BlockId, Cfg, CfgEdge, EdgeType};

/// Build a CFG straight from source text with the default classifier.
///
/// Convenience for callers that only want the graph; the full pipeline with
/// dataflow lives in [`crate::analysis::analyze_source`].
pub fn cfg_from_source(source: &str) -> Cfg {
    let statements = crate::statement::classify(source);
    let leaders = find_leaders(&statements);
    build_cfg(form_blocks(&statements, &leaders))
}
