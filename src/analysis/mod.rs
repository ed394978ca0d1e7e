//! End-to-end analysis pipeline.
//!
//! Glues the stages together for one source file: classify statements, build
//! the CFG, extract definitions, compute gen/kill, solve reaching
//! definitions, derive metrics and ambiguity findings. [`analyze_files`]
//! runs the whole pipeline over many files in parallel with per-file error
//! isolation.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cfg::builder::{build_cfg, find_leaders, form_blocks};
use crate::cfg::types::{BlockId, Cfg};
use crate::dataflow::reaching_definitions::{
    compute_gen_kill, extract_definitions, interpret_multiple_defs, solve, DefId, Definition,
    MultiDefSite, SolveOutcome,
};
use crate::error::{FlowError, Result};
use crate::metrics::{graph_metrics, GraphMetrics};
use crate::statement::classify;

/// Per-block gen/kill sets rendered as sorted definition ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockGenKill {
    /// The block.
    pub block: BlockId,
    /// Definitions surviving to block exit.
    pub gen: Vec<DefId>,
    /// Program-wide definitions invalidated by this block.
    pub kill: Vec<DefId>,
}

/// Complete analysis result for one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAnalysis {
    /// Display name of the analyzed source (usually the path).
    pub name: String,
    /// The control flow graph.
    pub cfg: Cfg,
    /// All definitions, in program order.
    pub definitions: Vec<Definition>,
    /// Gen/kill sets per block, in document order.
    pub gen_kill: Vec<BlockGenKill>,
    /// Solver output: final IN/OUT plus per-pass history.
    pub dataflow: SolveOutcome,
    /// Node/edge/complexity counts.
    pub metrics: GraphMetrics,
    /// Points where multiple definitions of one variable may reach.
    pub multi_def_sites: Vec<MultiDefSite>,
}

/// Run the full pipeline over in-memory source text.
///
/// An empty source yields an empty but valid analysis (zero blocks, zero
/// definitions); it is not an error.
///
/// # Errors
///
/// Returns [`FlowError::NonConvergence`] if the dataflow solver fails to
/// reach a fixpoint within its pass cap.
pub fn analyze_source(name: &str, source: &str) -> Result<FileAnalysis> {
    let statements = classify(source);
    let leaders = find_leaders(&statements);
    let blocks = form_blocks(&statements, &leaders);

    let (definitions, per_block) = extract_definitions(&blocks);
    let gen_kill_sets = compute_gen_kill(&blocks, &definitions, &per_block);
    let cfg = build_cfg(blocks);

    let dataflow = solve(&cfg, &gen_kill_sets)?;
    let metrics = graph_metrics(&cfg);
    let multi_def_sites = interpret_multiple_defs(&cfg, &dataflow, &definitions);

    let gen_kill = cfg
        .block_ids()
        .map(|block| BlockGenKill {
            block,
            gen: gen_kill_sets.gen_ids(block),
            kill: gen_kill_sets.kill_ids(block),
        })
        .collect();

    tracing::info!(
        name,
        blocks = cfg.node_count(),
        definitions = definitions.len(),
        passes = dataflow.passes,
        "analyzed source"
    );

    Ok(FileAnalysis {
        name: name.to_string(),
        cfg,
        definitions,
        gen_kill,
        dataflow,
        metrics,
        multi_def_sites,
    })
}

/// Read a file from disk and analyze it.
///
/// # Errors
///
/// Returns [`FlowError::Io`] with the offending path if the file cannot be
/// read, or any error from [`analyze_source`].
pub fn analyze_file(path: &Path) -> Result<FileAnalysis> {
    let source =
        std::fs::read_to_string(path).map_err(|e| FlowError::io_with_path(e, path))?;
    analyze_source(&path.display().to_string(), &source)
}

/// Analyze many files in parallel.
///
/// Each file is analyzed independently on the rayon thread pool; one file
/// failing (unreadable, non-convergent) never affects the others. Results
/// are returned in input order.
pub fn analyze_files(paths: &[PathBuf]) -> Vec<(PathBuf, Result<FileAnalysis>)> {
    paths
        .par_iter()
        .map(|path| (path.clone(), analyze_file(path)))
        .collect()
}
