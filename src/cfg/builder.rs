//! CFG construction: leader identification, block forming, edge synthesis.
//!
//! The three classic leader rules partition the statement stream; edge
//! synthesis then runs one pass over the ordered blocks, consulting only
//! each block's **last** statement as the control signal.
//!
//! # Known heuristic limits
//!
//! - The branch rule assumes the "false" target is exactly two blocks ahead.
//!   This mis-wires `else`-chains and any branch body longer than one block.
//! - The loop rule assumes the loop body is exactly the immediately
//!   following block; braces are not matched.
//!
//! Both are consequences of the line-oriented statement model and are kept
//! deliberately; callers needing exact wiring need a real parser behind the
//! [`crate::statement::Classify`] seam.

use std::collections::BTreeSet;

use crate::cfg::types::{BasicBlock, BlockId, Cfg, CfgEdge, EdgeType};
use crate::statement::{StatementKind, StatementLine};

/// Apply the leader rules and return the sorted, deduplicated leader indices.
///
/// Rule 1: index 0 is always a leader. Rule 2: every Branch, Loop,
/// SwitchHeader, and CaseLabel statement is itself a leader. Rule 3: the
/// statement immediately after any of those four kinds, and after any
/// Return/Break statement, is a leader when that index is in bounds (a rule
/// firing on the last statement is silently skipped).
///
/// For an empty stream the set degenerates to `[0]`; the block former
/// produces zero blocks from it.
pub fn find_leaders(statements: &[StatementLine]) -> Vec<usize> {
    let n = statements.len();
    let mut leaders: BTreeSet<usize> = BTreeSet::new();
    leaders.insert(0);

    for stmt in statements {
        if stmt.kind.is_control_opener() {
            leaders.insert(stmt.index);
            if stmt.index + 1 < n {
                leaders.insert(stmt.index + 1);
            }
        } else if stmt.kind.terminates_flow() && stmt.index + 1 < n {
            leaders.insert(stmt.index + 1);
        }
    }

    let leaders: Vec<usize> = leaders.into_iter().collect();
    tracing::debug!(leaders = leaders.len(), statements = n, "identified leaders");
    leaders
}

/// Partition the statement stream into basic blocks delimited by consecutive
/// leaders.
///
/// Block `Bi` spans `[leaders[i], leaders[i+1])`; the final block runs to the
/// end of the stream. Leaders are strictly increasing by construction, so no
/// block is ever empty. An empty statement stream yields zero blocks even
/// though the degenerate leader set `[0]` is supplied.
pub fn form_blocks(statements: &[StatementLine], leaders: &[usize]) -> Vec<BasicBlock> {
    let n = statements.len();
    let mut blocks = Vec::with_capacity(leaders.len());

    for (i, &start) in leaders.iter().enumerate() {
        if start >= n {
            break;
        }
        let end = leaders.get(i + 1).copied().unwrap_or(n);
        blocks.push(BasicBlock {
            id: BlockId(blocks.len()),
            start,
            end,
            statements: statements[start..end].to_vec(),
        });
    }

    tracing::debug!(blocks = blocks.len(), "formed basic blocks");
    blocks
}

/// Synthesize CFG edges over the ordered block list.
///
/// One pass, last statement of each block as the control signal:
///
/// - **Sequential**: `Bi -> Bi+1` unless the last statement is Return/Break.
/// - **Branch**: `Bi -> Bi+1` labeled `true` and, if present, `Bi -> Bi+2`
///   labeled `false`. These coexist with the sequential edge.
/// - **Loop**: `Bi -> Bi+1` labeled `loop-body` plus the back-edge
///   `Bi+1 -> Bi`.
/// - **Switch dispatch**: an unlabeled edge `Bi -> Bj` for every later block
///   `Bj` containing at least one case label. Case-to-case fall-through is
///   not modeled as a distinct edge; the sequential edge between adjacent
///   blocks already covers it.
pub fn build_cfg(blocks: Vec<BasicBlock>) -> Cfg {
    let mut edges: Vec<CfgEdge> = Vec::new();
    let n = blocks.len();

    for (i, block) in blocks.iter().enumerate() {
        let Some(last) = block.last_kind() else {
            continue;
        };
        let id = block.id;
        let next = (i + 1 < n).then(|| BlockId(i + 1));

        if let Some(next) = next {
            if !last.terminates_flow() {
                edges.push(CfgEdge::sequential(id, next));
            }
        }

        match last {
            StatementKind::Branch => {
                if let Some(next) = next {
                    edges.push(CfgEdge::new(id, next, EdgeType::True));
                }
                if i + 2 < n {
                    edges.push(CfgEdge::new(id, BlockId(i + 2), EdgeType::False));
                }
            }
            StatementKind::Loop => {
                if let Some(next) = next {
                    edges.push(CfgEdge::new(id, next, EdgeType::LoopBody));
                    edges.push(CfgEdge::new(next, id, EdgeType::BackEdge));
                }
            }
            StatementKind::SwitchHeader => {
                for later in &blocks[i + 1..] {
                    if later.contains_case_label() {
                        edges.push(CfgEdge::sequential(id, later.id));
                    }
                }
            }
            _ => {}
        }
    }

    tracing::debug!(nodes = n, edges = edges.len(), "built control flow graph");
    Cfg::new(blocks, edges)
}
