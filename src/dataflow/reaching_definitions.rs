//! Reaching-definitions dataflow analysis.
//!
//! For each program point, determines which definitions (assignments) of
//! variables may reach that point without being killed by another definition
//! of the same variable.
//!
//! # Data Flow Equations (Forward Analysis)
//!
//! - `GEN[B]`  = definitions surviving to block B's exit
//! - `KILL[B]` = program-wide definitions invalidated by B's reassignments
//! - `IN[B]`   = UNION(OUT[P]) for all predecessors P
//! - `OUT[B]`  = GEN[B] UNION (IN[B] - KILL[B])
//!
//! The solver iterates these equations Gauss-Seidel style over the blocks in
//! document order: updates made within a pass are visible to later blocks of
//! the same pass. Every full pass is recorded as a snapshot for inspection.
//! IN/OUT grow monotonically inside the finite universe of definition ids,
//! so termination is mathematically guaranteed; the 500-pass cap is a safety
//! net whose triggering signals a logic defect.

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cfg::types::{BasicBlock, BlockId, Cfg};
use crate::dataflow::common::BitSet;
use crate::error::{FlowError, Result};

/// Hard cap on solver passes. A monotone fixpoint over a finite graph never
/// needs this many; exceeding it aborts the file's analysis.
pub const MAX_PASSES: usize = 500;

// =============================================================================
// Types
// =============================================================================

/// Unique identifier for a definition, assigned in strict program order
/// across the whole file (1-based, never reused or reordered). Displayed as
/// `D1`, `D2`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DefId(pub usize);

impl std::fmt::Display for DefId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "D{}", self.0)
    }
}

impl DefId {
    /// Bit index in the definition universe (ids are 1-based).
    #[inline]
    fn bit(self) -> usize {
        self.0 - 1
    }

    /// Inverse of [`DefId::bit`].
    #[inline]
    fn from_bit(bit: usize) -> Self {
        DefId(bit + 1)
    }
}

/// An assignment to a variable, created once during extraction and immutable
/// thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// Program-order identifier.
    pub id: DefId,
    /// The assigned variable name.
    pub variable: String,
    /// Owning block.
    pub block: BlockId,
    /// Statement index within the owning block.
    pub stmt_index: usize,
    /// The matched statement text.
    pub code: String,
}

/// Per-block gen/kill sets over the definition universe.
///
/// `gen[B]` holds the last definition of each variable written inside B
/// (earlier same-variable definitions in B are shadowed and excluded);
/// `kill[B]` holds every other program-wide definition of a variable that B
/// redefines. The two are disjoint by construction.
#[derive(Debug, Clone)]
pub struct GenKillSets {
    gen: Vec<BitSet>,
    kill: Vec<BitSet>,
    num_defs: usize,
}

impl GenKillSets {
    /// Gen set of a block as a bit set.
    #[inline]
    pub fn gen(&self, block: BlockId) -> &BitSet {
        &self.gen[block.0]
    }

    /// Kill set of a block as a bit set.
    #[inline]
    pub fn kill(&self, block: BlockId) -> &BitSet {
        &self.kill[block.0]
    }

    /// Size of the definition universe.
    #[inline]
    pub fn num_defs(&self) -> usize {
        self.num_defs
    }

    /// Gen set as sorted definition ids, for reporting.
    pub fn gen_ids(&self, block: BlockId) -> Vec<DefId> {
        self.gen[block.0].iter().map(DefId::from_bit).collect()
    }

    /// Kill set as sorted definition ids, for reporting.
    pub fn kill_ids(&self, block: BlockId) -> Vec<DefId> {
        self.kill[block.0].iter().map(DefId::from_bit).collect()
    }
}

/// IN/OUT of every block as of the end of one solver pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSets {
    /// The block these sets belong to.
    pub block: BlockId,
    /// Definitions possibly reaching block entry, ascending.
    pub reaching_in: Vec<DefId>,
    /// Definitions possibly reaching block exit, ascending.
    pub reaching_out: Vec<DefId>,
}

/// One full pass of the solver, blocks in document order.
pub type PassSnapshot = Vec<BlockSets>;

/// Result of the iterative solver: final IN/OUT plus convergence history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveOutcome {
    /// Number of full passes until fixpoint (including the final pass that
    /// observed no change).
    pub passes: usize,
    /// Per-pass snapshots, one entry per pass.
    pub history: Vec<PassSnapshot>,
    /// Final IN sets, keyed by block ordinal.
    pub reaching_in: FxHashMap<usize, Vec<DefId>>,
    /// Final OUT sets, keyed by block ordinal.
    pub reaching_out: FxHashMap<usize, Vec<DefId>>,
}

/// Which of a block's two point sets a finding refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetPosition {
    /// The block-entry set.
    In,
    /// The block-exit set.
    Out,
}

impl std::fmt::Display for SetPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetPosition::In => write!(f, "IN"),
            SetPosition::Out => write!(f, "OUT"),
        }
    }
}

/// A program point where more than one definition of the same variable may
/// reach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiDefSite {
    /// Block of the finding.
    pub block: BlockId,
    /// Whether the ambiguity is at block entry or exit.
    pub position: SetPosition,
    /// The variable with multiple reaching definitions.
    pub variable: String,
    /// The competing definitions, ascending.
    pub definitions: Vec<DefId>,
}

// =============================================================================
// Definition extraction
// =============================================================================

/// Simple-assignment matcher: an identifier immediately followed by an
/// assignment operator. Longest operators first so `<<=` is not shadowed by
/// `=`. Equality (`==`) is excluded by inspecting the character after the
/// match, since the regex crate has no lookahead.
static ASSIGN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z_]\w*)\s*(<<=|>>=|\+=|-=|\*=|/=|%=|&=|\|=|\^=|=)").expect("static regex")
});

/// Find the assigned variable of a statement, if it is a simple assignment.
///
/// Lines that look like equality comparisons and preprocessor lines yield
/// `None`; this is a classification decision, not an error.
fn assignment_target(stmt: &str) -> Option<&str> {
    let s = stmt.trim();
    if s.is_empty() || s.starts_with('#') {
        return None;
    }

    let mut search_from = 0;
    while let Some(caps) = ASSIGN_RE.captures(&s[search_from..]) {
        let whole = caps.get(0).expect("capture 0 always present");
        let op = caps.get(2).expect("operator group");
        let after = search_from + op.end();
        // A trailing '=' means this was equality, not assignment; resume the
        // scan one character past the failed match start.
        if s[after..].starts_with('=') {
            search_from += whole.start() + 1;
            continue;
        }
        let var = caps.get(1).expect("identifier group");
        let (start, end) = (search_from + var.start(), search_from + var.end());
        return Some(&s[start..end]);
    }
    None
}

/// Scan all blocks for assignment statements and number them in program
/// order.
///
/// Blocks are scanned in document order, statements in block order; the
/// resulting id sequence is the canonical ordering used for tie-breaking and
/// deterministic set rendering everywhere else. The counter is local to this
/// call, so concurrent analyses of different files never interfere.
pub fn extract_definitions(
    blocks: &[BasicBlock],
) -> (Vec<Definition>, FxHashMap<BlockId, Vec<DefId>>) {
    let mut definitions = Vec::new();
    let mut per_block: FxHashMap<BlockId, Vec<DefId>> = FxHashMap::default();
    let mut counter = 0usize;

    for block in blocks {
        for (stmt_index, stmt) in block.statements.iter().enumerate() {
            if let Some(var) = assignment_target(&stmt.text) {
                counter += 1;
                let id = DefId(counter);
                definitions.push(Definition {
                    id,
                    variable: var.to_string(),
                    block: block.id,
                    stmt_index,
                    code: stmt.text.clone(),
                });
                per_block.entry(block.id).or_default().push(id);
            }
        }
    }

    tracing::debug!(definitions = definitions.len(), "extracted definitions");
    (definitions, per_block)
}

// =============================================================================
// Gen/Kill computation
// =============================================================================

/// Compute gen and kill sets for every block.
pub fn compute_gen_kill(
    blocks: &[BasicBlock],
    definitions: &[Definition],
    per_block: &FxHashMap<BlockId, Vec<DefId>>,
) -> GenKillSets {
    let num_defs = definitions.len();

    // Group definitions by variable, program-wide.
    let mut defs_by_var: FxHashMap<&str, Vec<DefId>> = FxHashMap::default();
    for def in definitions {
        defs_by_var.entry(&def.variable).or_default().push(def.id);
    }

    let def_var = |id: DefId| definitions[id.bit()].variable.as_str();

    let mut gen = Vec::with_capacity(blocks.len());
    let mut kill = Vec::with_capacity(blocks.len());

    for block in blocks {
        // Later definitions of a variable shadow earlier ones within the
        // block; only the last survives to block exit.
        let mut last_def_for_var: FxHashMap<&str, DefId> = FxHashMap::default();
        if let Some(ids) = per_block.get(&block.id) {
            for &id in ids {
                last_def_for_var.insert(def_var(id), id);
            }
        }

        let mut gen_set = BitSet::with_capacity(num_defs);
        for &id in last_def_for_var.values() {
            gen_set.insert(id.bit());
        }

        let mut kill_set = BitSet::with_capacity(num_defs);
        for var in last_def_for_var.keys() {
            for &other in &defs_by_var[var] {
                if !gen_set.contains(other.bit()) {
                    kill_set.insert(other.bit());
                }
            }
        }

        gen.push(gen_set);
        kill.push(kill_set);
    }

    GenKillSets {
        gen,
        kill,
        num_defs,
    }
}

// =============================================================================
// Iterative solver
// =============================================================================

/// Solve the reaching-definitions equations to a fixpoint.
///
/// Initializes all IN/OUT to the empty set and repeats full passes over the
/// blocks in document order until no set changes. Updates within a pass are
/// immediately visible to later blocks of the same pass; each pass appends a
/// snapshot of every block's (IN, OUT) to the returned history, including
/// the final pass that observed no change.
///
/// Predecessors are taken from all CFG edges regardless of label.
///
/// # Errors
///
/// Returns [`FlowError::NonConvergence`] if [`MAX_PASSES`] full passes do
/// not reach a fixpoint. This should never happen for a monotone fixpoint
/// over a finite graph and indicates a bug, so no partial result is
/// returned.
pub fn solve(cfg: &Cfg, gen_kill: &GenKillSets) -> Result<SolveOutcome> {
    let num_blocks = cfg.node_count();
    let num_defs = gen_kill.num_defs();

    let mut in_sets: Vec<BitSet> = (0..num_blocks)
        .map(|_| BitSet::with_capacity(num_defs))
        .collect();
    let mut out_sets: Vec<BitSet> = (0..num_blocks)
        .map(|_| BitSet::with_capacity(num_defs))
        .collect();

    let mut history: Vec<PassSnapshot> = Vec::new();

    for pass in 1..=MAX_PASSES {
        let mut changed = false;

        for block in cfg.block_ids() {
            // IN[B] = union of OUT[P] over predecessors (Gauss-Seidel:
            // earlier blocks of this pass already hold their new OUT).
            let mut new_in = BitSet::with_capacity(num_defs);
            for pred in cfg.predecessors(block) {
                new_in.union_with(&out_sets[pred.0]);
            }

            // OUT[B] = GEN[B] UNION (IN[B] - KILL[B])
            let mut new_out = new_in.clone();
            new_out.difference_with(gen_kill.kill(block));
            new_out.union_with(gen_kill.gen(block));

            if new_in != in_sets[block.0] || new_out != out_sets[block.0] {
                changed = true;
            }
            in_sets[block.0] = new_in;
            out_sets[block.0] = new_out;
        }

        history.push(snapshot(cfg, &in_sets, &out_sets));

        if !changed {
            tracing::debug!(passes = pass, "reaching definitions converged");
            return Ok(SolveOutcome {
                passes: pass,
                history,
                reaching_in: to_id_map(&in_sets),
                reaching_out: to_id_map(&out_sets),
            });
        }
    }

    tracing::warn!(passes = MAX_PASSES, "solver pass cap exceeded");
    Err(FlowError::NonConvergence { passes: MAX_PASSES })
}

fn snapshot(cfg: &Cfg, in_sets: &[BitSet], out_sets: &[BitSet]) -> PassSnapshot {
    cfg.block_ids()
        .map(|block| BlockSets {
            block,
            reaching_in: in_sets[block.0].iter().map(DefId::from_bit).collect(),
            reaching_out: out_sets[block.0].iter().map(DefId::from_bit).collect(),
        })
        .collect()
}

fn to_id_map(sets: &[BitSet]) -> FxHashMap<usize, Vec<DefId>> {
    sets.iter()
        .enumerate()
        .map(|(i, s)| (i, s.iter().map(DefId::from_bit).collect()))
        .collect()
}

// =============================================================================
// Interpretation
// =============================================================================

/// Flag every program point where more than one definition of the same
/// variable may reach.
///
/// Sites are reported deterministically: blocks in document order, IN before
/// OUT, variables ordered by their earliest competing definition.
pub fn interpret_multiple_defs(
    cfg: &Cfg,
    outcome: &SolveOutcome,
    definitions: &[Definition],
) -> Vec<MultiDefSite> {
    let mut sites = Vec::new();

    for block in cfg.block_ids() {
        for (position, set) in [
            (SetPosition::In, outcome.reaching_in.get(&block.0)),
            (SetPosition::Out, outcome.reaching_out.get(&block.0)),
        ] {
            let Some(ids) = set else { continue };

            let mut per_var: FxHashMap<&str, Vec<DefId>> = FxHashMap::default();
            for &id in ids {
                per_var
                    .entry(definitions[id.bit()].variable.as_str())
                    .or_default()
                    .push(id);
            }

            let mut ambiguous: Vec<(&str, Vec<DefId>)> = per_var
                .into_iter()
                .filter(|(_, ids)| ids.len() > 1)
                .collect();
            ambiguous.sort_by_key(|(_, ids)| ids[0]);

            for (variable, definitions) in ambiguous {
                sites.push(MultiDefSite {
                    block,
                    position,
                    variable: variable.to_string(),
                    definitions,
                });
            }
        }
    }

    sites
}

// =============================================================================
// Tests
// =============================================================================
