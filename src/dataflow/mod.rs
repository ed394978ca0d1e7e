//! Dataflow analyses over the control flow graph.
//!
//! Currently one analysis: reaching definitions, a forward may-analysis
//! solved by round-robin iteration to a fixpoint. The [`common`] module
//! holds the bit-set machinery shared by any future analysis.

pub mod common;
pub mod reaching_definitions;

pub use common::BitSet;
pub use reaching_definitions::{
    compute_gen_kill, extract_definitions, interpret_multiple_defs, solve, BlockSets, DefId,
    Definition, GenKillSets, MultiDefSite, PassSnapshot, SetPosition, SolveOutcome,
    MAX_PASSES,
};
