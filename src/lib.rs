//! Line-oriented control flow and reaching-definitions analysis.
//!
//! Takes C-like source text, partitions it into basic blocks using the
//! classic leader rules, synthesizes a control flow graph, and solves the
//! reaching-definitions dataflow equations iteratively to a fixpoint,
//! recording every pass. The front end is a deliberate keyword heuristic
//! (one line = one statement, no brace matching) hidden behind the
//! [`statement::Classify`] seam.
//!
//! # Pipeline
//!
//! 1. [`statement`] — strip comments, classify each line
//! 2. [`cfg`] — leaders, basic blocks, edges
//! 3. [`dataflow`] — definitions, gen/kill, iterative solve
//! 4. [`metrics`] / [`analysis`] — counts, findings, batch driver
//!
//! # Example
//!
//! ```
//! let analysis = blockflow::analyze_source("demo", "x = 1;\nif (x > 0)\ny = 2;\n").unwrap();
//! assert_eq!(analysis.cfg.node_count(), 3);
//! assert_eq!(analysis.definitions.len(), 2);
//! ```

pub mod analysis;
pub mod cfg;
pub mod dataflow;
pub mod error;
pub mod metrics;
pub mod statement;

pub use analysis::{analyze_file, analyze_files, analyze_source, FileAnalysis};
pub use cfg::{cfg_from_source, BasicBlock, BlockId, Cfg, CfgEdge, EdgeType};
pub use dataflow::{DefId, Definition, MultiDefSite, SolveOutcome};
pub use error::{FlowError, Result};
pub use metrics::{graph_metrics, GraphMetrics};
pub use statement::{classify, Classify, KeywordClassifier, StatementKind, StatementLine};
