//! Error types for the analysis pipeline.
//!
//! Every error here is recoverable at the file-processing boundary: the batch
//! driver reports a file's error and continues with the remaining files.
//! Absence of a match (no leader fired, no definition found, no predecessors)
//! is represented by empty sets, never by an error.

use std::path::{Path, PathBuf};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, FlowError>;

/// Errors produced while analyzing a source file.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// The input file could not be read or decoded.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The dataflow solver exceeded its pass cap without reaching a fixpoint.
    ///
    /// Reaching definitions is a monotone fixpoint over a finite lattice, so
    /// this indicates a logic defect rather than a data problem. The file's
    /// analysis is aborted; no partial result is returned.
    #[error("reaching-definitions solver did not converge after {passes} passes")]
    NonConvergence {
        /// Number of full passes executed before giving up.
        passes: usize,
    },
}

impl FlowError {
    /// Wrap an I/O error with the path that produced it.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        FlowError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
