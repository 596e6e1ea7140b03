//! Observer errors

use thiserror::Error;

/// Result type for observer operations
pub type Result<T> = std::result::Result<T, ObserverError>;

/// Errors raised while consuming the audit log
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObserverError {
    /// An entry's hash or link does not match the recomputed chain
    #[error("audit chain broken at sequence {sequence}: {reason}")]
    ChainBroken {
        /// First bad sequence number
        sequence: u64,
        /// What failed to match
        reason: String,
    },

    /// An event referenced an entity the projection has never seen
    ///
    /// This means an earlier audit event did not carry enough fields to
    /// reconstruct state, which the core promises never to do.
    #[error("inconsistent audit stream: {0}")]
    Inconsistent(String),
}
