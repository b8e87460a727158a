//! Errors reported by sequence operations.
//!
//! Every error is returned at the call that caused it, and the sequence is
//! left exactly as it was before that call.

use thiserror::Error;

/// Why a sequence operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Error {
    /// `pop_front` on an empty sequence.
    #[error("sequence is empty")]
    Empty,
    /// Inserting or erasing after the end marker.
    #[error("there is no position after the end marker")]
    EndPosition,
    /// Erasing after a position with no following element.
    #[error("no element follows the position")]
    NothingAfter,
    /// Reading through the before-begin or end position.
    #[error("position does not reference an element")]
    NotDereferenceable,
    /// Advancing the end marker.
    #[error("cannot advance past the end marker")]
    PastEnd,
    /// The node a position referenced has been removed.
    #[error("position references a removed element")]
    StalePosition,
    /// Storage refused a new node.
    #[error("storage cannot hold another element")]
    StorageFull,
}

/// Result alias for sequence operations.
pub type Result<T> = std::result::Result<T, Error>;
