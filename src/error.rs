//! Error types for the interaction core.
//!
//! Two distinct families:
//! - [`ContractViolation`]: programmer errors (starting a gesture twice,
//!   duplicate index membership, re-entrant disposal). These surface as
//!   `Err` from the public API and indicate a caller bug.
//! - [`Incompatibility`]: expected "these two connections may not join"
//!   outcomes. Never raised as an error; the search layer skips the
//!   candidate and tries the next-best one.

use thiserror::Error;

use crate::types::{BlockId, ConnectionId};

/// Fatal caller-contract violations.
///
/// A production host should treat one of these as "abort this gesture and
/// log", not as a reason to crash; the workspace does exactly that on the
/// pointer-event path (see `WorkspaceEvent::GestureAborted`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    /// A gesture was started while it had already been started.
    #[error("gesture already started")]
    GestureAlreadyStarted,

    /// Drag classification ran a second time on the same gesture.
    #[error("gesture already classified")]
    AlreadyClassified,

    /// A gesture was asked to end while it was already ending.
    #[error("gesture is already ending")]
    RecursiveGestureEnd,

    /// Disposal of a block re-entered itself.
    #[error("re-entrant disposal of block {0:?}")]
    ReentrantDisposal(BlockId),

    /// A connection was inserted into an index it is already a member of.
    #[error("connection {0:?} is already in its index")]
    DuplicateIndexEntry(ConnectionId),

    /// An index operation referenced a connection that is not a member.
    #[error("connection {0:?} is not in the index")]
    MissingIndexEntry(ConnectionId),

    /// An id referenced a block or connection that no longer exists.
    #[error("stale reference: {0}")]
    StaleId(&'static str),

    /// A block template was structurally invalid (e.g. both an output and a
    /// previous connection).
    #[error("invalid block template: {0}")]
    InvalidBlock(&'static str),
}

/// Reasons two connections may not join. Produced by the compatibility
/// checker; consumed by the search layer, which moves on to the next
/// candidate rather than reporting an error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incompatibility {
    /// The connection kinds are not complementary.
    #[error("connection kinds are not complementary")]
    WrongKind,

    /// Both connections belong to the same block.
    #[error("connection would attach a block to itself")]
    SelfConnection,

    /// One block is an ancestor of the other; connecting would nest a block
    /// inside its own descendant.
    #[error("connection would create an ancestor cycle")]
    AncestorCycle,

    /// The type-check tag lists have no common tag.
    #[error("type-check tags do not intersect")]
    TypeMismatch,

    /// The two connections are already each other's partner (degenerate
    /// reconnect during a drag).
    #[error("connections are already connected to each other")]
    AlreadyConnected,

    /// The target's owner is part of the stack currently being dragged.
    #[error("target belongs to the dragged stack")]
    TargetMidDrag,

    /// The target already has a partner whose block cannot be displaced.
    #[error("existing partner cannot be displaced")]
    WouldDisplaceImmovable,
}

/// Result alias for workspace operations.
pub type WsResult<T> = Result<T, ContractViolation>;
