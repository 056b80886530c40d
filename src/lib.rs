//! Interaction core for a block-based diagram editor.
//!
//! The crate is headless: the host owns rendering and hit testing, feeds
//! pointer events (plus hit-test answers) into a [`workspace::Workspace`],
//! and drains structural-change events back out for undo, rendering, and
//! persistence. In between, the core runs the gesture state machine, the
//! drag strategies, connection snapping with per-kind sorted indices,
//! compatibility checking, and deferred collision bumps on a cooperative
//! clock the host advances.

pub mod block;
pub mod bump;
pub mod checker;
pub mod connection;
pub mod connection_db;
pub mod constants;
pub mod error;
pub mod events;
pub mod input;
pub mod scheduler;
pub mod spatial_index;
pub mod types;
pub mod workspace;

pub use block::{Block, BlockTemplate, ConnectionTemplate, Field};
pub use connection::Connection;
pub use error::{ContractViolation, Incompatibility, WsResult};
pub use events::{EventKind, WorkspaceEvent};
pub use input::{ConnectionCandidate, Gesture, GesturePhase, ViewTransform};
pub use types::{
    BlockId, BubbleId, ConnectionId, ConnectionKind, GestureSurface, GroupId, HitTarget,
    Modifiers, PointerButton, PointerEvent, Tracking,
};
pub use workspace::{Bubble, Workspace};
