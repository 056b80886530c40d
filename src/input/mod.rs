//! The pointer-input pipeline.
//!
//! `coords` maps between screen and workspace space, `state` names the
//! gesture phases, `drag` holds the per-strategy drag logic, and `gesture`
//! drives the down/move/up lifecycle and exposes the pointer API on
//! [`crate::workspace::Workspace`].

pub mod coords;
pub mod drag;
pub mod gesture;
pub mod state;

pub use coords::ViewTransform;
pub use drag::{ConnectionCandidate, Dragger};
pub use gesture::Gesture;
pub use state::GesturePhase;
