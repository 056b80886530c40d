//! Gesture phase - explicit state for one pointer-down-to-up lifecycle.
//!
//! Replaces scattered boolean flags with a single state machine, making
//! impossible states unrepresentable: a gesture is never simultaneously a
//! click and a drag, and never drives two drag strategies at once.
//!
//! ## State Transitions
//!
//! ```text
//! Pending -> DraggingBlock     (drag radius exceeded, block under pointer)
//! Pending -> DraggingCanvas    (drag radius exceeded, pannable surface)
//! Pending -> DraggingBubble    (drag radius exceeded, bubble under pointer)
//! Pending -> Ended             (pointer up within radius - a click)
//!
//! Any -> Ended                 (pointer up or cancel - never re-entered)
//! ```

/// Phase of the active gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GesturePhase {
    /// Pointer is down; no classification has happened yet (and none will
    /// until the drag radius is exceeded).
    #[default]
    Pending,

    /// A block drag is in flight.
    DraggingBlock,

    /// The canvas itself is being panned.
    DraggingCanvas,

    /// A floating bubble is being dragged.
    DraggingBubble,

    /// The gesture resolved (click, finished drag, or cancel). Terminal.
    Ended,
}

impl GesturePhase {
    /// Returns true if any drag strategy is active.
    pub fn is_dragging(self) -> bool {
        matches!(
            self,
            Self::DraggingBlock | Self::DraggingCanvas | Self::DraggingBubble
        )
    }

    pub fn is_dragging_block(self) -> bool {
        matches!(self, Self::DraggingBlock)
    }

    pub fn is_dragging_canvas(self) -> bool {
        matches!(self, Self::DraggingCanvas)
    }

    pub fn is_dragging_bubble(self) -> bool {
        matches!(self, Self::DraggingBubble)
    }

    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_ended(self) -> bool {
        matches!(self, Self::Ended)
    }
}
