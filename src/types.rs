//! Core identifier and value types shared across the interaction core.
//!
//! Identifiers are workspace-local monotonic `u64` newtypes; every lookup
//! goes through the live registries on [`crate::workspace::Workspace`], so a
//! stale id is always detectable (and deferred callbacks rely on that).
//! Pointer events are immutable snapshot values passed by value into each
//! handler; nothing in the core holds onto a mutable "current event".

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a block on the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u64);

/// Identifier of a connection point on a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

/// Identifier of a floating auxiliary bubble anchored to a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BubbleId(pub u64);

/// Identifier of an undo-log event group. Events sharing a group id are
/// undone and redone atomically by the undo collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub u64);

/// Monotonic id generator owned by the workspace. One counter feeds every
/// id family so ids also encode creation order, which the connection index
/// uses as its deterministic tie-break.
#[derive(Debug, Default)]
pub struct IdGen {
    next: u64,
}

impl IdGen {
    fn bump(&mut self) -> u64 {
        self.next += 1;
        self.next
    }

    pub fn block(&mut self) -> BlockId {
        BlockId(self.bump())
    }

    pub fn connection(&mut self) -> ConnectionId {
        ConnectionId(self.bump())
    }

    pub fn bubble(&mut self) -> BubbleId {
        BubbleId(self.bump())
    }

    pub fn group(&mut self) -> GroupId {
        GroupId(self.bump())
    }
}

// ============================================================================
// Connection Kinds & Tracking
// ============================================================================

/// The four kinds of attachment point a block can carry. Exactly one kind
/// per connection; `Input` joins `Output` and `Previous` joins `Next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionKind {
    /// A value socket on a parent block.
    Input,
    /// The value plug of a child block.
    Output,
    /// The top notch of a stackable block.
    Previous,
    /// The bottom notch of a stackable block.
    Next,
}

impl ConnectionKind {
    /// The complementary kind this kind may join.
    pub fn opposite(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
            Self::Previous => Self::Next,
            Self::Next => Self::Previous,
        }
    }

    /// Superior kinds live on the parent side of a joint (`Input`, `Next`);
    /// inferior kinds (`Output`, `Previous`) live on the child side.
    pub fn is_superior(self) -> bool {
        matches!(self, Self::Input | Self::Next)
    }
}

/// Index-membership state of a connection.
///
/// A connection is a member of its kind's index iff it is `Tracked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tracking {
    /// Not yet in the index, but should be once the block lands on the main
    /// surface (freshly created or flyout template blocks).
    WillTrack,
    /// In the index.
    Tracked,
    /// Deliberately out of the index (mid-drag, connected, or disposed).
    Untracked,
}

// ============================================================================
// Pointer Events
// ============================================================================

/// Modifier-key state captured with a pointer event. `alt` (or `meta`)
/// selects heal-the-stack semantics when a mid-stack block is detached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Whether detaching a mid-stack block should reconnect its neighbours.
    pub fn heals_stack(self) -> bool {
        self.alt || self.meta
    }
}

/// Which physical button/touch produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    /// Right-click; short-circuits to a context action.
    Secondary,
    Middle,
}

/// Immutable snapshot of one pointer event, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Screen-space position.
    pub pos: kurbo::Point,
    pub button: PointerButton,
    /// Touch/pointer identity; events from pointers other than the one that
    /// started the gesture are ignored.
    pub pointer_id: u32,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// A primary-button event at `(x, y)` with no modifiers, pointer 0.
    pub fn primary(x: f64, y: f64) -> Self {
        Self {
            pos: kurbo::Point::new(x, y),
            button: PointerButton::Primary,
            pointer_id: 0,
            modifiers: Modifiers::default(),
        }
    }
}

// ============================================================================
// Hit Targets
// ============================================================================

/// The host's answer to "what is under this point", delivered together with
/// a pointer-down event. The rendering layer owns hit testing; the core only
/// consumes its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// A floating bubble. Beats blocks for drag classification.
    Bubble(BubbleId),
    /// A field on a block. Recorded for click routing but never decides
    /// drag-vs-click on its own.
    Field { block: BlockId, field: usize },
    /// A block body.
    Block(BlockId),
    /// Empty canvas.
    Workspace,
}

/// Which surface a gesture started on. The flyout uses a smaller drag
/// threshold and instantiates a fresh block copy when a drag begins there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureSurface {
    Main,
    Flyout,
}
