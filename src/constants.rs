//! Interaction-wide constants.
//!
//! Centralizes magic numbers for gesture classification, snapping, and
//! collision resolution to make the codebase more maintainable and
//! self-documenting.

// ============================================================================
// Gesture Classification
// ============================================================================

/// Distance (in screen units) a pointer must travel from its down-point
/// before the gesture stops being a click and becomes a drag, on the main
/// canvas. A move of exactly this distance is still a click.
pub const DRAG_RADIUS: f64 = 8.0;

/// Drag threshold inside the flyout (block palette). Smaller than the canvas
/// radius so that pulling a new block out of the palette feels immediate.
pub const FLYOUT_DRAG_RADIUS: f64 = 5.0;

// ============================================================================
// Connection Snapping
// ============================================================================

/// Maximum distance (in workspace units) between two connections for the
/// dragged one to snap onto the other.
pub const SNAP_RADIUS: f64 = 28.0;

/// Radius used when listing nearby connections for highlighting. Kept equal
/// to the snap radius so the highlight matches what release would do.
pub const HIGHLIGHT_RADIUS: f64 = SNAP_RADIUS;

// ============================================================================
// Collision Resolution ("bump")
// ============================================================================

/// Delay before a bump is applied, so the nudge reads as a deliberate
/// follow-up rather than instantaneous jitter, and so it can join the event
/// group of the disconnect that caused it.
pub const BUMP_DELAY_MS: u64 = 250;

/// Upper bound on the random extra distance added to a bump offset. The
/// total bump displacement lies in `[SNAP_RADIUS, SNAP_RADIUS + BUMP_JITTER)`.
pub const BUMP_JITTER: f64 = 10.0;

// ============================================================================
// Deferred Work
// ============================================================================

/// Interval between individual disposals when many blocks are deleted at
/// once, to avoid janking the host's main loop.
pub const DISPOSE_STAGGER_MS: u64 = 10;

// ============================================================================
// Zoom & Pan
// ============================================================================

/// Minimum zoom level
pub const MIN_ZOOM: f64 = 0.1;

/// Maximum zoom level
pub const MAX_ZOOM: f64 = 5.0;

/// Default zoom level
pub const DEFAULT_ZOOM: f64 = 1.0;
