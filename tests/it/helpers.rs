//! Test helpers and builders for reducing boilerplate in tests.
//!
//! This module provides:
//! - `TestWorkspaceBuilder` - builder for workspaces pre-populated with blocks
//! - Canonical block templates (`stack_block`, `value_block`, `socket_block`)
//! - Pointer-sequence drivers (`click`, `drag`, `drag_with_modifiers`)

use kurbo::{Point, Vec2};
use snapblocks::{
    BlockId, BlockTemplate, ConnectionId, ConnectionKind, GestureSurface, HitTarget, Modifiers,
    PointerEvent, Workspace,
};

/// Install a log subscriber honouring `RUST_LOG`, once per test binary.
/// Handy when a pointer-pipeline test fails and the interleaving matters.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// TestWorkspaceBuilder
// ============================================================================

/// Builder for workspaces pre-populated with blocks.
///
/// # Example
/// ```ignore
/// let (ws, ids) = TestWorkspaceBuilder::new()
///     .with_block(stack_block(0.0, 0.0))
///     .with_block(stack_block(0.0, 100.0))
///     .build();
/// ```
pub struct TestWorkspaceBuilder {
    templates: Vec<BlockTemplate>,
    pannable: bool,
    rtl: bool,
}

impl Default for TestWorkspaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspaceBuilder {
    pub fn new() -> Self {
        Self {
            templates: Vec::new(),
            pannable: true,
            rtl: false,
        }
    }

    pub fn with_block(mut self, template: BlockTemplate) -> Self {
        self.templates.push(template);
        self
    }

    pub fn without_panning(mut self) -> Self {
        self.pannable = false;
        self
    }

    pub fn rtl(mut self) -> Self {
        self.rtl = true;
        self
    }

    /// Build the workspace, returning it together with the created block ids
    /// in template order. Creation events are drained so tests start from a
    /// clean log.
    pub fn build(self) -> (Workspace, Vec<BlockId>) {
        let mut ws = Workspace::new();
        ws.pannable = self.pannable;
        ws.rtl = self.rtl;
        let ids = self
            .templates
            .into_iter()
            .map(|t| ws.add_block(t).unwrap())
            .collect();
        ws.take_events();
        (ws, ids)
    }
}

// ============================================================================
// Canonical block templates
// ============================================================================

/// A 100x40 stackable block: previous notch at the origin, next notch at the
/// bottom-left corner.
pub fn stack_block(x: f64, y: f64) -> BlockTemplate {
    BlockTemplate::new()
        .at(x, y)
        .sized(100.0, 40.0)
        .with_connection(ConnectionKind::Previous, Vec2::ZERO)
        .with_connection(ConnectionKind::Next, Vec2::new(0.0, 40.0))
}

/// A 100x40 value block: output plug on the left edge.
pub fn value_block(x: f64, y: f64) -> BlockTemplate {
    BlockTemplate::new()
        .at(x, y)
        .sized(100.0, 40.0)
        .with_connection(ConnectionKind::Output, Vec2::new(0.0, 20.0))
}

/// A value block whose output only accepts the given type tag.
pub fn typed_value_block(x: f64, y: f64, tag: &str) -> BlockTemplate {
    BlockTemplate::new()
        .at(x, y)
        .sized(100.0, 40.0)
        .with_checked_connection(
            ConnectionKind::Output,
            Vec2::new(0.0, 20.0),
            Some(vec![tag.to_string()]),
        )
}

/// A 100x40 block with a value socket on its right edge.
pub fn socket_block(x: f64, y: f64) -> BlockTemplate {
    BlockTemplate::new()
        .at(x, y)
        .sized(100.0, 40.0)
        .with_connection(ConnectionKind::Input, Vec2::new(100.0, 20.0))
}

/// A socket block whose input only accepts the given type tag.
pub fn typed_socket_block(x: f64, y: f64, tag: &str) -> BlockTemplate {
    BlockTemplate::new()
        .at(x, y)
        .sized(100.0, 40.0)
        .with_checked_connection(
            ConnectionKind::Input,
            Vec2::new(100.0, 20.0),
            Some(vec![tag.to_string()]),
        )
}

/// The id of `block`'s connection of the given kind. Panics if absent.
pub fn conn_of(ws: &Workspace, block: BlockId, kind: ConnectionKind) -> ConnectionId {
    ws.block(block)
        .unwrap()
        .connections
        .iter()
        .copied()
        .find(|cid| ws.connection(*cid).unwrap().kind == kind)
        .unwrap()
}

// ============================================================================
// Pointer-sequence drivers
// ============================================================================

/// Press and release at the same point: resolves as a click.
pub fn click(ws: &mut Workspace, hit: HitTarget, at: Point) {
    let down = PointerEvent::primary(at.x, at.y);
    ws.pointer_down(down, hit, GestureSurface::Main).unwrap();
    ws.pointer_up(down).unwrap();
}

/// Press at `from`, move to `to`, release. Classifies as a drag whenever the
/// displacement exceeds the drag radius.
pub fn drag(ws: &mut Workspace, hit: HitTarget, from: Point, to: Point) {
    drag_with_modifiers(ws, hit, from, to, Modifiers::default());
}

pub fn drag_with_modifiers(
    ws: &mut Workspace,
    hit: HitTarget,
    from: Point,
    to: Point,
    modifiers: Modifiers,
) {
    let mut down = PointerEvent::primary(from.x, from.y);
    down.modifiers = modifiers;
    ws.pointer_down(down, hit, GestureSurface::Main).unwrap();

    let mut mv = PointerEvent::primary(to.x, to.y);
    mv.modifiers = modifiers;
    ws.pointer_move(mv).unwrap();
    ws.pointer_up(mv).unwrap();
}
