//! Pointer-gesture lifecycle: down, moves, up (or cancel).
//!
//! One [`Gesture`] value exists per pointer interaction. It is created at
//! pointer-down with the host's hit-test answer, buffers moves until the
//! pointer leaves the drag radius, classifies itself exactly once (bubble
//! drag, block drag, canvas pan, or inert), and resolves at pointer-up as
//! either that drag's completion or a click on the most specific target
//! under the original press.
//!
//! The workspace holds at most one gesture; a second pointer going down
//! while one is active is ignored rather than queued.

use kurbo::{Point, Vec2};
use tracing::{debug, trace, warn};

use crate::constants::{DRAG_RADIUS, FLYOUT_DRAG_RADIUS};
use crate::error::{ContractViolation, WsResult};
use crate::events::EventKind;
use crate::input::drag::{BlockDragger, BubbleDragger, CanvasDragger, ConnectionCandidate, Dragger};
use crate::input::state::GesturePhase;
use crate::types::{BlockId, BubbleId, GestureSurface, HitTarget, PointerButton, PointerEvent};
use crate::workspace::Workspace;

/// The state of one pointer interaction, from down to up.
#[derive(Debug)]
pub struct Gesture {
    /// The pointer that owns this gesture; events from other pointers are
    /// ignored for its whole lifetime.
    pointer_id: u32,
    start_screen: Point,
    surface: GestureSurface,
    start_bubble: Option<BubbleId>,
    start_field: Option<(BlockId, usize)>,
    start_block: Option<BlockId>,
    /// Last observed displacement, screen space.
    delta_screen: Vec2,
    /// Last observed displacement, workspace space.
    delta_ws: Vec2,
    has_started: bool,
    classified: bool,
    /// True once the pointer has left the drag radius; from then on the
    /// gesture can never resolve as a click.
    exceeded_radius: bool,
    /// Guard against ending re-entering itself through a callback.
    ending: bool,
    dragger: Option<Dragger>,
    phase: GesturePhase,
}

impl Gesture {
    pub(crate) fn new(down: PointerEvent, hit: HitTarget, surface: GestureSurface) -> Self {
        let (start_bubble, start_field, start_block) = match hit {
            HitTarget::Bubble(id) => (Some(id), None, None),
            HitTarget::Field { block, field } => (None, Some((block, field)), Some(block)),
            HitTarget::Block(id) => (None, None, Some(id)),
            HitTarget::Workspace => (None, None, None),
        };
        Self {
            pointer_id: down.pointer_id,
            start_screen: down.pos,
            surface,
            start_bubble,
            start_field,
            start_block,
            delta_screen: Vec2::ZERO,
            delta_ws: Vec2::ZERO,
            has_started: false,
            classified: false,
            exceeded_radius: false,
            ending: false,
            dragger: None,
            phase: GesturePhase::Pending,
        }
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn surface(&self) -> GestureSurface {
        self.surface
    }

    /// The block currently being dragged by this gesture, if any.
    pub fn dragged_block(&self) -> Option<BlockId> {
        self.dragger.as_ref().and_then(|d| d.dragged_block())
    }

    /// The pending snap pairing of a block drag, for insertion-marker
    /// rendering.
    pub fn insertion_candidate(&self) -> Option<&ConnectionCandidate> {
        self.dragger.as_ref().and_then(|d| d.insertion_candidate())
    }

    /// Whether disposing `block` would pull state out from under this
    /// gesture.
    pub(crate) fn involves_block(&self, block: BlockId) -> bool {
        self.start_block == Some(block) || self.dragged_block() == Some(block)
    }

    /// Arm the gesture. A gesture is armed exactly once, at pointer-down.
    pub(crate) fn start(&mut self) -> WsResult<()> {
        if self.has_started {
            return Err(ContractViolation::GestureAlreadyStarted);
        }
        self.has_started = true;
        trace!(pointer = self.pointer_id, at = ?self.start_screen, "gesture armed");
        Ok(())
    }

    fn drag_radius(&self) -> f64 {
        match self.surface {
            GestureSurface::Main => DRAG_RADIUS,
            GestureSurface::Flyout => FLYOUT_DRAG_RADIUS,
        }
    }

    pub(crate) fn handle_move(&mut self, ws: &mut Workspace, ev: PointerEvent) -> WsResult<()> {
        if ev.pointer_id != self.pointer_id || self.phase.is_ended() {
            return Ok(());
        }
        self.delta_screen = ev.pos - self.start_screen;
        self.delta_ws = ws.view.screen_delta_to_workspace(self.delta_screen);

        // The threshold is strict so a move of exactly the radius is still a
        // click in waiting.
        if !self.exceeded_radius && self.delta_screen.hypot() > self.drag_radius() {
            self.exceeded_radius = true;
            self.classify(ws, ev)?;
        }
        if let Some(mut dragger) = self.dragger.take() {
            let result = dragger.drag(ws, self.delta_ws, self.delta_screen);
            self.dragger = Some(dragger);
            result?;
        }
        Ok(())
    }

    /// Pick the drag strategy for this gesture, exactly once. Most specific
    /// target wins: bubble over block over canvas; an immovable block defers
    /// to its nearest movable ancestor; a gesture with no draggable target
    /// stays inert (and, having left the radius, can no longer click).
    fn classify(&mut self, ws: &mut Workspace, ev: PointerEvent) -> WsResult<()> {
        if self.classified {
            return Err(ContractViolation::AlreadyClassified);
        }
        self.classified = true;

        let mut dragger = if let Some(bubble) = self.start_bubble {
            Some(Dragger::Bubble(BubbleDragger::new(bubble)))
        } else if let Some(block) = self.start_block {
            match self.surface {
                GestureSurface::Flyout => {
                    // Dragging out of the palette drags a fresh copy, never
                    // the template itself.
                    let at = ws.view.screen_to_workspace(self.start_screen);
                    let copy = ws.instantiate_from_flyout(block, at)?;
                    Some(Dragger::Block(BlockDragger::new(copy)))
                }
                GestureSurface::Main => self
                    .movable_target(ws, block)
                    .map(|target| Dragger::Block(BlockDragger::new(target))),
            }
        } else if self.surface == GestureSurface::Main && ws.pannable {
            Some(Dragger::Canvas(CanvasDragger::new()))
        } else {
            None
        };

        if let Some(d) = &mut dragger {
            d.start(ws, ev.modifiers)?;
            self.phase = d.phase();
        }
        self.dragger = dragger;
        debug!(phase = ?self.phase, "gesture classified");
        Ok(())
    }

    /// The pressed block if movable, else its nearest movable ancestor.
    fn movable_target(&self, ws: &Workspace, block: BlockId) -> Option<BlockId> {
        let mut cur = block;
        for _ in 0..=ws.block_count() {
            if ws.block(cur).is_some_and(|b| b.movable) {
                return Some(cur);
            }
            cur = ws.parent_of(cur)?;
        }
        None
    }

    pub(crate) fn handle_up(&mut self, ws: &mut Workspace, ev: PointerEvent) -> WsResult<()> {
        if ev.pointer_id != self.pointer_id {
            return Ok(());
        }
        if self.ending {
            return Err(ContractViolation::RecursiveGestureEnd);
        }
        self.ending = true;

        self.delta_screen = ev.pos - self.start_screen;
        self.delta_ws = ws.view.screen_delta_to_workspace(self.delta_screen);

        let result = match self.dragger.take() {
            Some(mut dragger) => dragger.end(ws, self.delta_ws, self.delta_screen),
            None => {
                if !self.exceeded_radius {
                    ws.push_event(EventKind::Click {
                        target: self.click_target(ws),
                    });
                }
                Ok(())
            }
        };
        self.phase = GesturePhase::Ended;
        debug!(pointer = self.pointer_id, "gesture ended");
        result
    }

    /// Click routing mirrors drag classification: bubble, then clickable
    /// field, then block, then bare canvas. Flyout fields are display-only
    /// and fall through to their block.
    fn click_target(&self, ws: &Workspace) -> HitTarget {
        if let Some(bubble) = self.start_bubble {
            return HitTarget::Bubble(bubble);
        }
        if self.surface == GestureSurface::Main
            && let Some((block, field)) = self.start_field
            && ws
                .block(block)
                .and_then(|b| b.fields.get(field))
                .is_some_and(|f| f.clickable)
        {
            return HitTarget::Field { block, field };
        }
        if let Some(block) = self.start_block {
            return HitTarget::Block(block);
        }
        HitTarget::Workspace
    }

    /// Terminate the gesture at its last observed displacement. Idempotent;
    /// emits no click.
    pub(crate) fn cancel(&mut self, ws: &mut Workspace) -> WsResult<()> {
        if self.ending || self.phase.is_ended() {
            return Ok(());
        }
        self.ending = true;
        let result = match self.dragger.take() {
            Some(mut dragger) => dragger.end(ws, self.delta_ws, self.delta_screen),
            None => Ok(()),
        };
        self.phase = GesturePhase::Ended;
        debug!(pointer = self.pointer_id, "gesture cancelled");
        result
    }
}

// ============================================================================
// Pointer API on the workspace
// ============================================================================

impl Workspace {
    /// Begin a pointer interaction. `hit` is the host's hit-test answer for
    /// `ev.pos`; `surface` says whether the press landed on the main canvas
    /// or the flyout palette.
    ///
    /// A secondary-button press short-circuits into a context-menu event and
    /// never becomes a gesture. A press while another gesture is active is
    /// ignored.
    pub fn pointer_down(
        &mut self,
        ev: PointerEvent,
        hit: HitTarget,
        surface: GestureSurface,
    ) -> WsResult<()> {
        if ev.button == PointerButton::Secondary {
            let target = match hit {
                HitTarget::Field { block, .. } => HitTarget::Block(block),
                other => other,
            };
            self.push_event(EventKind::ContextMenu { target });
            return Ok(());
        }
        if self.gesture.is_some() {
            trace!(pointer = ev.pointer_id, "pointer down ignored; gesture active");
            return Ok(());
        }
        let mut gesture = Gesture::new(ev, hit, surface);
        gesture.start()?;
        self.gesture = Some(gesture);
        Ok(())
    }

    /// Feed a pointer-move into the active gesture, if any.
    pub fn pointer_move(&mut self, ev: PointerEvent) -> WsResult<()> {
        let Some(mut gesture) = self.gesture.take() else {
            return Ok(());
        };
        match gesture.handle_move(self, ev) {
            Ok(()) => {
                self.gesture = Some(gesture);
                Ok(())
            }
            Err(err) => {
                self.abort_gesture(gesture, &err);
                Err(err)
            }
        }
    }

    /// Feed a pointer-up into the active gesture, if any. The gesture ends
    /// unless the up came from a different pointer.
    pub fn pointer_up(&mut self, ev: PointerEvent) -> WsResult<()> {
        let Some(mut gesture) = self.gesture.take() else {
            return Ok(());
        };
        match gesture.handle_up(self, ev) {
            Ok(()) => {
                if !gesture.phase().is_ended() {
                    self.gesture = Some(gesture);
                }
                Ok(())
            }
            Err(err) => {
                self.abort_gesture(gesture, &err);
                Err(err)
            }
        }
    }

    /// Host-initiated cancel (pointer capture lost, window blur). The active
    /// drag settles at its last observed position.
    pub fn pointer_cancel(&mut self) {
        self.cancel_active_gesture();
    }

    pub fn active_gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    /// End the active gesture at its last displacement, if one exists.
    pub fn cancel_active_gesture(&mut self) {
        if let Some(mut gesture) = self.gesture.take()
            && let Err(err) = gesture.cancel(self)
        {
            warn!(%err, "gesture cancel failed");
        }
    }

    fn abort_gesture(&mut self, mut gesture: Gesture, err: &ContractViolation) {
        warn!(%err, "gesture aborted");
        if let Err(cancel_err) = gesture.cancel(self) {
            warn!(%cancel_err, "abort cleanup failed");
        }
        self.push_event(EventKind::GestureAborted {
            reason: err.to_string(),
        });
    }
}
