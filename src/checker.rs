//! Connection compatibility rules.
//!
//! A pure predicate layer: given two connections, decide whether they may
//! legally join. Nothing here mutates; an incompatible pair is an expected
//! outcome surfaced as a reason code, never an error. The search layer is
//! responsible for moving on to the next-best candidate.

use crate::error::Incompatibility;
use crate::types::{ConnectionId, Tracking};
use crate::workspace::Workspace;

/// Whether `a` and `b` may join. Convenience wrapper over [`check`].
pub fn can_connect(ws: &Workspace, a: ConnectionId, b: ConnectionId, is_drag: bool) -> bool {
    check(ws, a, b, is_drag).is_ok()
}

/// Evaluate the compatibility predicates in order, short-circuiting on the
/// first failure:
///
/// 1. kinds are complementary;
/// 2. an occupied side is only acceptable if its existing partner's block
///    can be displaced (is movable);
/// 3. the owners are distinct and neither is an ancestor of the other;
/// 4. the type-check tag lists intersect (or a side accepts anything);
/// 5. for drag connections: the pair is not already joined through the
///    connection being evaluated, and the target is not itself mid-drag.
pub fn check(
    ws: &Workspace,
    a: ConnectionId,
    b: ConnectionId,
    is_drag: bool,
) -> Result<(), Incompatibility> {
    // A vanished endpoint can never join anything.
    let (Some(ca), Some(cb)) = (ws.connection(a), ws.connection(b)) else {
        return Err(Incompatibility::WrongKind);
    };

    if ca.kind.opposite() != cb.kind {
        return Err(Incompatibility::WrongKind);
    }

    if is_drag && ca.partner == Some(b) {
        return Err(Incompatibility::AlreadyConnected);
    }

    // Replacing an existing partner is only legal when the displaced block
    // could actually be moved out of the way.
    for conn in [ca, cb] {
        if let Some(partner) = conn.partner
            && let Some(partner_conn) = ws.connection(partner)
            && ws
                .block(partner_conn.owner)
                .is_some_and(|blk| !blk.movable)
        {
            return Err(Incompatibility::WouldDisplaceImmovable);
        }
    }

    if ca.owner == cb.owner {
        return Err(Incompatibility::SelfConnection);
    }
    if ws.is_ancestor(ca.owner, cb.owner) || ws.is_ancestor(cb.owner, ca.owner) {
        return Err(Incompatibility::AncestorCycle);
    }

    if !ca.checks_intersect(cb) {
        return Err(Incompatibility::TypeMismatch);
    }

    // A target that is part of the stack being dragged was pulled out of the
    // index; reject direct probes against it too.
    if is_drag && cb.tracking == Tracking::Untracked {
        return Err(Incompatibility::TargetMidDrag);
    }

    Ok(())
}
