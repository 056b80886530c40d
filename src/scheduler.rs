//! Deferred-work queue.
//!
//! The interaction model is single-threaded and event-driven; "later" only
//! happens when the host's main loop advances time. Instead of timers, work
//! that must not run inside the current event (bump nudges, staggered
//! disposal) is queued here as a closed [`Task`] enum carrying ids only.
//! When a task finally runs, the workspace re-checks by id that its targets
//! still exist; a task outliving its target is expected and becomes a
//! no-op, never a dangling-reference bug.

use crate::types::{BlockId, ConnectionId, GroupId};

/// A unit of deferred work. Tasks hold ids, never references; liveness is
/// re-established at run time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Nudge `block` away from the obstructing connection `away_from`.
    /// Attributed to the event group of the disconnect that caused it.
    BumpBlock {
        block: BlockId,
        away_from: ConnectionId,
        group: Option<GroupId>,
    },
    /// Dispose one block of a staggered batch.
    DisposeBlock { block: BlockId },
}

#[derive(Debug, Clone)]
struct Scheduled {
    due_ms: u64,
    /// Submission order; keeps equal-deadline tasks FIFO.
    seq: u64,
    task: Task,
}

/// Monotonic task queue drained by `Workspace::advance_time`.
#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_seq: u64,
    queue: Vec<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scheduler time, advanced only by [`Scheduler::advance`].
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queue `task` to run `delay_ms` from now.
    pub fn schedule_in(&mut self, delay_ms: u64, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled {
            due_ms: self.now_ms + delay_ms,
            seq,
            task,
        });
    }

    /// Advance time and remove every task that became due, in (deadline,
    /// submission) order. The caller executes them; execution may schedule
    /// further tasks, which is why draining and running are separate steps.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<Task> {
        self.now_ms += elapsed_ms;
        let now = self.now_ms;

        let mut due: Vec<Scheduled> = Vec::new();
        self.queue.retain(|s| {
            if s.due_ms <= now {
                due.push(s.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|s| (s.due_ms, s.seq));
        due.into_iter().map(|s| s.task).collect()
    }

    /// Drop every queued task that targets `block`. Used when a block is
    /// disposed synchronously so its deferred work never fires.
    pub fn cancel_for_block(&mut self, block: BlockId) {
        self.queue.retain(|s| match &s.task {
            Task::BumpBlock { block: b, .. } | Task::DisposeBlock { block: b } => *b != block,
        });
    }
}
