//! Deferred round actions against the session clock
//!
//! Timers are plain data: an action and the session time it becomes due. The
//! controller drains due actions at the start of every tick and re-checks its
//! own guards before acting, so a stale action is harmless.

use serde::{Deserialize, Serialize};

/// Something the controller wants to do later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundAction {
    /// Enter AwaitingSpawn and drop the next fruit
    SpawnFruit,
    /// Release the predators for the given round
    SpawnPursuers { round: u32 },
    /// Hand the final score to the session/UI collaborator
    ReportFinalScore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Pending {
    due_ms: f64,
    seq: u64,
    action: RoundAction,
}

/// Ordered set of pending actions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    pending: Vec<Pending>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: f64, action: RoundAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending { due_ms, seq, action });
    }

    /// Remove and return every action due at `now_ms`, earliest first
    /// (ties broken by scheduling order)
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<RoundAction> {
        let (mut due, rest): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|p| p.due_ms <= now_ms);
        self.pending = rest;
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|p| p.action).collect()
    }

    /// Drop every pending action
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether an equal action is already waiting
    pub fn contains(&self, action: RoundAction) -> bool {
        self.pending.iter().any(|p| p.action == action)
    }
}
