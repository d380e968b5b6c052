// src/scheduler.rs
//! Pending scripted-turn timers. Time is whatever millisecond clock the caller
//! passes in; nothing here sleeps or spawns.

use std::collections::BTreeMap;

use log::debug;

/// Identifies the committed state a timer was scheduled for. `generation`
/// changes on every reset, `version` on every accepted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TurnKey {
    pub generation: u32,
    pub version: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub key: TurnKey,
    pub seat: u8,
    pub due_ms: u64,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    pending: BTreeMap<TurnKey, Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// One timer per key; a second schedule for the same key is ignored.
    pub fn schedule(&mut self, key: TurnKey, seat: u8, due_ms: u64) -> bool {
        if self.pending.contains_key(&key) {
            return false;
        }
        debug!("timer {:?} scheduled for seat {} at {}ms", key, seat, due_ms);
        self.pending.insert(key, Timer { key, seat, due_ms });
        true
    }

    pub fn cancel(&mut self, key: TurnKey) -> Option<Timer> {
        let timer = self.pending.remove(&key);
        if timer.is_some() {
            debug!("timer {:?} cancelled", key);
        }
        timer
    }

    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        if n > 0 {
            debug!("cancelling {} pending timer(s)", n);
        }
        self.pending.clear();
        n
    }

    /// Removes and returns the earliest timer due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Timer> {
        let key = self
            .pending
            .values()
            .filter(|t| t.due_ms <= now_ms)
            .min_by_key(|t| (t.due_ms, t.key))?
            .key;
        self.pending.remove(&key)
    }

    pub fn next_due(&self) -> Option<u64> {
        self.pending.values().map(|t| t.due_ms).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
