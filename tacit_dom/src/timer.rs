// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic timer queue driven by host timestamps.
//!
//! Behaviors never sleep or spawn. When they need to act later they schedule a
//! payload here, and the host drives time forward by calling the behavior's
//! `advance(now, ..)`, which drains due entries with [`Timers::pop_due`].
//!
//! ```
//! use tacit_dom::Timers;
//!
//! let mut timers: Timers<&str> = Timers::new();
//! let a = timers.schedule(1000, 50, "settle");
//! timers.schedule(1000, 10, "arm");
//!
//! assert_eq!(timers.next_due(), Some(1010));
//! assert_eq!(timers.pop_due(1100), Some((1010, "arm")));
//! assert!(timers.cancel(a));
//! assert_eq!(timers.pop_due(1100), None);
//! ```

use alloc::vec::Vec;

/// Identifier of a scheduled timer, unique within its [`Timers`] queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct Entry<T> {
    id: TimerId,
    due: u64,
    payload: T,
}

/// Pending timers ordered by due time, then by scheduling order.
#[derive(Clone, Debug)]
pub struct Timers<T> {
    next_id: u64,
    // Sorted by (due, id).
    entries: Vec<Entry<T>>,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Timers<T> {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Schedule `payload` to fire `delay` milliseconds after `now`.
    pub fn schedule(&mut self, now: u64, delay: u64, payload: T) -> TimerId {
        self.schedule_at(now.saturating_add(delay), payload)
    }

    /// Schedule `payload` to fire at the absolute time `due`.
    pub fn schedule_at(&mut self, due: u64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        // Entries with equal due time keep scheduling order.
        let pos = self.entries.partition_point(|e| e.due <= due);
        self.entries.insert(pos, Entry { id, due, payload });
        id
    }

    /// Cancel a timer. Returns `false` if it already fired or was canceled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Whether `id` is still pending.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Cancel everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Due time of the earliest pending timer.
    pub fn next_due(&self) -> Option<u64> {
        self.entries.first().map(|e| e.due)
    }

    /// Remove and return the earliest timer due at or before `now`, with its due time.
    pub fn pop_due(&mut self, now: u64) -> Option<(u64, T)> {
        if self.entries.first()?.due > now {
            return None;
        }
        let entry = self.entries.remove(0);
        Some((entry.due, entry.payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_due_times_fire_in_scheduling_order() {
        let mut timers = Timers::new();
        timers.schedule(0, 5, 'a');
        timers.schedule(0, 5, 'b');
        timers.schedule(0, 1, 'c');
        let mut fired = Vec::new();
        while let Some((_, p)) = timers.pop_due(10) {
            fired.push(p);
        }
        assert_eq!(fired, ['c', 'a', 'b']);
    }

    #[test]
    fn nothing_fires_early() {
        let mut timers = Timers::new();
        let id = timers.schedule(100, 0, ());
        assert_eq!(timers.pop_due(99), None);
        assert!(timers.is_pending(id));
        assert_eq!(timers.pop_due(100), Some((100, ())));
        assert!(!timers.is_pending(id));
        assert!(!timers.cancel(id));
    }

    #[test]
    fn clear_drops_everything() {
        let mut timers = Timers::new();
        timers.schedule(0, 1, 1);
        timers.schedule(0, 2, 2);
        assert_eq!(timers.len(), 2);
        timers.clear();
        assert!(timers.is_empty());
        assert_eq!(timers.next_due(), None);
    }
}
