// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Timer Queue
//!
//! An ordered set of pending entries keyed by deadline. Entries with equal
//! deadlines keep their insertion order. Each entry is identified by a
//! caller-supplied id so it can be removed without knowing its deadline.
//!
//! # Design
//!
//! - **Ordered map**: `(expires, seq)` keys in a `BTreeMap`; the first key
//!   is the next entry to expire
//! - **Id index**: id to key lookup for removal
//! - **Sequence numbers**: strictly increasing per insertion, used for
//!   tie-breaking and for bounding a single expiry pass
//!
//! The queue itself is not synchronized; the owner keeps it behind a lock.

use alloc::collections::BTreeMap;

use crate::ktime::Ktime;

/// Position of an entry in the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueueKey {
    /// Deadline (compared first)
    pub expires: Ktime,

    /// Insertion sequence (for tie-breaking)
    pub seq: u64,
}

/// Deadline-ordered queue
pub struct TimerQueue<T> {
    entries: BTreeMap<QueueKey, (u64, T)>,
    index: BTreeMap<u64, QueueKey>,
    next_seq: u64,
}

impl<T> TimerQueue<T> {
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            index: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Insert `value` under `id` at `expires`
    ///
    /// An entry already queued under `id` is replaced and moves to its new
    /// position.
    pub fn add(&mut self, id: u64, expires: Ktime, value: T) -> QueueKey {
        self.del(id);

        let key = QueueKey {
            expires,
            seq: self.next_seq,
        };
        self.next_seq += 1;

        self.entries.insert(key, (id, value));
        self.index.insert(id, key);
        key
    }

    /// Remove the entry queued under `id`
    pub fn del(&mut self, id: u64) -> Option<T> {
        let key = self.index.remove(&id)?;
        self.entries.remove(&key).map(|(_, value)| value)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.index.contains_key(&id)
    }

    /// Key of the entry queued under `id`
    pub fn key_of(&self, id: u64) -> Option<QueueKey> {
        self.index.get(&id).copied()
    }

    /// Earliest entry, without removing it
    pub fn getnext(&self) -> Option<(QueueKey, &T)> {
        self.entries
            .first_key_value()
            .map(|(key, (_, value))| (*key, value))
    }

    /// Sequence number the next insertion will receive
    ///
    /// Entries with a smaller sequence were queued before this call.
    pub fn horizon(&self) -> u64 {
        self.next_seq
    }

    /// Remove and return the earliest entry if it expires at or before
    /// `now` and was queued before `horizon`
    pub fn pop_expired(&mut self, now: Ktime, horizon: u64) -> Option<T> {
        let (key, _) = self.entries.first_key_value()?;
        if key.expires > now {
            return None;
        }

        // Entries queued during this pass wait for the next expiry.
        let key = match self.entries.iter().find(|(key, _)| key.seq < horizon) {
            Some((key, _)) if key.expires <= now => *key,
            _ => return None,
        };

        let (id, value) = self.entries.remove(&key)?;
        self.index.remove(&id);
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in expiry order
    pub fn iter(&self) -> impl Iterator<Item = (QueueKey, &T)> {
        self.entries.iter().map(|(key, (_, value))| (*key, value))
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn t(ns: i64) -> Ktime {
        Ktime::from_ns(ns)
    }

    #[test]
    fn test_ordering() {
        let mut queue = TimerQueue::new();
        queue.add(1, t(300), "c");
        queue.add(2, t(100), "a");
        queue.add(3, t(200), "b");

        let order: Vec<_> = queue.iter().map(|(_, v)| *v).collect();
        assert_eq!(order, ["a", "b", "c"]);
        assert_eq!(queue.getnext().map(|(k, _)| k.expires), Some(t(100)));
    }

    #[test]
    fn test_equal_deadlines_keep_insertion_order() {
        let mut queue = TimerQueue::new();
        queue.add(10, t(100), 10);
        queue.add(11, t(100), 11);
        queue.add(12, t(100), 12);

        let order: Vec<_> = queue.iter().map(|(_, v)| *v).collect();
        assert_eq!(order, [10, 11, 12]);
    }

    #[test]
    fn test_readd_moves_entry() {
        let mut queue = TimerQueue::new();
        queue.add(1, t(100), 1);
        queue.add(2, t(200), 2);
        queue.add(1, t(300), 1);

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.getnext().map(|(_, v)| *v), Some(2));
        assert_eq!(queue.key_of(1).map(|k| k.expires), Some(t(300)));
    }

    #[test]
    fn test_del() {
        let mut queue = TimerQueue::new();
        queue.add(1, t(100), 1);
        assert_eq!(queue.del(1), Some(1));
        assert_eq!(queue.del(1), None);
        assert!(!queue.contains(1));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_pop_expired() {
        let mut queue = TimerQueue::new();
        queue.add(1, t(100), 1);
        queue.add(2, t(150), 2);
        queue.add(3, t(300), 3);

        let horizon = queue.horizon();
        assert_eq!(queue.pop_expired(t(200), horizon), Some(1));
        assert_eq!(queue.pop_expired(t(200), horizon), Some(2));
        assert_eq!(queue.pop_expired(t(200), horizon), None);
        assert_eq!(queue.len(), 1);
        assert!(!queue.contains(1));
    }

    #[test]
    fn test_pop_expired_respects_horizon() {
        let mut queue = TimerQueue::new();
        queue.add(1, t(100), 1);
        let horizon = queue.horizon();

        assert_eq!(queue.pop_expired(t(100), horizon), Some(1));
        // Re-queued in the past during the same pass.
        queue.add(1, t(50), 1);
        assert_eq!(queue.pop_expired(t(100), horizon), None);
        assert_eq!(queue.pop_expired(t(100), queue.horizon()), Some(1));
    }
}
