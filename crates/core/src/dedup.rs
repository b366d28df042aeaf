//! Alert suppression keyed by (subject, category).
//!
//! Suppression is monotonic per key: once a key is emitted it stays
//! suppressed until an evaluation of the same subject no longer produces
//! that category ([`AlertDeduplicator::clear_resolved`]), the subject is
//! reset, or the process restarts. There is no time-based cooldown.
//!
//! The set is capped. When an insertion would exceed the cap, the oldest
//! half of the keys (by insertion order) is evicted. An evicted condition
//! that is still ongoing will alert once more on its next evaluation.

use std::collections::{HashSet, VecDeque};

use crate::alert::{AlertCategory, AlertKey, AlertKind};

/// Default number of keys retained before eviction.
pub const DEFAULT_CAPACITY: usize = 100;

/// Set of alert keys that have already been dispatched.
///
/// Not internally synchronized. Callers that share it across tasks wrap it
/// in a mutex and hold the lock across check-and-record.
#[derive(Debug)]
pub struct AlertDeduplicator {
    capacity: usize,
    /// Insertion order, oldest first.
    order: VecDeque<AlertKey>,
    active: HashSet<AlertKey>,
}

impl Default for AlertDeduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl AlertDeduplicator {
    /// Create an empty deduplicator. A capacity below 2 is raised to 2 so
    /// that evicting half always frees room.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            active: HashSet::with_capacity(capacity),
        }
    }

    /// Maximum number of keys held before eviction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of keys currently suppressed.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Whether `key` is currently suppressed.
    pub fn contains(&self, key: &AlertKey) -> bool {
        self.active.contains(key)
    }

    /// Returns `true` if `key` has not been emitted yet, recording it.
    pub fn should_emit(&mut self, key: &AlertKey) -> bool {
        if self.active.contains(key) {
            return false;
        }
        if self.active.len() >= self.capacity {
            self.evict_oldest_half();
        }
        self.active.insert(key.clone());
        self.order.push_back(key.clone());
        true
    }

    /// Forget keys of `kind` for `subject_id` whose category is not in
    /// `still_firing`. Returns how many keys were cleared.
    ///
    /// Call after every successful evaluation pass of a subject so that a
    /// condition that resolves and later recurs alerts again.
    pub fn clear_resolved(
        &mut self,
        subject_id: &str,
        kind: AlertKind,
        still_firing: &[AlertCategory],
    ) -> usize {
        self.remove_where(|key| {
            key.subject_id == subject_id
                && key.category.kind() == kind
                && !still_firing.contains(&key.category)
        })
    }

    /// Forget every key for a subject, e.g. when it leaves monitoring.
    pub fn reset(&mut self, subject_id: &str) -> usize {
        self.remove_where(|key| key.subject_id == subject_id)
    }

    fn remove_where(&mut self, predicate: impl Fn(&AlertKey) -> bool) -> usize {
        let before = self.active.len();
        self.active.retain(|key| !predicate(key));
        self.order.retain(|key| !predicate(key));
        before - self.active.len()
    }

    fn evict_oldest_half(&mut self) {
        let evict = self.capacity / 2;
        for key in self.order.drain(..evict.min(self.order.len())) {
            self.active.remove(&key);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
