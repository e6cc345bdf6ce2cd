//! Bounded LIFO stack with "keep the newest half" eviction.

use std::collections::VecDeque;

/// A LIFO stack that never holds more than `capacity` entries.
///
/// Entries are stored oldest-first in a `VecDeque` so eviction from the old end
/// is cheap. When a push takes the stack over capacity, [`evict_oldest_half`]
/// drops the oldest entries and keeps only the newest `capacity / 2` (at least
/// one).
///
/// [`evict_oldest_half`]: BoundedStack::evict_oldest_half
#[derive(Debug, Clone)]
pub struct BoundedStack<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedStack<T> {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Push onto the top, returning whatever was evicted (oldest first).
    pub fn push(&mut self, item: T) -> Vec<T> {
        self.items.push_back(item);
        if self.items.len() > self.capacity {
            self.evict_oldest_half()
        } else {
            Vec::new()
        }
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_back()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.back()
    }

    /// Iterate from the most recent entry to the oldest.
    pub fn iter_recent_first(&self) -> impl Iterator<Item = &T> {
        self.items.iter().rev()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Drop the oldest entries so that only the newest `capacity / 2` remain.
    pub fn evict_oldest_half(&mut self) -> Vec<T> {
        let keep = (self.capacity / 2).max(1);
        let drop = self.items.len().saturating_sub(keep);
        self.items.drain(..drop).collect()
    }
}
