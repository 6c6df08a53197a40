//! Bounded, newest-first list of past calculations.

use std::collections::VecDeque;

use serde::Serialize;

/// Number of entries kept when no capacity is given.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Rolling history that keeps the most recent `capacity` entries.
///
/// New entries go to the front; the oldest entry falls off the back once
/// the list is full. Entries are not deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct History<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(
        &mut self,
        entry: T,
    ) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&T> {
        self.entries.front()
    }

    /// Entries from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}
