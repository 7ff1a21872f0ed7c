//! Ring Buffer Implementation

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Default buffer capacity (100 most recent entries)
pub const DEFAULT_CAPACITY: usize = 100;

/// Bounded FIFO ring buffer
///
/// Holds at most `capacity` entries. `push` on a full buffer evicts the
/// oldest entry under the same lock, so the bound holds with any number of
/// concurrent writers.
pub struct RingBuffer<T> {
    /// Entries, oldest at the front
    storage: Mutex<VecDeque<T>>,
    /// Capacity of the buffer
    capacity: usize,
    /// Total entries ever written (for statistics)
    total_written: AtomicUsize,
}

impl<T> RingBuffer<T> {
    /// Create a new ring buffer with given capacity (at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            storage: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            total_written: AtomicUsize::new(0),
        }
    }

    /// Create a buffer with default capacity (100 entries)
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    // Entries are plain values; a panicking writer cannot leave them torn.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.storage.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Push an entry, returning the evicted oldest entry if the buffer was full
    pub fn push(&self, item: T) -> Option<T> {
        let mut storage = self.lock();
        let evicted = if storage.len() >= self.capacity {
            storage.pop_front()
        } else {
            None
        };
        storage.push_back(item);
        self.total_written.fetch_add(1, Ordering::Relaxed);
        evicted
    }

    /// Get the number of entries currently in the buffer
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get total entries written (for statistics)
    pub fn total_written(&self) -> usize {
        self.total_written.load(Ordering::Relaxed)
    }

    /// Clear the buffer
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Run a closure over the current entries (oldest first) under the lock
    pub fn with_entries<R>(&self, f: impl FnOnce(&VecDeque<T>) -> R) -> R {
        f(&self.lock())
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copy of every entry, oldest first
    pub fn snapshot(&self) -> Vec<T> {
        self.lock().iter().cloned().collect()
    }
}

impl<T> Default for RingBuffer<T> {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl<T> std::fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("total_written", &self.total_written())
            .finish()
    }
}
