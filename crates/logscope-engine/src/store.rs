use std::collections::VecDeque;

use logscope_types::LogEvent;

/// Size-bounded ordered store with FIFO eviction.
///
/// Owned and mutated exclusively by the single consumer context, so it
/// carries no locking of its own. Insertion order is preserved; when a
/// capacity is set, appending past it evicts the oldest entries from
/// the front until the invariant `len() <= capacity` holds again.
pub struct EventStore {
    entries: VecDeque<LogEvent>,

    /// Maximum entry count; 0 means unbounded (no eviction)
    capacity: usize,
}

/// Default maximum entry count.
pub const DEFAULT_CAPACITY: usize = 5000;

impl EventStore {
    /// Create a store with the given capacity (0 = unbounded).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
        }
    }

    /// Append an event, evicting from the front if over capacity.
    pub fn append(&mut self, event: LogEvent) {
        self.entries.push_back(event);
        self.evict_overflow();
    }

    /// Change the capacity, evicting immediately if the store is now
    /// over it.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.evict_overflow();
    }

    fn evict_overflow(&mut self) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Point-in-time ordered copy for export; later mutation of the
    /// store cannot affect it.
    pub fn snapshot(&self) -> Vec<LogEvent> {
        self.entries.iter().cloned().collect()
    }

    /// Iterate entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &LogEvent> {
        self.entries.iter()
    }

    /// Current entry count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current capacity (0 = unbounded).
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
