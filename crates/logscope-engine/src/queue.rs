use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use logscope_types::LogEvent;

/// Thread-safe FIFO buffer between producers and the drain scheduler.
///
/// Any number of threads may submit concurrently; exactly one consumer
/// context (the pipeline runner) drains. Both operations take the same
/// mutex, with critical sections kept to O(1) for submit and O(batch)
/// for drain so producers are never blocked for long.
#[derive(Clone)]
pub struct IngestQueue {
    pending: Arc<Mutex<VecDeque<LogEvent>>>,

    /// When set, submissions are dropped at the producer boundary
    /// before they ever enter the queue.
    paused: Arc<AtomicBool>,
}

impl IngestQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(VecDeque::new())),
            paused: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Submit an event from any thread.
    ///
    /// A no-op while ingestion is paused: the event is dropped, not
    /// buffered, so it can never appear in the store retroactively.
    pub fn submit(&self, event: LogEvent) {
        if self.paused.load(Ordering::Acquire) {
            return;
        }
        self.pending.lock().push_back(event);
    }

    /// Atomically remove and return at most `n` oldest events in FIFO
    /// order. Returns an empty Vec when the queue is empty.
    ///
    /// Only the single designated consumer may call this; concurrent
    /// drainers would break the ordering contract.
    pub fn drain_up_to(&self, n: usize) -> Vec<LogEvent> {
        let mut pending = self.pending.lock();
        let count = n.min(pending.len());
        pending.drain(..count).collect()
    }

    /// Discard all pending events.
    pub fn clear(&self) {
        self.pending.lock().clear();
    }

    /// Stop accepting new submissions.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume accepting submissions.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
    }

    /// Whether ingestion is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

impl Default for IngestQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer-facing submit handle.
///
/// The ingestion side of the queue, handed to log sources explicitly
/// instead of being registered through any global logger state. Cheap
/// to clone; one per producer.
#[derive(Clone)]
pub struct LogSink {
    queue: IngestQueue,
}

impl LogSink {
    pub(crate) fn new(queue: IngestQueue) -> Self {
        Self { queue }
    }

    /// Submit an event, fire-and-forget. Dropped silently while the
    /// pipeline is paused.
    pub fn submit(&self, event: LogEvent) {
        self.queue.submit(event);
    }
}
