use tracing::debug;

use logscope_types::{FilterPredicate, LogEvent};

use crate::queue::{IngestQueue, LogSink};
use crate::store::{DEFAULT_CAPACITY, EventStore};
use crate::view::FilterView;

/// Pipeline tuning knobs.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Maximum stored entries (0 = unbounded)
    pub capacity: usize,

    /// Maximum events applied to the store per drain tick
    pub batch_size: usize,

    /// Initial filter predicate
    pub predicate: FilterPredicate,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            batch_size: 100,
            predicate: FilterPredicate::all(),
        }
    }
}

/// Display counters refreshed after each non-empty drain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplaySummary {
    /// Entries currently stored
    pub total: usize,

    /// Entries matching the active predicate
    pub matched: usize,

    /// Events applied by the most recent non-empty drain
    pub last_drained: usize,
}

/// The single-consumer pipeline state: queue handle, bounded store,
/// and filter view.
///
/// All mutation goes through `&mut self`, so exactly one execution
/// context can drive it; only the queue inside is shared with
/// producers. The async shell around this lives in the scheduler
/// module.
pub struct LogPipeline {
    queue: IngestQueue,
    store: EventStore,
    view: FilterView,
    batch_size: usize,
    summary: DisplaySummary,
}

impl LogPipeline {
    /// Build a pipeline from its configuration.
    pub fn new(config: PipelineConfig) -> Self {
        let store = EventStore::new(config.capacity);
        let mut view = FilterView::new(config.predicate);
        view.recompute(&store);

        Self {
            queue: IngestQueue::new(),
            store,
            view,
            batch_size: config.batch_size.max(1),
            summary: DisplaySummary::default(),
        }
    }

    /// Producer handle for submitting events from any thread.
    pub fn sink(&self) -> LogSink {
        LogSink::new(self.queue.clone())
    }

    /// One drain cycle: pull a bounded batch off the queue, apply it
    /// to the store in order, and recompute the view.
    ///
    /// Returns the number of events applied. An empty queue costs
    /// nothing: no store mutation and no recompute.
    pub fn tick(&mut self) -> usize {
        let batch = self.queue.drain_up_to(self.batch_size);
        if batch.is_empty() {
            return 0;
        }

        let drained = batch.len();
        for event in batch {
            self.store.append(event);
        }
        self.view.recompute(&self.store);
        self.summary = DisplaySummary {
            total: self.store.len(),
            matched: self.view.matched(),
            last_drained: drained,
        };
        debug!(drained, total = self.store.len(), "drained batch");
        drained
    }

    /// Replace the filter predicate; the view updates immediately.
    pub fn set_predicate(&mut self, predicate: FilterPredicate) {
        self.view.set_predicate(predicate, &self.store);
        self.refresh_summary();
    }

    /// Change the store capacity; shrinking evicts oldest entries now,
    /// which can change the view.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.store.set_capacity(capacity);
        self.view.recompute(&self.store);
        self.refresh_summary();
    }

    /// Stop accepting new submissions. Already-queued and stored
    /// entries are untouched.
    pub fn pause(&mut self) {
        self.queue.pause();
    }

    /// Resume accepting submissions.
    pub fn resume(&mut self) {
        self.queue.resume();
    }

    /// Whether ingestion is paused.
    pub fn is_paused(&self) -> bool {
        self.queue.is_paused()
    }

    /// Drop everything: stored entries and any events still pending in
    /// the queue, so nothing stale reappears on the next tick.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.store.clear();
        self.view.recompute(&self.store);
        self.summary = DisplaySummary::default();
    }

    /// Entries matching the active predicate, in store order.
    pub fn current_view(&self) -> &[LogEvent] {
        self.view.entries()
    }

    /// Total stored entries.
    pub fn count(&self) -> usize {
        self.store.len()
    }

    /// Point-in-time ordered copy of the full store, for export.
    pub fn snapshot(&self) -> Vec<LogEvent> {
        self.store.snapshot()
    }

    /// Current display counters.
    pub fn summary(&self) -> DisplaySummary {
        self.summary
    }

    /// Events waiting in the ingestion queue.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn refresh_summary(&mut self) {
        self.summary.total = self.store.len();
        self.summary.matched = self.view.matched();
    }
}

impl Default for LogPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logscope_types::LogLevel;

    fn event(msg: &str) -> LogEvent {
        LogEvent::new(LogLevel::Info, msg)
    }

    fn config(capacity: usize, batch_size: usize) -> PipelineConfig {
        PipelineConfig {
            capacity,
            batch_size,
            predicate: FilterPredicate::all(),
        }
    }

    #[test]
    fn tick_applies_queued_events_in_order() {
        let mut pipeline = LogPipeline::new(config(100, 100));
        let sink = pipeline.sink();
        for msg in ["a", "b", "c"] {
            sink.submit(event(msg));
        }

        assert_eq!(pipeline.tick(), 3);
        let messages: Vec<_> = pipeline.current_view().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["a", "b", "c"]);
        assert_eq!(pipeline.summary().last_drained, 3);
    }

    #[test]
    fn tick_is_bounded_by_batch_size() {
        let mut pipeline = LogPipeline::new(config(0, 10));
        let sink = pipeline.sink();
        for i in 0..25 {
            sink.submit(event(&format!("m{i}")));
        }

        assert_eq!(pipeline.tick(), 10);
        assert_eq!(pipeline.count(), 10);
        assert_eq!(pipeline.tick(), 10);
        assert_eq!(pipeline.tick(), 5);
        assert_eq!(pipeline.tick(), 0);
        assert_eq!(pipeline.count(), 25);
    }

    #[test]
    fn empty_tick_does_nothing() {
        let mut pipeline = LogPipeline::new(config(100, 100));
        assert_eq!(pipeline.tick(), 0);
        assert_eq!(pipeline.count(), 0);
        assert_eq!(pipeline.summary(), DisplaySummary::default());
    }

    #[test]
    fn paused_submissions_never_reach_the_store() {
        let mut pipeline = LogPipeline::new(config(100, 100));
        let sink = pipeline.sink();

        pipeline.pause();
        sink.submit(event("dropped"));
        pipeline.resume();
        assert_eq!(pipeline.tick(), 0);
        assert_eq!(pipeline.count(), 0);

        sink.submit(event("kept"));
        assert_eq!(pipeline.tick(), 1);
        assert_eq!(pipeline.count(), 1);
    }

    #[test]
    fn clear_drops_pending_and_stored() {
        let mut pipeline = LogPipeline::new(config(100, 100));
        let sink = pipeline.sink();
        for i in 0..10 {
            sink.submit(event(&format!("stored{i}")));
        }
        pipeline.tick();
        for i in 0..5 {
            sink.submit(event(&format!("pending{i}")));
        }

        pipeline.clear();
        assert_eq!(pipeline.count(), 0);
        assert_eq!(pipeline.pending(), 0);
        assert_eq!(pipeline.tick(), 0);
        assert!(pipeline.current_view().is_empty());
    }

    #[test]
    fn predicate_change_updates_view_without_tick() {
        let mut pipeline = LogPipeline::new(config(100, 100));
        let sink = pipeline.sink();
        sink.submit(LogEvent::new(LogLevel::Info, "info"));
        sink.submit(LogEvent::new(LogLevel::Error, "boom"));
        pipeline.tick();

        pipeline.set_predicate(FilterPredicate::all().with_min_level(LogLevel::Error));
        let messages: Vec<_> = pipeline.current_view().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["boom"]);
        assert_eq!(pipeline.summary().matched, 1);
        assert_eq!(pipeline.summary().total, 2);
    }

    #[test]
    fn shrinking_capacity_reflects_in_view() {
        let mut pipeline = LogPipeline::new(config(10, 100));
        let sink = pipeline.sink();
        for i in 0..10 {
            sink.submit(event(&format!("m{i}")));
        }
        pipeline.tick();

        pipeline.set_capacity(3);
        let messages: Vec<_> = pipeline.current_view().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["m7", "m8", "m9"]);
    }

    #[test]
    fn eviction_during_tick_respects_capacity() {
        let mut pipeline = LogPipeline::new(config(3, 100));
        let sink = pipeline.sink();
        for msg in ["A", "B", "C", "D", "E"] {
            sink.submit(event(msg));
        }
        pipeline.tick();

        let messages: Vec<_> = pipeline.current_view().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["C", "D", "E"]);
        assert_eq!(pipeline.count(), 3);
    }

    #[test]
    fn snapshot_ignores_active_filter() {
        let mut pipeline = LogPipeline::new(PipelineConfig {
            capacity: 100,
            batch_size: 100,
            predicate: FilterPredicate::all().with_min_level(LogLevel::Error),
        });
        let sink = pipeline.sink();
        sink.submit(LogEvent::new(LogLevel::Info, "hidden"));
        sink.submit(LogEvent::new(LogLevel::Error, "shown"));
        pipeline.tick();

        assert_eq!(pipeline.current_view().len(), 1);
        assert_eq!(pipeline.snapshot().len(), 2);
    }
}
