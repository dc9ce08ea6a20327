use logscope_types::{FilterPredicate, LogEvent};

use crate::store::EventStore;

/// Derived, recomputable view over the store.
///
/// The view is a pure function of store contents + predicate: it is
/// recomputed from scratch on every relevant change rather than
/// incrementally maintained. O(store size) per recompute, which is
/// acceptable because the store is capacity-bounded.
pub struct FilterView {
    predicate: FilterPredicate,
    matched: Vec<LogEvent>,
}

impl FilterView {
    /// Create a view with the given initial predicate. Empty until the
    /// first recompute.
    pub fn new(predicate: FilterPredicate) -> Self {
        Self {
            predicate,
            matched: Vec::new(),
        }
    }

    /// Recompute the view against the current store contents,
    /// preserving store order.
    pub fn recompute(&mut self, store: &EventStore) {
        self.matched = store
            .entries()
            .filter(|e| self.predicate.matches(e))
            .cloned()
            .collect();
    }

    /// Replace the predicate and recompute immediately, so predicate
    /// edits reflect without waiting for the next drain tick.
    pub fn set_predicate(&mut self, predicate: FilterPredicate, store: &EventStore) {
        self.predicate = predicate;
        self.recompute(store);
    }

    /// Entries matching the predicate, in store order.
    pub fn entries(&self) -> &[LogEvent] {
        &self.matched
    }

    /// Number of matching entries.
    pub fn matched(&self) -> usize {
        self.matched.len()
    }

    /// The active predicate.
    pub fn predicate(&self) -> &FilterPredicate {
        &self.predicate
    }
}

impl Default for FilterView {
    fn default() -> Self {
        Self::new(FilterPredicate::all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logscope_types::LogLevel;

    fn store_with(events: &[(LogLevel, &str)]) -> EventStore {
        let mut store = EventStore::new(0);
        for (level, msg) in events {
            store.append(LogEvent::new(*level, *msg));
        }
        store
    }

    fn view_messages(view: &FilterView) -> Vec<String> {
        view.entries().iter().map(|e| e.message.clone()).collect()
    }

    #[test]
    fn all_predicate_is_identity() {
        let store = store_with(&[
            (LogLevel::Trace, "a"),
            (LogLevel::Info, "b"),
            (LogLevel::Fatal, "c"),
        ]);
        let mut view = FilterView::default();
        view.recompute(&store);

        assert_eq!(view_messages(&view), ["a", "b", "c"]);
        assert_eq!(view.matched(), store.len());
    }

    #[test]
    fn recompute_is_idempotent() {
        let store = store_with(&[(LogLevel::Info, "a"), (LogLevel::Error, "b")]);
        let mut view = FilterView::new(FilterPredicate::all().with_min_level(LogLevel::Warn));

        view.recompute(&store);
        let first = view_messages(&view);
        view.recompute(&store);
        assert_eq!(view_messages(&view), first);
    }

    #[test]
    fn warn_threshold_scenario() {
        let store = store_with(&[
            (LogLevel::Info, "a"),
            (LogLevel::Warn, "b"),
            (LogLevel::Error, "c"),
        ]);
        let mut view = FilterView::new(FilterPredicate::all().with_min_level(LogLevel::Warn));
        view.recompute(&store);

        assert_eq!(view_messages(&view), ["b", "c"]);
    }

    #[test]
    fn search_matches_message_and_source_case_insensitively() {
        let mut store = EventStore::new(0);
        store.append(LogEvent::new(LogLevel::Info, "Disk Full").with_source("monitor"));
        store.append(LogEvent::new(LogLevel::Info, "all good").with_source("DiskWatcher"));
        store.append(LogEvent::new(LogLevel::Info, "unrelated").with_source("net"));

        let mut view = FilterView::new(FilterPredicate::all().with_search("disk"));
        view.recompute(&store);

        assert_eq!(view_messages(&view), ["Disk Full", "all good"]);
    }

    #[test]
    fn view_follows_store_after_eviction() {
        let mut store = EventStore::new(2);
        let mut view = FilterView::default();
        for msg in ["a", "b", "c"] {
            store.append(LogEvent::new(LogLevel::Info, msg));
        }
        view.recompute(&store);

        // Evicted entries never linger in the view
        assert_eq!(view_messages(&view), ["b", "c"]);
    }

    #[test]
    fn predicate_change_recomputes_against_current_store() {
        let store = store_with(&[(LogLevel::Info, "keep me"), (LogLevel::Info, "other")]);
        let mut view = FilterView::default();
        view.recompute(&store);
        assert_eq!(view.matched(), 2);

        view.set_predicate(FilterPredicate::all().with_search("keep"), &store);
        assert_eq!(view_messages(&view), ["keep me"]);
    }
}
