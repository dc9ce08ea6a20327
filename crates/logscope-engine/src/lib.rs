//! Log ingestion pipeline for logscope
//!
//! This crate provides the core pipeline: a thread-safe ingestion
//! queue fed by any number of producers, a periodic batch drain onto a
//! size-bounded ordered store with FIFO eviction, and a continuously
//! recomputed filter view over that store.

mod error;
mod pipeline;
mod queue;
mod scheduler;
mod store;
mod view;

pub use error::EngineError;
pub use pipeline::{DisplaySummary, LogPipeline, PipelineConfig};
pub use queue::{IngestQueue, LogSink};
pub use scheduler::{PipelineEvent, PipelineHandle, PipelineRunner};
pub use store::EventStore;
pub use view::FilterView;

// Re-export types used in our public API
pub use logscope_types::{FilterPredicate, LogEvent, LogLevel};
