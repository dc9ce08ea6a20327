//! Log file parsing and bulk import for logscope
//!
//! This crate converts raw text lines into log events through an
//! ordered-fallback parser, and feeds whole files or folders into the
//! engine's ingestion queue.

mod error;
mod import;
mod parser;

pub use error::ImportError;
pub use import::{BulkImporter, DEFAULT_EXTENSIONS, ImportProgress};
pub use parser::LineParser;

// Re-export types used in our public API
pub use logscope_types::{LogEvent, LogLevel};
