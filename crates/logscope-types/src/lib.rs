//! Shared types for logscope
//!
//! This crate contains the data model used across the logscope crates:
//! log events, severity levels, and the filter predicate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Log severity level, ordered from least to most severe.
///
/// The derived `Ord` gives the ordinal comparison used by level
/// threshold filtering: `Trace < Debug < Info < Warn < Error < Fatal`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    /// Parse a level token from common formats.
    ///
    /// Matching is case-insensitive; unrecognized tokens map to `Info`.
    pub fn from_token(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "TRACE" => Self::Trace,
            "DEBUG" => Self::Debug,
            "INFO" => Self::Info,
            "WARN" | "WARNING" => Self::Warn,
            "ERROR" => Self::Error,
            "FATAL" => Self::Fatal,
            _ => Self::Info,
        }
    }

    /// Canonical uppercase token, as written by the plain-text export.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single log event flowing through the pipeline.
///
/// Events are immutable once constructed; the store and the filter view
/// only ever clone or drop them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogEvent {
    /// When the event was produced (millisecond precision preserved)
    pub timestamp: DateTime<Utc>,

    /// Detected or declared severity
    pub level: LogLevel,

    /// Message text
    pub message: String,

    /// Logger or subsystem name ("Unknown" when the producer gives none)
    pub source: String,

    /// Originating file name, empty unless produced by bulk import
    pub origin_file: String,
}

impl LogEvent {
    /// Create an event timestamped now, with source "Unknown".
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            source: "Unknown".to_string(),
            origin_file: String::new(),
        }
    }

    /// Set the source name.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set an explicit timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Tag the event with the file it was imported from.
    pub fn with_origin_file(mut self, file: impl Into<String>) -> Self {
        self.origin_file = file.into();
        self
    }
}

/// The current level-threshold + substring filter.
///
/// `min_level: None` means "All" (every level passes). The search text
/// matches case-insensitively against both message and source; an empty
/// search matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterPredicate {
    /// Minimum level to include (None = all levels)
    pub min_level: Option<LogLevel>,

    /// Case-insensitive substring filter (empty = no text filter)
    pub search: String,
}

impl FilterPredicate {
    /// Predicate that accepts every event.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to events at or above the given level.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = Some(level);
        self
    }

    /// Set the substring filter.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Check whether an event passes this predicate.
    pub fn matches(&self, event: &LogEvent) -> bool {
        let level_match = match self.min_level {
            None => true,
            Some(min) => event.level >= min,
        };
        if !level_match {
            return false;
        }

        if self.search.is_empty() {
            return true;
        }

        let needle = self.search.to_lowercase();
        event.message.to_lowercase().contains(&needle)
            || event.source.to_lowercase().contains(&needle)
    }
}
