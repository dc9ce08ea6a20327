use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

use logscope_types::{LogEvent, LogLevel};

/// Timestamp layout shared by both recognized line formats.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Ordered-fallback parser for raw log lines.
///
/// Patterns are tried in sequence; the first that matches wins, and
/// exhaustion reaches a generic fallback. A line is therefore never
/// rejected outright:
///
/// 1. `[2023-01-01 12:00:00.000] [INFO] message [Source]` (source
///    optional)
/// 2. `2023-01-01 12:00:00.000 INFO message`
/// 3. the entire line as an Info message timestamped now
pub struct LineParser {
    bracketed: Regex,
    bare: Regex,
}

impl LineParser {
    /// Compile the line patterns.
    pub fn new() -> Self {
        Self {
            bracketed: Regex::new(
                r"^\[(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d{3})\]\s*\[([A-Za-z]+)\]\s*(.+?)(?:\s*\[([^\]]+)\])?$",
            )
            .expect("bracketed pattern is valid"),
            bare: Regex::new(
                r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d{3})\s+([A-Za-z]+)\s+(.+)$",
            )
            .expect("bare pattern is valid"),
        }
    }

    /// Parse one raw line into a log event tagged with its provenance
    /// label (the originating file name).
    ///
    /// Returns `None` only for blank or whitespace-only lines.
    pub fn parse(&self, line: &str, origin_file: &str) -> Option<LogEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let event = self
            .parse_bracketed(line)
            .or_else(|| self.parse_bare(line))
            .unwrap_or_else(|| {
                // Unknown format: keep the whole line as the message
                LogEvent::new(LogLevel::Info, line).with_source("File")
            });

        Some(event.with_origin_file(origin_file))
    }

    fn parse_bracketed(&self, line: &str) -> Option<LogEvent> {
        let caps = self.bracketed.captures(line)?;
        let timestamp = parse_timestamp(&caps[1])?;
        let level = LogLevel::from_token(&caps[2]);
        let message = caps[3].to_string();
        let source = caps.get(4).map_or("File", |m| m.as_str());

        Some(
            LogEvent::new(level, message)
                .with_timestamp(timestamp)
                .with_source(source),
        )
    }

    fn parse_bare(&self, line: &str) -> Option<LogEvent> {
        let caps = self.bare.captures(line)?;
        let timestamp = parse_timestamp(&caps[1])?;
        let level = LogLevel::from_token(&caps[2]);
        let message = caps[3].to_string();

        Some(
            LogEvent::new(level, message)
                .with_timestamp(timestamp)
                .with_source("File"),
        )
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the shared timestamp layout; a malformed date (e.g. month 13)
/// declines the pattern instead of propagating.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn parser() -> LineParser {
        LineParser::new()
    }

    #[test]
    fn bracketed_line_with_source() {
        let event = parser()
            .parse("[2023-01-01 12:00:00.000] [INFO] hello [svc]", "app.log")
            .unwrap();

        assert_eq!(
            event.timestamp,
            Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(event.level, LogLevel::Info);
        assert_eq!(event.message, "hello");
        assert_eq!(event.source, "svc");
        assert_eq!(event.origin_file, "app.log");
    }

    #[test]
    fn bracketed_line_without_source() {
        let event = parser()
            .parse("[2023-01-01 12:00:00.500] [ERROR] disk failure", "app.log")
            .unwrap();

        assert_eq!(event.level, LogLevel::Error);
        assert_eq!(event.message, "disk failure");
        assert_eq!(event.source, "File");
        assert_eq!(event.timestamp.nanosecond(), 500_000_000);
    }

    #[test]
    fn bare_line() {
        let event = parser()
            .parse("2023-01-01 12:00:00.000 WARN low memory", "sys.txt")
            .unwrap();

        assert_eq!(event.level, LogLevel::Warn);
        assert_eq!(event.message, "low memory");
        assert_eq!(event.source, "File");
    }

    #[test]
    fn warning_alias_maps_to_warn() {
        let event = parser()
            .parse("[2023-01-01 12:00:00.000] [WARNING] careful", "a.log")
            .unwrap();
        assert_eq!(event.level, LogLevel::Warn);
    }

    #[test]
    fn unrecognized_level_token_maps_to_info() {
        let event = parser()
            .parse("[2023-01-01 12:00:00.000] [NOTICE] something", "a.log")
            .unwrap();
        assert_eq!(event.level, LogLevel::Info);
    }

    #[test]
    fn unparseable_line_falls_back_to_generic_entry() {
        let before = Utc::now();
        let event = parser().parse("not a log line at all", "a.log").unwrap();

        assert_eq!(event.level, LogLevel::Info);
        assert_eq!(event.message, "not a log line at all");
        assert_eq!(event.source, "File");
        assert!(event.timestamp >= before);
    }

    #[test]
    fn malformed_timestamp_falls_through_to_fallback() {
        // Month 13 matches the digit pattern but fails date parsing
        let event = parser()
            .parse("[2023-13-01 12:00:00.000] [INFO] hello", "a.log")
            .unwrap();

        assert_eq!(event.message, "[2023-13-01 12:00:00.000] [INFO] hello");
        assert_eq!(event.source, "File");
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert!(parser().parse("", "a.log").is_none());
        assert!(parser().parse("   \t  ", "a.log").is_none());
    }

    #[test]
    fn level_tokens_are_case_insensitive() {
        let event = parser()
            .parse("2023-01-01 08:30:00.250 fatal kernel panic", "a.log")
            .unwrap();
        assert_eq!(event.level, LogLevel::Fatal);
    }
}
