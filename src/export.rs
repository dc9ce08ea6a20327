//! Export writers consuming the store's snapshot contract.
//!
//! Formats match what the viewer's plain-text import understands:
//! the text format round-trips through the line parser's bracketed
//! pattern.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use logscope_types::LogEvent;

/// Timestamp layout used by both export formats.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Supported export formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    /// One `[timestamp] [LEVEL] message [source]` line per entry
    Text,
    /// `timestamp,level,message,source` with quoted fields
    Csv,
}

impl ExportFormat {
    /// Pick a format from a file extension (`.csv` means CSV,
    /// anything else plain text).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Text,
        }
    }
}

/// Write entries as plain text, one line per entry.
pub fn write_text<W: Write>(writer: &mut W, events: &[LogEvent]) -> io::Result<()> {
    for event in events {
        writeln!(
            writer,
            "[{}] [{}] {} [{}]",
            event.timestamp.format(TIMESTAMP_FORMAT),
            event.level,
            event.message,
            event.source
        )?;
    }
    Ok(())
}

/// Write entries as CSV with a header row. Every field is quoted and
/// embedded quotes are doubled.
pub fn write_csv<W: Write>(writer: &mut W, events: &[LogEvent]) -> io::Result<()> {
    writeln!(writer, "timestamp,level,message,source")?;
    for event in events {
        writeln!(
            writer,
            "{},{},{},{}",
            csv_field(&event.timestamp.format(TIMESTAMP_FORMAT).to_string()),
            csv_field(event.level.as_str()),
            csv_field(&event.message),
            csv_field(&event.source)
        )?;
    }
    Ok(())
}

/// Export a snapshot to a file, picking the format from the extension.
/// Returns the number of entries written.
pub fn export_to_path(path: &Path, events: &[LogEvent]) -> io::Result<usize> {
    let mut writer = BufWriter::new(File::create(path)?);
    match ExportFormat::from_path(path) {
        ExportFormat::Text => write_text(&mut writer, events)?,
        ExportFormat::Csv => write_csv(&mut writer, events)?,
    }
    writer.flush()?;
    Ok(events.len())
}

fn csv_field(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}
