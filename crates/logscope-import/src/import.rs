use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::{info, warn};

use logscope_engine::LogSink;
use logscope_types::{LogEvent, LogLevel};

use crate::parser::LineParser;

/// File extensions picked up by folder import.
pub const DEFAULT_EXTENSIONS: &[&str] = &["log", "txt"];

/// Incremental progress report, one per file.
///
/// Fire-and-forget: reporting never blocks ingestion, and a dropped
/// receiver is silently ignored.
#[derive(Clone, Debug)]
pub struct ImportProgress {
    /// 1-based index of the file being processed
    pub index: usize,

    /// Total number of files in this import
    pub total: usize,

    /// Name of the file being processed
    pub file_name: String,
}

/// Feeds log files through the line parser into the ingestion queue.
///
/// Files are processed sequentially to bound memory use and avoid
/// thrashing the store with many simultaneous producers; events enter
/// through the same sink as live traffic, so pause semantics apply
/// unchanged.
pub struct BulkImporter {
    sink: LogSink,
    parser: LineParser,
}

impl BulkImporter {
    /// Create an importer submitting through the given sink.
    pub fn new(sink: LogSink) -> Self {
        Self {
            sink,
            parser: LineParser::new(),
        }
    }

    /// Import the given files in order.
    ///
    /// An unreadable file degrades into a single synthetic error-level
    /// event (the failure message, with the file name as source) and
    /// the remaining files still run; this method itself never fails.
    pub async fn import_files(
        &self,
        paths: &[PathBuf],
        progress: Option<&mpsc::UnboundedSender<ImportProgress>>,
    ) {
        let total = paths.len();

        for (i, path) in paths.iter().enumerate() {
            let file_name = file_name_of(path);

            if let Some(tx) = progress {
                let _ = tx.send(ImportProgress {
                    index: i + 1,
                    total,
                    file_name: file_name.clone(),
                });
            }

            match tokio::fs::read_to_string(path).await {
                Ok(contents) => {
                    let mut parsed = 0usize;
                    for line in contents.lines() {
                        if let Some(event) = self.parser.parse(line, &file_name) {
                            self.sink.submit(event);
                            parsed += 1;
                        }
                    }
                    info!(file = %path.display(), parsed, "imported file");
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "failed to read file");
                    self.sink.submit(
                        LogEvent::new(
                            LogLevel::Error,
                            format!("failed to read {}: {e}", path.display()),
                        )
                        .with_source(file_name.as_str())
                        .with_origin_file(file_name.as_str()),
                    );
                }
            }
        }
    }

    /// Recursively discover files under `root` matching the given
    /// extensions (case-insensitive), then import them.
    ///
    /// Returns the number of files discovered.
    pub async fn import_folder(
        &self,
        root: &Path,
        extensions: &[String],
        progress: Option<&mpsc::UnboundedSender<ImportProgress>>,
    ) -> Result<usize, crate::ImportError> {
        if !root.is_dir() {
            return Err(crate::ImportError::NotFound(root.to_path_buf()));
        }

        let mut files = Vec::new();
        discover_files(root, extensions, &mut files)?;
        // Deterministic order regardless of directory walk order
        files.sort();

        self.import_files(&files, progress).await;
        Ok(files.len())
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn discover_files(
    dir: &Path,
    extensions: &[String],
    out: &mut Vec<PathBuf>,
) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            discover_files(&path, extensions, out)?;
        } else if matches_extension(&path, extensions) {
            out.push(path);
        }
    }
    Ok(())
}

fn matches_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}
