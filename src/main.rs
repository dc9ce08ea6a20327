use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing::{debug, info};

use logscope_engine::{
    FilterPredicate, LogLevel, LogSink, PipelineConfig, PipelineEvent, PipelineRunner,
};
use logscope_import::{BulkImporter, DEFAULT_EXTENSIONS, ImportProgress, LineParser};

mod config;
mod export;

use config::FileConfig;

/// Logscope - a live log viewer engine for files and streams
#[derive(Parser, Debug)]
#[command(name = "logscope")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log files to import
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Folder to import recursively (by extension filter)
    #[arg(long, value_name = "DIR")]
    folder: Option<PathBuf>,

    /// Extensions picked up by --folder (repeatable)
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// Read live events from standard input
    #[arg(long)]
    stdin: bool,

    /// Maximum stored entries (0 = unbounded)
    #[arg(long)]
    capacity: Option<usize>,

    /// Events applied to the store per drain tick
    #[arg(long)]
    batch_size: Option<usize>,

    /// Drain period in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Minimum level to show (trace/debug/info/warn/error/fatal)
    #[arg(long, value_name = "LEVEL")]
    level: Option<String>,

    /// Case-insensitive substring filter over message and source
    #[arg(long, value_name = "TEXT")]
    search: Option<String>,

    /// Export the full store instead of printing the filtered view
    /// (.csv gets CSV, anything else plain text)
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Config file path (default: ./logscope.toml if present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run_app(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run_app(args: Args) -> Result<()> {
    let file_config = FileConfig::load(args.config.as_deref())?;

    // CLI overrides the config file, which overrides defaults
    let defaults = PipelineConfig::default();
    let pipeline_config = PipelineConfig {
        capacity: args
            .capacity
            .or(file_config.capacity)
            .unwrap_or(defaults.capacity),
        batch_size: args
            .batch_size
            .or(file_config.batch_size)
            .unwrap_or(defaults.batch_size),
        predicate: predicate_from(&args),
    };
    let tick = Duration::from_millis(args.tick_ms.or(file_config.tick_ms).unwrap_or(100));
    let extensions = if !args.extensions.is_empty() {
        args.extensions.clone()
    } else {
        file_config
            .extensions
            .clone()
            .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect())
    };

    let (mut runner, handle) = PipelineRunner::spawn_with_period(pipeline_config, tick);

    // Stdin producer runs concurrently with the bulk import below;
    // their events interleave by arrival time at the queue.
    let stdin_task = args.stdin.then(|| tokio::spawn(read_stdin(handle.sink())));

    // Import progress is printed off the ingestion path
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<ImportProgress>();
    let progress_task = tokio::spawn(async move {
        while let Some(p) = progress_rx.recv().await {
            info!("importing file ({}/{}): {}", p.index, p.total, p.file_name);
        }
    });

    let importer = BulkImporter::new(handle.sink());
    if let Some(folder) = &args.folder {
        let found = importer
            .import_folder(folder, &extensions, Some(&progress_tx))
            .await?;
        info!(folder = %folder.display(), files = found, "folder import finished");
    }
    if !args.files.is_empty() {
        importer.import_files(&args.files, Some(&progress_tx)).await;
    }
    drop(progress_tx);
    progress_task.await?;

    if let Some(task) = stdin_task {
        task.await?;
    }

    // Let the scheduler drain the backlog
    loop {
        if handle.pending().await? == 0 {
            break;
        }
        tokio::select! {
            Some(PipelineEvent::ViewChanged { matched, total }) = runner.next_event() => {
                debug!(matched, total, "view updated");
            }
            _ = tokio::time::sleep(tick) => {}
        }
    }

    let summary = handle.summary().await?;
    info!(
        total = summary.total,
        matched = summary.matched,
        "ingestion complete"
    );

    if let Some(path) = &args.export {
        let snapshot = handle.snapshot().await?;
        let written = export::export_to_path(path, &snapshot)?;
        info!("exported {} entries to {}", written, path.display());
    } else {
        let view = handle.current_view().await?;
        let stdout = std::io::stdout();
        export::write_text(&mut stdout.lock(), &view)?;
    }

    runner.shutdown();
    runner.join().await;

    Ok(())
}

fn predicate_from(args: &Args) -> FilterPredicate {
    let mut predicate = FilterPredicate::all();
    if let Some(level) = &args.level {
        predicate = predicate.with_min_level(LogLevel::from_token(level));
    }
    if let Some(search) = &args.search {
        predicate = predicate.with_search(search.as_str());
    }
    predicate
}

/// Live producer: each stdin line becomes an event through the same
/// parser and sink as imported files, with no provenance label.
async fn read_stdin(sink: LogSink) {
    let parser = LineParser::new();
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if let Some(event) = parser.parse(&line, "") {
            sink.submit(event);
        }
    }
}
