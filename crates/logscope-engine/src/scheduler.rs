use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use logscope_types::{FilterPredicate, LogEvent};

use crate::error::EngineError;
use crate::pipeline::{DisplaySummary, LogPipeline, PipelineConfig};
use crate::queue::LogSink;

/// Default drain period.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(100);

/// Control and query messages for the runner task.
enum Command {
    SetPredicate(FilterPredicate),
    SetCapacity(usize),
    Pause,
    Resume,
    Clear,
    CurrentView(oneshot::Sender<Vec<LogEvent>>),
    Snapshot(oneshot::Sender<Vec<LogEvent>>),
    Count(oneshot::Sender<usize>),
    Pending(oneshot::Sender<usize>),
    Summary(oneshot::Sender<DisplaySummary>),
}

/// Notifications published by the runner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineEvent {
    /// The filter view changed: a non-empty drain completed, or a
    /// predicate/capacity/clear command was applied.
    ViewChanged { matched: usize, total: usize },
}

/// Drives a [`LogPipeline`] on a single tokio task.
///
/// The task owns the pipeline outright, making it the one designated
/// consumer: it wakes on a fixed-period interval to drain a batch, and
/// applies control commands in between ticks. A second drainer cannot
/// exist by construction.
pub struct PipelineRunner {
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
    events: mpsc::UnboundedReceiver<PipelineEvent>,
}

impl PipelineRunner {
    /// Spawn the runner with the default tick period.
    pub fn spawn(config: PipelineConfig) -> (Self, PipelineHandle) {
        Self::spawn_with_period(config, DEFAULT_TICK_PERIOD)
    }

    /// Spawn the runner, draining a batch every `tick_period`.
    pub fn spawn_with_period(
        config: PipelineConfig,
        tick_period: Duration,
    ) -> (Self, PipelineHandle) {
        let mut pipeline = LogPipeline::new(config);
        let sink = pipeline.sink();
        let (command_tx, mut command_rx) = mpsc::unbounded_channel::<Command>();
        let (event_tx, events) = mpsc::unbounded_channel::<PipelineEvent>();
        let cancel = CancellationToken::new();

        let task = {
            let cancel = cancel.clone();

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(tick_period);

                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,

                        _ = interval.tick() => {
                            if pipeline.tick() > 0 {
                                publish_view_changed(&event_tx, &pipeline);
                            }
                        }

                        command = command_rx.recv() => {
                            match command {
                                Some(command) => {
                                    if apply_command(&mut pipeline, command) {
                                        publish_view_changed(&event_tx, &pipeline);
                                    }
                                }
                                // All handles dropped; nothing can
                                // reach the pipeline anymore.
                                None => break,
                            }
                        }
                    }
                }
                debug!("pipeline runner stopped");
            })
        };

        (
            Self {
                cancel,
                task,
                events,
            },
            PipelineHandle { sink, command_tx },
        )
    }

    /// Receive the next pipeline notification.
    pub async fn next_event(&mut self) -> Option<PipelineEvent> {
        self.events.recv().await
    }

    /// Request shutdown. In-flight ticks finish; no further drains run.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Wait for the runner task to finish.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

/// Apply one command; returns true when the view changed.
fn apply_command(pipeline: &mut LogPipeline, command: Command) -> bool {
    match command {
        Command::SetPredicate(predicate) => {
            pipeline.set_predicate(predicate);
            true
        }
        Command::SetCapacity(capacity) => {
            pipeline.set_capacity(capacity);
            true
        }
        Command::Pause => {
            pipeline.pause();
            false
        }
        Command::Resume => {
            pipeline.resume();
            false
        }
        Command::Clear => {
            pipeline.clear();
            true
        }
        Command::CurrentView(reply) => {
            let _ = reply.send(pipeline.current_view().to_vec());
            false
        }
        Command::Snapshot(reply) => {
            let _ = reply.send(pipeline.snapshot());
            false
        }
        Command::Count(reply) => {
            let _ = reply.send(pipeline.count());
            false
        }
        Command::Pending(reply) => {
            let _ = reply.send(pipeline.pending());
            false
        }
        Command::Summary(reply) => {
            let _ = reply.send(pipeline.summary());
            false
        }
    }
}

fn publish_view_changed(
    event_tx: &mpsc::UnboundedSender<PipelineEvent>,
    pipeline: &LogPipeline,
) {
    let summary = pipeline.summary();
    let _ = event_tx.send(PipelineEvent::ViewChanged {
        matched: summary.matched,
        total: summary.total,
    });
}

/// Cloneable control/query surface over a running pipeline.
///
/// Submissions go straight into the shared ingestion queue; control
/// and query operations are relayed to the runner task and fail with
/// [`EngineError::Closed`] once it has shut down.
#[derive(Clone)]
pub struct PipelineHandle {
    sink: LogSink,
    command_tx: mpsc::UnboundedSender<Command>,
}

impl PipelineHandle {
    /// Submit a live event, fire-and-forget.
    pub fn submit(&self, event: LogEvent) {
        self.sink.submit(event);
    }

    /// Producer handle for handing to other event sources.
    pub fn sink(&self) -> LogSink {
        self.sink.clone()
    }

    /// Replace the filter predicate; takes effect immediately.
    pub fn set_predicate(&self, predicate: FilterPredicate) -> Result<(), EngineError> {
        self.send(Command::SetPredicate(predicate))
    }

    /// Change the store capacity (0 = unbounded).
    pub fn set_capacity(&self, capacity: usize) -> Result<(), EngineError> {
        self.send(Command::SetCapacity(capacity))
    }

    /// Stop accepting new submissions.
    pub fn pause(&self) -> Result<(), EngineError> {
        self.send(Command::Pause)
    }

    /// Resume accepting submissions.
    pub fn resume(&self) -> Result<(), EngineError> {
        self.send(Command::Resume)
    }

    /// Drop stored entries and everything pending in the queue.
    pub fn clear(&self) -> Result<(), EngineError> {
        self.send(Command::Clear)
    }

    /// Entries matching the active predicate, in store order.
    pub async fn current_view(&self) -> Result<Vec<LogEvent>, EngineError> {
        self.query(Command::CurrentView).await
    }

    /// Point-in-time ordered copy of the full store.
    pub async fn snapshot(&self) -> Result<Vec<LogEvent>, EngineError> {
        self.query(Command::Snapshot).await
    }

    /// Total stored entries.
    pub async fn count(&self) -> Result<usize, EngineError> {
        self.query(Command::Count).await
    }

    /// Events still waiting in the ingestion queue.
    pub async fn pending(&self) -> Result<usize, EngineError> {
        self.query(Command::Pending).await
    }

    /// Current display counters.
    pub async fn summary(&self) -> Result<DisplaySummary, EngineError> {
        self.query(Command::Summary).await
    }

    fn send(&self, command: Command) -> Result<(), EngineError> {
        self.command_tx
            .send(command)
            .map_err(|_| EngineError::Closed)
    }

    async fn query<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(make(reply_tx))?;
        reply_rx.await.map_err(|_| EngineError::Closed)
    }
}
