use thiserror::Error;

/// Errors surfaced by the pipeline handle.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The pipeline runner has shut down and no longer accepts
    /// commands or queries.
    #[error("pipeline is closed")]
    Closed,
}
