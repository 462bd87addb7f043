use thiserror::Error;

/// fatal errors raised by the swarm; everything else (empty alive set,
/// non-finite rewards, cancellation) is handled locally and never reaches
/// the caller as an `Err` (see module docs on [`crate::orchestrator`])
#[derive(Debug, Error)]
pub enum SwarmError {
    #[error("schema mismatch on column `{column}`: expected length {expected}, got {got}")]
    SchemaMismatch {
        column: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("worker {worker} raised an exception: {source}")]
    WorkerException { worker: usize, source: anyhow::Error },

    #[error("misconfiguration: {0}")]
    Misconfiguration(String),
}
