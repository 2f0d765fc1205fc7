use thiserror::Error;

/// Errors surfaced by the citation pipeline.
///
/// The engine never partially commits: any of these fails the whole call.
#[derive(Debug, Error)]
pub enum CitationError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{collaborator} violated its contract on input {index}: {detail}")]
    CollaboratorContract {
        collaborator: &'static str,
        index: usize,
        detail: String,
    },
    #[error("unknown aligner backend: {0}")]
    UnknownBackend(String),
}
