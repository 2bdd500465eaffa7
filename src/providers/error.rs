use thiserror::Error;

/// Failure of a single completion call.
///
/// Roles never propagate this further; they swap it for a sentinel text so the
/// run keeps going.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode completion response: {0}")]
    Decode(String),

    #[error("empty response")]
    EmptyResponse,
}
