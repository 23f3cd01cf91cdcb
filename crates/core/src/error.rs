use crate::score::ScoreError;
use thiserror::Error;

/// Failures surfaced by a conversation session or its backend client.
///
/// None of these are retried; the caller decides whether to resend a message.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The endpoint could not be reached or the body could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("API error (code {status}): {body}")]
    Upstream { status: u16, body: String },

    /// The endpoint answered successfully but not with a chat completion.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The model's rating does not select a slot in the delta table.
    #[error("rating {index} cannot be applied: {source}")]
    OutOfRange {
        index: i64,
        #[source]
        source: ScoreError,
    },
}

impl From<ScoreError> for SessionError {
    fn from(source: ScoreError) -> Self {
        let ScoreError::OutOfRange { index, .. } = source;
        Self::OutOfRange { index, source }
    }
}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;
