use thiserror::Error;

use crate::state::Phase;

/// Failures raised while talking to the analysis service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service answered with a non-2xx status; the body was never read.
    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// Connection, request or body-read failure.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// A streamed line that is not a well-formed status record.
    #[error("invalid record {line:?}: {source}")]
    Decode {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    /// The `/ask` response body is not a JSON answer.
    #[error("invalid answer: {0}")]
    Answer(#[source] serde_json::Error),
}

/// A form submission the controller refused in its current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("a request is already in flight ({0:?})")]
    Busy(Phase),

    #[error("questions can only be asked after an analysis completes")]
    NotReady,
}
