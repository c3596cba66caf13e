use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    /// A `}` with no open `{` before it. The payload is rejected whole.
    #[error("mismatched brackets in js file: unmatched '}}' on line {line}")]
    UnmatchedBrace { line: usize },

    #[error("timed out after {after:?} waiting for {waiting_for:?}")]
    Timeout {
        waiting_for: String,
        after: Duration,
    },

    #[error("connection closed by target")]
    Closed,

    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no target binary given (use --bin or set \"binary\" in the profile)")]
    MissingBinary,

    #[error("cannot parse terminal command {0:?}")]
    Terminal(String),

    #[error("invalid profile: {0}")]
    Profile(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
