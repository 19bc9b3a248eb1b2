use reqwest::StatusCode;
use shared::error::DomainError;
use thiserror::Error;

pub const REACTION_FAILED_NOTICE: &str = "Error saving reaction";

/// Why a reaction that reached (or tried to reach) the server was not applied.
#[derive(Debug, Error)]
pub enum ReactionFailure {
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("server answered with status {0}")]
    Status(StatusCode),
    #[error("malformed reaction response: {0}")]
    MalformedBody(#[source] serde_json::Error),
    #[error("server did not confirm the reaction")]
    NotConfirmed,
}

#[derive(Debug, Error)]
pub enum ReactionError {
    #[error("invalid reaction target: {0}")]
    InvalidTarget(#[from] DomainError),
    #[error("not signed in")]
    Unauthenticated,
    #[error("reaction failed: {0}")]
    ReactionFailed(#[from] ReactionFailure),
}

impl ReactionError {
    pub fn notice_text(&self) -> String {
        match self {
            ReactionError::InvalidTarget(err) => format!("{REACTION_FAILED_NOTICE}: {err}"),
            ReactionError::Unauthenticated => "Please sign in to react".to_string(),
            ReactionError::ReactionFailed(_) => REACTION_FAILED_NOTICE.to_string(),
        }
    }

    pub fn requires_reauth(&self) -> bool {
        matches!(self, ReactionError::Unauthenticated)
    }
}
