use thiserror::Error;

/// Rejections raised while reading identifiers and enumerated values out of
/// rendered markup. None of these ever reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{kind} id must be positive, got {id}")]
    NonPositiveId { kind: &'static str, id: i64 },
    #[error("{kind} id is not an integer: {raw:?}")]
    InvalidId { kind: &'static str, raw: String },
    #[error("unknown reaction target kind: {0:?}")]
    UnknownKind(String),
    #[error("unknown reaction choice: {0:?}")]
    UnknownChoice(String),
    #[error("unknown post filter: {0:?}")]
    UnknownFilter(String),
    #[error("missing attribute {0}")]
    MissingAttribute(&'static str),
}
