use thiserror::Error;

/// Failures surfaced by inventory acquisition. Fatal to a browsing session:
/// the interactive loop cannot proceed without data, so the caller reports
/// the message and exits non-zero. Cache problems are never represented
/// here; they are absorbed by the cache collaborator as a miss.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("{0}")]
    SourceUnavailable(String),
}
