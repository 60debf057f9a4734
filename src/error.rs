use thiserror::Error;

/// Precondition violations reported by the snippet core.
///
/// The core never guesses a fallback for a bad formatting context; the host
/// decides how to surface these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnippetError {
    #[error("tab size must be greater than zero (got {0})")]
    InvalidTabSize(usize),

    #[error("invalid `{key}` setting: {reason}")]
    InvalidSetting { key: String, reason: String },
}
