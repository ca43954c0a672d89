#![forbid(unsafe_code)]

use thiserror::Error;

/// Failure carried by a [`Notification::Error`](crate::Notification::Error).
///
/// Cloneable so a single failure can fan out to every observer of a subject.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("source failed: {message}")]
    Failed { message: String },

    #[error("value for `{name}` could not be serialized: {message}")]
    Serialize { name: String, message: String },
}

impl StreamError {
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}
