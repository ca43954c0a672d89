#![forbid(unsafe_code)]

use rxview_reactive::StreamError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BindError>;

#[derive(Debug, Error)]
pub enum BindError {
    #[error("view model factory failed: {message}")]
    Factory { message: String },

    #[error("upstream source failed: {0}")]
    Upstream(#[from] StreamError),

    #[error("argument for action `{name}` does not fit its sink: {source}")]
    ActionArgument {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no action named `{name}`")]
    UnknownAction { name: String },
}

impl BindError {
    #[must_use]
    pub fn factory(message: impl Into<String>) -> Self {
        Self::Factory {
            message: message.into(),
        }
    }
}
