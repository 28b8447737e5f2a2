//! Error types shared by the primitives and the host root.

use thiserror::Error;

/// Errors that cross the primitive boundary and reach the host.
///
/// Everything else (storage failures, fetch failures, stale completions) is
/// represented as data inside the primitive that hit it.
#[derive(Debug, Error)]
pub enum HookError {
    /// An effect body or cleanup failed.
    #[error(transparent)]
    Effect(#[from] EffectError),

    /// The component kept invalidating itself while settling.
    #[error("component `{name}` still dirty after {passes} render passes")]
    RenderLoop { name: String, passes: usize },

    /// The root was already torn down.
    #[error("component `{name}` is unmounted")]
    Unmounted { name: String },
}

/// Failure raised inside an effect body or its cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("effect failed: {message}")]
pub struct EffectError {
    message: String,
}

impl EffectError {
    /// Create an effect error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failures of the key-value storage service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("no value stored under `{key}`")]
    NotFound { key: String },

    #[error("failed to read `{key}`: {message}")]
    Read { key: String, message: String },

    #[error("value stored under `{key}` could not be parsed: {message}")]
    Parse { key: String, message: String },

    #[error("failed to write `{key}`: {message}")]
    Write { key: String, message: String },
}

/// Failures of an asynchronous resource load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// The body could not be decoded into the expected type.
    #[error("failed to decode response: {0}")]
    Decode(String),
}
