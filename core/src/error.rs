//! Error types for watching and encoding.

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Errors that can occur while setting up or running a watch session.
#[derive(Error, Debug)]
pub enum WatchError {
    /// Directory not found.
    #[error("directory not found: {0}")]
    DirectoryNotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The notification source failed to initialize or start.
    #[error("subscription error: {0}")]
    Subscription(#[from] notify::Error),

    /// An operation could not be written to the sink.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodeError),

    /// A background task panicked or was aborted.
    #[error("task failed: {0}")]
    Task(String),
}

/// Errors produced by the protocol encoder.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// Path does not fit the 16-bit length prefix.
    #[error("path is {len} bytes, the wire limit is 65535")]
    PathTooLong { len: usize },

    /// The sink reported a hard failure. Bytes already written stay written.
    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),
}
