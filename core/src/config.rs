//! Configuration types for a watch session.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WatchError};

/// Default bound of the channels between the subscription and the pipeline.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Configuration for a watched root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Directory to watch. Always watched recursively.
    pub root: PathBuf,

    /// Coalescing window in milliseconds. Zero delivers every
    /// notification group as its own batch.
    #[serde(default)]
    pub latency_ms: u64,

    /// Capacity of the notification and batch channels.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

impl WatchConfig {
    /// Create a new config for `root` with default settings.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            latency_ms: 0,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Set the coalescing window.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the channel capacity.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// The coalescing window as a [`Duration`].
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    /// The watched root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check that the root is an existing directory and the settings are usable.
    pub fn validate(&self) -> Result<()> {
        if !self.root.exists() {
            return Err(WatchError::DirectoryNotFound(
                self.root.display().to_string(),
            ));
        }

        if !self.root.is_dir() {
            return Err(WatchError::Configuration(format!(
                "path is not a directory: {}",
                self.root.display()
            )));
        }

        // tokio's bounded channels panic on zero capacity
        if self.channel_capacity == 0 {
            return Err(WatchError::Configuration(
                "channel capacity must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
