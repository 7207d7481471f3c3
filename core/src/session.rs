//! Watch session: the `notify` subscription wired to a pipeline.

use std::path::Path;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::WatchConfig;
use crate::error::{Result, WatchError};
use crate::oracle::{ExistenceOracle, FsOracle};
use crate::pipeline::{Pipeline, PipelineStats};
use crate::protocol::SharedSink;
use crate::source::{self, NotificationSource};

/// A running watch over one root.
///
/// Dropping the session cancels it without waiting; call
/// [`WatchSession::shutdown`] for an orderly teardown.
pub struct WatchSession {
    /// Watched root and settings.
    config: WatchConfig,

    /// Internal notify watcher.
    watcher: Option<RecommendedWatcher>,

    /// Cancelled when teardown begins.
    shutdown: CancellationToken,

    /// Cancelled when the pipeline task returns.
    stopped: CancellationToken,

    coalescer: Option<JoinHandle<()>>,

    pipeline: Option<JoinHandle<Result<PipelineStats>>>,
}

impl WatchSession {
    /// Start watching `config.root` and stream operations into `sink`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<W>(config: WatchConfig, sink: SharedSink<W>) -> Result<Self>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Self::start_with_oracle(config, sink, FsOracle)
    }

    /// Like [`WatchSession::start`] with a custom existence oracle.
    pub fn start_with_oracle<O, W>(
        config: WatchConfig,
        sink: SharedSink<W>,
        oracle: O,
    ) -> Result<Self>
    where
        O: ExistenceOracle + Send + Sync + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        config.validate()?;

        let (raw_tx, raw_rx) = mpsc::channel(config.channel_capacity);
        let (batch_tx, batch_rx) = mpsc::channel(config.channel_capacity);

        // On failure the watcher and both channels are dropped here, in
        // reverse order of creation.
        let mut watcher =
            notify::recommended_watcher(source::event_handler(NotificationSource::new(), raw_tx))?;
        watcher.watch(config.root(), RecursiveMode::Recursive)?;

        let shutdown = CancellationToken::new();
        let stopped = CancellationToken::new();

        let coalescer = tokio::spawn(source::coalesce(
            raw_rx,
            batch_tx,
            config.latency(),
            shutdown.clone(),
        ));

        let pipeline = {
            let pipeline = Pipeline::new(oracle, sink);
            let shutdown = shutdown.clone();
            let stopped = stopped.clone();
            tokio::spawn(async move {
                let result = pipeline.run(batch_rx, shutdown).await;
                stopped.cancel();
                result
            })
        };

        info!("Watching directory: {}", config.root().display());

        Ok(Self {
            config,
            watcher: Some(watcher),
            shutdown,
            stopped,
            coalescer: Some(coalescer),
            pipeline: Some(pipeline),
        })
    }

    /// The watched root.
    pub fn root(&self) -> &Path {
        self.config.root()
    }

    /// Check if the session is still processing notifications.
    pub fn is_running(&self) -> bool {
        !self.shutdown.is_cancelled() && !self.stopped.is_cancelled()
    }

    /// Resolves once the pipeline has stopped on its own (sink failure or
    /// closed source) or after shutdown.
    pub async fn stopped(&self) {
        self.stopped.cancelled().await;
    }

    /// Stop the subscription and wait for the pipeline to finish.
    ///
    /// Teardown order: cancel, join the coalescer (closing the notification
    /// channel so a callback blocked on a full channel returns), drop the
    /// notify watcher, then join the pipeline. Returns the pipeline's result,
    /// including a sink failure that stopped it early.
    pub async fn shutdown(mut self) -> Result<PipelineStats> {
        self.shutdown.cancel();

        if let Some(coalescer) = self.coalescer.take() {
            if let Err(e) = coalescer.await {
                warn!("Coalescer task failed: {e}");
            }
        }

        if let Some(watcher) = self.watcher.take() {
            drop(watcher);
            debug!("Subscription released: {}", self.config.root().display());
        }

        let result = match self.pipeline.take() {
            Some(pipeline) => pipeline
                .await
                .map_err(|e| WatchError::Task(e.to_string()))?,
            None => Ok(PipelineStats::default()),
        };

        info!("Stopped watching: {}", self.config.root().display());
        result
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
