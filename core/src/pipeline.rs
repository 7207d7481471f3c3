//! Sequential worker that classifies batches and writes operations.

use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use crate::classify::classify_unfiltered;
use crate::error::{EncodeError, Result};
use crate::ignore;
use crate::notification::NotificationBatch;
use crate::operation::Operation;
use crate::oracle::ExistenceOracle;
use crate::protocol::SharedSink;

/// Counters for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Batches taken from the channel.
    pub batches: u64,

    /// Batches dropped by the ignore filter.
    pub ignored: u64,

    /// Batches that matched no rule.
    pub unclassified: u64,

    /// Operations written to the sink.
    pub written: u64,

    /// Operations that could not be encoded.
    pub skipped: u64,
}

/// Classification and encoding for one watched root.
///
/// Owns no state beyond its counters; every batch is handled independently.
pub struct Pipeline<O, W> {
    oracle: O,
    sink: SharedSink<W>,
    stats: PipelineStats,
}

impl<O, W> Pipeline<O, W>
where
    O: ExistenceOracle,
    W: AsyncWrite + Unpin,
{
    pub fn new(oracle: O, sink: SharedSink<W>) -> Self {
        Self {
            oracle,
            sink,
            stats: PipelineStats::default(),
        }
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Handle one batch.
    ///
    /// Returns the operation that was written, if any. An operation whose
    /// path is too long is skipped; a sink failure is returned because the
    /// stream may now hold a partial message.
    pub async fn process(&mut self, batch: &NotificationBatch) -> Result<Option<Operation>> {
        self.stats.batches += 1;

        if ignore::should_ignore(batch) {
            trace!("ignoring metadata notification");
            self.stats.ignored += 1;
            return Ok(None);
        }

        let Some(operation) = classify_unfiltered(batch, &self.oracle) else {
            trace!("no rule matched batch of {}", batch.len());
            self.stats.unclassified += 1;
            return Ok(None);
        };

        match self.sink.write_operation(&operation).await {
            Ok(len) => {
                debug!("{operation} ({len} bytes)");
                self.stats.written += 1;
                Ok(Some(operation))
            }
            Err(EncodeError::PathTooLong { len }) => {
                warn!("Skipping {operation}: path of {len} bytes exceeds the wire limit");
                self.stats.skipped += 1;
                Ok(None)
            }
            Err(e) => {
                error!("Failed to write {operation}: {e}");
                Err(e.into())
            }
        }
    }

    /// Consume batches until the channel closes or `shutdown` is cancelled.
    ///
    /// Cancellation is checked before every batch, so nothing is taken from
    /// the channel once teardown has begun. A batch already taken runs to
    /// completion.
    pub async fn run(
        mut self,
        mut batches: mpsc::Receiver<NotificationBatch>,
        shutdown: CancellationToken,
    ) -> Result<PipelineStats> {
        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => {
                    debug!("pipeline shutting down");
                    break;
                }
                next = batches.recv() => match next {
                    Some(batch) => {
                        self.process(&batch).await?;
                    }
                    None => {
                        debug!("batch channel closed");
                        break;
                    }
                },
            }
        }

        Ok(self.stats)
    }
}
