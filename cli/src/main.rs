//! `fs_watch`: stream classified filesystem operations for one directory.
//!
//! Operations are written to stdout in the binary wire format; logs go to
//! stderr. Exits 0 after a termination signal, 1 on usage or setup errors.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use fswatch_core::config::DEFAULT_CHANNEL_CAPACITY;
use fswatch_core::{SharedSink, WatchConfig, WatchSession};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Watch a directory tree and write classified operations to stdout.
#[derive(Debug, Parser)]
#[command(name = "fs_watch", version)]
struct Cli {
    /// Directory to watch (recursively).
    dir: PathBuf,

    /// Coalesce notifications arriving within this many milliseconds.
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,

    /// Capacity of the internal notification channels.
    #[arg(long, default_value_t = DEFAULT_CHANNEL_CAPACITY)]
    channel_capacity: usize,
}

impl Cli {
    fn watch_config(&self) -> WatchConfig {
        WatchConfig::new(&self.dir)
            .with_latency(Duration::from_millis(self.latency_ms))
            .with_channel_capacity(self.channel_capacity)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version are not failures
            let code = if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = err.print();
            return code;
        }
    };

    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the wire protocol
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.watch_config();
    let sink = SharedSink::new(tokio::io::stdout());
    let session = WatchSession::start(config, sink)
        .with_context(|| format!("failed to watch {}", cli.dir.display()))?;

    tokio::select! {
        signal = termination_signal() => {
            signal.context("failed to listen for termination signals")?;
            info!("Termination signal received");
        }
        () = session.stopped() => {
            warn!("Pipeline stopped before a termination signal");
        }
    }

    let stats = session.shutdown().await?;
    info!(
        "Processed {} batches: {} written, {} ignored, {} unclassified, {} skipped",
        stats.batches, stats.written, stats.ignored, stats.unclassified, stats.skipped
    );
    Ok(())
}

/// Resolves on SIGINT, SIGTERM or SIGQUIT.
#[cfg(unix)]
async fn termination_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
        _ = quit.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn termination_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_positional_directory() {
        let cli = Cli::try_parse_from(["fs_watch", "/w"]).unwrap();
        let config = cli.watch_config();

        assert_eq!(config, WatchConfig::new("/w"));
    }

    #[test]
    fn test_latency_flag() {
        let cli = Cli::try_parse_from(["fs_watch", "--latency-ms", "500", "/w"]).unwrap();

        assert_eq!(cli.watch_config().latency(), Duration::from_millis(500));
    }

    #[test]
    fn test_missing_directory_is_a_usage_error() {
        let err = Cli::try_parse_from(["fs_watch"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_extra_positional_is_a_usage_error() {
        assert!(Cli::try_parse_from(["fs_watch", "/a", "/b"]).is_err());
    }

    #[test]
    fn test_help_is_not_a_failure() {
        let err = Cli::try_parse_from(["fs_watch", "--help"]).unwrap_err();
        assert!(!err.use_stderr());
    }
}
