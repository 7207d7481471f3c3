//! # fswatch core
//!
//! This crate turns raw filesystem change notifications into a small set of
//! semantic operations and streams them to a consumer over a compact binary
//! protocol.
//!
//! ## Features
//!
//! - **Classification**: Interpret coalesced notification flags as one of
//!   Added, Modified, Created, Removed or Renamed
//! - **Rename Detection**: Pair the two halves of a rename delivered together
//! - **Wire Encoding**: Length-prefixed, big-endian messages on any byte sink
//! - **Watch Sessions**: `notify` subscription, batching and a sequential pipeline
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Watch Session                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  notify ──► NotificationSource ──► coalesce ──► Pipeline        │
//! │                                                   │             │
//! │                          ┌────────────────────────┤             │
//! │                          ▼                        ▼             │
//! │                  IgnoreFilter ──► classify ──► protocol ──► sink│
//! │                                      │                          │
//! │                                      ▼                          │
//! │                               ExistenceOracle                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod flags;
pub mod ignore;
pub mod notification;
pub mod operation;
pub mod oracle;
pub mod pipeline;
pub mod protocol;
pub mod session;
pub mod source;

pub use classify::classify;
pub use config::WatchConfig;
pub use error::{EncodeError, Result, WatchError};
pub use flags::AttributeFlags;
pub use notification::{NotificationBatch, ObjectKind, RawNotification};
pub use operation::{Opcode, Operation};
pub use oracle::{ExistenceOracle, FsOracle};
pub use pipeline::{Pipeline, PipelineStats};
pub use protocol::SharedSink;
pub use session::WatchSession;
pub use source::NotificationSource;
