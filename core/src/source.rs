//! Translation of `notify` events into raw notifications and batches.
//!
//! The `notify` callback runs on the backend's own thread. It only translates
//! events and pushes them onto a channel; [`coalesce`] groups them into
//! [`NotificationBatch`] values on the async side.

use std::path::Path;
use std::time::Duration;

use notify::event::{CreateKind, MetadataKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::flags::AttributeFlags;
use crate::notification::{NotificationBatch, RawNotification};

/// Assigns sequence ids and attribute flags to `notify` events.
#[derive(Debug)]
pub struct NotificationSource {
    next_id: u64,
}

impl NotificationSource {
    /// Create a source whose first notification gets id 1.
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Translate one event into notifications, one per path.
    ///
    /// A `Name(Both)` rename becomes the two halves of the rename (old path
    /// first) with adjacent ids. Access and unknown events translate to
    /// nothing.
    pub fn translate(&mut self, event: &Event) -> Vec<RawNotification> {
        let Some(changes) = change_flags(&event.kind) else {
            return Vec::new();
        };

        match (&event.kind, event.paths.as_slice()) {
            (EventKind::Modify(ModifyKind::Name(RenameMode::Both)), [from, to]) => {
                // the old name is gone, so the new one tells us the kind
                let kind = kind_flags(&event.kind, to);
                vec![
                    RawNotification::new(from.clone(), kind | changes, self.next_id()),
                    RawNotification::new(to.clone(), kind | changes, self.next_id()),
                ]
            }
            (kind, paths) => paths
                .iter()
                .map(|path| {
                    RawNotification::new(
                        path.clone(),
                        kind_flags(kind, path) | changes,
                        self.next_id(),
                    )
                })
                .collect(),
        }
    }
}

impl Default for NotificationSource {
    fn default() -> Self {
        Self::new()
    }
}

fn change_flags(kind: &EventKind) -> Option<AttributeFlags> {
    let flags = match kind {
        EventKind::Create(_) => AttributeFlags::CREATED,
        EventKind::Remove(_) => AttributeFlags::REMOVED,
        EventKind::Modify(ModifyKind::Name(_)) => AttributeFlags::RENAMED,
        EventKind::Modify(ModifyKind::Metadata(metadata)) => match metadata {
            MetadataKind::Ownership | MetadataKind::Permissions => AttributeFlags::OWNER_CHANGED,
            MetadataKind::Extended => AttributeFlags::XATTR_MODIFIED,
            _ => AttributeFlags::INODE_META_MODIFIED,
        },
        EventKind::Modify(_) => AttributeFlags::MODIFIED,
        _ => return None,
    };
    Some(flags)
}

fn kind_flags(kind: &EventKind, path: &Path) -> AttributeFlags {
    match kind {
        EventKind::Create(CreateKind::File) | EventKind::Remove(RemoveKind::File) => {
            return AttributeFlags::IS_FILE;
        }
        EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => {
            return AttributeFlags::IS_DIRECTORY;
        }
        _ => {}
    }

    // Paths that are already gone are reported as files.
    match std::fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => AttributeFlags::IS_DIRECTORY,
        _ => AttributeFlags::IS_FILE,
    }
}

/// Build the callback handed to `notify`.
///
/// Must run outside the async runtime: it uses `blocking_send`.
pub fn event_handler(
    mut source: NotificationSource,
    tx: mpsc::Sender<Vec<RawNotification>>,
) -> impl FnMut(notify::Result<Event>) + Send + 'static {
    move |res| match res {
        Ok(event) => {
            let notifications = source.translate(&event);
            if notifications.is_empty() {
                trace!("dropping untranslated event: {:?}", event.kind);
                return;
            }
            if tx.blocking_send(notifications).is_err() {
                debug!("notification channel closed, dropping event");
            }
        }
        Err(e) => {
            warn!("Watch error: {e}");
        }
    }
}

/// Group notifications into batches and forward them to the pipeline.
///
/// With a zero `latency` every translated event becomes its own batch.
/// Otherwise everything arriving within `latency` of the first notification
/// is delivered together, in arrival order.
pub async fn coalesce(
    mut notifications: mpsc::Receiver<Vec<RawNotification>>,
    batches: mpsc::Sender<NotificationBatch>,
    latency: Duration,
    shutdown: CancellationToken,
) {
    loop {
        let mut pending = tokio::select! {
            biased;
            () = shutdown.cancelled() => break,
            next = notifications.recv() => match next {
                Some(first) => first,
                None => break,
            },
        };

        if !latency.is_zero() {
            let deadline = Instant::now() + latency;
            loop {
                tokio::select! {
                    biased;
                    // the pending batch is dropped along with the subscription
                    () = shutdown.cancelled() => return,
                    next = tokio::time::timeout_at(deadline, notifications.recv()) => match next {
                        Ok(Some(more)) => pending.extend(more),
                        Ok(None) | Err(_) => break,
                    },
                }
            }
        }

        let Some(batch) = NotificationBatch::new(pending) else {
            continue;
        };
        if batches.send(batch).await.is_err() {
            debug!("batch channel closed, stopping coalescer");
            break;
        }
    }
}
