//! Filtering of notifications about reserved metadata files.

use std::path::Path;

use crate::notification::NotificationBatch;

/// Finder metadata file that never produces an operation.
pub const RESERVED_METADATA_NAME: &str = ".DS_Store";

/// Whether the final segment of `path` is the reserved metadata name.
pub fn is_reserved_metadata_path(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name == RESERVED_METADATA_NAME)
}

/// Whether a batch must be dropped before classification.
///
/// Only single-notification batches are checked; larger batches pass through.
pub fn should_ignore(batch: &NotificationBatch) -> bool {
    match batch.notifications() {
        [only] => is_reserved_metadata_path(only.path()),
        _ => false,
    }
}
