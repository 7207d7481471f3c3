//! Classification of notification batches into operations.
//!
//! The source coalesces several underlying changes into one notification, so
//! a flag pattern alone is often ambiguous (a `RENAMED` file may have left
//! the tree or arrived in it). The rules below resolve that with an ordered
//! rule table and an [`ExistenceOracle`] lookup.

use std::path::PathBuf;

use tracing::trace;

use crate::flags::AttributeFlags;
use crate::ignore;
use crate::notification::{NotificationBatch, ObjectKind, RawNotification};
use crate::operation::Operation;
use crate::oracle::ExistenceOracle;

/// Classify one batch into at most one operation.
///
/// Single-notification batches about the reserved metadata file are dropped
/// first. Unmatched flag combinations and batches of any size other than one
/// or two produce `None`.
pub fn classify<O: ExistenceOracle>(batch: &NotificationBatch, oracle: &O) -> Option<Operation> {
    if ignore::should_ignore(batch) {
        trace!("ignoring metadata notification");
        return None;
    }

    classify_unfiltered(batch, oracle)
}

/// Classify without applying the ignore filter.
pub(crate) fn classify_unfiltered<O: ExistenceOracle>(
    batch: &NotificationBatch,
    oracle: &O,
) -> Option<Operation> {
    match batch.notifications() {
        [single] => classify_single(single, oracle),
        [first, second] => classify_rename(first, second, oracle),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Removed,
    Created,
    Added,
    Modified,
}

/// First match wins. There is no directory rule for `Modified`.
const PRECEDENCE: [(Rule, ObjectKind); 7] = [
    (Rule::Removed, ObjectKind::File),
    (Rule::Removed, ObjectKind::Directory),
    (Rule::Created, ObjectKind::File),
    (Rule::Created, ObjectKind::Directory),
    (Rule::Added, ObjectKind::File),
    (Rule::Added, ObjectKind::Directory),
    (Rule::Modified, ObjectKind::File),
];

impl Rule {
    fn matches(self, kind: ObjectKind, flags: AttributeFlags, exists: &impl Fn() -> bool) -> bool {
        if !flags.contains(kind.flag()) {
            return false;
        }

        match self {
            Self::Removed => flags.is_removed() || (flags.is_renamed() && !exists()),
            Self::Created => flags.is_created() && exists(),
            Self::Added => flags.is_renamed() && !flags.is_modified() && exists(),
            Self::Modified => flags.is_modified() && exists(),
        }
    }

    fn operation(self, kind: ObjectKind, path: PathBuf) -> Operation {
        match self {
            Self::Removed => Operation::Removed { kind, path },
            Self::Created => Operation::Created { kind, path },
            Self::Added => Operation::Added { kind, path },
            Self::Modified => Operation::Modified { kind, path },
        }
    }
}

fn classify_single<O: ExistenceOracle>(
    notification: &RawNotification,
    oracle: &O,
) -> Option<Operation> {
    let exists = || oracle.exists(notification.path());

    PRECEDENCE
        .into_iter()
        .find(|(rule, kind)| rule.matches(*kind, notification.flags, &exists))
        .map(|(rule, kind)| rule.operation(kind, notification.path.clone()))
}

/// Detect the two halves of one rename delivered as adjacent sequence ids.
fn classify_rename<O: ExistenceOracle>(
    first: &RawNotification,
    second: &RawNotification,
    oracle: &O,
) -> Option<Operation> {
    if first.sequence_id.checked_add(1) != Some(second.sequence_id) {
        return None;
    }

    // Both halves are judged by the first notification's flags; the second
    // half's own flags are never consulted.
    let flags = first.flags;
    let kind = ObjectKind::ALL
        .into_iter()
        .find(|kind| flags.contains(kind.flag()) && flags.is_renamed())?;

    if !oracle.exists(second.path()) {
        return None;
    }

    Some(Operation::Renamed {
        kind,
        from: first.path.clone(),
        to: second.path.clone(),
    })
}
