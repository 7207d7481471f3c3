//! Raw notifications as delivered by the notification source.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::flags::AttributeFlags;

/// One change record for one filesystem object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNotification {
    /// Path to the affected file or directory.
    pub path: PathBuf,

    /// Attributes reported for the change.
    pub flags: AttributeFlags,

    /// Monotonically increasing id assigned by the source.
    pub sequence_id: u64,
}

impl RawNotification {
    /// Create a new notification.
    pub fn new(path: impl Into<PathBuf>, flags: AttributeFlags, sequence_id: u64) -> Self {
        Self {
            path: path.into(),
            flags,
            sequence_id,
        }
    }

    /// Object kind derived from the kind bits, if any is set.
    pub fn kind(&self) -> Option<ObjectKind> {
        ObjectKind::from_flags(self.flags)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// An ordered, non-empty group of notifications delivered together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationBatch {
    notifications: Vec<RawNotification>,
}

impl NotificationBatch {
    /// Create a batch. Returns `None` for an empty vector.
    pub fn new(notifications: Vec<RawNotification>) -> Option<Self> {
        if notifications.is_empty() {
            None
        } else {
            Some(Self { notifications })
        }
    }

    /// A batch holding exactly one notification.
    pub fn single(notification: RawNotification) -> Self {
        Self {
            notifications: vec![notification],
        }
    }

    pub fn notifications(&self) -> &[RawNotification] {
        &self.notifications
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub fn into_inner(self) -> Vec<RawNotification> {
        self.notifications
    }
}

/// File or directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ObjectKind {
    File = 1,
    Directory = 2,
}

impl ObjectKind {
    /// Kinds in rule evaluation order.
    pub const ALL: [ObjectKind; 2] = [ObjectKind::File, ObjectKind::Directory];

    /// Derive the kind from a flag set.
    ///
    /// `IS_FILE` wins when both kind bits are set.
    pub fn from_flags(flags: AttributeFlags) -> Option<Self> {
        if flags.is_file() {
            Some(Self::File)
        } else if flags.is_directory() {
            Some(Self::Directory)
        } else {
            None
        }
    }

    /// The flag bit that marks this kind.
    pub fn flag(self) -> AttributeFlags {
        match self {
            Self::File => AttributeFlags::IS_FILE,
            Self::Directory => AttributeFlags::IS_DIRECTORY,
        }
    }

    /// Byte used on the wire.
    pub fn wire_code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Directory => f.write_str("folder"),
        }
    }
}
