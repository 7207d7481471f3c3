//! Semantic operations produced by classification.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::notification::ObjectKind;

/// The classified, consumer-facing change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Object appeared under the root by a rename (moved in).
    Added { kind: ObjectKind, path: PathBuf },

    /// File contents changed.
    Modified { kind: ObjectKind, path: PathBuf },

    /// Object was created.
    Created { kind: ObjectKind, path: PathBuf },

    /// Object was deleted or moved away.
    Removed { kind: ObjectKind, path: PathBuf },

    /// Object was renamed within the root.
    Renamed {
        kind: ObjectKind,
        from: PathBuf,
        to: PathBuf,
    },
}

impl Operation {
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Added { .. } => Opcode::Added,
            Self::Modified { .. } => Opcode::Modified,
            Self::Created { .. } => Opcode::Created,
            Self::Renamed { .. } => Opcode::Renamed,
            Self::Removed { .. } => Opcode::Removed,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Added { kind, .. }
            | Self::Modified { kind, .. }
            | Self::Created { kind, .. }
            | Self::Removed { kind, .. }
            | Self::Renamed { kind, .. } => *kind,
        }
    }

    /// Paths in wire order: the single path, or `from` then `to`.
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            Self::Added { path, .. }
            | Self::Modified { path, .. }
            | Self::Created { path, .. }
            | Self::Removed { path, .. } => vec![path.as_path()],
            Self::Renamed { from, to, .. } => vec![from.as_path(), to.as_path()],
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added { kind, path } => write!(f, "{kind} added: {}", path.display()),
            Self::Modified { kind, path } => write!(f, "{kind} modified: {}", path.display()),
            Self::Created { kind, path } => write!(f, "{kind} created: {}", path.display()),
            Self::Removed { kind, path } => write!(f, "{kind} removed: {}", path.display()),
            Self::Renamed { kind, from, to } => write!(
                f,
                "{kind} renamed: {} -> {}",
                from.display(),
                to.display()
            ),
        }
    }
}

/// Wire byte identifying the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Added = 3,
    Modified = 4,
    Created = 5,
    Renamed = 6,
    Removed = 7,
}

impl Opcode {
    pub fn wire_code(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_opcodes() {
        assert_eq!(Opcode::Added.wire_code(), 3);
        assert_eq!(Opcode::Modified.wire_code(), 4);
        assert_eq!(Opcode::Created.wire_code(), 5);
        assert_eq!(Opcode::Renamed.wire_code(), 6);
        assert_eq!(Opcode::Removed.wire_code(), 7);
    }

    #[test]
    fn test_display() {
        let created = Operation::Created {
            kind: ObjectKind::File,
            path: PathBuf::from("/w/a.txt"),
        };
        let renamed = Operation::Renamed {
            kind: ObjectKind::Directory,
            from: PathBuf::from("/w/a"),
            to: PathBuf::from("/w/b"),
        };

        assert_eq!(created.to_string(), "file created: /w/a.txt");
        assert_eq!(renamed.to_string(), "folder renamed: /w/a -> /w/b");
    }

    #[test]
    fn test_paths_in_wire_order() {
        let renamed = Operation::Renamed {
            kind: ObjectKind::File,
            from: PathBuf::from("/w/old.txt"),
            to: PathBuf::from("/w/new.txt"),
        };

        assert_eq!(renamed.opcode(), Opcode::Renamed);
        assert_eq!(renamed.kind(), ObjectKind::File);
        assert_eq!(
            renamed.paths(),
            vec![Path::new("/w/old.txt"), Path::new("/w/new.txt")]
        );
    }
}
