//! Existence checks used to disambiguate coalesced flags.

use std::path::Path;

/// Answers whether a filesystem object exists at a path right now.
pub trait ExistenceOracle {
    fn exists(&self, path: &Path) -> bool;
}

/// Oracle backed by the real filesystem. Follows symlinks like `stat(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsOracle;

impl ExistenceOracle for FsOracle {
    fn exists(&self, path: &Path) -> bool {
        std::fs::metadata(path).is_ok()
    }
}

impl<F> ExistenceOracle for F
where
    F: Fn(&Path) -> bool,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}
