//! Attribute flags carried by a raw notification.
//!
//! Bit values match the FSEvents item flags so a raw platform bitmask can be
//! converted with [`AttributeFlags::from_bits_truncate`].

use bitflags::bitflags;

bitflags! {
    /// Independent attributes that may co-occur on one notification.
    ///
    /// The notification source coalesces several underlying changes into a
    /// single record, so e.g. `CREATED | MODIFIED | RENAMED` is legal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AttributeFlags: u32 {
        const CREATED = 0x0000_0100;
        const REMOVED = 0x0000_0200;
        const INODE_META_MODIFIED = 0x0000_0400;
        const RENAMED = 0x0000_0800;
        const MODIFIED = 0x0000_1000;
        const FINDER_INFO_MODIFIED = 0x0000_2000;
        const OWNER_CHANGED = 0x0000_4000;
        const XATTR_MODIFIED = 0x0000_8000;
        const IS_FILE = 0x0001_0000;
        const IS_DIRECTORY = 0x0002_0000;
    }
}

impl AttributeFlags {
    pub fn is_file(self) -> bool {
        self.contains(Self::IS_FILE)
    }

    pub fn is_directory(self) -> bool {
        self.contains(Self::IS_DIRECTORY)
    }

    pub fn is_created(self) -> bool {
        self.contains(Self::CREATED)
    }

    pub fn is_removed(self) -> bool {
        self.contains(Self::REMOVED)
    }

    pub fn is_modified(self) -> bool {
        self.contains(Self::MODIFIED)
    }

    pub fn is_renamed(self) -> bool {
        self.contains(Self::RENAMED)
    }

    pub fn is_xattr_modified(self) -> bool {
        self.contains(Self::XATTR_MODIFIED)
    }

    pub fn is_owner_changed(self) -> bool {
        self.contains(Self::OWNER_CHANGED)
    }

    pub fn is_finder_info_modified(self) -> bool {
        self.contains(Self::FINDER_INFO_MODIFIED)
    }

    pub fn is_inode_meta_modified(self) -> bool {
        self.contains(Self::INODE_META_MODIFIED)
    }

    /// The change bits only, with the object kind bits masked off.
    pub fn changes(self) -> Self {
        self.difference(Self::IS_FILE | Self::IS_DIRECTORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_coalesced_attributes() {
        let flags = AttributeFlags::IS_FILE | AttributeFlags::CREATED | AttributeFlags::MODIFIED;

        assert!(flags.is_file());
        assert!(!flags.is_directory());
        assert!(flags.is_created());
        assert!(flags.is_modified());
        assert!(!flags.is_renamed());
        assert!(!flags.is_removed());
    }

    #[test]
    fn test_platform_bits_are_truncated() {
        // ItemIsFile | ItemRenamed | ItemIsSymlink | HistoryDone
        let raw = 0x0001_0000 | 0x0000_0800 | 0x0004_0000 | 0x0000_0010;
        let flags = AttributeFlags::from_bits_truncate(raw);

        assert_eq!(flags, AttributeFlags::IS_FILE | AttributeFlags::RENAMED);
    }

    #[test]
    fn test_changes_masks_kind() {
        let flags = AttributeFlags::IS_DIRECTORY | AttributeFlags::OWNER_CHANGED;

        assert_eq!(flags.changes(), AttributeFlags::OWNER_CHANGED);
        assert!(flags.changes().is_owner_changed());
    }
}
