//! File identifiers for parsed source files.

use std::fmt;

/// Index of a source file inside a [`JavaModel`](crate::hir::JavaModel).
///
/// Ids are assigned in load order and are only meaningful for the model that
/// produced them. Common and platform models number their files separately.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FileId(u32);

impl FileId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Position of the file in its model's file list.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for FileId {
    #[inline]
    fn from(index: usize) -> Self {
        Self(index as u32)
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_id_from_index() {
        let id = FileId::from(3usize);
        assert_eq!(id, FileId::new(3));
        assert_eq!(id.index(), 3);
    }

    #[test]
    fn test_file_id_ordering() {
        assert!(FileId::new(1) < FileId::new(2));
    }
}
