//! Identifiers for type declarations inside a loaded model.

use std::fmt;

use crate::base::FileId;

/// Locates a type declaration inside a [`JavaModel`](super::JavaModel).
///
/// Combines the file the declaration lives in with the path of indices
/// leading to it: the first index selects a top-level type of the file, each
/// following index selects a member of the previous type.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct ClassId {
    /// The file containing this declaration
    pub file: FileId,
    path: Box<[u32]>,
}

impl ClassId {
    /// Identifier of the `index`-th top-level type of `file`.
    pub fn top_level(file: FileId, index: u32) -> Self {
        Self {
            file,
            path: Box::new([index]),
        }
    }

    /// Identifier of the type declared by member `index` of this type.
    pub fn nested(&self, index: u32) -> Self {
        let mut path = self.path.to_vec();
        path.push(index);
        Self {
            file: self.file,
            path: path.into_boxed_slice(),
        }
    }

    /// Index of the top-level type this declaration lives in.
    pub fn top_level_index(&self) -> u32 {
        self.path[0]
    }

    /// Member indices below the top-level type.
    pub fn member_path(&self) -> &[u32] {
        &self.path[1..]
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({:?}:{:?})", self.file, self.path)
    }
}
