//! Source roots of a module.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// The directories a module's sources live in.
///
/// Mirrors the `java.srcDirs` of a module: every file of the module sits
/// below exactly one root, and its path relative to that root is what gets
/// reproduced in the output directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceRoots {
    roots: Vec<PathBuf>,
}

impl SourceRoots {
    /// Create a root set from the given directories, in order, without
    /// duplicates.
    pub fn new<P: Into<PathBuf>>(dirs: impl IntoIterator<Item = P>) -> Self {
        let mut roots: Vec<PathBuf> = Vec::new();
        for dir in dirs {
            let dir = dir.into();
            if !roots.contains(&dir) {
                roots.push(dir);
            }
        }
        Self { roots }
    }

    /// Like [`SourceRoots::new`], but keeps only directories that exist.
    pub fn existing<P: Into<PathBuf>>(dirs: impl IntoIterator<Item = P>) -> Self {
        Self::new(dirs.into_iter().map(Into::into).filter(|dir| dir.is_dir()))
    }

    /// Path of `file` relative to the first root it lives under.
    pub fn relative_path(&self, file: &Path) -> Result<PathBuf> {
        self.roots
            .iter()
            .find_map(|root| file.strip_prefix(root).ok())
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::NoMatchingSource(file.to_path_buf()))
    }

    /// Iterate over all roots.
    pub fn iter(&self) -> impl Iterator<Item = &Path> + '_ {
        self.roots.iter().map(PathBuf::as_path)
    }

    /// Get the number of roots.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Check if there are no roots.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
