use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::hir::{JavaModel, SourceRoots};

/// Loads the Java sources of a module from its source roots.
pub struct WorkspaceLoader;

impl WorkspaceLoader {
    pub fn new() -> Self {
        Self
    }

    /// Collects every `.java` file below `roots`, root by root, each root in
    /// sorted path order.
    pub fn collect_java_files(&self, roots: &SourceRoots) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for root in roots.iter() {
            for entry in WalkDir::new(root).sort_by_file_name() {
                let entry = entry.map_err(|err| Error::Io {
                    operation: "Reading directory",
                    path: root.to_path_buf(),
                    source: err.into(),
                })?;
                if entry.file_type().is_file() && is_java_file(entry.path()) {
                    paths.push(entry.into_path());
                }
            }
        }
        Ok(paths)
    }

    /// Loads and parses every Java file of `roots` into a model.
    ///
    /// Unreadable files abort immediately; parse failures are collected and
    /// reported together.
    pub fn load(&self, roots: SourceRoots) -> Result<JavaModel> {
        let paths = self.collect_java_files(&roots)?;
        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            let text = fs::read_to_string(&path).map_err(Error::io("Reading source", &path))?;
            sources.push((path, text));
        }
        debug!(files = sources.len(), roots = roots.len(), "loaded sources");
        JavaModel::parse(roots, sources)
    }
}

impl Default for WorkspaceLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn is_java_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "java")
}
