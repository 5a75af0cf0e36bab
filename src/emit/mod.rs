//! Writing the generated source tree.

pub mod imports;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::hir::JavaModel;
use crate::merge::EmitSet;
use crate::syntax::print_unit;

pub use imports::{FixSummary, ImportData, fix_imports, fix_source};

/// Print every file that declares a touched class into `output`, at its
/// path relative to its source root. Returns the written paths.
pub fn write_emitted(model: &JavaModel, emit: &EmitSet, output: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for file in model.files().iter().filter(|f| emit.touches_file(f)) {
        let dest = output.join(model.roots().relative_path(&file.path)?);
        create_parent(&dest)?;
        fs::write(&dest, print_unit(&file.unit)).map_err(Error::io("Writing source", &dest))?;
        debug!(path = %dest.display(), "emitted");
        written.push(dest);
    }
    Ok(written)
}

/// Copy `from` to `to` byte for byte, creating parent directories.
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    create_parent(to)?;
    fs::copy(from, to).map_err(Error::io("Copying file", from))?;
    Ok(())
}

/// Delete `dir` and everything below it, deepest paths first. Entries that
/// cannot be removed are logged and skipped.
pub fn clear_output(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in WalkDir::new(dir).contents_first(true) {
        let entry = entry.map_err(|err| Error::Io {
            operation: "Deleting files",
            path: dir.to_path_buf(),
            source: err.into(),
        })?;
        let path = entry.path();
        let removed = if entry.file_type().is_dir() {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };
        if let Err(err) = removed {
            warn!(path = %path.display(), %err, "Error deleting file");
        }
    }
    Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent).map_err(Error::io("Creating folder", parent)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_output_removes_tree() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir_all(out.join("a/b")).unwrap();
        fs::write(out.join("a/b/C.java"), "class C {}").unwrap();
        fs::write(out.join("D.java"), "class D {}").unwrap();

        clear_output(&out).unwrap();
        assert!(!out.exists());
        clear_output(&out).unwrap();
    }

    #[test]
    fn test_copy_file_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("A.java");
        fs::write(&from, "class A {}\r\n").unwrap();
        let to = dir.path().join("x/y/A.java");

        copy_file(&from, &to).unwrap();
        assert_eq!(fs::read(&to).unwrap(), fs::read(&from).unwrap());
    }
}
