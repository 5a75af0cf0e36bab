//! Error types for the overwrite engine.
//!
//! Structural validation problems are collected into an [`ErrorReport`] and
//! surface once, as [`Error::InvalidOverwrites`]. Everything else aborts the
//! run at the point of failure.

use std::io;
use std::path::{Path, PathBuf};

use smol_str::SmolStr;
use thiserror::Error;

use crate::check::ErrorReport;
use crate::syntax::ParseError;

#[derive(Debug, Error)]
pub enum Error {
    /// A platform class asks to overwrite or inherit from a common class
    /// that does not exist.
    #[error("Class {class} has nothing to inherit")]
    MissingCommonClass { class: SmolStr },

    /// An `@Overwrite` member has no structural match in the common class.
    #[error("No overwrite target for {kind}: {member} in {class}")]
    MissingOverwriteTarget {
        class: SmolStr,
        kind: &'static str,
        member: String,
    },

    /// The common-model cache was read before it was built.
    #[error("Plugins ran out of order")]
    PluginOrdering,

    #[error("Project '{module}' contains invalid overwrites")]
    InvalidOverwrites { module: String, report: ErrorReport },

    #[error("{operation} {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    /// An emitted file has no package declaration to anchor imports on.
    #[error("No package declaration in Java file: {}", .0.display())]
    MalformedSource(PathBuf),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Failed to load {} file(s):\n  {}", .0.len(), join_lines(.0))]
    Load(Vec<ParseError>),

    #[error("No matching source root: {}", .0.display())]
    NoMatchingSource(PathBuf),

    /// The import fixer could not build a pattern for the imported names.
    #[error("Invalid name pattern: {0}")]
    NamePattern(#[from] regex::Error),

    #[error("Invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Adapter for `map_err` that tags an I/O failure with the operation and
    /// the path it was working on.
    pub(crate) fn io(operation: &'static str, path: &Path) -> impl FnOnce(io::Error) -> Error {
        let path = path.to_owned();
        move |source| Error::Io {
            operation,
            path,
            source,
        }
    }
}

fn join_lines(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n  ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::LineCol;

    #[test]
    fn test_missing_common_class_message() {
        let err = Error::MissingCommonClass {
            class: SmolStr::new("a.Z"),
        };
        assert_eq!(err.to_string(), "Class a.Z has nothing to inherit");
    }

    #[test]
    fn test_load_lists_every_file() {
        let err = Error::Load(vec![
            ParseError {
                path: PathBuf::from("A.java"),
                position: LineCol::new(0, 0),
                message: "bad".into(),
            },
            ParseError {
                path: PathBuf::from("B.java"),
                position: LineCol::new(1, 2),
                message: "worse".into(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Failed to load 2 file(s):\n  A.java:1:1: bad\n  B.java:2:3: worse"
        );
    }

    #[test]
    fn test_io_context() {
        let err = Error::io("Copying file", Path::new("x/A.java"))(io::Error::other("denied"));
        assert_eq!(err.to_string(), "Copying file x/A.java: denied");
    }
}
