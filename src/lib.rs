//! # overwrite
//!
//! Source-level overwrite engine for multi-platform Java projects. A
//! *common* module holds shared classes; each *platform* module redeclares
//! some of them, marked with `@OverwriteClass`, `@Overwrite`, `@Inherit` or
//! `@InheritMissingMembers`. The engine folds common code into the marked
//! platform classes, writes the generated tree, repairs its imports and
//! validates that every platform class still honours the common surface.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project → config, source discovery, per-module pipeline
//!   ↓
//! emit    → output tree, import fixer
//!   ↓
//! merge   → rewrite passes, emit set
//! check   → validators, error report
//!   ↓
//! hir     → Java models, markers, structural accessors, common cache
//!   ↓
//! syntax  → lexer, declaration parser, printer
//!   ↓
//! base    → primitives (FileId, LineIndex, TextRange)
//! ```

/// Foundation types: FileId, LineIndex, text ranges
pub mod base;

pub mod check;
pub mod emit;
pub mod error;
pub mod hir;
pub mod merge;
pub mod project;
pub mod syntax;

pub use base::{FileId, LineCol, LineIndex, TextRange, TextSize};
pub use check::{ErrorReport, ReportKind};
pub use error::{Error, Result};
pub use hir::{CommonCache, CommonModel, JavaModel, Mark};
pub use merge::EmitSet;
pub use project::{Module, Options, Outcome, Pipeline, ProjectConfig};
