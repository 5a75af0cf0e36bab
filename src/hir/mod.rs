//! Semantic layer: loaded models, structural member queries, markers and
//! the shared common-model cache.

pub mod access;
mod cache;
mod ids;
mod input;
pub mod marks;
mod source;

pub use access::{MemberRef, Signature};
pub use cache::{CommonCache, CommonModel};
pub use ids::ClassId;
pub use input::SourceRoots;
pub use marks::{Annotated, Mark};
pub use source::{ClassRef, JavaModel, SourceFile, TypeScope, qualify, relative_name};
