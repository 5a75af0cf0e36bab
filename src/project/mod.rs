//! Project configuration, source loading and the module pipeline.

pub mod config;
mod pipeline;
mod workspace_loader;

pub use config::{Module, ModuleConfig, Options, ProjectConfig};
pub use pipeline::{Outcome, Pipeline};
pub use workspace_loader::WorkspaceLoader;
