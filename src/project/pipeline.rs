//! Per-module driver.
//!
//! For each module: clear its output directory, make sure the common model
//! is cached, then either rewrite and emit the marked classes or only check
//! the marks, and finally validate the result.

use std::path::PathBuf;

use tracing::{debug, info, info_span};

use super::WorkspaceLoader;
use super::config::{Module, Options};
use crate::check::validate;
use crate::emit::{self, fix_imports};
use crate::error::{Error, Result};
use crate::hir::{CommonCache, CommonModel};
use crate::merge;

/// What a module run produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The module has no existing source directory.
    Skipped,
    /// The module is the common module; only the cache was filled.
    CommonModule,
    /// The module was validated against the common module.
    Validated {
        /// Source roots the build should compile instead of the originals,
        /// when code was generated.
        compile_sources: Option<PathBuf>,
        /// Number of files printed from the rewritten model.
        emitted: usize,
    },
}

/// Runs modules against a shared [`CommonCache`].
pub struct Pipeline<'c> {
    cache: &'c CommonCache,
    loader: WorkspaceLoader,
}

impl<'c> Pipeline<'c> {
    pub fn new(cache: &'c CommonCache) -> Self {
        Self {
            cache,
            loader: WorkspaceLoader::new(),
        }
    }

    pub fn run(&self, module: &Module, options: &Options) -> Result<Outcome> {
        let _span = info_span!("module", name = %module.name).entered();

        let roots = module.source_roots();
        if roots.is_empty() {
            info!("No source directories in {}. Skipping.", module.name);
            return Ok(Outcome::Skipped);
        }

        emit::clear_output(&options.output_directory)?;

        let common = self.cache.get_or_init(|| {
            info!(module = %options.common.name, "loading common sources");
            let model = self.loader.load(options.common.source_roots())?;
            Ok(CommonModel::new(model))
        })?;

        if module.name == options.common.name {
            return Ok(Outcome::CommonModule);
        }

        let mut model = self.loader.load(roots)?;
        let (compile_sources, emitted) = if options.generate_code {
            let emit_set = merge::run(&mut model, &common)?;
            for class in emit_set.iter() {
                debug!(class, "emitting");
            }
            let written = emit::write_emitted(&model, &emit_set, &options.output_directory)?;
            let summary = fix_imports(&model, &common, &emit_set, &options.output_directory)?;
            info!(
                emitted = written.len(),
                copied = summary.copied,
                output = %options.output_directory.display(),
                "generated sources"
            );
            (Some(options.output_directory.clone()), written.len())
        } else {
            merge::verify(&model, &common)?;
            (None, 0)
        };

        let report = validate(&model, &common);
        if !report.is_empty() {
            report.print(&module.name);
            return Err(Error::InvalidOverwrites {
                module: module.name.clone(),
                report,
            });
        }

        Ok(Outcome::Validated {
            compile_sources,
            emitted,
        })
    }
}
