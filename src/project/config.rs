//! Project configuration (`overwrite.toml`).
//!
//! Names the common module, the platform modules checked against it, and
//! where generated sources go.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::hir::SourceRoots;

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

/// Top-level project configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Rewrite marked classes into the output tree (default: `false`, only
    /// validate).
    #[serde(default)]
    pub generate_code: bool,

    /// Parent of the per-module output directories.
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// The module every platform module overwrites.
    pub common: ModuleConfig,

    /// Platform modules.
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}

fn default_output_root() -> PathBuf {
    PathBuf::from("build/generated/overwrite")
}

/// One module of the project.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    pub name: String,

    /// Source directories; missing ones are ignored.
    #[serde(default)]
    pub sources: Vec<PathBuf>,

    /// Output directory (default: `<output_root>/<name>`).
    #[serde(default)]
    pub output: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved options
// ---------------------------------------------------------------------------

/// A module as the pipeline sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub sources: Vec<PathBuf>,
}

impl Module {
    pub fn new<P: Into<PathBuf>>(name: impl Into<String>, sources: impl IntoIterator<Item = P>) -> Self {
        Self {
            name: name.into(),
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }

    /// The configured source directories that exist.
    pub fn source_roots(&self) -> SourceRoots {
        SourceRoots::existing(self.sources.iter().cloned())
    }
}

/// Per-module pipeline options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub common: Module,
    pub output_directory: PathBuf,
    pub generate_code: bool,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl ProjectConfig {
    /// Load a config file; relative paths resolve against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_owned(),
            message: format!("could not read file: {e}"),
        })?;
        let base = path.parent().unwrap_or(Path::new(""));
        Self::parse(&contents, base).map_err(|message| Error::Config {
            path: path.to_owned(),
            message,
        })
    }

    /// Parse a config from TOML, resolving relative paths against `base`.
    pub fn parse(toml_str: &str, base: &Path) -> Result<Self, String> {
        let mut config: Self = toml::from_str(toml_str).map_err(|e| {
            let message = e.message().to_owned();
            match e.span() {
                Some(span) => {
                    let line = toml_str[..span.start].chars().filter(|&c| c == '\n').count() + 1;
                    format!("line {line}: {message}")
                }
                None => message,
            }
        })?;
        config.resolve(base);
        Ok(config)
    }

    fn resolve(&mut self, base: &Path) {
        self.output_root = base.join(&self.output_root);
        for module in std::iter::once(&mut self.common).chain(&mut self.modules) {
            for source in &mut module.sources {
                *source = base.join(&*source);
            }
            if let Some(output) = &mut module.output {
                *output = base.join(&*output);
            }
        }
    }

    pub fn common_module(&self) -> Module {
        Module::new(self.common.name.clone(), self.common.sources.iter().cloned())
    }

    pub fn module(&self, name: &str) -> Option<&ModuleConfig> {
        std::iter::once(&self.common)
            .chain(&self.modules)
            .find(|m| m.name == name)
    }

    /// Every module in run order: the common module first.
    pub fn all_modules(&self) -> impl Iterator<Item = &ModuleConfig> + '_ {
        std::iter::once(&self.common).chain(&self.modules)
    }

    /// Pipeline options for `module`.
    pub fn options_for(&self, module: &ModuleConfig) -> Options {
        Options {
            common: self.common_module(),
            output_directory: module
                .output
                .clone()
                .unwrap_or_else(|| self.output_root.join(&module.name)),
            generate_code: self.generate_code,
        }
    }
}

impl ModuleConfig {
    pub fn to_module(&self) -> Module {
        Module::new(self.name.clone(), self.sources.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
generate_code = true
output_root = "out"

[common]
name = "common"
sources = ["common/src/main/java"]

[[modules]]
name = "fabric"
sources = ["fabric/src/main/java", "fabric/src/extra/java"]

[[modules]]
name = "forge"
sources = ["forge/src/main/java"]
output = "forge/build/generated"
"#;

    #[test]
    fn test_parse_full_config() {
        let cfg = ProjectConfig::parse(FULL, Path::new("/p")).unwrap();

        assert!(cfg.generate_code);
        assert_eq!(cfg.common.sources, [PathBuf::from("/p/common/src/main/java")]);
        assert_eq!(cfg.modules.len(), 2);
        assert_eq!(cfg.all_modules().count(), 3);

        let fabric = cfg.options_for(cfg.module("fabric").unwrap());
        assert_eq!(fabric.output_directory, PathBuf::from("/p/out/fabric"));
        assert_eq!(fabric.common.name, "common");

        let forge = cfg.options_for(cfg.module("forge").unwrap());
        assert_eq!(forge.output_directory, PathBuf::from("/p/forge/build/generated"));
    }

    #[test]
    fn test_defaults() {
        let cfg = ProjectConfig::parse("[common]\nname = \"c\"\n", Path::new("")).unwrap();
        assert!(!cfg.generate_code);
        assert_eq!(cfg.output_root, PathBuf::from("build/generated/overwrite"));
        assert!(cfg.modules.is_empty());
    }

    #[test]
    fn test_rejects_unknown_field() {
        let err = ProjectConfig::parse("[common]\nname = \"c\"\nsrc = []\n", Path::new("")).unwrap_err();
        assert!(err.contains("unknown field"), "{err}");
    }

    #[test]
    fn test_common_is_required() {
        assert!(ProjectConfig::parse("generate_code = true\n", Path::new("")).is_err());
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overwrite.toml");
        std::fs::write(&path, "[common\n").unwrap();

        let err = ProjectConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config { path: ref p, .. } if p == &path));
    }
}
