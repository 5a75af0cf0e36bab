//! Import repair for generated files.
//!
//! Members grafted from common classes reference types the platform file
//! never imported. The fixer merges the imports of the common file into the
//! generated one, shortens qualified names the printer left in place, and
//! lays the header out as `package`, blank line, sorted imports, blank line.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};
use rustc_hash::FxHashMap;
use tracing::debug;

use super::copy_file;
use crate::error::{Error, Result};
use crate::hir::{CommonModel, JavaModel, qualify};
use crate::merge::EmitSet;

static IMPORT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*import\s+(static\s+)?((?:[\w$]+\s*\.\s*)+)([\w$]+|\*)\s*;.*$")
        .expect("import regex")
});

static PACKAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*package\s.*$").expect("package regex")
});

/// One parsed import line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportData {
    /// The original line, trimmed.
    pub statement: String,
    /// Imported path, e.g. `java.util.List`, or `java.util` for `java.util.*`.
    pub path: String,
    /// Simple name the import brings into scope; `*` for wildcards.
    pub reference: String,
    pub is_static: bool,
}

impl ImportData {
    pub fn parse(line: &str) -> Option<Self> {
        let captures = IMPORT_PATTERN.captures(line)?;
        let is_static = captures.get(1).is_some();
        let prefix: String = captures[2].chars().filter(|c| !c.is_whitespace()).collect();
        let reference = captures[3].to_string();
        let path = if reference == "*" {
            prefix.trim_end_matches('.').to_string()
        } else {
            format!("{prefix}{reference}")
        };
        Some(Self {
            statement: line.trim().to_string(),
            path,
            reference,
            is_static,
        })
    }

    pub fn is_wildcard(&self) -> bool {
        self.reference == "*"
    }

    /// Deduplication key: the simple name, or the full path for wildcards.
    fn key(&self) -> String {
        let name = if self.is_wildcard() {
            format!("{}.*", self.path)
        } else {
            self.reference.clone()
        };
        if self.is_static {
            format!("static {name}")
        } else {
            name
        }
    }
}

/// Every import statement of `text`, in order.
pub fn parse_imports(text: &str) -> Vec<ImportData> {
    text.lines().filter_map(ImportData::parse).collect()
}

/// Union of two import lists keyed by simple name, sorted. On conflict the
/// first list wins.
pub fn merge_imports(
    primary: impl IntoIterator<Item = ImportData>,
    secondary: impl IntoIterator<Item = ImportData>,
) -> Vec<ImportData> {
    let mut merged: IndexMap<String, ImportData> = IndexMap::new();
    for import in primary.into_iter().chain(secondary) {
        merged.entry(import.key()).or_insert(import);
    }
    let mut imports: Vec<ImportData> = merged.into_values().collect();
    imports.sort_by(|a, b| {
        (a.is_static, &a.statement).cmp(&(b.is_static, &b.statement))
    });
    imports
}

/// Repair the imports of one generated source. Returns `None` when the
/// source has no package declaration.
pub fn fix_source(generated: &str, common: &str, package: Option<&str>) -> Result<Option<String>> {
    let emitted = parse_imports(generated);
    let body = generated
        .lines()
        .filter(|line| !IMPORT_PATTERN.is_match(line))
        .collect::<Vec<_>>()
        .join("\n");
    let imports = merge_imports(emitted, parse_imports(common));
    let body = shorten_names(&body, &imports, package)?;

    let Some(package_line) = PACKAGE_PATTERN.find(&body) else {
        return Ok(None);
    };
    let (head, rest) = body.split_at(package_line.end());
    let mut out = String::with_capacity(body.len() + imports.len() * 32);
    out.push_str(head);
    out.push_str("\n\n");
    if !imports.is_empty() {
        for import in &imports {
            out.push_str(&import.statement);
            out.push('\n');
        }
        out.push('\n');
    }
    out.push_str(rest.trim_start());
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(Some(out))
}

/// Replace imported qualified names by their simple names, then drop the
/// `java.lang.` and own-package prefixes in front of type names.
fn shorten_names(body: &str, imports: &[ImportData], package: Option<&str>) -> Result<String> {
    let names: FxHashMap<&str, &str> = imports
        .iter()
        .filter(|i| !i.is_wildcard())
        .map(|i| (i.path.as_str(), i.reference.as_str()))
        .collect();

    let mut body = body.to_string();
    if !names.is_empty() {
        // Longest first, so a path never matches as the prefix of another.
        let mut paths: Vec<&str> = names.keys().copied().collect();
        paths.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let alternation = paths.iter().map(|p| regex::escape(p)).collect::<Vec<_>>().join("|");
        let imported = Regex::new(&format!(r"(?m)(^|[^\w$.])({alternation})\b"))?;
        body = imported
            .replace_all(&body, |caps: &Captures<'_>| {
                let path = &caps[2];
                format!("{}{}", &caps[1], names.get(path).copied().unwrap_or(path))
            })
            .into_owned();
    }

    let prefixes = std::iter::once("java.lang")
        .chain(package)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    let implicit = Regex::new(&format!(r"(?m)(^|[^\w$.])(?:{prefixes})\.([A-Z])"))?;
    Ok(implicit.replace_all(&body, "${1}${2}").into_owned())
}

/// Counts of a [`fix_imports`] run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixSummary {
    pub fixed: usize,
    pub copied: usize,
}

/// Fix every generated file of `model` under `output`, and copy the sources
/// that were not generated.
pub fn fix_imports(
    model: &JavaModel,
    common: &CommonModel,
    emit: &EmitSet,
    output: &Path,
) -> Result<FixSummary> {
    let mut summary = FixSummary::default();
    for file in model.files() {
        let relative = model.roots().relative_path(&file.path)?;
        let generated = output.join(&relative);
        let counterpart = file
            .unit
            .types
            .iter()
            .find_map(|t| common.common_class_by_name(&qualify(file.package(), &t.name)));

        match counterpart {
            Some(counterpart) if emit.touches_file(file) && generated.is_file() => {
                fix_file(&generated, &counterpart.file.text, file.package())?;
                summary.fixed += 1;
            }
            _ => {
                copy_file(&file.path, &generated)?;
                summary.copied += 1;
            }
        }
    }
    debug!(fixed = summary.fixed, copied = summary.copied, "imports fixed");
    Ok(summary)
}

fn fix_file(generated: &Path, common: &str, package: Option<&str>) -> Result<()> {
    let text = fs::read_to_string(generated).map_err(Error::io("Fixing imports", generated))?;
    let fixed = fix_source(&text, common, package)?
        .ok_or_else(|| Error::MalformedSource(generated.to_path_buf()))?;
    fs::write(generated, fixed).map_err(Error::io("Fixing imports", generated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("import java.util.List;", "java.util.List", "List", false)]
    #[case("import static java.lang.Math.max;", "java.lang.Math.max", "max", true)]
    #[case("  import java.io.*;", "java.io", "*", false)]
    #[case("import a.b.Outer$Inner; // note", "a.b.Outer$Inner", "Outer$Inner", false)]
    fn test_parse_import(
        #[case] line: &str,
        #[case] path: &str,
        #[case] reference: &str,
        #[case] is_static: bool,
    ) {
        let import = ImportData::parse(line).unwrap();
        assert_eq!(import.path, path);
        assert_eq!(import.reference, reference);
        assert_eq!(import.is_static, is_static);
    }

    #[test]
    fn test_non_import_lines() {
        assert!(ImportData::parse("// import a.B;").is_none());
        assert!(ImportData::parse("importable x;").is_none());
    }

    #[test]
    fn test_emitted_import_wins_conflict() {
        let merged = merge_imports(
            parse_imports("import x.List;"),
            parse_imports("import java.util.List;\nimport java.util.Map;\nimport java.io.*;"),
        );
        let statements: Vec<_> = merged.iter().map(|i| i.statement.as_str()).collect();
        assert_eq!(
            statements,
            ["import java.io.*;", "import java.util.Map;", "import x.List;"]
        );
    }

    #[test]
    fn test_fix_source_layout() {
        let generated = "package a;\n\nimport java.util.List;\n\npublic class C {\n    java.util.Map<String, java.lang.String> m;\n    a.Other o;\n    List<a.sub.Thing> l;\n}\n";
        let common = "package a;\nimport java.util.Map;\nclass C {}\n";

        let fixed = fix_source(generated, common, Some("a")).unwrap().unwrap();
        assert_eq!(
            fixed,
            "package a;\n\nimport java.util.List;\nimport java.util.Map;\n\npublic class C {\n    Map<String, String> m;\n    Other o;\n    List<a.sub.Thing> l;\n}\n"
        );
    }

    #[test]
    fn test_fix_source_is_idempotent() {
        let generated = "package a;\nimport b.B;\n\n\nclass C extends b.B implements c.D {\n}\n\n";
        let common = "package a;\nimport c.D;\n";

        let once = fix_source(generated, common, Some("a")).unwrap().unwrap();
        let twice = fix_source(&once, common, Some("a")).unwrap().unwrap();
        assert_eq!(once, twice);
        assert!(once.contains("class C extends B implements D {"));
    }

    #[test]
    fn test_shorten_prefers_longest_path() {
        let generated = "package a;\nimport b.Outer;\nimport b.Outer.Inner;\nimport c.Box$Item;\n\nclass C {\n    b.Outer.Inner i;\n    b.Outer o;\n    c.Box$Item item;\n    java.lang.System.out s;\n}\n";

        let fixed = fix_source(generated, "", Some("a")).unwrap().unwrap();
        assert!(fixed.contains("    Inner i;\n    Outer o;\n    Box$Item item;\n    System.out s;\n"), "{fixed}");
    }

    #[test]
    fn test_missing_package_declaration() {
        assert!(fix_source("class C {}\n", "", None).unwrap().is_none());
    }

    #[test]
    fn test_no_imports_keeps_single_blank_line() {
        let fixed = fix_source("package a;\nclass C {}", "package a;", Some("a")).unwrap().unwrap();
        assert_eq!(fixed, "package a;\n\nclass C {}\n");
    }
}
