//! The in-memory model of a module's Java sources.

use std::path::PathBuf;
use std::sync::Arc;

use smol_str::{SmolStr, format_smolstr};

use super::{ClassId, SourceRoots};
use crate::base::FileId;
use crate::error::{Error, Result};
use crate::syntax::{CompilationUnit, MemberKind, TypeDecl, parse_java};

/// One parsed source file. The original text is kept next to the tree: the
/// import fixer reads the imports of common files from it.
#[derive(Debug)]
pub struct SourceFile {
    pub id: FileId,
    pub path: PathBuf,
    pub text: Arc<str>,
    pub unit: CompilationUnit,
}

impl SourceFile {
    pub fn package(&self) -> Option<&str> {
        self.unit.package.as_deref()
    }
}

/// All Java sources of one module, in load order.
#[derive(Debug, Default)]
pub struct JavaModel {
    roots: SourceRoots,
    files: Vec<SourceFile>,
}

impl JavaModel {
    /// Parse the given `(path, text)` pairs. Every file is attempted; parse
    /// failures are reported together as [`Error::Load`].
    pub fn parse(
        roots: SourceRoots,
        sources: impl IntoIterator<Item = (PathBuf, String)>,
    ) -> Result<Self> {
        let mut files = Vec::new();
        let mut errors = Vec::new();
        for (path, text) in sources {
            match parse_java(&text, &path) {
                Ok(unit) => files.push(SourceFile {
                    id: FileId::from(files.len()),
                    path,
                    text: text.into(),
                    unit,
                }),
                Err(err) => errors.push(err),
            }
        }
        if !errors.is_empty() {
            return Err(Error::Load(errors));
        }
        Ok(Self { roots, files })
    }

    pub fn roots(&self) -> &SourceRoots {
        &self.roots
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.index())
    }

    /// Every type declaration of the model, nested types included, in
    /// pre-order.
    pub fn classes(&self) -> Vec<ClassRef<'_>> {
        let mut out = Vec::new();
        for file in &self.files {
            for (index, decl) in file.unit.types.iter().enumerate() {
                let qualified_name = qualify(file.package(), &decl.name);
                let class = ClassRef {
                    id: ClassId::top_level(file.id, index as u32),
                    top_level: qualified_name.clone(),
                    qualified_name,
                    decl,
                    file,
                };
                collect_classes(class, &mut out);
            }
        }
        out
    }

    /// Resolve an identifier handed out by [`JavaModel::classes`].
    pub fn class(&self, id: &ClassId) -> Option<ClassRef<'_>> {
        let file = self.file(id.file)?;
        let mut decl = file.unit.types.get(id.top_level_index() as usize)?;
        let top_level = qualify(file.package(), &decl.name);
        let mut qualified_name = top_level.clone();
        for &index in id.member_path() {
            match &decl.members.get(index as usize)?.kind {
                MemberKind::Type(nested) => {
                    qualified_name = nested_name(&qualified_name, &nested.name);
                    decl = nested;
                }
                _ => return None,
            }
        }
        Some(ClassRef {
            id: id.clone(),
            qualified_name,
            top_level,
            decl,
            file,
        })
    }

    /// Visit every type declaration mutably, parents before their nested
    /// types. Types a visitor adds to a declaration are visited as well.
    pub fn visit_types_mut<F>(&mut self, mut visit: F) -> Result<()>
    where
        F: FnMut(&TypeScope, &mut TypeDecl) -> Result<()>,
    {
        for file in &mut self.files {
            let package = file.unit.package.clone();
            for decl in &mut file.unit.types {
                let qualified_name = qualify(package.as_deref(), &decl.name);
                let scope = TypeScope {
                    file: file.id,
                    top_level: qualified_name.clone(),
                    qualified_name,
                };
                walk_types_mut(&scope, decl, &mut visit)?;
            }
        }
        Ok(())
    }
}

/// A borrowed view of one type declaration and where it lives.
#[derive(Clone, Debug)]
pub struct ClassRef<'a> {
    pub id: ClassId,
    /// `pkg.Outer$Inner`
    pub qualified_name: SmolStr,
    /// Qualified name of the enclosing top-level type.
    pub top_level: SmolStr,
    pub decl: &'a TypeDecl,
    pub file: &'a SourceFile,
}

impl<'a> ClassRef<'a> {
    pub fn package(&self) -> Option<&'a str> {
        self.file.package()
    }

    /// Qualified name without the package, e.g. `Outer$Inner`.
    pub fn relative_name(&self) -> &str {
        relative_name(&self.qualified_name, self.package())
    }
}

/// Names of the declaration handed to a [`JavaModel::visit_types_mut`]
/// visitor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeScope {
    pub file: FileId,
    pub qualified_name: SmolStr,
    pub top_level: SmolStr,
}

impl TypeScope {
    pub fn nested(&self, simple_name: &str) -> Self {
        Self {
            file: self.file,
            qualified_name: nested_name(&self.qualified_name, simple_name),
            top_level: self.top_level.clone(),
        }
    }
}

/// Qualified name of a top-level type.
pub fn qualify(package: Option<&str>, simple_name: &str) -> SmolStr {
    match package {
        Some(package) => format_smolstr!("{package}.{simple_name}"),
        None => SmolStr::new(simple_name),
    }
}

fn nested_name(outer: &str, simple_name: &str) -> SmolStr {
    format_smolstr!("{outer}${simple_name}")
}

/// Strip the package prefix from a qualified name.
pub fn relative_name<'n>(qualified_name: &'n str, package: Option<&str>) -> &'n str {
    package
        .and_then(|p| qualified_name.strip_prefix(p))
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(qualified_name)
}

fn collect_classes<'a>(class: ClassRef<'a>, out: &mut Vec<ClassRef<'a>>) {
    let decl = class.decl;
    let nested: Vec<ClassRef<'a>> = decl
        .members
        .iter()
        .enumerate()
        .filter_map(|(index, member)| match &member.kind {
            MemberKind::Type(inner) => Some(ClassRef {
                id: class.id.nested(index as u32),
                qualified_name: nested_name(&class.qualified_name, &inner.name),
                top_level: class.top_level.clone(),
                decl: inner,
                file: class.file,
            }),
            _ => None,
        })
        .collect();
    out.push(class);
    for inner in nested {
        collect_classes(inner, out);
    }
}

fn walk_types_mut<F>(scope: &TypeScope, decl: &mut TypeDecl, visit: &mut F) -> Result<()>
where
    F: FnMut(&TypeScope, &mut TypeDecl) -> Result<()>,
{
    visit(scope, decl)?;
    for member in &mut decl.members {
        if let MemberKind::Type(nested) = &mut member.kind {
            let inner = scope.nested(&nested.name);
            walk_types_mut(&inner, nested, visit)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(sources: &[(&str, &str)]) -> JavaModel {
        JavaModel::parse(
            SourceRoots::new(["/src"]),
            sources
                .iter()
                .map(|(path, text)| (PathBuf::from(path), text.to_string())),
        )
        .unwrap()
    }

    #[test]
    fn test_classes_are_listed_in_pre_order() {
        let model = model(&[(
            "/src/a/A.java",
            "package a; class A { static class B { class C {} } } class D {}",
        )]);
        let names: Vec<_> = model
            .classes()
            .iter()
            .map(|c| c.qualified_name.to_string())
            .collect();
        assert_eq!(names, ["a.A", "a.A$B", "a.A$B$C", "a.D"]);
    }

    #[test]
    fn test_class_id_resolves_back() {
        let model = model(&[("/src/a/A.java", "package a; class A { int x; static class B {} }")]);
        let classes = model.classes();
        let nested = &classes[1];

        let resolved = model.class(&nested.id).unwrap();
        assert_eq!(resolved.qualified_name, "a.A$B");
        assert_eq!(resolved.top_level, "a.A");
        assert_eq!(resolved.relative_name(), "A$B");
    }

    #[test]
    fn test_default_package() {
        let model = model(&[("/src/A.java", "class A {}")]);
        let classes = model.classes();
        assert_eq!(classes[0].qualified_name, "A");
        assert_eq!(classes[0].relative_name(), "A");
    }

    #[test]
    fn test_parse_failures_are_aggregated() {
        let err = JavaModel::parse(
            SourceRoots::default(),
            [
                (PathBuf::from("A.java"), "class A {".to_string()),
                (PathBuf::from("B.java"), "class B {}".to_string()),
                (PathBuf::from("C.java"), "class C { void".to_string()),
            ],
        )
        .unwrap_err();
        match err {
            Error::Load(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_visit_types_mut_sees_nested_scopes() {
        let mut model = model(&[("/src/p/O.java", "package p; class O { interface I {} }")]);
        let mut seen = Vec::new();
        model
            .visit_types_mut(|scope, decl| {
                seen.push((scope.qualified_name.to_string(), scope.top_level.to_string()));
                decl.annotations.clear();
                Ok(())
            })
            .unwrap();
        assert_eq!(
            seen,
            [
                ("p.O".to_string(), "p.O".to_string()),
                ("p.O$I".to_string(), "p.O".to_string())
            ]
        );
    }
}
