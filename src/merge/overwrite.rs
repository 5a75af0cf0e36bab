//! `@OverwriteClass` and `@Overwrite`.

use smol_str::SmolStr;
use tracing::debug;

use super::{PassContext, Processor};
use crate::error::{Error, Result};
use crate::hir::TypeScope;
use crate::hir::access::{format_member, member_kind_name, overrides_member};
use crate::hir::marks::{Annotated, Mark, any_member_marked};
use crate::syntax::{MemberKind, TypeDecl};

/// Replaces a common class verbatim.
pub struct OverwriteClass;

impl Processor for OverwriteClass {
    fn name(&self) -> &'static str {
        "overwrite-class"
    }

    fn process(
        &self,
        cx: &mut PassContext<'_>,
        scope: &TypeScope,
        decl: &mut TypeDecl,
    ) -> Result<()> {
        if !decl.has_mark(Mark::OverwriteClass) {
            return Ok(());
        }
        cx.counterpart(&scope.qualified_name)?;
        decl.remove_mark(Mark::OverwriteClass);
        cx.emit.record(scope);
        Ok(())
    }
}

/// Replaces individual common members.
pub struct Overwrite;

impl Processor for Overwrite {
    fn name(&self) -> &'static str {
        "overwrite"
    }

    fn process(
        &self,
        cx: &mut PassContext<'_>,
        scope: &TypeScope,
        decl: &mut TypeDecl,
    ) -> Result<()> {
        if !any_member_marked(decl, Mark::Overwrite) {
            return Ok(());
        }
        let common = cx.counterpart(&scope.qualified_name)?;
        let stripped = strip_overwrites(decl, common.decl, &scope.qualified_name)?;
        debug!(class = %scope.qualified_name, stripped, "overwrote members");
        cx.emit.record(scope);
        Ok(())
    }
}

/// Check and strip the `@Overwrite` members of `platform`, then do the same
/// for nested types that have a common type of the same simple name.
fn strip_overwrites(platform: &mut TypeDecl, common: &TypeDecl, class: &str) -> Result<usize> {
    check_overwritten_members(platform, common, class)?;
    let mut stripped = 0;
    for member in &mut platform.members {
        match &mut member.kind {
            MemberKind::Type(nested) => {
                if let Some(inner) = common.nested_type(&nested.name) {
                    let name = format!("{class}${}", nested.name);
                    stripped += strip_overwrites(nested, inner, &name)?;
                }
            }
            _ => {
                let before = member.annotations.len();
                member.annotations.retain(|a| !Mark::Overwrite.matches(a));
                stripped += before - member.annotations.len();
            }
        }
    }
    Ok(stripped)
}

/// Every direct `@Overwrite` member of `platform` needs a structural match
/// in `common`.
pub(super) fn check_overwritten_members(
    platform: &TypeDecl,
    common: &TypeDecl,
    class: &str,
) -> Result<()> {
    let relative = class.rsplit('.').next().unwrap_or(class);
    for member in &platform.members {
        if matches!(member.kind, MemberKind::Type(_)) || !member.has_mark(Mark::Overwrite) {
            continue;
        }
        if !overrides_member(common, platform, member) {
            return Err(Error::MissingOverwriteTarget {
                class: SmolStr::new(class),
                kind: member_kind_name(member),
                member: format_member(relative, platform, member),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::{EmitSet, PassContext, Processor};
    use super::*;
    use crate::base::FileId;
    use crate::hir::{CommonModel, JavaModel, SourceRoots};
    use crate::syntax::{parse_java, print_unit};
    use std::path::{Path, PathBuf};

    fn common(source: &str) -> CommonModel {
        CommonModel::new(
            JavaModel::parse(
                SourceRoots::new(["/common"]),
                [(PathBuf::from("/common/a/C.java"), source.to_string())],
            )
            .unwrap(),
        )
    }

    fn apply(pass: &dyn Processor, common: &CommonModel, platform: &str) -> Result<(String, EmitSet)> {
        let mut unit = parse_java(platform, Path::new("C.java")).unwrap();
        let mut emit = EmitSet::new();
        let mut cx = PassContext {
            common,
            emit: &mut emit,
        };
        let scope = TypeScope {
            file: FileId::new(0),
            qualified_name: "a.C".into(),
            top_level: "a.C".into(),
        };
        pass.process(&mut cx, &scope, &mut unit.types[0])?;
        Ok((print_unit(&unit), emit))
    }

    #[test]
    fn test_overwrite_class_keeps_platform_body() {
        let common = common("package a; class C { public int x() { return 1; } }");
        let (printed, emit) = apply(
            &OverwriteClass,
            &common,
            "package a; @OverwriteClass class C { public int x() { return 2; } }",
        )
        .unwrap();
        assert_eq!(
            printed,
            "package a;\n\nclass C {\n    public int x() { return 2; }\n}\n"
        );
        assert!(emit.contains("a.C"));
    }

    #[test]
    fn test_overwrite_strips_member_marks() {
        let common = common("package a; class C { public void f(int a) {} }");
        let (printed, emit) = apply(
            &Overwrite,
            &common,
            "package a; class C { @Overwrite @Deprecated public void f(int b) {} }",
        )
        .unwrap();
        assert!(!printed.contains("@Overwrite"));
        assert!(printed.contains("@Deprecated"));
        assert!(emit.contains("a.C"));
    }

    #[test]
    fn test_overwrite_without_target_is_fatal() {
        let common = common("package a; class C { public void f(int a) {} }");
        let err = apply(
            &Overwrite,
            &common,
            "package a; class C { @Overwrite public void f(long a) {} }",
        )
        .unwrap_err();
        match err {
            Error::MissingOverwriteTarget {
                class,
                kind,
                member,
            } => {
                assert_eq!(class, "a.C");
                assert_eq!(kind, "method");
                assert_eq!(member, "f(long)");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_overwrite_recurses_into_paired_nested_types() {
        let common = common(
            "package a; class C { void f() {} static class N { void g() {} } }",
        );
        let (printed, _) = apply(
            &Overwrite,
            &common,
            "package a; class C { @Overwrite void f() {} static class N { @Overwrite void g() {} } }",
        )
        .unwrap();
        assert!(!printed.contains("@Overwrite"), "{printed}");
    }

    #[test]
    fn test_nested_overwrite_checks_nested_counterpart() {
        let common = common("package a; class C { void f() {} static class N {} }");
        let err = apply(
            &Overwrite,
            &common,
            "package a; class C { @Overwrite void f() {} static class N { @Overwrite void g() {} } }",
        )
        .unwrap_err();
        assert!(
            matches!(err, Error::MissingOverwriteTarget { ref class, .. } if class == "a.C$N")
        );
    }

    #[test]
    fn test_class_without_marked_members_is_skipped() {
        let common = common("package a; class Other {}");
        let (_, emit) = apply(&Overwrite, &common, "package a; class C { void f() {} }").unwrap();
        assert!(emit.is_empty());
    }
}
