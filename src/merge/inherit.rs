//! `@InheritMissingMembers` and `@Inherit`.

use tracing::debug;

use super::{PassContext, Processor};
use crate::error::Result;
use crate::hir::TypeScope;
use crate::hir::access::{erase_type, overrides_member};
use crate::hir::marks::{Annotated, Mark};
use crate::syntax::{Member, MemberKind, TypeDecl, TypeKind};

/// Copies every common member the platform class does not declare.
pub struct InheritMissingMembers;

impl Processor for InheritMissingMembers {
    fn name(&self) -> &'static str {
        "inherit-missing-members"
    }

    fn process(
        &self,
        cx: &mut PassContext<'_>,
        scope: &TypeScope,
        decl: &mut TypeDecl,
    ) -> Result<()> {
        if !decl.has_mark(Mark::InheritMissingMembers) {
            return Ok(());
        }
        let common = cx.counterpart(&scope.qualified_name)?;
        let grafted = graft_missing_members(decl, common.decl);
        decl.remove_mark(Mark::InheritMissingMembers);
        debug!(class = %scope.qualified_name, grafted, "inherited missing members");
        cx.emit.record(scope);
        Ok(())
    }
}

/// Like [`InheritMissingMembers`], and additionally adopts the common
/// supertypes, enum constants and nested types.
pub struct Inherit;

impl Processor for Inherit {
    fn name(&self) -> &'static str {
        "inherit"
    }

    fn process(
        &self,
        cx: &mut PassContext<'_>,
        scope: &TypeScope,
        decl: &mut TypeDecl,
    ) -> Result<()> {
        if !decl.has_mark(Mark::Inherit) {
            return Ok(());
        }
        let common = cx.counterpart(&scope.qualified_name)?;
        let grafted = graft_missing_members(decl, common.decl) + graft_missing_types(decl, common.decl);
        reparent(decl, common.decl);
        decl.remove_mark(Mark::Inherit);
        debug!(class = %scope.qualified_name, grafted, "inherited class");
        cx.emit.record(scope);
        Ok(())
    }
}

/// Graft clones of the fields, methods, constructors and initializer blocks
/// of `common` that `platform` lacks. Fields go after the last platform
/// field, everything else at the end. Returns the number of grafted members.
fn graft_missing_members(platform: &mut TypeDecl, common: &TypeDecl) -> usize {
    let has_initializer = |is_static: bool| {
        platform
            .members
            .iter()
            .any(|m| m.is_initializer() && m.modifiers.is_static() == is_static)
    };
    let (has_static_init, has_instance_init) = (has_initializer(true), has_initializer(false));

    let mut fields = Vec::new();
    let mut others = Vec::new();
    for member in &common.members {
        match &member.kind {
            MemberKind::Field(_) if !overrides_member(platform, common, member) => {
                fields.push(member.clone());
            }
            MemberKind::Method(_) | MemberKind::Constructor(_)
                if !overrides_member(platform, common, member) =>
            {
                others.push(graft(member, platform));
            }
            MemberKind::Initializer(_) => {
                let declared = if member.modifiers.is_static() {
                    has_static_init
                } else {
                    has_instance_init
                };
                if !declared {
                    others.push(member.clone());
                }
            }
            _ => {}
        }
    }

    let grafted = fields.len() + others.len();
    let at = platform
        .members
        .iter()
        .rposition(|m| matches!(m.kind, MemberKind::Field(_)))
        .map_or(0, |i| i + 1);
    platform.members.splice(at..at, fields);
    platform.members.extend(others);
    grafted
}

/// Clone `member` into `platform`; constructors take the platform name.
fn graft(member: &Member, platform: &TypeDecl) -> Member {
    let mut clone = member.clone();
    if let MemberKind::Constructor(ctor) = &mut clone.kind {
        ctor.name = platform.name.clone();
    }
    clone
}

/// Graft nested common types with no platform type of the same simple name.
fn graft_missing_types(platform: &mut TypeDecl, common: &TypeDecl) -> usize {
    let missing: Vec<Member> = common
        .members
        .iter()
        .filter(|m| match &m.kind {
            MemberKind::Type(nested) => platform.nested_type(&nested.name).is_none(),
            _ => false,
        })
        .cloned()
        .collect();
    let grafted = missing.len();
    platform.members.extend(missing);
    grafted
}

/// Adopt the supertypes of `common`. Existing platform declarations win.
fn reparent(platform: &mut TypeDecl, common: &TypeDecl) {
    if platform.type_params.is_none() {
        platform.type_params.clone_from(&common.type_params);
    }
    if platform.kind.is_interface_like() {
        union_types(&mut platform.extends, &common.extends);
    } else {
        if platform.kind == TypeKind::Class && platform.extends.is_empty() {
            platform.extends.clone_from(&common.extends);
        }
        union_types(&mut platform.implements, &common.implements);
    }
    if platform.kind == TypeKind::Enum && platform.enum_constants.is_none() {
        platform.enum_constants.clone_from(&common.enum_constants);
    }
}

fn union_types(target: &mut Vec<String>, extra: &[String]) {
    for ty in extra {
        let erased = erase_type(ty);
        if !target.iter().any(|t| erase_type(t) == erased) {
            target.push(ty.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{EmitSet, PassContext, Processor};
    use super::*;
    use crate::base::FileId;
    use crate::error::Error;
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

    fn apply(pass: &dyn Processor, common: &CommonModel, platform: &str) -> Result<String> {
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
        Ok(print_unit(&unit))
    }

    #[test]
    fn test_inherit_missing_members_grafts_only_absent_members() {
        let common = common(
            "package a; public class C { public int a() { return 1; } public int b() { return 1; } }",
        );
        let printed = apply(
            &InheritMissingMembers,
            &common,
            "package a; @InheritMissingMembers public class C { public int a() { return 2; } }",
        )
        .unwrap();
        assert_eq!(
            printed,
            "package a;\n\npublic class C {\n    public int a() { return 2; }\n\n    public int b() { return 1; }\n}\n"
        );
    }

    #[test]
    fn test_grafted_fields_follow_platform_fields() {
        let common = common("package a; class C { int x = 1; int y = 2; }");
        let printed = apply(
            &InheritMissingMembers,
            &common,
            "package a; @InheritMissingMembers class C { int x = 3; void f() {} }",
        )
        .unwrap();
        assert_eq!(
            printed,
            "package a;\n\nclass C {\n    int x = 3;\n\n    int y = 2;\n\n    void f() {}\n}\n"
        );
    }

    #[test]
    fn test_initializers_graft_by_staticness() {
        let common = common("package a; class C { static { init(); } { setup(); } }");
        let printed = apply(
            &InheritMissingMembers,
            &common,
            "package a; @InheritMissingMembers class C { static { other(); } }",
        )
        .unwrap();
        assert!(printed.contains("static { other(); }"));
        assert!(!printed.contains("init()"));
        assert!(printed.contains("{ setup(); }"));
    }

    #[test]
    fn test_inherit_adopts_supertypes_and_nested_types() {
        let common = common(
            "package a; public class C extends Base implements java.io.Serializable, Runnable { public void run() {} public static class N {} }",
        );
        let printed = apply(
            &Inherit,
            &common,
            "package a; @Inherit public class C implements Serializable {}",
        )
        .unwrap();
        assert!(printed.contains("public class C extends Base implements Serializable, Runnable {"));
        assert!(printed.contains("public void run() {}"));
        assert!(printed.contains("public static class N {"));
        assert!(!printed.contains("@Inherit"));
    }

    #[test]
    fn test_inherit_keeps_declared_superclass() {
        let common = common("package a; class C extends Base {}");
        let printed = apply(&Inherit, &common, "package a; @Inherit class C extends Other {}").unwrap();
        assert!(printed.contains("class C extends Other {"));
    }

    #[test]
    fn test_inherit_adopts_enum_constants() {
        let common = common("package a; enum C { A, B; void f() {} }");
        let printed = apply(&Inherit, &common, "package a; @Inherit enum C {}").unwrap();
        assert!(printed.contains("    A, B;\n"));
        assert!(printed.contains("void f() {}"));
    }

    #[test]
    fn test_unmarked_class_is_left_alone() {
        let common = common("package a; class C { int x; }");
        let printed = apply(&Inherit, &common, "package a; class C {}").unwrap();
        assert_eq!(printed, "package a;\n\nclass C {\n}\n");
    }

    #[test]
    fn test_missing_counterpart() {
        let common = common("package a; class Other {}");
        let err = apply(&InheritMissingMembers, &common, "package a; @InheritMissingMembers class C {}").unwrap_err();
        assert!(matches!(err, Error::MissingCommonClass { .. }));
    }
}
