//! Marker annotations understood by the overwrite engine.

use crate::syntax::{Annotation, Member, MemberKind, TypeDecl};

/// The marker vocabulary. Platform code uses the first four; common code
/// designates overwrite targets with [`Mark::OverwriteTarget`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mark {
    /// Member replaces the common member with the same signature.
    Overwrite,
    /// Class replaces the common class verbatim.
    OverwriteClass,
    /// Class absorbs the common class, inheriting everything it lacks.
    Inherit,
    /// Class inherits missing members without adopting the common supertypes.
    InheritMissingMembers,
    /// Common class every platform module is expected to overwrite.
    OverwriteTarget,
}

impl Mark {
    /// Marks that must never survive into generated sources.
    pub const PLATFORM: [Mark; 4] = [
        Mark::Overwrite,
        Mark::OverwriteClass,
        Mark::Inherit,
        Mark::InheritMissingMembers,
    ];

    pub const fn simple_name(self) -> &'static str {
        match self {
            Mark::Overwrite => "Overwrite",
            Mark::OverwriteClass => "OverwriteClass",
            Mark::Inherit => "Inherit",
            Mark::InheritMissingMembers => "InheritMissingMembers",
            Mark::OverwriteTarget => "OverwriteTarget",
        }
    }

    /// Marks are matched by simple name, so qualified uses also resolve.
    pub fn matches(self, annotation: &Annotation) -> bool {
        annotation.simple_name() == self.simple_name()
    }
}

/// Declarations that carry annotations.
pub trait Annotated {
    fn annotations(&self) -> &[Annotation];

    fn annotations_mut(&mut self) -> &mut Vec<Annotation>;

    fn annotation(&self, mark: Mark) -> Option<&Annotation> {
        self.annotations().iter().find(|a| mark.matches(a))
    }

    fn has_mark(&self, mark: Mark) -> bool {
        self.annotation(mark).is_some()
    }

    /// Remove every occurrence of `mark`; returns whether any was present.
    fn remove_mark(&mut self, mark: Mark) -> bool {
        let annotations = self.annotations_mut();
        let before = annotations.len();
        annotations.retain(|a| !mark.matches(a));
        annotations.len() != before
    }
}

impl Annotated for TypeDecl {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    fn annotations_mut(&mut self) -> &mut Vec<Annotation> {
        &mut self.annotations
    }
}

/// A nested type member is a surrogate for its declaration: the parser
/// stores the annotations on the [`TypeDecl`], so lookups are forwarded.
impl Annotated for Member {
    fn annotations(&self) -> &[Annotation] {
        match &self.kind {
            MemberKind::Type(decl) => &decl.annotations,
            _ => &self.annotations,
        }
    }

    fn annotations_mut(&mut self) -> &mut Vec<Annotation> {
        match &mut self.kind {
            MemberKind::Type(decl) => &mut decl.annotations,
            _ => &mut self.annotations,
        }
    }
}

/// Nullable lookup of `mark` on any annotated declaration.
pub fn annotation_on<T: Annotated + ?Sized>(target: &T, mark: Mark) -> Option<&Annotation> {
    target.annotation(mark)
}

/// Does any direct field, method or constructor of `decl` carry `mark`?
pub fn any_member_marked(decl: &TypeDecl, mark: Mark) -> bool {
    decl.members
        .iter()
        .filter(|m| !matches!(m.kind, MemberKind::Type(_)))
        .any(|m| m.has_mark(mark))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{TypeKind, parse_java};
    use std::path::Path;

    fn parse_type(source: &str) -> TypeDecl {
        parse_java(source, Path::new("T.java"))
            .unwrap()
            .types
            .remove(0)
    }

    #[test]
    fn test_qualified_mark_resolves() {
        let decl = parse_type("@personthecat.overwritevalidator.annotations.OverwriteClass class A {}");
        assert!(annotation_on(&decl, Mark::OverwriteClass).is_some());
        assert!(annotation_on(&decl, Mark::Inherit).is_none());
    }

    #[test]
    fn test_nested_type_member_forwards_to_declaration() {
        let mut decl = parse_type("class A { @Inherit static class B {} }");
        let member = &mut decl.members[0];
        assert!(member.has_mark(Mark::Inherit));
        assert!(member.remove_mark(Mark::Inherit));
        assert!(decl.nested_type("B").unwrap().annotations.is_empty());
    }

    #[test]
    fn test_every_declarator_shares_member_mark() {
        let decl = parse_type("class A { @Overwrite public int a, b; }");
        assert!(decl.members.iter().all(|m| m.has_mark(Mark::Overwrite)));
        assert!(any_member_marked(&decl, Mark::Overwrite));
    }

    #[test]
    fn test_nested_marks_are_not_direct_members() {
        let decl = parse_type("class A { static class B { @Overwrite void f() {} } }");
        assert!(!any_member_marked(&decl, Mark::Overwrite));
        assert_eq!(decl.kind, TypeKind::Class);
    }

    #[test]
    fn test_remove_mark_keeps_other_annotations() {
        let mut decl = parse_type("@Deprecated @OverwriteClass class A {}");
        assert!(decl.remove_mark(Mark::OverwriteClass));
        assert!(!decl.remove_mark(Mark::OverwriteClass));
        assert_eq!(decl.annotations.len(), 1);
    }
}
