//! Declaration-level Java syntax tree.
//!
//! The tree models what the overwrite engine reasons about: packages,
//! imports, type declarations and their members. Anything below member
//! granularity (method bodies, field initializers, enum constant lists) is
//! kept as a [`Snippet`] of the original source.

use smol_str::SmolStr;

/// One parsed `.java` file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompilationUnit {
    /// Comments ahead of the package or first import, such as a license.
    pub header: Option<Snippet>,
    pub package: Option<SmolStr>,
    /// Annotations placed on the package declaration (`package-info.java`).
    pub package_annotations: Vec<Annotation>,
    pub imports: Vec<Import>,
    pub types: Vec<TypeDecl>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Import {
    pub is_static: bool,
    /// Dotted path without the trailing `.*` of a wildcard import.
    pub path: SmolStr,
    pub wildcard: bool,
}

/// Source text copied verbatim from the input, together with the column its
/// owning declaration started at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snippet {
    pub text: String,
    pub col: u32,
}

impl Snippet {
    pub fn new(text: impl Into<String>, col: u32) -> Self {
        Self {
            text: text.into(),
            col,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    /// Name as written, possibly qualified (`Overwrite`, `a.b.Overwrite`).
    pub name: SmolStr,
    /// Raw argument list including parentheses.
    pub args: Option<String>,
}

impl Annotation {
    /// Last segment of the annotation name.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Strictfp,
    Default,
    Sealed,
    NonSealed,
}

impl Modifier {
    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Static => "static",
            Modifier::Final => "final",
            Modifier::Abstract => "abstract",
            Modifier::Native => "native",
            Modifier::Synchronized => "synchronized",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
            Modifier::Strictfp => "strictfp",
            Modifier::Default => "default",
            Modifier::Sealed => "sealed",
            Modifier::NonSealed => "non-sealed",
        }
    }
}

/// Java access levels, ordered from most to least restrictive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Access {
    Private,
    Package,
    Protected,
    Public,
}

impl Access {
    pub fn as_str(self) -> &'static str {
        match self {
            Access::Private => "private",
            Access::Package => "package",
            Access::Protected => "protected",
            Access::Public => "public",
        }
    }
}

/// Modifier keywords in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    keywords: Vec<Modifier>,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, modifier: Modifier) {
        if !self.contains(modifier) {
            self.keywords.push(modifier);
        }
    }

    pub fn contains(&self, modifier: Modifier) -> bool {
        self.keywords.contains(&modifier)
    }

    pub fn iter(&self) -> impl Iterator<Item = Modifier> + '_ {
        self.keywords.iter().copied()
    }

    /// The access level spelled out in source, if any.
    pub fn declared_access(&self) -> Option<Access> {
        self.keywords.iter().find_map(|m| match m {
            Modifier::Public => Some(Access::Public),
            Modifier::Protected => Some(Access::Protected),
            Modifier::Private => Some(Access::Private),
            _ => None,
        })
    }

    pub fn is_static(&self) -> bool {
        self.contains(Modifier::Static)
    }

    pub fn is_final(&self) -> bool {
        self.contains(Modifier::Final)
    }
}

impl FromIterator<Modifier> for Modifiers {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        let mut modifiers = Modifiers::new();
        for m in iter {
            modifiers.push(m);
        }
        modifiers
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl TypeKind {
    pub fn keyword(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Record => "record",
            TypeKind::Annotation => "@interface",
        }
    }

    /// Interfaces and annotation types make their members implicitly public.
    pub fn is_interface_like(self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::Annotation)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDecl {
    pub doc: Option<Snippet>,
    pub annotations: Vec<Annotation>,
    pub modifiers: Modifiers,
    pub kind: TypeKind,
    pub name: SmolStr,
    /// Raw `<...>` type parameter list.
    pub type_params: Option<String>,
    /// Record components.
    pub components: Vec<Param>,
    pub extends: Vec<String>,
    pub implements: Vec<String>,
    pub permits: Vec<String>,
    /// Raw enum constant list, without the terminating `;`.
    pub enum_constants: Option<Snippet>,
    pub members: Vec<Member>,
}

impl TypeDecl {
    pub fn new(kind: TypeKind, name: impl Into<SmolStr>) -> Self {
        Self {
            doc: None,
            annotations: Vec::new(),
            modifiers: Modifiers::new(),
            kind,
            name: name.into(),
            type_params: None,
            components: Vec::new(),
            extends: Vec::new(),
            implements: Vec::new(),
            permits: Vec::new(),
            enum_constants: None,
            members: Vec::new(),
        }
    }

    pub fn nested_types(&self) -> impl Iterator<Item = &TypeDecl> + '_ {
        self.members.iter().filter_map(|m| match &m.kind {
            MemberKind::Type(t) => Some(t.as_ref()),
            _ => None,
        })
    }

    pub fn nested_type(&self, simple_name: &str) -> Option<&TypeDecl> {
        self.nested_types().find(|t| t.name == simple_name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    /// Annotations and `final` written before the type.
    pub prefix: Option<String>,
    pub ty: String,
    pub varargs: bool,
    pub name: SmolStr,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub doc: Option<Snippet>,
    pub annotations: Vec<Annotation>,
    pub modifiers: Modifiers,
    pub kind: MemberKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Field(Field),
    Method(Method),
    Constructor(Constructor),
    Type(Box<TypeDecl>),
    Initializer(Snippet),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub ty: String,
    pub name: SmolStr,
    pub init: Option<Snippet>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Method {
    pub type_params: Option<String>,
    pub ret: String,
    pub name: SmolStr,
    pub params: Vec<Param>,
    pub throws: Option<String>,
    /// `None` for abstract, interface and native methods.
    pub body: Option<Snippet>,
    /// Annotation element default value.
    pub default_value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constructor {
    pub type_params: Option<String>,
    pub name: SmolStr,
    pub params: Vec<Param>,
    /// Compact record constructor, written without a parameter list.
    pub compact: bool,
    pub throws: Option<String>,
    pub body: Snippet,
}

impl Member {
    pub fn new(kind: MemberKind) -> Self {
        Self {
            doc: None,
            annotations: Vec::new(),
            modifiers: Modifiers::new(),
            kind,
        }
    }

    /// Simple name: the field, method or type name. Constructors report the
    /// name of their class; initializers have none.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            MemberKind::Field(f) => Some(&f.name),
            MemberKind::Method(m) => Some(&m.name),
            MemberKind::Constructor(c) => Some(&c.name),
            MemberKind::Type(t) => Some(&t.name),
            MemberKind::Initializer(_) => None,
        }
    }

    pub fn params(&self) -> Option<&[Param]> {
        match &self.kind {
            MemberKind::Method(m) => Some(&m.params),
            MemberKind::Constructor(c) => Some(&c.params),
            _ => None,
        }
    }

    pub fn is_initializer(&self) -> bool {
        matches!(self.kind, MemberKind::Initializer(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_ordering() {
        assert!(Access::Public > Access::Protected);
        assert!(Access::Protected > Access::Package);
        assert!(Access::Package > Access::Private);
    }

    #[test]
    fn test_modifiers_keep_source_order_without_duplicates() {
        let mods: Modifiers = [Modifier::Static, Modifier::Public, Modifier::Static]
            .into_iter()
            .collect();
        assert_eq!(
            mods.iter().collect::<Vec<_>>(),
            vec![Modifier::Static, Modifier::Public]
        );
        assert_eq!(mods.declared_access(), Some(Access::Public));
    }

    #[test]
    fn test_annotation_simple_name() {
        let annotation = |name: &str| Annotation {
            name: name.into(),
            args: None,
        };
        assert_eq!(annotation("a.b.Overwrite").simple_name(), "Overwrite");
        assert_eq!(annotation("Inherit").simple_name(), "Inherit");
    }
}
