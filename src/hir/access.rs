//! Structural accessors over type declarations.
//!
//! Members of two different models never share identity, so platform and
//! common members are paired by [`Signature`]: fields by name, methods by name
//! and erased parameter types, constructors by erased parameter types.

use smol_str::SmolStr;

use crate::syntax::{Access, Member, MemberKind, Param, TypeDecl, TypeKind};

/// Structural identity of a field, method or constructor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Signature {
    Field(SmolStr),
    Method(SmolStr, Vec<SmolStr>),
    Constructor(Vec<SmolStr>),
}

/// A member together with the type that declares it. Implicit modifiers
/// depend on the owner, so most questions need both.
#[derive(Clone, Copy, Debug)]
pub struct MemberRef<'a> {
    pub owner: &'a TypeDecl,
    pub member: &'a Member,
}

impl<'a> MemberRef<'a> {
    pub fn new(owner: &'a TypeDecl, member: &'a Member) -> Self {
        Self { owner, member }
    }

    pub fn access(self) -> Access {
        effective_access(self.owner, self.member)
    }

    pub fn is_static(self) -> bool {
        is_static(self.owner, self.member)
    }

    pub fn signature(self) -> Option<Signature> {
        signature(self.owner, self.member)
    }
}

/// Erase a written type: drop type arguments, whitespace, type-use
/// annotations and package qualifiers. `java.util.List<String> []`
/// becomes `List[]`.
pub fn erase_type(ty: &str) -> SmolStr {
    let mut stripped = String::with_capacity(ty.len());
    let mut depth = 0usize;
    for c in ty.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            c => stripped.push(c),
        }
    }
    let mut erased = String::with_capacity(stripped.len());
    for word in stripped.split_whitespace() {
        if !word.starts_with('@') {
            erased.push_str(word);
        }
    }
    let dims = erased.find('[').unwrap_or(erased.len());
    let (base, dims) = erased.split_at(dims);
    let simple = base.rsplit('.').next().unwrap_or(base);
    SmolStr::from(format!("{simple}{dims}"))
}

/// Type variables declared by a `<...>` list, each with its erased bound.
/// `<T extends Comparable<T>, U>` gives `[(T, Comparable), (U, Object)]`.
fn type_variables(type_params: Option<&str>) -> Vec<(SmolStr, SmolStr)> {
    let Some(list) = type_params else {
        return Vec::new();
    };
    let inner = list.trim().trim_start_matches('<');
    let inner = inner.strip_suffix('>').unwrap_or(inner);

    let mut segments = Vec::new();
    let (mut depth, mut from) = (0usize, 0);
    for (i, c) in inner.char_indices() {
        match c {
            '<' | '(' => depth += 1,
            '>' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                segments.push(&inner[from..i]);
                from = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&inner[from..]);

    segments
        .into_iter()
        .filter_map(|segment| {
            let words: Vec<&str> = segment.split_whitespace().collect();
            let split = words.iter().position(|w| *w == "extends").unwrap_or(words.len());
            let name = words[..split].last()?;
            let bound = words.get(split + 1..).map(|rest| rest.join(" "));
            let bound = bound
                .as_deref()
                .and_then(|b| b.split('&').next())
                .filter(|b| !b.trim().is_empty())
                .map_or_else(|| SmolStr::new_static("Object"), erase_type);
            Some((SmolStr::new(name), bound))
        })
        .collect()
}

/// Erase parameter types, replacing the member's own type variables by
/// their bounds so renamed variables still match.
fn erase_params(params: &[Param], type_params: Option<&str>) -> Vec<SmolStr> {
    let variables = type_variables(type_params);
    params
        .iter()
        .map(|p| {
            let erased = erase_type(&p.ty);
            let dims = erased.find('[').unwrap_or(erased.len());
            let (base, dims) = erased.split_at(dims);
            let base = variables
                .iter()
                .find(|(name, _)| name == base)
                .map_or(base, |(_, bound)| bound.as_str());
            let varargs = if p.varargs { "[]" } else { "" };
            SmolStr::from(format!("{base}{dims}{varargs}"))
        })
        .collect()
}

/// Structural signature of `member` as declared in `owner`. Nested types and
/// initializers have none.
pub fn signature(owner: &TypeDecl, member: &Member) -> Option<Signature> {
    match &member.kind {
        MemberKind::Field(field) => Some(Signature::Field(field.name.clone())),
        MemberKind::Method(method) => Some(Signature::Method(
            method.name.clone(),
            erase_params(&method.params, method.type_params.as_deref()),
        )),
        MemberKind::Constructor(ctor) if ctor.compact => {
            Some(Signature::Constructor(erase_params(&owner.components, None)))
        }
        MemberKind::Constructor(ctor) => Some(Signature::Constructor(erase_params(
            &ctor.params,
            ctor.type_params.as_deref(),
        ))),
        MemberKind::Type(_) | MemberKind::Initializer(_) => None,
    }
}

/// Access level after applying the implicit rules of the owner kind.
pub fn effective_access(owner: &TypeDecl, member: &Member) -> Access {
    if let Some(access) = member.modifiers.declared_access() {
        return access;
    }
    match (&member.kind, owner.kind) {
        (MemberKind::Initializer(_), _) => Access::Package,
        (_, kind) if kind.is_interface_like() => Access::Public,
        (MemberKind::Constructor(_), TypeKind::Enum) => Access::Private,
        _ => Access::Package,
    }
}

pub fn is_static(owner: &TypeDecl, member: &Member) -> bool {
    if member.modifiers.is_static() {
        return true;
    }
    match &member.kind {
        MemberKind::Field(_) => owner.kind.is_interface_like(),
        MemberKind::Type(nested) => {
            owner.kind.is_interface_like() || nested.kind != TypeKind::Class
        }
        _ => false,
    }
}

pub fn is_final(owner: &TypeDecl, member: &Member) -> bool {
    member.modifiers.is_final()
        || (matches!(member.kind, MemberKind::Field(_)) && owner.kind.is_interface_like())
}

/// A field that is public, static and final.
pub fn is_public_constant(owner: &TypeDecl, member: &Member) -> bool {
    matches!(member.kind, MemberKind::Field(_))
        && effective_access(owner, member) == Access::Public
        && is_static(owner, member)
        && is_final(owner, member)
}

/// Public fields, methods and constructors, constants excluded.
pub fn public_members_of(decl: &TypeDecl) -> impl Iterator<Item = &Member> + '_ {
    decl.members.iter().filter(move |m| {
        signature(decl, m).is_some()
            && effective_access(decl, m) == Access::Public
            && !is_public_constant(decl, m)
    })
}

/// Public static final fields.
pub fn public_constants_of(decl: &TypeDecl) -> impl Iterator<Item = &Member> + '_ {
    decl.members
        .iter()
        .filter(move |m| is_public_constant(decl, m))
}

/// Fields, methods and constructors regardless of access.
pub fn structural_members_of(decl: &TypeDecl) -> impl Iterator<Item = &Member> + '_ {
    decl.members
        .iter()
        .filter(move |m| signature(decl, m).is_some())
}

/// The member of `target` with the same signature as `member` of `owner`.
pub fn overridden_member<'t>(
    target: &'t TypeDecl,
    owner: &TypeDecl,
    member: &Member,
) -> Option<&'t Member> {
    let wanted = signature(owner, member)?;
    target
        .members
        .iter()
        .find(|candidate| signature(target, candidate).as_ref() == Some(&wanted))
}

/// Does `target` declare a counterpart of `member` of `owner`?
pub fn overrides_member(target: &TypeDecl, owner: &TypeDecl, member: &Member) -> bool {
    overridden_member(target, owner, member).is_some()
}

pub fn has_more_restrictive_access(child: MemberRef<'_>, parent: MemberRef<'_>) -> bool {
    child.access() < parent.access()
}

pub fn has_different_access_kind(child: MemberRef<'_>, parent: MemberRef<'_>) -> bool {
    child.is_static() != parent.is_static()
}

/// Human-readable member description used in reports: `K` for fields,
/// `m(int, String)` for methods, `Outer$Inner(int)` for constructors.
pub fn format_member(relative_name: &str, owner: &TypeDecl, member: &Member) -> String {
    let params = |params: &[Param]| {
        params
            .iter()
            .map(|p| {
                if p.varargs {
                    format!("{}...", p.ty)
                } else {
                    p.ty.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    };
    match &member.kind {
        MemberKind::Field(field) => field.name.to_string(),
        MemberKind::Method(method) => format!("{}({})", method.name, params(&method.params)),
        MemberKind::Constructor(ctor) if ctor.compact => {
            format!("{relative_name}({})", params(&owner.components))
        }
        MemberKind::Constructor(ctor) => format!("{relative_name}({})", params(&ctor.params)),
        MemberKind::Type(nested) => format!("{relative_name}${}", nested.name),
        MemberKind::Initializer(_) => "<init>".to_string(),
    }
}

/// Word used for `member` in diagnostics.
pub fn member_kind_name(member: &Member) -> &'static str {
    match member.kind {
        MemberKind::Field(_) => "field",
        MemberKind::Method(_) => "method",
        MemberKind::Constructor(_) => "constructor",
        MemberKind::Type(_) => "type",
        MemberKind::Initializer(_) => "initializer",
    }
}
