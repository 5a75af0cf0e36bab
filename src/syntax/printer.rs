//! Pretty-printer for compilation units.
//!
//! Output is normalized: four-space indentation, one declarator per field,
//! members in model order. Snippets keep their original text and are shifted
//! from the column they were parsed at to the column they are printed at.

use std::fmt::Write as _;

use super::ast::*;

const INDENT: &str = "    ";

pub fn print_unit(unit: &CompilationUnit) -> String {
    let mut p = Printer::default();
    p.unit(unit);
    p.out
}

/// Re-indent a multi-line snippet. The first line is emitted as is; later
/// lines lose up to `from_col` leading whitespace characters and gain `indent`.
pub fn reindent(text: &str, from_col: u32, indent: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i == 0 {
            out.push_str(line);
            continue;
        }
        out.push('\n');
        let trimmed = line.trim_end_matches('\r');
        let strip = trimmed
            .chars()
            .take(from_col as usize)
            .take_while(|c| *c == ' ' || *c == '\t')
            .count();
        let rest = &trimmed[strip..];
        if !rest.is_empty() {
            out.push_str(indent);
        }
        out.push_str(rest);
    }
    out
}

#[derive(Default)]
struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn indent(&self) -> String {
        INDENT.repeat(self.depth)
    }

    fn line(&mut self, text: &str) {
        if !text.is_empty() {
            self.out.push_str(&self.indent());
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    fn snippet(&self, snippet: &Snippet) -> String {
        reindent(&snippet.text, snippet.col, &self.indent())
    }

    fn unit(&mut self, unit: &CompilationUnit) {
        if let Some(header) = &unit.header {
            let text = self.snippet(header);
            self.line(&text);
        }
        for annotation in &unit.package_annotations {
            self.line(&annotation_text(annotation));
        }
        if let Some(package) = &unit.package {
            self.line(&format!("package {package};"));
            self.line("");
        }
        if !unit.imports.is_empty() {
            for import in &unit.imports {
                self.line(&import_text(import));
            }
            self.line("");
        }
        for (i, ty) in unit.types.iter().enumerate() {
            if i > 0 {
                self.line("");
            }
            self.type_decl(ty);
        }
    }

    fn header(&mut self, doc: &Option<Snippet>, annotations: &[Annotation]) {
        if let Some(doc) = doc {
            let text = self.snippet(doc);
            self.line(&text);
        }
        for annotation in annotations {
            self.line(&annotation_text(annotation));
        }
    }

    fn type_decl(&mut self, ty: &TypeDecl) {
        self.header(&ty.doc, &ty.annotations);

        let mut decl = modifiers_text(&ty.modifiers);
        decl.push_str(ty.kind.keyword());
        decl.push(' ');
        decl.push_str(&ty.name);
        if let Some(params) = &ty.type_params {
            decl.push_str(params);
        }
        if ty.kind == TypeKind::Record {
            decl.push('(');
            decl.push_str(&params_text(&ty.components));
            decl.push(')');
        }
        for (keyword, list) in [
            ("extends", &ty.extends),
            ("implements", &ty.implements),
            ("permits", &ty.permits),
        ] {
            if !list.is_empty() {
                let _ = write!(decl, " {keyword} {}", list.join(", "));
            }
        }
        decl.push_str(" {");
        self.line(&decl);

        self.depth += 1;
        let mut first = true;
        if let Some(constants) = &ty.enum_constants {
            let text = self.snippet(constants);
            self.line(&format!("{text};"));
            first = false;
        } else if ty.kind == TypeKind::Enum && !ty.members.is_empty() {
            self.line(";");
            first = false;
        }
        for member in &ty.members {
            if !first {
                self.line("");
            }
            first = false;
            self.member(member);
        }
        self.depth -= 1;
        self.line("}");
    }

    fn member(&mut self, member: &Member) {
        if let MemberKind::Type(nested) = &member.kind {
            self.type_decl(nested);
            return;
        }
        self.header(&member.doc, &member.annotations);

        let mut text = modifiers_text(&member.modifiers);
        match &member.kind {
            MemberKind::Field(field) => {
                let _ = write!(text, "{} {}", field.ty, field.name);
                if let Some(init) = &field.init {
                    let _ = write!(text, " = {}", self.snippet(init));
                }
                text.push(';');
            }
            MemberKind::Method(method) => {
                if let Some(params) = &method.type_params {
                    let _ = write!(text, "{params} ");
                }
                let _ = write!(
                    text,
                    "{} {}({})",
                    method.ret,
                    method.name,
                    params_text(&method.params)
                );
                if let Some(throws) = &method.throws {
                    let _ = write!(text, " throws {throws}");
                }
                if let Some(value) = &method.default_value {
                    let _ = write!(text, " default {value}");
                }
                match &method.body {
                    Some(body) => {
                        let _ = write!(text, " {}", self.snippet(body));
                    }
                    None => text.push(';'),
                }
            }
            MemberKind::Constructor(ctor) => {
                if let Some(params) = &ctor.type_params {
                    let _ = write!(text, "{params} ");
                }
                text.push_str(&ctor.name);
                if !ctor.compact {
                    let _ = write!(text, "({})", params_text(&ctor.params));
                }
                if let Some(throws) = &ctor.throws {
                    let _ = write!(text, " throws {throws}");
                }
                let _ = write!(text, " {}", self.snippet(&ctor.body));
            }
            MemberKind::Initializer(body) => text.push_str(&self.snippet(body)),
            MemberKind::Type(_) => unreachable!("nested types are printed above"),
        }
        self.line(&text);
    }
}

fn annotation_text(annotation: &Annotation) -> String {
    format!("@{}{}", annotation.name, annotation.args.as_deref().unwrap_or(""))
}

fn import_text(import: &Import) -> String {
    format!(
        "import {}{}{};",
        if import.is_static { "static " } else { "" },
        import.path,
        if import.wildcard { ".*" } else { "" }
    )
}

fn modifiers_text(modifiers: &Modifiers) -> String {
    let mut text = String::new();
    for modifier in modifiers.iter() {
        text.push_str(modifier.keyword());
        text.push(' ');
    }
    text
}

fn params_text(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| {
            let mut text = String::new();
            if let Some(prefix) = &p.prefix {
                text.push_str(prefix);
                text.push(' ');
            }
            text.push_str(&p.ty);
            if p.varargs {
                text.push_str("...");
            }
            text.push(' ');
            text.push_str(&p.name);
            text
        })
        .collect::<Vec<_>>()
        .join(", ")
}
