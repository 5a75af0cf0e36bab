//! Declaration-level recursive descent parser for Java.
//!
//! Statements and expressions are never parsed: bodies are skipped by
//! balancing braces, initializers by balancing brackets up to the next
//! declarator boundary. This keeps the parser tolerant of any Java version
//! as long as the declaration grammar is recognizable.

use std::path::{Path, PathBuf};

use smol_str::SmolStr;
use thiserror::Error;

use super::ast::*;
use super::lexer::{Token, TokenKind, tokenize};
use crate::base::{LineCol, LineIndex, TextRange, TextSize};

/// A syntax error in a Java source file.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{}:{position}: {message}", path.display())]
pub struct ParseError {
    pub path: PathBuf,
    pub position: LineCol,
    pub message: String,
}

/// Parse one Java source file. `path` is used for error messages and to
/// recognize `module-info.java`, which carries no types and parses to an
/// empty unit.
pub fn parse_java(source: &str, path: &Path) -> Result<CompilationUnit, ParseError> {
    if path.file_name().is_some_and(|n| n == "module-info.java") {
        return Ok(CompilationUnit::default());
    }
    let lines = LineIndex::new(source);
    let raw = tokenize(source).map_err(|offset| ParseError {
        path: path.to_owned(),
        position: lines.line_col(offset),
        message: "unrecognized character".to_owned(),
    })?;

    let (comments, tokens): (Vec<Token>, Vec<Token>) =
        raw.into_iter().partition(|t| t.kind.is_comment());
    let comments = comments.into_iter().map(|t| t.range).collect();

    Parser {
        source,
        path,
        lines,
        tokens,
        comments,
        pos: 0,
    }
    .compilation_unit()
}

struct Parser<'a> {
    source: &'a str,
    path: &'a Path,
    lines: LineIndex,
    tokens: Vec<Token>,
    comments: Vec<TextRange>,
    pos: usize,
}

type PResult<T> = Result<T, ParseError>;

impl<'a> Parser<'a> {
    // ========================================================================
    // TOKEN CURSOR
    // ========================================================================

    fn nth(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn peek(&self) -> Option<TokenKind> {
        self.nth(0)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn nth_text(&self, n: usize) -> &'a str {
        self.tokens
            .get(self.pos + n)
            .map_or("", |t| &self.source[t.range])
    }

    fn at_ident(&self, text: &str) -> bool {
        self.at(TokenKind::Ident) && self.nth_text(0) == text
    }

    fn at_op(&self, op: &str) -> bool {
        self.at(TokenKind::Op) && self.nth_text(0) == op
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn bump(&mut self) -> PResult<Token> {
        let token = self
            .tokens
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.error("unexpected end of file"))?;
        self.pos += 1;
        Ok(token)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token> {
        if self.at(kind) {
            self.bump()
        } else {
            Err(self.error(format!("expected {what}, found {}", self.found())))
        }
    }

    fn ident(&mut self, what: &str) -> PResult<SmolStr> {
        let token = self.expect(TokenKind::Ident, what)?;
        Ok(SmolStr::new(&self.source[token.range]))
    }

    fn found(&self) -> String {
        if self.is_eof() {
            "end of file".to_owned()
        } else {
            format!("'{}'", self.nth_text(0))
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let offset = self
            .tokens
            .get(self.pos)
            .map_or(TextSize::of(self.source), |t| t.range.start());
        ParseError {
            path: self.path.to_owned(),
            position: self.lines.line_col(offset),
            message: message.into(),
        }
    }

    // ========================================================================
    // SOURCE SLICES
    // ========================================================================

    /// Source text from the start of token `first` to the end of token `last`.
    fn slice(&self, first: usize, last: usize) -> &'a str {
        let range = TextRange::new(self.tokens[first].range.start(), self.tokens[last].range.end());
        &self.source[range]
    }

    fn column_of(&self, index: usize) -> u32 {
        self.tokens
            .get(index)
            .map_or(0, |t| self.lines.column(t.range.start()))
    }

    /// The comments between token `index` and the previous token, as one
    /// snippet. A comment trailing the previous token on its line stays
    /// with that token.
    fn doc_before(&self, index: usize) -> Option<Snippet> {
        let start = self.tokens.get(index)?.range.start();
        let prev_end = index.checked_sub(1).map(|i| self.tokens[i].range.end());
        let prev_line = prev_end.map(|end| self.lines.line_col(end).line);
        let from = self
            .comments
            .partition_point(|c| c.end() <= prev_end.unwrap_or_default());
        let to = self.comments.partition_point(|c| c.end() <= start);
        let mut leading = self.comments[from..to]
            .iter()
            .filter(|c| prev_line.is_none_or(|line| self.lines.line_col(c.start()).line > line));
        let first = *leading.next()?;
        let last = leading.last().copied().unwrap_or(first);
        let range = TextRange::new(first.start(), last.end());
        Some(Snippet::new(&self.source[range], self.lines.column(first.start())))
    }

    /// Consume a balanced `open ... close` group, returning its token bounds.
    fn balanced(&mut self, open: TokenKind, close: TokenKind) -> PResult<(usize, usize)> {
        let first = self.pos;
        self.bump()?;
        let mut depth = 1usize;
        while depth > 0 {
            if self.is_eof() {
                self.pos = first;
                return Err(self.error("unbalanced delimiter"));
            }
            let token = self.bump()?;
            if token.kind == open {
                depth += 1;
            } else if token.kind == close {
                depth -= 1;
            }
        }
        Ok((first, self.pos - 1))
    }

    fn balanced_text(&mut self, open: TokenKind, close: TokenKind) -> PResult<String> {
        let (first, last) = self.balanced(open, close)?;
        Ok(self.slice(first, last).to_owned())
    }

    fn block(&mut self, col: u32) -> PResult<Snippet> {
        if !self.at(TokenKind::LBrace) {
            return Err(self.error(format!("expected '{{', found {}", self.found())));
        }
        let (first, last) = self.balanced(TokenKind::LBrace, TokenKind::RBrace)?;
        Ok(Snippet::new(self.slice(first, last), col))
    }

    /// Raw text up to (not including) the first depth-0 token matching `stop`.
    fn text_until(&mut self, stop: impl Fn(&Self) -> bool) -> PResult<Option<(usize, usize)>> {
        let first = self.pos;
        let mut depth = 0usize;
        loop {
            let Some(kind) = self.peek() else {
                return Err(self.error("unexpected end of file"));
            };
            if depth == 0 && stop(self) {
                break;
            }
            match kind {
                TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket => {
                    if depth == 0 {
                        return Err(self.error(format!("unexpected {}", self.found())));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.pos += 1;
        }
        Ok((self.pos > first).then(|| (first, self.pos - 1)))
    }

    // ========================================================================
    // COMPILATION UNIT
    // ========================================================================

    fn compilation_unit(mut self) -> PResult<CompilationUnit> {
        let mut unit = CompilationUnit::default();
        let header = self.doc_before(0);

        let start = self.pos;
        let (annotations, modifiers) = self.modifiers()?;
        let mut pending = None;
        if self.eat(TokenKind::Package) {
            unit.package = Some(self.qualified_name("package name")?);
            self.expect(TokenKind::Semi, "';'")?;
            unit.package_annotations = annotations;
        } else if !annotations.is_empty() || modifiers != Modifiers::new() {
            pending = Some((start, annotations, modifiers));
        }

        if pending.is_none() {
            loop {
                if self.eat(TokenKind::Semi) {
                    continue;
                }
                if !self.at(TokenKind::Import) {
                    break;
                }
                unit.imports.push(self.import()?);
            }
        }

        if let Some((start, annotations, modifiers)) = pending {
            unit.types.push(self.type_decl(start, annotations, modifiers)?);
        }
        while !self.is_eof() {
            if self.eat(TokenKind::Semi) {
                continue;
            }
            let start = self.pos;
            let (annotations, modifiers) = self.modifiers()?;
            unit.types.push(self.type_decl(start, annotations, modifiers)?);
        }
        // Without a package or imports the leading comment belongs to the
        // first type.
        if unit.package.is_some() || !unit.imports.is_empty() {
            unit.header = header;
        }
        Ok(unit)
    }

    fn qualified_name(&mut self, what: &str) -> PResult<SmolStr> {
        let mut name = self.ident(what)?.to_string();
        while self.at(TokenKind::Dot) && self.nth(1) == Some(TokenKind::Ident) {
            self.pos += 1;
            name.push('.');
            name.push_str(&self.ident(what)?);
        }
        Ok(SmolStr::new(name))
    }

    fn import(&mut self) -> PResult<Import> {
        self.expect(TokenKind::Import, "'import'")?;
        let is_static = self.eat(TokenKind::Static);
        let mut path = self.ident("import path")?.to_string();
        let mut wildcard = false;
        while self.eat(TokenKind::Dot) {
            if self.at_op("*") {
                self.pos += 1;
                wildcard = true;
                break;
            }
            path.push('.');
            path.push_str(&self.ident("import path")?);
        }
        self.expect(TokenKind::Semi, "';' after import")?;
        Ok(Import {
            is_static,
            path: SmolStr::new(path),
            wildcard,
        })
    }

    // ========================================================================
    // MODIFIERS & ANNOTATIONS
    // ========================================================================

    fn modifiers(&mut self) -> PResult<(Vec<Annotation>, Modifiers)> {
        let mut annotations = Vec::new();
        let mut modifiers = Modifiers::new();
        loop {
            let modifier = match self.peek() {
                Some(TokenKind::At) if self.nth(1) != Some(TokenKind::Interface) => {
                    annotations.push(self.annotation()?);
                    continue;
                }
                Some(TokenKind::Public) => Modifier::Public,
                Some(TokenKind::Protected) => Modifier::Protected,
                Some(TokenKind::Private) => Modifier::Private,
                Some(TokenKind::Static) => Modifier::Static,
                Some(TokenKind::Final) => Modifier::Final,
                Some(TokenKind::Abstract) => Modifier::Abstract,
                Some(TokenKind::Native) => Modifier::Native,
                Some(TokenKind::Synchronized) => Modifier::Synchronized,
                Some(TokenKind::Transient) => Modifier::Transient,
                Some(TokenKind::Volatile) => Modifier::Volatile,
                Some(TokenKind::Strictfp) => Modifier::Strictfp,
                Some(TokenKind::Default) => Modifier::Default,
                Some(TokenKind::Ident) if self.at_ident("sealed") && self.sealed_follows(1) => {
                    Modifier::Sealed
                }
                Some(TokenKind::Ident)
                    if self.at_ident("non")
                        && self.nth(1) == Some(TokenKind::Op)
                        && self.nth_text(1) == "-"
                        && self.nth_text(2) == "sealed" =>
                {
                    self.pos += 2;
                    Modifier::NonSealed
                }
                _ => break,
            };
            self.pos += 1;
            modifiers.push(modifier);
        }
        Ok((annotations, modifiers))
    }

    /// `sealed` is contextual: it is a modifier only before a declaration.
    fn sealed_follows(&self, n: usize) -> bool {
        matches!(
            self.nth(n),
            Some(
                TokenKind::Class
                    | TokenKind::Interface
                    | TokenKind::Public
                    | TokenKind::Protected
                    | TokenKind::Private
                    | TokenKind::Static
                    | TokenKind::Abstract
                    | TokenKind::Strictfp
                    | TokenKind::At
            )
        )
    }

    fn annotation(&mut self) -> PResult<Annotation> {
        self.expect(TokenKind::At, "'@'")?;
        let name = self.qualified_name("annotation name")?;
        let args = if self.at(TokenKind::LParen) {
            Some(self.balanced_text(TokenKind::LParen, TokenKind::RParen)?)
        } else {
            None
        };
        Ok(Annotation { name, args })
    }

    // ========================================================================
    // TYPE DECLARATIONS
    // ========================================================================

    fn at_type_decl(&self) -> bool {
        match self.peek() {
            Some(TokenKind::Class | TokenKind::Interface | TokenKind::Enum) => true,
            Some(TokenKind::At) => self.nth(1) == Some(TokenKind::Interface),
            Some(TokenKind::Ident) => {
                self.at_ident("record")
                    && self.nth(1) == Some(TokenKind::Ident)
                    && matches!(self.nth(2), Some(TokenKind::LParen | TokenKind::Lt))
            }
            _ => false,
        }
    }

    fn type_decl(
        &mut self,
        start: usize,
        annotations: Vec<Annotation>,
        modifiers: Modifiers,
    ) -> PResult<TypeDecl> {
        if !self.at_type_decl() {
            return Err(self.error(format!(
                "expected class, interface, enum or record, found {}",
                self.found()
            )));
        }
        let kind = match self.peek() {
            Some(TokenKind::Class) => TypeKind::Class,
            Some(TokenKind::Interface) => TypeKind::Interface,
            Some(TokenKind::Enum) => TypeKind::Enum,
            Some(TokenKind::At) => {
                self.pos += 1;
                TypeKind::Annotation
            }
            _ => TypeKind::Record,
        };
        self.pos += 1;

        let mut decl = TypeDecl::new(kind, self.ident("type name")?);
        decl.doc = self.doc_before(start);
        decl.annotations = annotations;
        decl.modifiers = modifiers;

        loop {
            match self.peek() {
                Some(TokenKind::LBrace) => break,
                Some(TokenKind::Lt) if decl.type_params.is_none() => {
                    decl.type_params = Some(self.balanced_text(TokenKind::Lt, TokenKind::Gt)?);
                }
                Some(TokenKind::LParen) if kind == TypeKind::Record => {
                    decl.components = self.params()?;
                }
                Some(TokenKind::Extends) => {
                    self.pos += 1;
                    decl.extends = self.type_list()?;
                }
                Some(TokenKind::Implements) => {
                    self.pos += 1;
                    decl.implements = self.type_list()?;
                }
                Some(TokenKind::Ident) if self.at_ident("permits") => {
                    self.pos += 1;
                    decl.permits = self.type_list()?;
                }
                _ => {
                    return Err(self.error(format!(
                        "expected '{{' in declaration of {}, found {}",
                        decl.name,
                        self.found()
                    )));
                }
            }
        }

        self.type_body(&mut decl)?;
        Ok(decl)
    }

    /// Comma separated types of an `extends`, `implements` or `permits` clause.
    fn type_list(&mut self) -> PResult<Vec<String>> {
        let mut items = Vec::new();
        loop {
            let first = self.pos;
            self.type_ref()?;
            items.push(self.slice(first, self.pos - 1).to_owned());
            if !self.eat(TokenKind::Comma) {
                return Ok(items);
            }
        }
    }

    fn type_body(&mut self, decl: &mut TypeDecl) -> PResult<()> {
        self.expect(TokenKind::LBrace, "'{'")?;
        if decl.kind == TypeKind::Enum {
            let col = self.column_of(self.pos);
            let constants =
                self.text_until(|p| p.at(TokenKind::Semi) || p.at(TokenKind::RBrace))?;
            decl.enum_constants =
                constants.map(|(first, last)| Snippet::new(self.slice(first, last), col));
            self.eat(TokenKind::Semi);
        }
        loop {
            if self.eat(TokenKind::Semi) {
                continue;
            }
            if self.eat(TokenKind::RBrace) {
                return Ok(());
            }
            if self.is_eof() {
                return Err(self.error(format!("unclosed body of {}", decl.name)));
            }
            self.member(decl)?;
        }
    }

    // ========================================================================
    // MEMBERS
    // ========================================================================

    fn member(&mut self, decl: &mut TypeDecl) -> PResult<()> {
        let start = self.pos;
        let doc = self.doc_before(start);
        let col = self.column_of(start);
        let (annotations, modifiers) = self.modifiers()?;

        if self.at(TokenKind::LBrace) {
            let body = self.block(col)?;
            decl.members.push(Member {
                doc,
                annotations,
                modifiers,
                kind: MemberKind::Initializer(body),
            });
            return Ok(());
        }

        if self.at_type_decl() {
            let nested = self.type_decl(start, annotations, modifiers)?;
            decl.members.push(Member::new(MemberKind::Type(Box::new(nested))));
            return Ok(());
        }

        let type_params = if self.at(TokenKind::Lt) {
            Some(self.balanced_text(TokenKind::Lt, TokenKind::Gt)?)
        } else {
            None
        };

        let is_constructor = self.at(TokenKind::Ident)
            && (self.nth(1) == Some(TokenKind::LParen)
                || (decl.kind == TypeKind::Record
                    && self.nth_text(0) == decl.name
                    && self.nth(1) == Some(TokenKind::LBrace)));
        if is_constructor {
            let name = self.ident("constructor name")?;
            let compact = !self.at(TokenKind::LParen);
            let params = if compact { Vec::new() } else { self.params()? };
            let throws = self.throws()?;
            let body = self.block(col)?;
            decl.members.push(Member {
                doc,
                annotations,
                modifiers,
                kind: MemberKind::Constructor(Constructor {
                    type_params,
                    name,
                    params,
                    compact,
                    throws,
                    body,
                }),
            });
            return Ok(());
        }

        let ty = self.type_text()?;
        let name = self.ident("member name")?;

        if self.at(TokenKind::LParen) {
            let params = self.params()?;
            let ret = ty + &self.dims()?;
            let throws = self.throws()?;
            let default_value = if self.eat(TokenKind::Default) {
                self.text_until(|p| p.at(TokenKind::Semi))?
                    .map(|(first, last)| self.slice(first, last).to_owned())
            } else {
                None
            };
            let body = if self.at(TokenKind::LBrace) {
                Some(self.block(col)?)
            } else {
                self.expect(TokenKind::Semi, "method body or ';'")?;
                None
            };
            decl.members.push(Member {
                doc,
                annotations,
                modifiers,
                kind: MemberKind::Method(Method {
                    type_params,
                    ret,
                    name,
                    params,
                    throws,
                    body,
                    default_value,
                }),
            });
            return Ok(());
        }

        // One member per declarator: `int a = 1, b;` becomes two fields that
        // share the declaration's annotations and modifiers.
        let mut name = name;
        loop {
            let field_ty = ty.clone() + &self.dims()?;
            let init = if self.at_op("=") {
                self.pos += 1;
                let bounds = self.text_until(|p| {
                    p.at(TokenKind::Semi) || (p.at(TokenKind::Comma) && p.declarator_follows())
                })?;
                let (first, last) = bounds.ok_or_else(|| self.error("expected initializer"))?;
                Some(Snippet::new(self.slice(first, last), col))
            } else {
                None
            };
            decl.members.push(Member {
                doc: doc.clone(),
                annotations: annotations.clone(),
                modifiers: modifiers.clone(),
                kind: MemberKind::Field(Field {
                    ty: field_ty,
                    name,
                    init,
                }),
            });
            if self.eat(TokenKind::Comma) {
                name = self.ident("field name")?;
                continue;
            }
            self.expect(TokenKind::Semi, "';' after field")?;
            return Ok(());
        }
    }

    /// After a depth-0 comma in an initializer: does a new declarator start?
    /// Rules out commas inside generic arguments like `new HashMap<A, B>()`.
    fn declarator_follows(&self) -> bool {
        self.nth(1) == Some(TokenKind::Ident)
            && match self.nth(2) {
                Some(TokenKind::Comma | TokenKind::Semi | TokenKind::LBracket) => true,
                Some(TokenKind::Op) => self.nth_text(2) == "=",
                _ => false,
            }
    }

    /// Skip a type reference: `a.b.C<D>[]`.
    fn type_ref(&mut self) -> PResult<()> {
        while self.at(TokenKind::At) {
            self.annotation()?;
        }
        self.expect(TokenKind::Ident, "type")?;
        loop {
            match self.peek() {
                Some(TokenKind::Dot) if self.nth(1) == Some(TokenKind::Ident) => self.pos += 2,
                Some(TokenKind::Lt) => {
                    self.balanced(TokenKind::Lt, TokenKind::Gt)?;
                }
                Some(TokenKind::LBracket) if self.nth(1) == Some(TokenKind::RBracket) => {
                    self.pos += 2
                }
                _ => return Ok(()),
            }
        }
    }

    fn type_text(&mut self) -> PResult<String> {
        let first = self.pos;
        self.type_ref()?;
        Ok(self.slice(first, self.pos - 1).to_owned())
    }

    /// Array brackets written after a name: `int x[]`.
    fn dims(&mut self) -> PResult<String> {
        let mut dims = String::new();
        while self.at(TokenKind::LBracket) && self.nth(1) == Some(TokenKind::RBracket) {
            self.pos += 2;
            dims.push_str("[]");
        }
        Ok(dims)
    }

    fn params(&mut self) -> PResult<Vec<Param>> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if self.eat(TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            let first = self.pos;
            self.modifiers()?;
            let prefix = (self.pos > first).then(|| self.slice(first, self.pos - 1).to_owned());
            let ty = self.type_text()?;
            let varargs = self.eat(TokenKind::Ellipsis);
            let name = self.ident("parameter name")?;
            let ty = ty + &self.dims()?;
            params.push(Param {
                prefix,
                ty,
                varargs,
                name,
            });
            if !self.eat(TokenKind::Comma) {
                self.expect(TokenKind::RParen, "')'")?;
                return Ok(params);
            }
        }
    }

    fn throws(&mut self) -> PResult<Option<String>> {
        if !self.eat(TokenKind::Throws) {
            return Ok(None);
        }
        let bounds = self.text_until(|p| {
            matches!(
                p.peek(),
                Some(TokenKind::LBrace | TokenKind::Semi | TokenKind::Default)
            )
        })?;
        let (first, last) = bounds.ok_or_else(|| self.error("expected exception type"))?;
        Ok(Some(self.slice(first, last).to_owned()))
    }
}
