//! Java syntax: lexer, declaration-level parser, and pretty-printer.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod printer;

pub use ast::{
    Access, Annotation, CompilationUnit, Constructor, Field, Import, Member, MemberKind, Method,
    Modifier, Modifiers, Param, Snippet, TypeDecl, TypeKind,
};
pub use parser::{ParseError, parse_java};
pub use printer::print_unit;
