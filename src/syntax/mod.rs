//! Syntax model for C#-like declaration sources.
//!
//! This is the in-crate host for the pipeline's "parse(text) -> tree"
//! collaborator:
//!
//! - [`types`]: tree, declarations, members and type references
//! - [`statement`]: assertion statements of generated scenarios
//! - [`lexer`] / [`parser`]: source text to [`SyntaxTree`]
//! - [`printer`]: declarations and statements back to source text

pub mod lexer;
pub mod parser;
pub mod printer;
pub mod statement;
pub mod types;

pub use parser::parse;
pub use printer::Printer;
pub use statement::{Accessor, AssertionStyle, Operand, Role, Statement};
pub use types::{
    DeclId, DeclKind, FieldDecl, GenericUsage, Member, MemberKind, MethodBody, MethodDecl,
    Parameter, PropertyDecl, Span, SyntaxTree, TypeArgumentList, TypeDecl, TypeReferenceKind,
    TypeSyntax, UsingDirective,
};
