//! Syntax tree types for C#-like declaration sources.
//!
//! The tree keeps just enough structure for converter detection and member
//! resolution: type references, declarations, base lists and members.
//! Method bodies, initializers and trivia are retained verbatim so a
//! declaration can be re-rendered without disturbing code the pipeline
//! never looks at.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::statement::Statement;

/// Byte range in the source text of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Shape of a type reference.
///
/// A reference is either a single identifier (`ConvertFrom`) or a dotted
/// path (`Msg.PhoneCall`). Type arguments, if any, hang off the last
/// segment and live on [`TypeSyntax`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TypeReferenceKind {
    Simple(String),
    Qualified(Vec<String>),
}

impl TypeReferenceKind {
    /// Build a reference from dotted text, picking the variant by segment count.
    pub fn from_dotted(text: &str) -> Self {
        let segments: Vec<String> = text
            .split('.')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        match segments.len() {
            0 => Self::Simple(String::new()),
            1 => Self::Simple(segments.into_iter().next().unwrap_or_default()),
            _ => Self::Qualified(segments),
        }
    }

    /// Rightmost identifier.
    pub fn name(&self) -> &str {
        match self {
            Self::Simple(name) => name,
            Self::Qualified(path) => path.last().map(String::as_str).unwrap_or(""),
        }
    }

    /// All segments, left to right.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::Simple(name) => vec![name.as_str()],
            Self::Qualified(path) => path.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for TypeReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(name) => f.write_str(name),
            Self::Qualified(path) => f.write_str(&path.join(".")),
        }
    }
}

/// A type as written in source: reference, optional type arguments and
/// array/nullable suffixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSyntax {
    pub reference: TypeReferenceKind,
    pub type_args: Option<TypeArgumentList>,
    pub array_rank: usize,
    pub nullable: bool,
    pub span: Span,
}

impl TypeSyntax {
    /// A synthesized type with no source location.
    pub fn named(reference: TypeReferenceKind) -> Self {
        Self {
            reference,
            type_args: None,
            array_rank: 0,
            nullable: false,
            span: Span::default(),
        }
    }

    /// A synthesized generic type `name<args...>`.
    pub fn generic(reference: TypeReferenceKind, args: Vec<TypeSyntax>) -> Self {
        Self {
            type_args: Some(TypeArgumentList {
                args,
                span: Span::default(),
            }),
            ..Self::named(reference)
        }
    }

    /// Rightmost identifier of the reference.
    pub fn name(&self) -> &str {
        self.reference.name()
    }

    /// Whether the type carries a type-argument list anywhere in it.
    pub fn has_type_arguments(&self) -> bool {
        self.type_args.is_some()
    }

    /// Number of type arguments on this type (0 when not generic).
    pub fn arity(&self) -> usize {
        self.type_args.as_ref().map_or(0, |list| list.args.len())
    }

    /// Visit this type and every type nested in its arguments, outermost first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TypeSyntax)) {
        visit(self);
        if let Some(list) = &self.type_args {
            for arg in &list.args {
                arg.walk(visit);
            }
        }
    }
}

impl fmt::Display for TypeSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reference)?;
        if let Some(list) = &self.type_args {
            write!(f, "{}", list)?;
        }
        for _ in 0..self.array_rank {
            f.write_str("[]")?;
        }
        if self.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}

/// `<A, B>` following a generic name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeArgumentList {
    pub args: Vec<TypeSyntax>,
    pub span: Span,
}

impl fmt::Display for TypeArgumentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<")?;
        for (idx, arg) in self.args.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(">")
    }
}

/// Index of a declaration inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeclId(pub usize);

/// Kind of type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Class,
    Struct,
    Interface,
    Record,
    RecordStruct,
    Enum,
}

impl DeclKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Interface => "interface",
            Self::Record => "record",
            Self::RecordStruct => "record struct",
            Self::Enum => "enum",
        }
    }
}

/// Method or constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub modifiers: Vec<String>,
    pub ty: TypeSyntax,
    pub name: String,
    /// Default value, verbatim.
    pub default: Option<String>,
}

impl Parameter {
    pub fn new(ty: TypeSyntax, name: impl Into<String>) -> Self {
        Self {
            modifiers: Vec::new(),
            ty,
            name: name.into(),
            default: None,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{} ", modifier)?;
        }
        write!(f, "{} {}", self.ty, self.name)?;
        if let Some(default) = &self.default {
            write!(f, " = {}", default)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub modifiers: Vec<String>,
    pub ty: TypeSyntax,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub modifiers: Vec<String>,
    pub ty: TypeSyntax,
    pub names: Vec<String>,
}

/// Where a method's body lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MethodBody {
    /// Parsed body, kept verbatim in the member text (or absent for `;`).
    Source,
    /// Synthesized statement block.
    Statements(Vec<Statement>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub attributes: Vec<String>,
    pub modifiers: Vec<String>,
    pub return_type: TypeSyntax,
    pub name: String,
    pub type_parameters: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub body: MethodBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemberKind {
    Property(PropertyDecl),
    Field(FieldDecl),
    Method(MethodDecl),
    Constructor {
        name: String,
        parameters: Vec<Parameter>,
    },
    /// Nested type declaration.
    Type { id: DeclId },
    /// Events, indexers, operators, destructors.
    Other,
}

/// A member of a type declaration.
///
/// `text` holds the verbatim source from the end of the previous member
/// (leading trivia included) to the end of this one. Synthesized members
/// have no text and are rendered structurally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub kind: MemberKind,
    pub text: Option<String>,
    pub span: Span,
}

impl Member {
    /// A synthesized member.
    pub fn generated(kind: MemberKind) -> Self {
        Self {
            kind,
            text: None,
            span: Span::default(),
        }
    }

    pub fn as_method(&self) -> Option<&MethodDecl> {
        match &self.kind {
            MemberKind::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyDecl> {
        match &self.kind {
            MemberKind::Property(property) => Some(property),
            _ => None,
        }
    }
}

/// A class, record, struct, interface or enum declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub attributes: Vec<String>,
    pub modifiers: Vec<String>,
    pub kind: DeclKind,
    pub name: String,
    pub type_parameters: Vec<String>,
    /// Positional parameters of a record (`record Point(int X, int Y)`).
    pub primary_parameters: Option<Vec<Parameter>>,
    pub base_list: Vec<TypeSyntax>,
    /// `where` clauses, verbatim.
    pub constraints: Option<String>,
    pub members: Vec<Member>,
    /// `false` for body-less declarations such as `record Point(int X);`.
    pub has_body: bool,
    /// Verbatim text between the last member and the closing brace.
    pub closing_trivia: String,
    pub namespace: Option<String>,
    pub parent: Option<DeclId>,
    pub span: Span,
}

impl TypeDecl {
    /// Direct methods, in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(Member::as_method)
    }

    /// Whether a direct method with exactly this name exists.
    pub fn has_method(&self, name: &str) -> bool {
        self.methods().any(|method| method.name == name)
    }

    /// Property-like members in declaration order: record positional
    /// parameters first, then declared properties. Primary constructor
    /// parameters of non-record types are not properties.
    pub fn properties(&self) -> Vec<(&str, &TypeSyntax)> {
        let is_record = matches!(self.kind, DeclKind::Record | DeclKind::RecordStruct);
        let positional = self
            .primary_parameters
            .iter()
            .flatten()
            .filter(|_| is_record)
            .map(|param| (param.name.as_str(), &param.ty));
        let declared = self
            .members
            .iter()
            .filter_map(Member::as_property)
            .map(|property| (property.name.as_str(), &property.ty));
        positional.chain(declared).collect()
    }

    /// First entry of the base list, conventionally the base class.
    pub fn base_type(&self) -> Option<&TypeSyntax> {
        self.base_list.first()
    }
}

/// `using X;`, `using static X;` or `using Alias = X;`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsingDirective {
    pub alias: Option<String>,
    pub is_static: bool,
    pub target: TypeSyntax,
    pub span: Span,
}

/// A generic type usage found while walking a tree.
#[derive(Debug, Clone, Copy)]
pub struct GenericUsage<'t> {
    pub ty: &'t TypeSyntax,
    /// Nearest enclosing type declaration, `None` at file level.
    pub enclosing: Option<DeclId>,
}

/// A parsed source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxTree {
    pub path: String,
    pub text: String,
    pub usings: Vec<UsingDirective>,
    /// Every declaration in the file, nested ones included, in source order.
    pub declarations: Vec<TypeDecl>,
}

impl SyntaxTree {
    pub fn declaration(&self, id: DeclId) -> Option<&TypeDecl> {
        self.declarations.get(id.0)
    }

    pub fn iter_declarations(&self) -> impl Iterator<Item = (DeclId, &TypeDecl)> {
        self.declarations
            .iter()
            .enumerate()
            .map(|(idx, decl)| (DeclId(idx), decl))
    }

    /// Namespace, enclosing types and name joined with dots.
    pub fn full_name(&self, id: DeclId) -> Option<String> {
        let decl = self.declaration(id)?;
        let mut parts = vec![decl.name.clone()];
        let mut parent = decl.parent;
        while let Some(parent_id) = parent {
            let outer = self.declaration(parent_id)?;
            parts.push(outer.name.clone());
            parent = outer.parent;
        }
        if let Some(namespace) = &decl.namespace {
            parts.push(namespace.clone());
        }
        parts.reverse();
        Some(parts.join("."))
    }

    /// Every generic type usage in the file paired with its nearest
    /// enclosing declaration.
    pub fn generic_usages(&self) -> Vec<GenericUsage<'_>> {
        let mut usages = Vec::new();

        for using in &self.usings {
            collect_generic_usages(&using.target, None, &mut usages);
        }

        for (id, decl) in self.iter_declarations() {
            let owner = Some(id);
            for base in &decl.base_list {
                collect_generic_usages(base, owner, &mut usages);
            }
            for param in decl.primary_parameters.iter().flatten() {
                collect_generic_usages(&param.ty, owner, &mut usages);
            }
            for member in &decl.members {
                match &member.kind {
                    MemberKind::Property(property) => {
                        collect_generic_usages(&property.ty, owner, &mut usages)
                    }
                    MemberKind::Field(field) => {
                        collect_generic_usages(&field.ty, owner, &mut usages)
                    }
                    MemberKind::Method(method) => {
                        collect_generic_usages(&method.return_type, owner, &mut usages);
                        for param in &method.parameters {
                            collect_generic_usages(&param.ty, owner, &mut usages);
                        }
                    }
                    MemberKind::Constructor { parameters, .. } => {
                        for param in parameters {
                            collect_generic_usages(&param.ty, owner, &mut usages);
                        }
                    }
                    MemberKind::Type { .. } | MemberKind::Other => {}
                }
            }
        }

        usages
    }

    /// 1-based line and column of a byte offset.
    pub fn line_column(&self, offset: usize) -> (usize, usize) {
        line_column(&self.text, offset)
    }
}

fn collect_generic_usages<'t>(
    ty: &'t TypeSyntax,
    enclosing: Option<DeclId>,
    out: &mut Vec<GenericUsage<'t>>,
) {
    ty.walk(&mut |inner| {
        if inner.type_args.is_some() {
            out.push(GenericUsage {
                ty: inner,
                enclosing,
            });
        }
    });
}

pub(crate) fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(text.len());
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let column = before.rfind('\n').map_or(offset, |idx| offset - idx - 1) + 1;
    (line, column)
}
