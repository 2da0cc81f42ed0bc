//! Code model seams between the pipeline and its host.
//!
//! The pipeline reads types through [`CodeModel`] and writes replacements
//! through [`TreeEditor`]. [`Workspace`] is the in-memory host shipped with
//! the crate; other hosts implement the traits over their own trees.

pub mod metadata;
pub mod workspace;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::syntax::{DeclId, SyntaxTree, TypeDecl, TypeSyntax};

pub use metadata::{ForeignMember, ForeignType, TypeMetadata};
pub use workspace::Workspace;

/// Identifier of a document held by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub usize);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "document #{}", self.0)
    }
}

/// Where a resolved type lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SymbolOrigin {
    /// Declared in a document with a structural declaration.
    Source { document: DocumentId, decl: DeclId },
    /// Known only through metadata (compiled or foreign types).
    Metadata,
}

/// A resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    /// Fully qualified name.
    pub name: String,
    pub origin: SymbolOrigin,
}

impl Symbol {
    pub fn source(name: impl Into<String>, document: DocumentId, decl: DeclId) -> Self {
        Self {
            name: name.into(),
            origin: SymbolOrigin::Source { document, decl },
        }
    }

    pub fn metadata(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: SymbolOrigin::Metadata,
        }
    }

    pub fn is_metadata(&self) -> bool {
        self.origin == SymbolOrigin::Metadata
    }
}

/// Symbol resolution over a host's documents.
pub trait CodeModel: Send + Sync {
    /// Parsed tree of a document.
    fn document(&self, id: DocumentId) -> Option<&SyntaxTree>;

    /// Resolve a type reference written in `context`.
    fn resolve_type(&self, context: DocumentId, ty: &TypeSyntax) -> Option<Symbol>;

    /// Structural declaration of a symbol, if it has one.
    fn declaration_of(&self, symbol: &Symbol) -> Option<(DocumentId, &TypeDecl)>;

    /// Raw metadata members of a symbol without a structural declaration.
    ///
    /// Names are reported as the host sees them, accessor and
    /// constructor entries included.
    fn metadata_members(&self, symbol: &Symbol) -> Vec<ForeignMember>;

    /// Member names of [`CodeModel::metadata_members`].
    fn metadata_member_names(&self, symbol: &Symbol) -> Vec<String> {
        self.metadata_members(symbol)
            .into_iter()
            .map(|member| member.name)
            .collect()
    }
}

/// Tree-edit channel used to apply a rewrite.
pub trait TreeEditor {
    /// Replace declaration `old` of `document` with `new`.
    ///
    /// Either the whole replacement lands or the document is unchanged.
    fn replace_node(&mut self, document: DocumentId, old: DeclId, new: &TypeDecl) -> Result<()>;
}
