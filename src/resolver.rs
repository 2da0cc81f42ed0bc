//! Member resolution: a type reference to its flattened member list.
//!
//! Own members come first, then each ancestor's in base-chain order. The
//! walk is iterative and guarded by a visited set plus a depth bound, so
//! cyclic or runaway hierarchies stop with a warning instead of looping.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ScaffoldConfig;
use crate::model::{CodeModel, DocumentId, SymbolOrigin};
use crate::syntax::TypeSyntax;

/// Compiler-generated accessor names reported by metadata readers.
static ACCESSOR_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"get_|@").expect("Invalid regex"));

/// A data member of a resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberName {
    pub name: String,
    /// Declared type is a generic container.
    pub is_collection_shaped: bool,
}

impl MemberName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_collection_shaped: false,
        }
    }

    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_collection_shaped: true,
        }
    }
}

/// Flattened, ancestor-inclusive member list. Not deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberList {
    pub members: Vec<MemberName>,
}

impl MemberList {
    pub fn new(members: Vec<MemberName>) -> Self {
        Self { members }
    }

    pub fn names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Resolves type references to member lists through a [`CodeModel`].
pub struct MemberResolver<'m, M: CodeModel + ?Sized> {
    model: &'m M,
    denylist: Vec<String>,
    max_depth: usize,
}

impl<'m, M: CodeModel + ?Sized> MemberResolver<'m, M> {
    pub fn new(model: &'m M, config: &ScaffoldConfig) -> Self {
        Self {
            model,
            denylist: config.metadata_denylist.clone(),
            max_depth: config.max_base_depth,
        }
    }

    /// Flattened members of `ty` as written in `context`.
    ///
    /// Returns an empty list when the reference does not resolve.
    pub fn resolve(&self, context: DocumentId, ty: &TypeSyntax) -> MemberList {
        let mut members = Vec::new();
        let mut visited = HashSet::new();
        let mut current = (context, ty.clone());
        let mut depth = 0;

        loop {
            let (context, ty) = &current;
            let Some(symbol) = self.model.resolve_type(*context, ty) else {
                if depth == 0 {
                    debug!(ty = %ty, "Type did not resolve");
                }
                break;
            };

            if let SymbolOrigin::Source { document, decl } = symbol.origin {
                if !visited.insert((document, decl)) {
                    warn!(ty = %symbol.name, "Base chain cycles back; stopping member walk");
                    break;
                }
            }

            let Some((document, decl)) = self.model.declaration_of(&symbol) else {
                members.extend(self.metadata_members(&symbol));
                break;
            };

            members.extend(decl.properties().into_iter().map(|(name, ty)| MemberName {
                name: name.to_string(),
                is_collection_shaped: ty.has_type_arguments(),
            }));

            let Some(base) = decl.base_type() else {
                break;
            };
            depth += 1;
            if depth > self.max_depth {
                warn!(
                    ty = %symbol.name,
                    max_depth = self.max_depth,
                    "Base chain exceeds depth bound; stopping member walk"
                );
                break;
            }
            current = (document, base.clone());
        }

        debug!(
            ty = %ty,
            members = members.len(),
            "Resolved members"
        );
        MemberList::new(members)
    }

    fn metadata_members(&self, symbol: &crate::model::Symbol) -> Vec<MemberName> {
        self.model
            .metadata_members(symbol)
            .into_iter()
            .filter(|member| !ACCESSOR_NAME.is_match(&member.name))
            .filter(|member| !self.denylist.iter().any(|denied| *denied == member.name))
            .map(|member| MemberName {
                name: member.name,
                is_collection_shaped: member.collection,
            })
            .collect()
    }
}
