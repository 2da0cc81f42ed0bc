//! Types known only through metadata.
//!
//! A [`ForeignType`] stands in for a compiled type with no source in the
//! workspace. Member names are kept raw, the way a metadata reader reports
//! them (`.ctor`, `get_Name`, `ToString`, ...); filtering happens in the
//! member resolver.
//!
//! Rust structs can describe themselves with `#[derive(Shape)]`:
//!
//! ```
//! use convtest_core::model::TypeMetadata;
//! use convtest_core_derive::Shape;
//!
//! #[derive(Shape)]
//! #[shape(name = "Contracts.Invoice")]
//! struct Invoice {
//!     #[shape(rename = "Number")]
//!     number: String,
//!     #[shape(rename = "Lines")]
//!     lines: Vec<String>,
//! }
//!
//! let ty = Invoice::foreign_type();
//! assert_eq!(ty.name, "Contracts.Invoice");
//! assert!(ty.members[1].collection);
//! ```

use serde::{Deserialize, Serialize};

/// One member as reported by metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignMember {
    pub name: String,
    /// Declared type is a generic container.
    #[serde(default)]
    pub collection: bool,
}

impl ForeignMember {
    pub fn new(name: impl Into<String>, collection: bool) -> Self {
        Self {
            name: name.into(),
            collection,
        }
    }
}

/// A type without a structural declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignType {
    /// Fully qualified name, e.g. `Contracts.Invoice`.
    pub name: String,
    #[serde(default)]
    pub members: Vec<ForeignMember>,
}

impl ForeignType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Add a scalar member.
    pub fn with_member(mut self, name: impl Into<String>) -> Self {
        self.members.push(ForeignMember::new(name, false));
        self
    }

    /// Add a collection-shaped member.
    pub fn with_collection(mut self, name: impl Into<String>) -> Self {
        self.members.push(ForeignMember::new(name, true));
        self
    }

    /// Rightmost segment of the qualified name.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Whether `path` names this type, either fully or as a trailing
    /// run of segments.
    pub fn matches_path(&self, path: &str) -> bool {
        self.name == path
            || self
                .name
                .strip_suffix(path)
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}

/// Static description of a type's metadata.
///
/// Usually derived with `#[derive(Shape)]`.
pub trait TypeMetadata {
    /// Qualified type name.
    fn type_name() -> &'static str;

    /// Members in declaration order.
    fn members() -> Vec<ForeignMember>;

    /// Package the description as a [`ForeignType`].
    fn foreign_type() -> ForeignType
    where
        Self: Sized,
    {
        ForeignType {
            name: Self::type_name().to_string(),
            members: Self::members(),
        }
    }
}
