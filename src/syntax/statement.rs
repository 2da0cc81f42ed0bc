//! Assertion statements of a generated test scenario.

use serde::{Deserialize, Serialize};

/// Which side of the converter an operand reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The source instance (`expected`).
    Expected,
    /// The destination instance (`tested`).
    Tested,
}

/// What is read from the instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Accessor {
    /// The instance itself.
    Instance,
    /// A named member of the instance.
    Member(String),
    /// Placeholder for a member with no counterpart on the other side.
    Mismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operand {
    pub role: Role,
    pub accessor: Accessor,
}

impl Operand {
    pub fn instance(role: Role) -> Self {
        Self {
            role,
            accessor: Accessor::Instance,
        }
    }

    pub fn member(role: Role, name: impl Into<String>) -> Self {
        Self {
            role,
            accessor: Accessor::Member(name.into()),
        }
    }

    pub fn mismatch(role: Role) -> Self {
        Self {
            role,
            accessor: Accessor::Mismatch,
        }
    }

    pub fn is_mismatch(&self) -> bool {
        self.accessor == Accessor::Mismatch
    }
}

/// One assertion of a generated scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    /// `target` is not null.
    NotNull { target: Operand },
    /// `actual` equals `expected`.
    Equal { actual: Operand, expected: Operand },
    /// Length of the `actual` collection equals the count of `expected`.
    CountEqual { actual: Operand, expected: Operand },
}

impl Statement {
    pub fn not_null(target: Operand) -> Self {
        Self::NotNull { target }
    }

    pub fn equal(actual: Operand, expected: Operand) -> Self {
        Self::Equal { actual, expected }
    }

    pub fn count_equal(actual: Operand, expected: Operand) -> Self {
        Self::CountEqual { actual, expected }
    }

    /// Whether the statement references a mismatch placeholder.
    pub fn has_mismatch(&self) -> bool {
        match self {
            Self::NotNull { target } => target.is_mismatch(),
            Self::Equal { actual, expected } | Self::CountEqual { actual, expected } => {
                actual.is_mismatch() || expected.is_mismatch()
            }
        }
    }

    /// Whether the statement opens a collection group (null guard on a member).
    pub(crate) fn opens_group(&self) -> bool {
        matches!(
            self,
            Self::NotNull {
                target: Operand {
                    accessor: Accessor::Member(_) | Accessor::Mismatch,
                    ..
                }
            }
        )
    }
}

/// Test framework dialect for rendered assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssertionStyle {
    /// `Assert.That(actual, Is.EqualTo(expected));`
    #[default]
    #[serde(rename = "nunit")]
    NUnit,
    /// `Assert.Equal(expected, actual);`
    #[serde(rename = "xunit")]
    XUnit,
}
