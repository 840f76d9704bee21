//! Type descriptors for fact schemas.

use std::fmt;

/// Dense identifier for a declared fact type.
///
/// Assigned in declaration order when a contract's fact types are
/// registered; used to index the type-partitioned working memory.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeTag(u32);

impl TypeTag {
    /// Creates a tag from its raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index of this tag.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({})", self.0)
    }
}

/// Type of a single fact field.
///
/// The engine only distinguishes the word-sized shapes it has to compare
/// and compute with; richer numeric semantics belong to the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldType {
    /// Signed integer.
    Int,
    /// Boolean.
    Bool,
    /// Account address.
    Address,
    /// Fact handle.
    Handle,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Bool => write!(f, "bool"),
            Self::Address => write!(f, "address"),
            Self::Handle => write!(f, "handle"),
        }
    }
}
