//! The word-sized value type exchanged with the host.

use std::fmt;

use crate::handle::FactHandle;
use crate::types::FieldType;

/// Account address in the host chain.
///
/// Opaque to the engine; only equality matters here.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address(pub u64);

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({:#x})", self.0)
    }
}

/// A fact field value.
///
/// Every variant is word-sized in the host; the engine copies values
/// freely but never caches them across firing iterations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Signed integer.
    Int(i64),
    /// Boolean.
    Bool(bool),
    /// Account address.
    Address(Address),
    /// Fact handle.
    Handle(FactHandle),
}

impl Value {
    /// Returns the field type of this value.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        match self {
            Self::Int(_) => FieldType::Int,
            Self::Bool(_) => FieldType::Bool,
            Self::Address(_) => FieldType::Address,
            Self::Handle(_) => FieldType::Handle,
        }
    }

    /// Attempts to extract an integer.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract an address.
    #[must_use]
    pub const fn as_address(&self) -> Option<Address> {
        match self {
            Self::Address(a) => Some(*a),
            _ => None,
        }
    }

    /// Attempts to extract a fact handle.
    #[must_use]
    pub const fn as_handle(&self) -> Option<FactHandle> {
        match self {
            Self::Handle(h) => Some(*h),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Address(a) => write!(f, "{a:?}"),
            Self::Handle(h) => write!(f, "{h}"),
        }
    }
}
