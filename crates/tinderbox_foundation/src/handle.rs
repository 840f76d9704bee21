//! Fact handles and storage references.

use std::fmt;

/// Identifier for a fact registered in working memory.
///
/// Handles are dense integers allocated on insertion, starting at 1.
/// The zero handle is reserved as the null sentinel and never allocated,
/// so it can travel through host code as "no fact".
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactHandle(u64);

impl FactHandle {
    /// Creates a handle from its raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the null sentinel handle.
    #[must_use]
    pub const fn null() -> Self {
        Self(0)
    }

    /// Returns true if this is the null sentinel.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Returns the raw value of this handle.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for FactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "FactHandle(null)")
        } else {
            write!(f, "FactHandle({})", self.0)
        }
    }
}

impl fmt::Display for FactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "fact(null)")
        } else {
            write!(f, "fact({})", self.0)
        }
    }
}

/// Opaque reference to a record in host persistent storage.
///
/// The engine never dereferences a storage reference itself; all field
/// access goes through the host's load/store primitives. The only
/// property relied upon is that distinct records have distinct
/// references.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StorageRef(u64);

impl StorageRef {
    /// Creates a storage reference from its raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value of this reference.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for StorageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageRef({:#x})", self.0)
    }
}
