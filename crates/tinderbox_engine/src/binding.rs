//! The compile-time binding table.
//!
//! Pattern-introduced identifiers resolve once, during rule lowering,
//! to positions: the pattern index of the matched fact and, for inner
//! bindings, the field index inside it. At runtime a binding
//! environment is nothing but the match tuple itself.

use std::collections::HashMap;

use tinderbox_foundation::{Error, ErrorKind, Result};

/// Where a bound identifier points.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BindingSite {
    /// Index of the pattern that introduced the binding.
    pub pattern: usize,
    /// Field index for inner bindings; `None` for an outer binding
    /// naming the whole fact.
    pub field: Option<usize>,
}

impl BindingSite {
    /// Returns true if this binding names a whole fact.
    #[must_use]
    pub const fn is_fact(&self) -> bool {
        self.field.is_none()
    }
}

/// All bindings introduced by one rule's left-hand side.
#[derive(Clone, Debug, Default)]
pub struct BindingTable {
    entries: HashMap<String, BindingSite>,
}

impl BindingTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Introduces a binding.
    ///
    /// # Errors
    /// Returns an error if the name is already bound in this rule.
    pub fn bind(&mut self, name: impl Into<String>, site: BindingSite) -> Result<()> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(Error::new(ErrorKind::DuplicateBinding(name)));
        }
        self.entries.insert(name, site);
        Ok(())
    }

    /// Looks up a binding.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<BindingSite> {
        self.entries.get(name).copied()
    }

    /// Returns the outer binding name for a pattern, if the pattern was
    /// given one.
    #[must_use]
    pub fn fact_name_of(&self, pattern: usize) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, site)| site.pattern == pattern && site.is_fact())
            .map(|(name, _)| name.as_str())
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no bindings exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
