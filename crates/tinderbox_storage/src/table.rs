//! The fact table: per-contract working memory.
//!
//! Maps fact handles to (type tag, storage reference) pairs, partitioned
//! by type tag. Enumeration within a type follows insertion order; that
//! order is observable, since it drives conflict-resolution tie-breaks.

use std::collections::{HashMap, HashSet};

use tinderbox_foundation::{Error, FactHandle, Result, StorageRef, TypeTag};

/// One registered fact.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactEntry {
    /// Declared type of the fact.
    pub tag: TypeTag,
    /// Storage record holding the fact's fields.
    pub reference: StorageRef,
}

/// Per-contract working memory.
///
/// Invariants:
/// - handles are unique while inserted, allocated from a monotonic
///   counter starting at 1 (0 is the null handle);
/// - a storage reference is registered at most once at a time;
/// - per-type buckets hold handles in insertion order.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactTable {
    entries: HashMap<FactHandle, FactEntry>,
    buckets: HashMap<TypeTag, Vec<FactHandle>>,
    references: HashSet<StorageRef>,
    next: u64,
}

impl FactTable {
    /// Creates an empty fact table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            buckets: HashMap::new(),
            references: HashSet::new(),
            next: 1,
        }
    }

    /// Registers a storage record as a fact, allocating a fresh handle.
    ///
    /// # Errors
    /// Returns a duplicate-fact error if `reference` is already
    /// registered.
    pub fn insert(&mut self, tag: TypeTag, reference: StorageRef) -> Result<FactHandle> {
        if !self.references.insert(reference) {
            return Err(Error::duplicate_fact(reference));
        }

        let handle = FactHandle::new(self.next);
        self.next += 1;
        self.entries.insert(handle, FactEntry { tag, reference });
        self.buckets.entry(tag).or_default().push(handle);
        Ok(handle)
    }

    /// Removes a fact. Returns its entry, or `None` if the handle is
    /// not registered; the caller decides whether that is an error.
    pub fn remove(&mut self, handle: FactHandle) -> Option<FactEntry> {
        let entry = self.entries.remove(&handle)?;
        self.references.remove(&entry.reference);
        if let Some(bucket) = self.buckets.get_mut(&entry.tag) {
            bucket.retain(|h| *h != handle);
        }
        Some(entry)
    }

    /// Returns the entry for a handle.
    #[must_use]
    pub fn get(&self, handle: FactHandle) -> Option<&FactEntry> {
        self.entries.get(&handle)
    }

    /// Resolves a handle to its storage reference.
    ///
    /// # Errors
    /// Returns an unknown-handle error if the handle is not registered.
    pub fn resolve(&self, handle: FactHandle) -> Result<StorageRef> {
        self.entries
            .get(&handle)
            .map(|e| e.reference)
            .ok_or_else(|| Error::unknown_handle(handle))
    }

    /// Returns true if the handle is registered.
    #[must_use]
    pub fn contains(&self, handle: FactHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Enumerates the facts of one type in insertion order.
    pub fn iter_type(&self, tag: TypeTag) -> impl Iterator<Item = (FactHandle, StorageRef)> + '_ {
        self.buckets
            .get(&tag)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|h| (*h, self.entries[h].reference))
    }

    /// Returns the number of registered facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no facts are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every fact, keeping the handle counter monotonic.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.buckets.clear();
        self.references.clear();
    }
}
