//! The injected host-services interface.
//!
//! The engine reads and writes fact fields only through [`Host`], so it
//! can be unit-tested against [`MemoryHost`] and embedded against the
//! real chain backend without change. Fields are addressed by index,
//! resolved from names once at rule compile time.

use std::collections::HashMap;

use tinderbox_foundation::{Address, Error, ErrorKind, Result, StorageRef, Value};

/// Host services the engine depends on.
///
/// A failing store, load, or transfer is fatal to the enclosing firing
/// session; the host's transaction machinery discards partial effects.
pub trait Host {
    /// Loads a field of the record at `reference`.
    ///
    /// # Errors
    /// Returns a storage fault if the record or field does not exist.
    fn load(&self, reference: StorageRef, field: usize) -> Result<Value>;

    /// Stores a field of the record at `reference`.
    ///
    /// # Errors
    /// Returns a storage fault if the record or field does not exist.
    fn store(&mut self, reference: StorageRef, field: usize, value: Value) -> Result<()>;

    /// Transfers host value from the contract to an address.
    ///
    /// # Errors
    /// Returns a host abort if the contract balance is insufficient.
    fn transfer(&mut self, to: Address, amount: i64) -> Result<()>;
}

/// In-memory host for tests and examples.
///
/// Records are flat field vectors; the contract balance and per-address
/// credits model the chain's value transfer.
#[derive(Clone, Debug, Default)]
pub struct MemoryHost {
    records: HashMap<StorageRef, Vec<Value>>,
    credits: HashMap<Address, i64>,
    contract_balance: i64,
    next: u64,
}

impl MemoryHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a storage record with the given field values.
    pub fn alloc(&mut self, fields: Vec<Value>) -> StorageRef {
        let reference = StorageRef::new(self.next);
        self.next += 1;
        self.records.insert(reference, fields);
        reference
    }

    /// Adds to the contract balance.
    pub fn fund(&mut self, amount: i64) {
        self.contract_balance += amount;
    }

    /// Returns the contract balance.
    #[must_use]
    pub fn contract_balance(&self) -> i64 {
        self.contract_balance
    }

    /// Returns the total credited to an address.
    #[must_use]
    pub fn balance_of(&self, addr: Address) -> i64 {
        self.credits.get(&addr).copied().unwrap_or(0)
    }

    /// Returns the fields of a record, if it exists.
    #[must_use]
    pub fn record(&self, reference: StorageRef) -> Option<&[Value]> {
        self.records.get(&reference).map(Vec::as_slice)
    }
}

impl Host for MemoryHost {
    fn load(&self, reference: StorageRef, field: usize) -> Result<Value> {
        self.records
            .get(&reference)
            .and_then(|fields| fields.get(field))
            .copied()
            .ok_or_else(|| Error::new(ErrorKind::StorageFault(reference)))
    }

    fn store(&mut self, reference: StorageRef, field: usize, value: Value) -> Result<()> {
        let slot = self
            .records
            .get_mut(&reference)
            .and_then(|fields| fields.get_mut(field))
            .ok_or_else(|| Error::new(ErrorKind::StorageFault(reference)))?;
        *slot = value;
        Ok(())
    }

    fn transfer(&mut self, to: Address, amount: i64) -> Result<()> {
        if amount > self.contract_balance {
            return Err(Error::new(ErrorKind::HostAbort(format!(
                "insufficient contract balance: {} < {amount}",
                self.contract_balance
            ))));
        }
        self.contract_balance -= amount;
        *self.credits.entry(to).or_insert(0) += amount;
        Ok(())
    }
}
