//! Per-contract runtime session.
//!
//! A session owns the compiled contract, its matching network, the
//! working memory, and the host connection, and exposes the four
//! surface operators: fact insertion, fact deletion, the update
//! notice, and fire-all-rules. One session corresponds to one contract
//! instance inside one host transaction; there is no concurrent
//! mutator.

use tinderbox_foundation::{Error, FactHandle, Result, StorageRef, TypeTag};
use tinderbox_language::ContractDecl;
use tinderbox_storage::{FactTable, Host};

use crate::config::EngineConfig;
use crate::contract::{CompiledContract, ContractCompiler};
use crate::driver::{self, FireReport};
use crate::graph::ReteGraph;

/// Runtime state of one contract instance.
pub struct Session<H: Host> {
    contract: CompiledContract,
    graph: ReteGraph,
    table: FactTable,
    host: H,
    config: EngineConfig,
}

impl<H: Host> Session<H> {
    /// Compiles a contract and opens a session against a host.
    ///
    /// # Errors
    /// Returns the first compile diagnostic, if any.
    pub fn open(decl: &ContractDecl, host: H) -> Result<Self> {
        let (contract, graph) = ContractCompiler::compile(decl)?;
        Ok(Self {
            contract,
            graph,
            table: FactTable::new(),
            host,
            config: EngineConfig::default(),
        })
    }

    /// Replaces the session configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolves a fact type name to its tag.
    ///
    /// # Errors
    /// Returns an error for undeclared types.
    pub fn type_tag(&self, name: &str) -> Result<TypeTag> {
        self.contract.registry.resolve(name)
    }

    /// Registers a storage record as a fact and returns its handle.
    ///
    /// # Errors
    /// Returns a duplicate-fact error if the record is already
    /// registered; the existing registration is untouched.
    pub fn fact_insert(&mut self, tag: TypeTag, reference: StorageRef) -> Result<FactHandle> {
        let handle = self.table.insert(tag, reference)?;
        tracing::debug!(?handle, ?reference, "fact inserted");
        Ok(handle)
    }

    /// Removes a fact from working memory.
    ///
    /// Unknown handles are ignored unless strict deletion is
    /// configured.
    ///
    /// # Errors
    /// Returns an unknown-handle error in strict mode.
    pub fn fact_delete(&mut self, handle: FactHandle) -> Result<()> {
        match self.table.remove(handle) {
            Some(_) => {
                tracing::debug!(?handle, "fact deleted");
                Ok(())
            }
            None if self.config.strict_delete => Err(Error::unknown_handle(handle)),
            None => Ok(()),
        }
    }

    /// Notifies the engine that fields of a fact may have changed.
    ///
    /// Matching re-reads every field through the host on each firing
    /// iteration, so the notice has no immediate effect; it exists so
    /// rule sources stay valid under incremental hosts.
    ///
    /// # Errors
    /// Returns an unknown-handle error when strict deletion is
    /// configured; like deletion, the notice ignores unknown handles
    /// otherwise.
    pub fn update(&mut self, handle: FactHandle) -> Result<()> {
        if !self.table.contains(handle) && self.config.strict_delete {
            return Err(Error::unknown_handle(handle));
        }
        Ok(())
    }

    /// Matches and fires rules until no candidate remains.
    ///
    /// # Errors
    /// Returns an error if an action faults or the configured firing
    /// bound is exceeded.
    pub fn fire_all_rules(&mut self) -> Result<FireReport> {
        driver::run(
            &self.contract,
            &mut self.graph,
            &mut self.table,
            &mut self.host,
            &self.config,
        )
    }

    /// Empties working memory without discarding the compiled network.
    pub fn clear(&mut self) {
        self.table.clear();
        tracing::debug!("working memory cleared");
    }

    /// Returns the number of registered facts.
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.table.len()
    }

    /// Returns the working memory.
    #[must_use]
    pub fn table(&self) -> &FactTable {
        &self.table
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Returns the host mutably, for application-side record setup.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
