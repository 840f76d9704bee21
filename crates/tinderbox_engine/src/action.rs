//! Right-hand-side lowering.
//!
//! Actions compile into a flat step list over tuple positions. The
//! compiler enforces the mutation contract: an action that writes a
//! field of a bound fact must update that binding afterwards. Under
//! full recomputation the update itself is a no-op, but requiring it
//! keeps rule sources honest for hosts that match incrementally.

use std::collections::BTreeSet;

use tinderbox_foundation::{Error, ErrorKind, Result, StorageRef, TypeTag};
use tinderbox_language::{Expr, Location, Stmt};
use tinderbox_storage::SchemaRegistry;

use crate::binding::BindingTable;
use crate::code::Code;
use crate::expr::ExprCompiler;

/// One executable action step.
#[derive(Clone, Debug)]
pub enum Step {
    /// Write a field of the fact at a tuple position.
    Store {
        /// Tuple position of the fact.
        pattern: usize,
        /// Field index to write.
        field: usize,
        /// Value program.
        value: Code,
    },
    /// Register a storage record as a new fact.
    Insert {
        /// Declared type of the record.
        tag: TypeTag,
        /// The record; captured at compile time, dereferenced never.
        reference: StorageRef,
    },
    /// Remove a fact by handle.
    Delete {
        /// Handle program.
        handle: Code,
    },
    /// Mutation notice for the fact at a tuple position.
    Update {
        /// Tuple position of the fact.
        pattern: usize,
    },
    /// Transfer host value.
    Transfer {
        /// Recipient program.
        to: Code,
        /// Amount program.
        amount: Code,
    },
}

/// A compiled action block.
#[derive(Clone, Debug, Default)]
pub struct CompiledAction {
    /// Steps in statement order.
    pub steps: Vec<Step>,
}

/// Lowers action statements against a rule's binding table.
pub struct RhsCompiler<'a> {
    registry: &'a SchemaRegistry,
    bindings: &'a BindingTable,
    pattern_tags: &'a [TypeTag],
}

impl<'a> RhsCompiler<'a> {
    /// Creates a compiler for one rule's action block.
    pub fn new(
        registry: &'a SchemaRegistry,
        bindings: &'a BindingTable,
        pattern_tags: &'a [TypeTag],
    ) -> Self {
        Self {
            registry,
            bindings,
            pattern_tags,
        }
    }

    fn compile_expr(&self, expr: &Expr) -> Result<Code> {
        ExprCompiler::action_scope(self.registry, self.bindings, self.pattern_tags).compile(expr)
    }

    fn fact_position(&self, name: &str) -> Result<usize> {
        let site = self
            .bindings
            .get(name)
            .ok_or_else(|| Error::unbound(name))?;
        if !site.is_fact() {
            return Err(Error::new(ErrorKind::NotAFactBinding(name.to_string())));
        }
        Ok(site.pattern)
    }

    /// Lowers an action block.
    ///
    /// # Errors
    /// Returns a diagnostic for unresolvable references, a non-storage
    /// insertion operand, or a mutated binding with no subsequent
    /// update.
    pub fn compile(&self, stmts: &[Stmt]) -> Result<CompiledAction> {
        let mut steps = Vec::with_capacity(stmts.len());
        // Patterns written since their last update, in position order so
        // the diagnostic is deterministic.
        let mut dirty: BTreeSet<usize> = BTreeSet::new();

        for stmt in stmts {
            match stmt {
                Stmt::Assign {
                    object,
                    field,
                    value,
                    ..
                } => {
                    let pattern = self.fact_position(object)?;
                    let schema = self.registry.get(self.pattern_tags[pattern]);
                    let field_index = schema
                        .field_index(field)
                        .ok_or_else(|| Error::unknown_field(&schema.name, field))?;
                    let value = self.compile_expr(value)?;
                    dirty.insert(pattern);
                    steps.push(Step::Store {
                        pattern,
                        field: field_index,
                        value,
                    });
                }
                Stmt::Insert {
                    fact_type, operand, ..
                } => {
                    let tag = self.registry.resolve(fact_type)?;
                    let Expr::Slot(reference, Location::Storage, _) = operand else {
                        return Err(Error::new(ErrorKind::MemoryOperand));
                    };
                    steps.push(Step::Insert {
                        tag,
                        reference: *reference,
                    });
                }
                Stmt::Delete { operand, .. } => {
                    let handle = self.compile_expr(operand)?;
                    steps.push(Step::Delete { handle });
                }
                Stmt::Update { binding, .. } => {
                    let pattern = self.fact_position(binding)?;
                    dirty.remove(&pattern);
                    steps.push(Step::Update { pattern });
                }
                Stmt::Transfer { to, amount, .. } => {
                    let to = self.compile_expr(to)?;
                    let amount = self.compile_expr(amount)?;
                    steps.push(Step::Transfer { to, amount });
                }
            }
        }

        if let Some(pattern) = dirty.first() {
            let name = self
                .bindings
                .fact_name_of(*pattern)
                .unwrap_or("<pattern>")
                .to_string();
            return Err(Error::new(ErrorKind::MissingUpdate(name)));
        }

        Ok(CompiledAction { steps })
    }
}
