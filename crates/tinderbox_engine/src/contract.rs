//! Whole-contract compilation.
//!
//! Registers the declared fact types, then lowers every rule into one
//! shared network, in textual order. Rule order is semantic: the
//! driver scans terminals in this order when resolving conflicts.

use std::collections::HashSet;

use tinderbox_foundation::{Error, ErrorKind, Result, TypeTag};
use tinderbox_language::ContractDecl;
use tinderbox_storage::{FieldSchema, SchemaRegistry};

use crate::action::{CompiledAction, RhsCompiler};
use crate::binding::BindingTable;
use crate::graph::ReteGraph;
use crate::lhs::LhsCompiler;

/// A rule lowered to executable form.
#[derive(Clone, Debug)]
pub struct CompiledRule {
    /// Rule name, for diagnostics and logging.
    pub name: String,
    /// Bindings the patterns introduced.
    pub bindings: BindingTable,
    /// Type tag of each pattern.
    pub pattern_tags: Vec<TypeTag>,
    /// Compiled action block.
    pub action: CompiledAction,
}

/// A compiled contract: its fact types and rules. The matching network
/// is returned alongside, since its buffers are runtime state.
#[derive(Clone, Debug)]
pub struct CompiledContract {
    /// Registered fact types.
    pub registry: SchemaRegistry,
    /// Rules in textual order; index `i` owns terminal `i` of the
    /// network.
    pub rules: Vec<CompiledRule>,
}

/// Compiles contract declarations.
pub struct ContractCompiler;

impl ContractCompiler {
    /// Compiles a contract's fact and rule declarations.
    ///
    /// # Errors
    /// Returns the first diagnostic encountered, tagged with the rule
    /// it occurred in.
    pub fn compile(decl: &ContractDecl) -> Result<(CompiledContract, ReteGraph)> {
        let mut registry = SchemaRegistry::new();
        for fact in &decl.facts {
            let fields = fact
                .fields
                .iter()
                .map(|f| FieldSchema::new(f.name.clone(), f.ty))
                .collect();
            registry.register(fact.name.clone(), fields)?;
        }

        let mut graph = ReteGraph::new();
        let mut rules = Vec::with_capacity(decl.rules.len());
        let mut seen: HashSet<&str> = HashSet::new();

        for rule in &decl.rules {
            if !seen.insert(rule.name.as_str()) {
                return Err(Error::new(ErrorKind::DuplicateRuleName(rule.name.clone())));
            }

            let lhs = LhsCompiler::new(&registry, &mut graph)
                .compile(rule)
                .map_err(|e| e.in_rule(rule.name.as_str()))?;
            let action = RhsCompiler::new(&registry, &lhs.bindings, &lhs.pattern_tags)
                .compile(&rule.action)
                .map_err(|e| e.in_rule(rule.name.as_str()))?;

            rules.push(CompiledRule {
                name: rule.name.clone(),
                bindings: lhs.bindings,
                pattern_tags: lhs.pattern_tags,
                action,
            });
        }

        Ok((CompiledContract { registry, rules }, graph))
    }
}
