//! Left-hand-side lowering.
//!
//! Each rule's pattern sequence folds left into the network: one alpha
//! node per pattern, then `B0 = alpha0`, `Bk = beta(Bk-1, alphak, join)`,
//! with the last node feeding the rule's terminal.
//!
//! Classification of a field expression is decided by what it touches:
//! an expression over the fact being matched alone joins that pattern's
//! alpha filter; an expression reaching any earlier pattern's bindings
//! becomes part of the beta join predicate. Bindings are introduced
//! left-to-right, and referencing one before its introduction inside
//! the same pattern is rejected.

use std::collections::HashSet;

use tinderbox_foundation::{Error, ErrorKind, Result, TypeTag};
use tinderbox_language::{FieldExpr, RuleDecl};
use tinderbox_storage::SchemaRegistry;

use crate::binding::{BindingSite, BindingTable};
use crate::code::Code;
use crate::expr::ExprCompiler;
use crate::graph::ReteGraph;
use crate::node::NodeId;

/// Result of lowering one rule's left-hand side.
#[derive(Clone, Debug)]
pub struct CompiledLhs {
    /// The rule's terminal node.
    pub terminal: NodeId,
    /// All bindings the patterns introduced.
    pub bindings: BindingTable,
    /// Type tag of each pattern, in pattern order.
    pub pattern_tags: Vec<TypeTag>,
}

/// Lowers rule left-hand sides into a shared network.
pub struct LhsCompiler<'a> {
    registry: &'a SchemaRegistry,
    graph: &'a mut ReteGraph,
}

impl<'a> LhsCompiler<'a> {
    /// Creates a compiler targeting `graph`.
    pub fn new(registry: &'a SchemaRegistry, graph: &'a mut ReteGraph) -> Self {
        Self { registry, graph }
    }

    /// Lowers one rule's patterns and allocates its terminal node.
    ///
    /// # Errors
    /// Returns a diagnostic for unknown types or fields, unresolvable
    /// or forward references, duplicate bindings, or an empty LHS.
    pub fn compile(&mut self, rule: &RuleDecl) -> Result<CompiledLhs> {
        if rule.patterns.is_empty() {
            return Err(Error::new(ErrorKind::EmptyRule(rule.name.clone())));
        }

        let mut bindings = BindingTable::new();
        let mut pattern_tags: Vec<TypeTag> = Vec::with_capacity(rule.patterns.len());
        let mut left: Option<NodeId> = None;

        for (k, pattern) in rule.patterns.iter().enumerate() {
            let tag = self.registry.resolve(&pattern.fact_type)?;
            pattern_tags.push(tag);

            if let Some(name) = &pattern.binding {
                bindings.bind(name.clone(), BindingSite { pattern: k, field: None })?;
            }

            // Names this pattern will bind later; referencing one early
            // is a forward reference, not an unknown identifier.
            let mut pending: HashSet<String> = pattern
                .fields
                .iter()
                .filter_map(|f| match f {
                    FieldExpr::Binding { name, .. } => Some(name.clone()),
                    FieldExpr::Constraint(_) => None,
                })
                .collect();

            let mut alpha_terms: Vec<Code> = Vec::new();
            let mut join_terms: Vec<Code> = Vec::new();

            for field_expr in &pattern.fields {
                match field_expr {
                    FieldExpr::Binding { name, field, .. } => {
                        let schema = self.registry.get(tag);
                        let index = schema
                            .field_index(field)
                            .ok_or_else(|| Error::unknown_field(&schema.name, field))?;
                        pending.remove(name);
                        bindings.bind(
                            name.clone(),
                            BindingSite {
                                pattern: k,
                                field: Some(index),
                            },
                        )?;
                    }
                    FieldExpr::Constraint(expr) => {
                        let mut compiler = ExprCompiler::pattern_scope(
                            self.registry,
                            &bindings,
                            &pattern_tags,
                            k,
                            &pending,
                        );
                        let code = compiler.compile(expr)?;
                        if compiler.uses_left() {
                            join_terms.push(code);
                        } else {
                            alpha_terms.push(code);
                        }
                    }
                }
            }

            let alpha = self.graph.alpha(tag, Code::and_all(alpha_terms));
            left = Some(match left {
                None => alpha,
                Some(prior) => self.graph.beta(prior, alpha, Code::and_all(join_terms)),
            });
        }

        let input = left.expect("at least one pattern was lowered");
        let terminal = self.graph.terminal(input);

        Ok(CompiledLhs {
            terminal,
            bindings,
            pattern_tags,
        })
    }
}
