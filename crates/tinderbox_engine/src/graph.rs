//! The Rete network and its refresh walk.
//!
//! Construction happens once, at contract compile time; the arena order
//! is a topological order because every edge points at an
//! already-constructed node. Refresh fully recomputes every buffer from
//! the fact table, so no stale state can survive a mutation: a deleted
//! fact is gone from every tuple before the next match step, and a
//! mutated field is re-read through the host.

use std::collections::HashMap;

use tinderbox_foundation::{FactHandle, Result, TypeTag};
use tinderbox_storage::{FactTable, Host};

use crate::code::Code;
use crate::eval::{self, EvalCtx};
use crate::node::{Node, NodeId, Tuple};

/// The compiled matching network of one contract.
///
/// Rules share the network: alpha nodes with identical (type, filter)
/// parameters are allocated once. Terminal nodes are recorded per rule
/// in contract textual order.
#[derive(Clone, Debug, Default)]
pub struct ReteGraph {
    nodes: Vec<Node>,
    shared_alphas: HashMap<(TypeTag, Option<Code>), NodeId>,
    terminals: Vec<NodeId>,
}

impl ReteGraph {
    /// Creates an empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(u32::try_from(self.nodes.len()).expect("too many nodes"));
        self.nodes.push(node);
        id
    }

    /// Returns the alpha node for (tag, filter), allocating it on first
    /// use. Sharing is behaviour-preserving because a filter is pure
    /// code over the candidate fact.
    pub fn alpha(&mut self, tag: TypeTag, filter: Option<Code>) -> NodeId {
        if let Some(id) = self.shared_alphas.get(&(tag, filter.clone())) {
            return *id;
        }
        let id = self.push(Node::Alpha {
            tag,
            filter: filter.clone(),
            buffer: Vec::new(),
        });
        self.shared_alphas.insert((tag, filter), id);
        id
    }

    /// Allocates a beta node joining `left` with the alpha node `right`.
    pub fn beta(&mut self, left: NodeId, right: NodeId, join: Option<Code>) -> NodeId {
        debug_assert!(left.index() < self.nodes.len());
        debug_assert!(right.index() < self.nodes.len());
        self.push(Node::Beta {
            left,
            right,
            join,
            buffer: Vec::new(),
        })
    }

    /// Allocates the terminal node of the next rule.
    pub fn terminal(&mut self, input: NodeId) -> NodeId {
        debug_assert!(input.index() < self.nodes.len());
        let id = self.push(Node::Terminal {
            input,
            buffer: Vec::new(),
        });
        self.terminals.push(id);
        id
    }

    /// Returns the number of nodes in the arena.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of rules (terminal nodes).
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.terminals.len()
    }

    /// Returns the candidate matches of rule `rule` from the last
    /// refresh.
    #[must_use]
    pub fn matches(&self, rule: usize) -> &[Tuple] {
        self.nodes[self.terminals[rule].index()].matches()
    }

    /// Scans rules in textual order and returns the first candidate of
    /// the first rule with any: the match that fires next.
    #[must_use]
    pub fn first_match(&self) -> Option<(usize, Tuple)> {
        for (rule, terminal) in self.terminals.iter().enumerate() {
            if let Some(tuple) = self.nodes[terminal.index()].matches().first() {
                return Some((rule, tuple.clone()));
            }
        }
        None
    }

    /// Reads a node's output as tuples, wrapping alpha handles as
    /// 1-tuples.
    fn tuples_of(&self, id: NodeId) -> Vec<Tuple> {
        match &self.nodes[id.index()] {
            Node::Alpha { buffer, .. } => buffer.iter().map(|h| vec![*h]).collect(),
            Node::Beta { buffer, .. } | Node::Terminal { buffer, .. } => buffer.clone(),
        }
    }

    /// Rebuilds every buffer from the fact table, in topological order.
    ///
    /// Alpha buffers enumerate their type in insertion order; beta
    /// buffers are left-major, so tuple order everywhere is determined
    /// by fact insertion order alone.
    ///
    /// # Errors
    /// Returns an error if predicate evaluation faults.
    pub fn refresh(&mut self, table: &FactTable, host: &dyn Host) -> Result<()> {
        for index in 0..self.nodes.len() {
            let rebuilt = match &self.nodes[index] {
                Node::Alpha { tag, filter, .. } => {
                    let mut buffer = Vec::new();
                    for (handle, _) in table.iter_type(*tag) {
                        let keep = match filter {
                            None => true,
                            Some(code) => eval::run_bool(
                                code,
                                &EvalCtx {
                                    table,
                                    host,
                                    left: &[],
                                    current: Some(handle),
                                },
                            )?,
                        };
                        if keep {
                            buffer.push(handle);
                        }
                    }
                    Rebuilt::Handles(buffer)
                }
                Node::Beta {
                    left, right, join, ..
                } => {
                    let left_tuples = self.tuples_of(*left);
                    let Node::Alpha {
                        buffer: right_handles,
                        ..
                    } = &self.nodes[right.index()]
                    else {
                        unreachable!("beta right input is always an alpha node");
                    };

                    let mut buffer = Vec::new();
                    for tuple in &left_tuples {
                        for handle in right_handles {
                            let keep = match join {
                                None => true,
                                Some(code) => eval::run_bool(
                                    code,
                                    &EvalCtx {
                                        table,
                                        host,
                                        left: tuple,
                                        current: Some(*handle),
                                    },
                                )?,
                            };
                            if keep {
                                let mut joined = tuple.clone();
                                joined.push(*handle);
                                buffer.push(joined);
                            }
                        }
                    }
                    Rebuilt::Tuples(buffer)
                }
                Node::Terminal { input, .. } => Rebuilt::Tuples(self.tuples_of(*input)),
            };

            match (&mut self.nodes[index], rebuilt) {
                (Node::Alpha { buffer, .. }, Rebuilt::Handles(new)) => *buffer = new,
                (
                    Node::Beta { buffer, .. } | Node::Terminal { buffer, .. },
                    Rebuilt::Tuples(new),
                ) => *buffer = new,
                _ => unreachable!("rebuilt buffer shape matches node kind"),
            }
        }
        Ok(())
    }
}

enum Rebuilt {
    Handles(Vec<FactHandle>),
    Tuples(Vec<Tuple>),
}
