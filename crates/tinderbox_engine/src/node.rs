//! Rete network nodes.
//!
//! Nodes live in an arena indexed by [`NodeId`]; edges are indices, so
//! the beta chain's parent links never form ownership cycles. Each node
//! owns a tuple buffer that the driver rebuilds on every firing
//! iteration.

use std::fmt;

use tinderbox_foundation::{FactHandle, TypeTag};

use crate::code::Code;

/// Index of a node in the network arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates an id from its raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// An ordered sequence of fact handles; position `k` holds the fact
/// matched by pattern `k`.
pub type Tuple = Vec<FactHandle>;

/// A network node.
///
/// Alpha nodes filter one fact type by a single-fact constraint; beta
/// nodes join the accumulated tuples of their left parent with the
/// facts of a right alpha node; a terminal node per rule holds the
/// candidate matches.
#[derive(Clone, Debug)]
pub enum Node {
    /// Single-fact filter.
    Alpha {
        /// Fact type this node watches.
        tag: TypeTag,
        /// Constraint over the candidate fact; `None` accepts all.
        filter: Option<Code>,
        /// Handles passing the filter, in insertion order.
        buffer: Vec<FactHandle>,
    },
    /// Two-input join.
    Beta {
        /// Left parent (alpha for the first join, else the prior beta).
        left: NodeId,
        /// Right alpha node.
        right: NodeId,
        /// Join predicate over the left tuple and the right fact;
        /// `None` accepts every combination.
        join: Option<Code>,
        /// Joined tuples, left-major order.
        buffer: Vec<Tuple>,
    },
    /// Sink of one rule's chain.
    Terminal {
        /// The rule's last beta (or only alpha).
        input: NodeId,
        /// Candidate matches.
        buffer: Vec<Tuple>,
    },
}

impl Node {
    /// Returns the candidate tuples of a terminal node.
    ///
    /// # Panics
    /// Panics if the node is not a terminal.
    #[must_use]
    pub fn matches(&self) -> &[Tuple] {
        match self {
            Self::Terminal { buffer, .. } => buffer,
            _ => panic!("matches() on a non-terminal node"),
        }
    }
}
