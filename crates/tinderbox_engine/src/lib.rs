//! Matching network, rule compilers, and firing driver for Tinderbox.
//!
//! This crate provides:
//! - `ContractCompiler` - Lowers fact and rule declarations
//! - `ReteGraph` - The compiled alpha/beta matching network
//! - `Session` - Runtime surface: insert, delete, update, fire-all-rules
//! - `EngineConfig` - Host-decided firing bounds and strictness

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod action;
pub mod binding;
pub mod code;
pub mod config;
pub mod contract;
pub mod driver;
pub mod eval;
pub mod expr;
pub mod graph;
pub mod lhs;
pub mod node;
pub mod session;

// Compilation
pub use action::{CompiledAction, RhsCompiler, Step};
pub use binding::{BindingSite, BindingTable};
pub use code::{Code, Op};
pub use contract::{CompiledContract, CompiledRule, ContractCompiler};
pub use expr::ExprCompiler;
pub use lhs::{CompiledLhs, LhsCompiler};

// Network
pub use graph::ReteGraph;
pub use node::{Node, NodeId, Tuple};

// Runtime
pub use config::EngineConfig;
pub use driver::FireReport;
pub use session::Session;
