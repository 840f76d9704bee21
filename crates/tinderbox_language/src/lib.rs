//! Typed AST fragments for the Tinderbox rule engine.
//!
//! The surrounding contract language owns parsing and type checking;
//! this crate defines the shapes the host compiler hands the core:
//! - [`Expr`] - Typed expression trees for constraints and actions
//! - [`Pattern`] / [`RuleDecl`] / [`FactDecl`] - Rule and fact declarations
//! - [`Stmt`] - Right-hand-side action statements
//! - [`Span`] - Source locations for diagnostics

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod decl;
pub mod span;

pub use ast::{BinOp, Expr, Location, UnOp};
pub use decl::{ContractDecl, FactDecl, FieldDecl, FieldExpr, Pattern, RuleDecl, Stmt};
pub use span::Span;
