//! Working memory and host storage for the Tinderbox rule engine.
//!
//! This crate provides:
//! - [`FactTable`] - The per-contract working memory (handle to record map)
//! - [`FactSchema`] / [`SchemaRegistry`] - Declared fact types
//! - [`Host`] - The injected host-services interface
//! - [`MemoryHost`] - In-memory host for tests and examples

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod host;
pub mod schema;
pub mod table;

pub use host::{Host, MemoryHost};
pub use schema::{FactSchema, FieldSchema, SchemaRegistry};
pub use table::{FactEntry, FactTable};
