//! Core types for the Tinderbox rule engine.
//!
//! This crate provides:
//! - [`FactHandle`] - Dense identifiers for facts in working memory
//! - [`StorageRef`] - Opaque references into host persistent storage
//! - [`Value`] - The word-sized value type exchanged with the host
//! - [`FieldType`] / [`TypeTag`] - Type descriptors for fact schemas
//! - [`Error`] - Error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod handle;
pub mod types;
pub mod value;

// Re-export primary types at crate root for convenience
pub use error::{Error, ErrorKind};
pub use handle::{FactHandle, StorageRef};
pub use types::{FieldType, TypeTag};
pub use value::{Address, Value};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
