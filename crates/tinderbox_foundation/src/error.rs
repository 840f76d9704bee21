//! Error types for the Tinderbox engine.
//!
//! Uses `thiserror` for ergonomic error definition. Errors fall into
//! three classes: compile-time diagnostics (rule lowering), recoverable
//! runtime errors (surfaced at the operator call site), and fatal
//! runtime errors (abort the enclosing firing session).

use std::fmt;

use thiserror::Error;

use crate::handle::{FactHandle, StorageRef};
use crate::types::FieldType;

/// The main error type for Tinderbox operations.
#[derive(Debug)]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Name of the rule being compiled or fired, when known.
    pub rule: Option<String>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, rule: None }
    }

    /// Attaches the name of the rule the error occurred in.
    #[must_use]
    pub fn in_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Creates an unknown-fact-type error.
    #[must_use]
    pub fn unknown_fact_type(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownFactType(name.into()))
    }

    /// Creates an unknown-field error.
    #[must_use]
    pub fn unknown_field(fact_type: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownField {
            fact_type: fact_type.into(),
            field: field.into(),
        })
    }

    /// Creates an unbound-identifier error.
    #[must_use]
    pub fn unbound(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnboundIdentifier(name.into()))
    }

    /// Creates a duplicate-fact error.
    #[must_use]
    pub fn duplicate_fact(reference: StorageRef) -> Self {
        Self::new(ErrorKind::DuplicateFact(reference))
    }

    /// Creates an unknown-handle error.
    #[must_use]
    pub fn unknown_handle(handle: FactHandle) -> Self {
        Self::new(ErrorKind::UnknownHandle(handle))
    }

    /// Creates a type-mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: FieldType, actual: FieldType) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns true if this error is recoverable at the operator call
    /// site rather than fatal to the firing session.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::DuplicateFact(_) | ErrorKind::UnknownHandle(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(rule) = &self.rule {
            write!(f, " (in rule {rule:?})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    // --- compile-time diagnostics ---
    /// Pattern names a fact type the contract never declared.
    #[error("unknown fact type: {0}")]
    UnknownFactType(String),

    /// Two fact declarations share a name.
    #[error("duplicate fact type: {0}")]
    DuplicateFactType(String),

    /// Field expression names a field the fact type does not have.
    #[error("unknown field: {field} on fact type {fact_type}")]
    UnknownField {
        /// The fact type that was searched.
        fact_type: String,
        /// The field name that was not found.
        field: String,
    },

    /// Identifier used in a constraint or action is not bound.
    #[error("unbound identifier: {0}")]
    UnboundIdentifier(String),

    /// Constraint references a binding introduced later in the same
    /// pattern; evaluation within a pattern is left-to-right.
    #[error("forward reference to binding: {0}")]
    ForwardReference(String),

    /// Field access on an identifier that does not name a matched fact.
    #[error("identifier does not name a matched fact: {0}")]
    NotAFactBinding(String),

    /// Two bindings in one rule share a name.
    #[error("duplicate binding: {0}")]
    DuplicateBinding(String),

    /// Two rules in one contract share a name.
    #[error("duplicate rule name: {0}")]
    DuplicateRuleName(String),

    /// Rule has an empty left-hand side.
    #[error("rule has no patterns: {0}")]
    EmptyRule(String),

    /// Operand of a fact insertion does not reside in persistent storage.
    #[error("fact insertion operand must reside in storage")]
    MemoryOperand,

    /// Action mutates a bound fact without a subsequent update of that
    /// binding.
    #[error("binding {0} is mutated without a subsequent update")]
    MissingUpdate(String),

    // --- recoverable runtime errors ---
    /// Storage reference is already registered in working memory.
    #[error("fact already inserted: {0:?}")]
    DuplicateFact(StorageRef),

    /// Handle is not registered in working memory.
    #[error("unknown fact handle: {0}")]
    UnknownHandle(FactHandle),

    // --- fatal runtime errors ---
    /// Value had the wrong type during evaluation.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected field type.
        expected: FieldType,
        /// The actual field type encountered.
        actual: FieldType,
    },

    /// Division by zero during evaluation.
    #[error("division by zero")]
    DivisionByZero,

    /// Integer overflow during evaluation.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// Host-imposed firing bound exceeded.
    #[error("firing limit ({0}) exceeded")]
    LimitExceeded(usize),

    /// Host storage rejected a load or store.
    #[error("storage fault at {0:?}")]
    StorageFault(StorageRef),

    /// Host aborted during action execution.
    #[error("host abort: {0}")]
    HostAbort(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}
