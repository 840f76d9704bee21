//! Fact, pattern, and rule declarations.
//!
//! These are the parsed, type-annotated forms of the `fact` and `rule`
//! declarations in a contract. Builder-style constructors keep host
//! glue and tests readable; the host front end typically produces these
//! directly from its AST.

use tinderbox_foundation::FieldType;

use crate::ast::Expr;
use crate::span::Span;

/// Declaration of a fact type: a named record with ordered typed fields.
#[derive(Clone, Debug, PartialEq)]
pub struct FactDecl {
    /// Fact type name.
    pub name: String,
    /// Ordered field declarations.
    pub fields: Vec<FieldDecl>,
    /// Source location.
    pub span: Span,
}

impl FactDecl {
    /// Creates a fact declaration with no fields.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            span: Span::default(),
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldDecl {
            name: name.into(),
            ty,
            span: Span::default(),
        });
        self
    }
}

/// Declaration of a single fact field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDecl {
    /// Field name.
    pub name: String,
    /// Field type.
    pub ty: FieldType,
    /// Source location.
    pub span: Span,
}

/// One element of a pattern's parenthesised field list.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldExpr {
    /// `name : field` - introduces `name`, equal to `field` of the fact
    /// under consideration.
    Binding {
        /// Introduced identifier.
        name: String,
        /// Field of the fact being matched.
        field: String,
        /// Source location.
        span: Span,
    },
    /// Boolean constraint over fields of facts matched so far.
    Constraint(Expr),
}

/// One pattern of a rule's left-hand side.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    /// Outer binding naming the matched fact, as in `p: Person(...)`.
    pub binding: Option<String>,
    /// Fact type to match.
    pub fact_type: String,
    /// Field expressions, in written order.
    pub fields: Vec<FieldExpr>,
    /// Source location.
    pub span: Span,
}

impl Pattern {
    /// Creates a pattern with no field expressions.
    #[must_use]
    pub fn new(fact_type: impl Into<String>) -> Self {
        Self {
            binding: None,
            fact_type: fact_type.into(),
            fields: Vec::new(),
            span: Span::default(),
        }
    }

    /// Sets the outer binding.
    #[must_use]
    pub fn bind_as(mut self, name: impl Into<String>) -> Self {
        self.binding = Some(name.into());
        self
    }

    /// Adds an inner binding `name : field`.
    #[must_use]
    pub fn with_binding(mut self, name: impl Into<String>, field: impl Into<String>) -> Self {
        self.fields.push(FieldExpr::Binding {
            name: name.into(),
            field: field.into(),
            span: Span::default(),
        });
        self
    }

    /// Adds a constraint expression.
    #[must_use]
    pub fn with_constraint(mut self, expr: Expr) -> Self {
        self.fields.push(FieldExpr::Constraint(expr));
        self
    }
}

/// A right-hand-side action statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// Assignment to a field of a bound fact, like `b.amount = ...`.
    Assign {
        /// Outer binding naming the fact.
        object: String,
        /// Field being written.
        field: String,
        /// Value expression.
        value: Expr,
        /// Source location.
        span: Span,
    },
    /// Register a storage record as a new fact.
    Insert {
        /// Declared fact type of the record.
        fact_type: String,
        /// Operand; must resolve to a storage location.
        operand: Expr,
        /// Source location.
        span: Span,
    },
    /// Remove a fact from working memory.
    Delete {
        /// Handle-valued expression.
        operand: Expr,
        /// Source location.
        span: Span,
    },
    /// Declare that fields of a bound fact may have changed.
    Update {
        /// Outer binding naming the fact.
        binding: String,
        /// Source location.
        span: Span,
    },
    /// Transfer host value to an address.
    Transfer {
        /// Recipient address expression.
        to: Expr,
        /// Amount expression.
        amount: Expr,
        /// Source location.
        span: Span,
    },
}

impl Stmt {
    /// Assignment with a default span.
    #[must_use]
    pub fn assign(object: impl Into<String>, field: impl Into<String>, value: Expr) -> Self {
        Self::Assign {
            object: object.into(),
            field: field.into(),
            value,
            span: Span::default(),
        }
    }

    /// Fact insertion with a default span.
    #[must_use]
    pub fn insert(fact_type: impl Into<String>, operand: Expr) -> Self {
        Self::Insert {
            fact_type: fact_type.into(),
            operand,
            span: Span::default(),
        }
    }

    /// Fact deletion with a default span.
    #[must_use]
    pub fn delete(operand: Expr) -> Self {
        Self::Delete {
            operand,
            span: Span::default(),
        }
    }

    /// Update marker with a default span.
    #[must_use]
    pub fn update(binding: impl Into<String>) -> Self {
        Self::Update {
            binding: binding.into(),
            span: Span::default(),
        }
    }

    /// Transfer with a default span.
    #[must_use]
    pub fn transfer(to: Expr, amount: Expr) -> Self {
        Self::Transfer {
            to,
            amount,
            span: Span::default(),
        }
    }
}

/// Declaration of a rule: ordered patterns plus an action block.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleDecl {
    /// Rule name; unique within the contract.
    pub name: String,
    /// Patterns in written order; this order defines join order and
    /// binding scope.
    pub patterns: Vec<Pattern>,
    /// Action statements in written order.
    pub action: Vec<Stmt>,
    /// Source location.
    pub span: Span,
}

impl RuleDecl {
    /// Creates a rule with no patterns and an empty action.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            patterns: Vec::new(),
            action: Vec::new(),
            span: Span::default(),
        }
    }

    /// Appends a pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Appends an action statement.
    #[must_use]
    pub fn with_stmt(mut self, stmt: Stmt) -> Self {
        self.action.push(stmt);
        self
    }
}

/// All fact and rule declarations of one contract, in textual order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContractDecl {
    /// Fact type declarations.
    pub facts: Vec<FactDecl>,
    /// Rule declarations; textual order is the conflict-resolution order.
    pub rules: Vec<RuleDecl>,
}

impl ContractDecl {
    /// Creates an empty contract declaration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fact declaration.
    #[must_use]
    pub fn with_fact(mut self, fact: FactDecl) -> Self {
        self.facts.push(fact);
        self
    }

    /// Appends a rule declaration.
    #[must_use]
    pub fn with_rule(mut self, rule: RuleDecl) -> Self {
        self.rules.push(rule);
        self
    }
}
