//! Expression lowering into predicate code.
//!
//! One compiler serves both sides of a rule. In pattern scope, a bare
//! identifier resolves to a field of the fact being matched first and
//! to a visible binding second; member access resolves through an
//! outer binding. In action scope there is no "fact being matched":
//! every reference resolves through the match tuple.

use std::collections::HashSet;

use tinderbox_foundation::{Error, ErrorKind, Result, TypeTag, Value};
use tinderbox_language::{BinOp, Expr, UnOp};
use tinderbox_storage::SchemaRegistry;

use crate::binding::BindingTable;
use crate::code::{Code, Op};

/// Expression compiler for one expression occurrence.
///
/// Tracks whether the compiled code reaches into the left tuple; in
/// pattern scope that is what classifies a constraint as a join
/// predicate rather than an alpha constraint.
pub struct ExprCompiler<'a> {
    registry: &'a SchemaRegistry,
    bindings: &'a BindingTable,
    pattern_tags: &'a [TypeTag],
    /// Pattern under compilation, in pattern scope.
    current: Option<usize>,
    /// Inner bindings of the current pattern that are introduced to the
    /// right of the expression being compiled.
    pending: Option<&'a HashSet<String>>,
    uses_left: bool,
}

impl<'a> ExprCompiler<'a> {
    /// Creates a compiler for a constraint of pattern `current`.
    #[must_use]
    pub fn pattern_scope(
        registry: &'a SchemaRegistry,
        bindings: &'a BindingTable,
        pattern_tags: &'a [TypeTag],
        current: usize,
        pending: &'a HashSet<String>,
    ) -> Self {
        Self {
            registry,
            bindings,
            pattern_tags,
            current: Some(current),
            pending: Some(pending),
            uses_left: false,
        }
    }

    /// Creates a compiler for an action expression.
    #[must_use]
    pub fn action_scope(
        registry: &'a SchemaRegistry,
        bindings: &'a BindingTable,
        pattern_tags: &'a [TypeTag],
    ) -> Self {
        Self {
            registry,
            bindings,
            pattern_tags,
            current: None,
            pending: None,
            uses_left: false,
        }
    }

    /// Lowers an expression.
    ///
    /// # Errors
    /// Returns a diagnostic for unresolvable or forward references.
    pub fn compile(&mut self, expr: &Expr) -> Result<Code> {
        let mut ops = Vec::new();
        self.emit(expr, &mut ops)?;
        Ok(Code::new(ops))
    }

    /// Returns true if the last compiled expression referenced a fact
    /// matched by an earlier pattern.
    #[must_use]
    pub const fn uses_left(&self) -> bool {
        self.uses_left
    }

    fn emit(&mut self, expr: &Expr, ops: &mut Vec<Op>) -> Result<()> {
        match expr {
            Expr::Int(n, _) => ops.push(Op::Push(Value::Int(*n))),
            Expr::Bool(b, _) => ops.push(Op::Push(Value::Bool(*b))),
            Expr::Ident(name, _) => self.emit_ident(name, ops)?,
            Expr::Field(object, field, _) => self.emit_field(object, field, ops)?,
            Expr::Slot(..) => {
                return Err(Error::internal(
                    "storage operand outside a fact insertion",
                ));
            }
            Expr::Unary(op, operand, _) => {
                self.emit(operand, ops)?;
                ops.push(match op {
                    UnOp::Neg => Op::Neg,
                    UnOp::Not => Op::Not,
                });
            }
            Expr::Binary(op, lhs, rhs, _) => {
                self.emit(lhs, ops)?;
                self.emit(rhs, ops)?;
                ops.push(match op {
                    BinOp::Add => Op::Add,
                    BinOp::Sub => Op::Sub,
                    BinOp::Mul => Op::Mul,
                    BinOp::Div => Op::Div,
                    BinOp::Eq => Op::Eq,
                    BinOp::Ne => Op::Ne,
                    BinOp::Lt => Op::Lt,
                    BinOp::Le => Op::Le,
                    BinOp::Gt => Op::Gt,
                    BinOp::Ge => Op::Ge,
                    BinOp::And => Op::And,
                    BinOp::Or => Op::Or,
                });
            }
        }
        Ok(())
    }

    fn emit_ident(&mut self, name: &str, ops: &mut Vec<Op>) -> Result<()> {
        // Fields of the fact being matched shadow bindings; the surface
        // grammar makes `age >= 65` mean the candidate's own field.
        if let Some(k) = self.current {
            let schema = self.registry.get(self.pattern_tags[k]);
            if let Some(field) = schema.field_index(name) {
                ops.push(Op::LoadSelf { field });
                return Ok(());
            }
        }

        if let Some(site) = self.bindings.get(name) {
            let is_current = self.current == Some(site.pattern);
            match (site.field, is_current) {
                (Some(field), true) => ops.push(Op::LoadSelf { field }),
                (Some(field), false) => {
                    self.uses_left = true;
                    ops.push(Op::LoadLeft {
                        pattern: site.pattern,
                        field,
                    });
                }
                (None, true) => ops.push(Op::SelfHandle),
                (None, false) => {
                    self.uses_left = true;
                    ops.push(Op::LeftHandle {
                        pattern: site.pattern,
                    });
                }
            }
            return Ok(());
        }

        if self.pending.is_some_and(|p| p.contains(name)) {
            return Err(Error::new(ErrorKind::ForwardReference(name.to_string())));
        }

        Err(Error::unbound(name))
    }

    fn emit_field(&mut self, object: &str, field: &str, ops: &mut Vec<Op>) -> Result<()> {
        let Some(site) = self.bindings.get(object) else {
            if self.pending.is_some_and(|p| p.contains(object)) {
                return Err(Error::new(ErrorKind::ForwardReference(object.to_string())));
            }
            return Err(Error::unbound(object));
        };
        if !site.is_fact() {
            return Err(Error::new(ErrorKind::NotAFactBinding(object.to_string())));
        }

        let schema = self.registry.get(self.pattern_tags[site.pattern]);
        let field_index = schema
            .field_index(field)
            .ok_or_else(|| Error::unknown_field(&schema.name, field))?;

        if self.current == Some(site.pattern) {
            ops.push(Op::LoadSelf { field: field_index });
        } else {
            if self.current.is_some() {
                self.uses_left = true;
            }
            ops.push(Op::LoadLeft {
                pattern: site.pattern,
                field: field_index,
            });
        }
        Ok(())
    }
}
