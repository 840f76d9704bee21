//! Stack evaluation of predicate code against the host.
//!
//! Evaluation reads fact fields through the host on every run; nothing
//! is cached between firing iterations, so mutations made by actions
//! are always visible at the next refresh.

use tinderbox_foundation::{Error, ErrorKind, FactHandle, FieldType, Result, Value};
use tinderbox_storage::{FactTable, Host};

use crate::code::{Code, Op};

/// Evaluation context: the left tuple, the fact under consideration,
/// and the services needed to reach field values.
pub struct EvalCtx<'a> {
    /// Working memory, for handle resolution.
    pub table: &'a FactTable,
    /// Host storage access.
    pub host: &'a dyn Host,
    /// Facts matched by earlier patterns, in pattern order.
    pub left: &'a [FactHandle],
    /// The fact currently being tested, when evaluating an alpha
    /// constraint or join predicate.
    pub current: Option<FactHandle>,
}

impl EvalCtx<'_> {
    fn load(&self, handle: FactHandle, field: usize) -> Result<Value> {
        let reference = self.table.resolve(handle)?;
        self.host.load(reference, field)
    }

    fn current_handle(&self) -> Result<FactHandle> {
        self.current
            .ok_or_else(|| Error::internal("no fact under consideration"))
    }

    fn left_handle(&self, pattern: usize) -> Result<FactHandle> {
        self.left
            .get(pattern)
            .copied()
            .ok_or_else(|| Error::internal(format!("tuple has no position {pattern}")))
    }
}

fn int_of(value: Value) -> Result<i64> {
    value
        .as_int()
        .ok_or_else(|| Error::type_mismatch(FieldType::Int, value.field_type()))
}

fn bool_of(value: Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| Error::type_mismatch(FieldType::Bool, value.field_type()))
}

fn checked(result: Option<i64>) -> Result<Value> {
    result
        .map(Value::Int)
        .ok_or_else(|| Error::new(ErrorKind::ArithmeticOverflow))
}

/// Runs a program and returns its result value.
///
/// # Errors
/// Returns an error on type mismatches, arithmetic faults, or host
/// storage faults.
pub fn run(code: &Code, ctx: &EvalCtx<'_>) -> Result<Value> {
    let mut stack: Vec<Value> = Vec::with_capacity(code.len());

    for op in code.ops() {
        match op {
            Op::Push(value) => stack.push(*value),
            Op::LoadSelf { field } => {
                let handle = ctx.current_handle()?;
                stack.push(ctx.load(handle, *field)?);
            }
            Op::LoadLeft { pattern, field } => {
                let handle = ctx.left_handle(*pattern)?;
                stack.push(ctx.load(handle, *field)?);
            }
            Op::SelfHandle => stack.push(Value::Handle(ctx.current_handle()?)),
            Op::LeftHandle { pattern } => {
                stack.push(Value::Handle(ctx.left_handle(*pattern)?));
            }
            Op::Neg => {
                let v = int_of(pop(&mut stack)?)?;
                stack.push(checked(v.checked_neg())?);
            }
            Op::Not => {
                let v = bool_of(pop(&mut stack)?)?;
                stack.push(Value::Bool(!v));
            }
            Op::Add | Op::Sub | Op::Mul | Op::Div => {
                let rhs = int_of(pop(&mut stack)?)?;
                let lhs = int_of(pop(&mut stack)?)?;
                let value = match op {
                    Op::Add => checked(lhs.checked_add(rhs))?,
                    Op::Sub => checked(lhs.checked_sub(rhs))?,
                    Op::Mul => checked(lhs.checked_mul(rhs))?,
                    _ => {
                        if rhs == 0 {
                            return Err(Error::new(ErrorKind::DivisionByZero));
                        }
                        checked(lhs.checked_div(rhs))?
                    }
                };
                stack.push(value);
            }
            Op::Lt | Op::Le | Op::Gt | Op::Ge => {
                let rhs = int_of(pop(&mut stack)?)?;
                let lhs = int_of(pop(&mut stack)?)?;
                let value = match op {
                    Op::Lt => lhs < rhs,
                    Op::Le => lhs <= rhs,
                    Op::Gt => lhs > rhs,
                    _ => lhs >= rhs,
                };
                stack.push(Value::Bool(value));
            }
            Op::Eq | Op::Ne => {
                let rhs = pop(&mut stack)?;
                let lhs = pop(&mut stack)?;
                if lhs.field_type() != rhs.field_type() {
                    return Err(Error::type_mismatch(lhs.field_type(), rhs.field_type()));
                }
                let equal = lhs == rhs;
                stack.push(Value::Bool(if matches!(op, Op::Eq) {
                    equal
                } else {
                    !equal
                }));
            }
            Op::And | Op::Or => {
                let rhs = bool_of(pop(&mut stack)?)?;
                let lhs = bool_of(pop(&mut stack)?)?;
                stack.push(Value::Bool(if matches!(op, Op::And) {
                    lhs && rhs
                } else {
                    lhs || rhs
                }));
            }
        }
    }

    let result = pop(&mut stack)?;
    if stack.is_empty() {
        Ok(result)
    } else {
        Err(Error::internal("evaluation left residue on the stack"))
    }
}

/// Runs a program and coerces the result to a boolean.
///
/// # Errors
/// As [`run`], plus a type mismatch when the result is not boolean.
pub fn run_bool(code: &Code, ctx: &EvalCtx<'_>) -> Result<bool> {
    bool_of(run(code, ctx)?)
}

fn pop(stack: &mut Vec<Value>) -> Result<Value> {
    stack
        .pop()
        .ok_or_else(|| Error::internal("evaluation stack underflow"))
}
