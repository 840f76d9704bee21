//! The firing driver.
//!
//! Each iteration refreshes the whole network, picks the first tuple of
//! the first rule (textual order) with candidates, and executes that
//! rule's action with the tuple as its binding environment. The loop
//! ends when no rule has a candidate. Determinism follows from the
//! refresh order: tuple order in every node is fixed by fact insertion
//! order, so a fixed operation history yields a fixed firing sequence.

use tinderbox_foundation::{Error, ErrorKind, FactHandle, FieldType, Result};
use tinderbox_storage::{FactTable, Host};

use crate::action::{CompiledAction, Step};
use crate::config::EngineConfig;
use crate::contract::CompiledContract;
use crate::eval::{self, EvalCtx};
use crate::graph::ReteGraph;

/// Outcome of one fire-all-rules invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FireReport {
    /// Number of rule firings executed.
    pub firings: usize,
}

/// Runs rules until no candidate match remains.
///
/// # Errors
/// Returns an error if the configured firing bound is exceeded or if
/// an action faults; a fault leaves cleanup to the host's transaction
/// machinery.
pub fn run(
    contract: &CompiledContract,
    graph: &mut ReteGraph,
    table: &mut FactTable,
    host: &mut dyn Host,
    config: &EngineConfig,
) -> Result<FireReport> {
    let mut firings = 0usize;

    loop {
        graph.refresh(table, &*host)?;

        let Some((rule_index, tuple)) = graph.first_match() else {
            break;
        };

        if let Some(limit) = config.max_firings {
            if firings >= limit {
                return Err(Error::new(ErrorKind::LimitExceeded(limit)));
            }
        }

        let rule = &contract.rules[rule_index];
        tracing::debug!(rule = %rule.name, firing = firings, ?tuple, "firing rule");

        execute(&rule.action, &tuple, table, host, config)
            .map_err(|e| e.in_rule(rule.name.as_str()))?;
        firings += 1;
    }

    tracing::debug!(firings, "network stable");
    Ok(FireReport { firings })
}

/// Executes one compiled action against a match tuple.
fn execute(
    action: &CompiledAction,
    tuple: &[FactHandle],
    table: &mut FactTable,
    host: &mut dyn Host,
    config: &EngineConfig,
) -> Result<()> {
    for step in &action.steps {
        match step {
            Step::Store {
                pattern,
                field,
                value,
            } => {
                let value = eval::run(
                    value,
                    &EvalCtx {
                        table,
                        host: &*host,
                        left: tuple,
                        current: None,
                    },
                )?;
                let reference = table.resolve(tuple[*pattern])?;
                host.store(reference, *field, value)?;
            }
            Step::Insert { tag, reference } => {
                let handle = table.insert(*tag, *reference)?;
                tracing::trace!(?handle, "action inserted fact");
            }
            Step::Delete { handle } => {
                let value = eval::run(
                    handle,
                    &EvalCtx {
                        table,
                        host: &*host,
                        left: tuple,
                        current: None,
                    },
                )?;
                let handle = value
                    .as_handle()
                    .ok_or_else(|| Error::type_mismatch(FieldType::Handle, value.field_type()))?;
                if table.remove(handle).is_none() && config.strict_delete {
                    return Err(Error::unknown_handle(handle));
                }
            }
            Step::Update { pattern } => {
                // A mutation notice only; the next refresh re-reads
                // every field through the host anyway.
                tracing::trace!(handle = ?tuple.get(*pattern), "fact updated");
            }
            Step::Transfer { to, amount } => {
                let to_value = eval::run(
                    to,
                    &EvalCtx {
                        table,
                        host: &*host,
                        left: tuple,
                        current: None,
                    },
                )?;
                let to = to_value.as_address().ok_or_else(|| {
                    Error::type_mismatch(FieldType::Address, to_value.field_type())
                })?;
                let amount_value = eval::run(
                    amount,
                    &EvalCtx {
                        table,
                        host: &*host,
                        left: tuple,
                        current: None,
                    },
                )?;
                let amount = amount_value
                    .as_int()
                    .ok_or_else(|| Error::type_mismatch(FieldType::Int, amount_value.field_type()))?;
                host.transfer(to, amount)?;
            }
        }
    }
    Ok(())
}
