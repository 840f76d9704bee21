//! Duplicate registration: the same storage record cannot enter
//! working memory twice, and the failed attempt leaves everything
//! intact.

use tinderbox_engine::Session;
use tinderbox_foundation::{ErrorKind, FieldType, Value};
use tinderbox_language::{BinOp, ContractDecl, Expr, FactDecl, Pattern, RuleDecl, Stmt};
use tinderbox_storage::MemoryHost;

fn counter_contract() -> ContractDecl {
    ContractDecl::new()
        .with_fact(FactDecl::new("Counter").with_field("value", FieldType::Int))
        .with_rule(
            RuleDecl::new("drain")
                .with_pattern(Pattern::new("Counter").bind_as("c").with_constraint(
                    Expr::binary(BinOp::Gt, Expr::ident("value"), Expr::int(0)),
                ))
                .with_stmt(Stmt::assign(
                    "c",
                    "value",
                    Expr::binary(BinOp::Sub, Expr::field("c", "value"), Expr::int(1)),
                ))
                .with_stmt(Stmt::update("c")),
        )
}

#[test]
fn second_insert_of_same_record_aborts() {
    let mut session = Session::open(&counter_contract(), MemoryHost::new()).unwrap();
    let tag = session.type_tag("Counter").unwrap();
    let record = session.host_mut().alloc(vec![Value::Int(2)]);

    let first = session.fact_insert(tag, record).unwrap();
    let err = session.fact_insert(tag, record).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateFact(_)));
    assert!(err.is_recoverable());

    // the first handle is still live and matched exactly once per unit
    assert!(session.table().contains(first));
    let report = session.fire_all_rules().unwrap();
    assert_eq!(report.firings, 2);
    assert_eq!(session.host().record(record).unwrap()[0], Value::Int(0));
}

#[test]
fn delete_then_reinsert_is_not_a_duplicate() {
    let mut session = Session::open(&counter_contract(), MemoryHost::new()).unwrap();
    let tag = session.type_tag("Counter").unwrap();
    let record = session.host_mut().alloc(vec![Value::Int(1)]);

    let first = session.fact_insert(tag, record).unwrap();
    session.fact_delete(first).unwrap();

    let second = session.fact_insert(tag, record).unwrap();
    assert_ne!(first, second);
    assert_eq!(session.fact_count(), 1);

    // only the live handle participates in matching
    assert_eq!(session.fire_all_rules().unwrap().firings, 1);
}

#[test]
fn distinct_records_coexist() {
    let mut session = Session::open(&counter_contract(), MemoryHost::new()).unwrap();
    let tag = session.type_tag("Counter").unwrap();

    for value in [1, 2, 3] {
        let r = session.host_mut().alloc(vec![Value::Int(value)]);
        session.fact_insert(tag, r).unwrap();
    }

    assert_eq!(session.fact_count(), 3);
    assert_eq!(session.fire_all_rules().unwrap().firings, 6);
}
