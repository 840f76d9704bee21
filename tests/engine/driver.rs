//! Integration tests for the firing driver.
//!
//! The ordering contract: rules are scanned in textual order, the
//! first tuple of the first non-empty terminal fires, and everything
//! is re-evaluated after each firing. Given a fixed operation history,
//! the firing sequence is fixed.

use tinderbox_engine::{EngineConfig, Session};
use tinderbox_foundation::{ErrorKind, FieldType, Value};
use tinderbox_language::{BinOp, ContractDecl, Expr, FactDecl, Pattern, RuleDecl, Stmt};
use tinderbox_storage::MemoryHost;

/// Job/Slot contract: "claim" marks a job done and stamps it with the
/// next sequence number from the slot counter.
fn claim_contract() -> ContractDecl {
    ContractDecl::new()
        .with_fact(FactDecl::new("Slot").with_field("seq", FieldType::Int))
        .with_fact(
            FactDecl::new("Job")
                .with_field("done", FieldType::Bool)
                .with_field("rank", FieldType::Int),
        )
        .with_rule(
            RuleDecl::new("claim")
                .with_pattern(Pattern::new("Slot").bind_as("s"))
                .with_pattern(Pattern::new("Job").bind_as("j").with_constraint(
                    Expr::binary(BinOp::Eq, Expr::ident("done"), Expr::bool(false)),
                ))
                .with_stmt(Stmt::assign("j", "rank", Expr::field("s", "seq")))
                .with_stmt(Stmt::assign(
                    "s",
                    "seq",
                    Expr::binary(BinOp::Add, Expr::field("s", "seq"), Expr::int(1)),
                ))
                .with_stmt(Stmt::assign("j", "done", Expr::bool(true)))
                .with_stmt(Stmt::update("j"))
                .with_stmt(Stmt::update("s")),
        )
}

#[test]
fn insertion_order_breaks_ties() {
    let mut session = Session::open(&claim_contract(), MemoryHost::new()).unwrap();
    let slot_tag = session.type_tag("Slot").unwrap();
    let job_tag = session.type_tag("Job").unwrap();

    let slot = session.host_mut().alloc(vec![Value::Int(0)]);
    session.fact_insert(slot_tag, slot).unwrap();

    let jobs: Vec<_> = (0..4)
        .map(|_| {
            let r = session
                .host_mut()
                .alloc(vec![Value::Bool(false), Value::Int(-1)]);
            session.fact_insert(job_tag, r).unwrap();
            r
        })
        .collect();

    let report = session.fire_all_rules().unwrap();
    assert_eq!(report.firings, 4);

    // ranks follow insertion order: the earliest-inserted job claimed
    // the first sequence number
    for (rank, job) in jobs.iter().enumerate() {
        let record = session.host().record(*job).unwrap();
        assert_eq!(record[1], Value::Int(i64::try_from(rank).unwrap()));
        assert_eq!(record[0], Value::Bool(true));
    }
}

#[test]
fn firing_sequence_is_deterministic() {
    let run_once = || {
        let mut session = Session::open(&claim_contract(), MemoryHost::new()).unwrap();
        let slot_tag = session.type_tag("Slot").unwrap();
        let job_tag = session.type_tag("Job").unwrap();

        let slot = session.host_mut().alloc(vec![Value::Int(0)]);
        session.fact_insert(slot_tag, slot).unwrap();
        let jobs: Vec<_> = (0..8)
            .map(|_| {
                let r = session
                    .host_mut()
                    .alloc(vec![Value::Bool(false), Value::Int(-1)]);
                session.fact_insert(job_tag, r).unwrap();
                r
            })
            .collect();

        let report = session.fire_all_rules().unwrap();
        let ranks: Vec<_> = jobs
            .iter()
            .map(|r| session.host().record(*r).unwrap()[1])
            .collect();
        (report.firings, ranks)
    };

    assert_eq!(run_once(), run_once());
}

#[test]
fn rules_exhaust_before_returning() {
    let mut session = Session::open(&claim_contract(), MemoryHost::new()).unwrap();
    let slot_tag = session.type_tag("Slot").unwrap();
    let job_tag = session.type_tag("Job").unwrap();

    let slot = session.host_mut().alloc(vec![Value::Int(0)]);
    session.fact_insert(slot_tag, slot).unwrap();
    let r = session
        .host_mut()
        .alloc(vec![Value::Bool(false), Value::Int(-1)]);
    session.fact_insert(job_tag, r).unwrap();

    session.fire_all_rules().unwrap();
    // a second invocation finds nothing left to do
    assert_eq!(session.fire_all_rules().unwrap().firings, 0);
}

/// Two rules watch the same fact; the one declared first consumes it.
fn race_contract(winner_first: bool) -> ContractDecl {
    let take = RuleDecl::new("take")
        .with_pattern(Pattern::new("Token").bind_as("t").with_constraint(
            Expr::binary(BinOp::Eq, Expr::ident("claimed"), Expr::int(0)),
        ))
        .with_stmt(Stmt::assign("t", "claimed", Expr::int(1)))
        .with_stmt(Stmt::update("t"));
    let spoil = RuleDecl::new("spoil")
        .with_pattern(Pattern::new("Token").bind_as("t").with_constraint(
            Expr::binary(BinOp::Eq, Expr::ident("claimed"), Expr::int(0)),
        ))
        .with_stmt(Stmt::assign("t", "claimed", Expr::int(2)))
        .with_stmt(Stmt::update("t"));

    let decl = ContractDecl::new()
        .with_fact(FactDecl::new("Token").with_field("claimed", FieldType::Int));
    if winner_first {
        decl.with_rule(take).with_rule(spoil)
    } else {
        decl.with_rule(spoil).with_rule(take)
    }
}

#[test]
fn textual_order_decides_between_rules() {
    for winner_first in [true, false] {
        let mut session =
            Session::open(&race_contract(winner_first), MemoryHost::new()).unwrap();
        let tag = session.type_tag("Token").unwrap();
        let r = session.host_mut().alloc(vec![Value::Int(0)]);
        session.fact_insert(tag, r).unwrap();

        let report = session.fire_all_rules().unwrap();
        assert_eq!(report.firings, 1);

        let expected = if winner_first { 1 } else { 2 };
        assert_eq!(
            session.host().record(r).unwrap()[0],
            Value::Int(expected),
            "the textually first rule consumed the token"
        );
    }
}

/// Deleting the seed and inserting a successor exercises mid-session
/// working-memory changes: both are visible at the next refresh.
#[test]
fn action_inserts_are_matched_by_later_rules() {
    let mut host = MemoryHost::new();
    let child_record = host.alloc(vec![Value::Bool(false)]);

    let decl = ContractDecl::new()
        .with_fact(FactDecl::new("Seed").with_field("used", FieldType::Bool))
        .with_fact(FactDecl::new("Child").with_field("seen", FieldType::Bool))
        .with_rule(
            RuleDecl::new("sprout")
                .with_pattern(Pattern::new("Seed").bind_as("s").with_constraint(
                    Expr::binary(BinOp::Eq, Expr::ident("used"), Expr::bool(false)),
                ))
                .with_stmt(Stmt::assign("s", "used", Expr::bool(true)))
                .with_stmt(Stmt::update("s"))
                .with_stmt(Stmt::insert("Child", Expr::storage_slot(child_record)))
                .with_stmt(Stmt::delete(Expr::ident("s"))),
        )
        .with_rule(
            RuleDecl::new("notice")
                .with_pattern(Pattern::new("Child").bind_as("c").with_constraint(
                    Expr::binary(BinOp::Eq, Expr::ident("seen"), Expr::bool(false)),
                ))
                .with_stmt(Stmt::assign("c", "seen", Expr::bool(true)))
                .with_stmt(Stmt::update("c")),
        );

    let mut session = Session::open(&decl, host).unwrap();
    let seed_tag = session.type_tag("Seed").unwrap();
    let seed_record = session.host_mut().alloc(vec![Value::Bool(false)]);
    let seed = session.fact_insert(seed_tag, seed_record).unwrap();

    let report = session.fire_all_rules().unwrap();
    assert_eq!(report.firings, 2);

    // seed left working memory, child entered it and was noticed
    assert!(!session.table().contains(seed));
    assert_eq!(session.fact_count(), 1);
    assert_eq!(
        session.host().record(child_record).unwrap()[0],
        Value::Bool(true)
    );
}

#[test]
fn firing_bound_is_a_fatal_error() {
    // claimed tokens immediately unclaim themselves: never stabilises
    let decl = ContractDecl::new()
        .with_fact(FactDecl::new("Token").with_field("claimed", FieldType::Int))
        .with_rule(
            RuleDecl::new("flip")
                .with_pattern(Pattern::new("Token").bind_as("t"))
                .with_stmt(Stmt::assign(
                    "t",
                    "claimed",
                    Expr::binary(BinOp::Sub, Expr::int(1), Expr::field("t", "claimed")),
                ))
                .with_stmt(Stmt::update("t")),
        );

    let mut session = Session::open(&decl, MemoryHost::new())
        .unwrap()
        .with_config(EngineConfig::new().with_max_firings(50));
    let tag = session.type_tag("Token").unwrap();
    let r = session.host_mut().alloc(vec![Value::Int(0)]);
    session.fact_insert(tag, r).unwrap();

    let err = session.fire_all_rules().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::LimitExceeded(50)));
    assert!(!err.is_recoverable());
}
