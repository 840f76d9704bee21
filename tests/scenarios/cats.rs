//! The cat walk: a cat eats food at its location for energy and spends
//! energy moving forward. Rule declaration order decides whether food
//! along the way gets eaten.

use tinderbox_engine::Session;
use tinderbox_foundation::{FieldType, StorageRef, Value};
use tinderbox_language::{BinOp, ContractDecl, Expr, FactDecl, Pattern, RuleDecl, Stmt};
use tinderbox_storage::MemoryHost;

fn cat_facts() -> ContractDecl {
    ContractDecl::new()
        .with_fact(
            FactDecl::new("Cat")
                .with_field("id", FieldType::Int)
                .with_field("energy", FieldType::Int),
        )
        .with_fact(
            FactDecl::new("CatLocation")
                .with_field("cat", FieldType::Int)
                .with_field("location", FieldType::Int),
        )
        .with_fact(
            FactDecl::new("Food")
                .with_field("position", FieldType::Int)
                .with_field("energy", FieldType::Int),
        )
}

fn eat_rule() -> RuleDecl {
    RuleDecl::new("catEatFood")
        .with_pattern(Pattern::new("Cat").bind_as("c").with_binding("i", "id"))
        .with_pattern(
            Pattern::new("CatLocation")
                .with_constraint(Expr::binary(BinOp::Eq, Expr::ident("cat"), Expr::ident("i")))
                .with_binding("loc", "location"),
        )
        .with_pattern(Pattern::new("Food").bind_as("f").with_constraint(
            Expr::binary(BinOp::Eq, Expr::ident("position"), Expr::ident("loc")),
        ))
        .with_stmt(Stmt::assign(
            "c",
            "energy",
            Expr::binary(
                BinOp::Add,
                Expr::field("c", "energy"),
                Expr::field("f", "energy"),
            ),
        ))
        .with_stmt(Stmt::delete(Expr::ident("f")))
        .with_stmt(Stmt::update("c"))
}

fn move_rule() -> RuleDecl {
    RuleDecl::new("catMoves")
        .with_pattern(
            Pattern::new("Cat")
                .bind_as("c")
                .with_constraint(Expr::binary(BinOp::Gt, Expr::ident("energy"), Expr::int(0)))
                .with_binding("i", "id"),
        )
        .with_pattern(Pattern::new("CatLocation").bind_as("l").with_constraint(
            Expr::binary(BinOp::Eq, Expr::ident("cat"), Expr::ident("i")),
        ))
        .with_stmt(Stmt::assign(
            "l",
            "location",
            Expr::binary(BinOp::Add, Expr::field("l", "location"), Expr::int(1)),
        ))
        .with_stmt(Stmt::assign(
            "c",
            "energy",
            Expr::binary(BinOp::Sub, Expr::field("c", "energy"), Expr::int(1)),
        ))
        .with_stmt(Stmt::update("l"))
        .with_stmt(Stmt::update("c"))
}

struct Walk {
    session: Session<MemoryHost>,
    cat: StorageRef,
    location: StorageRef,
    foods: Vec<StorageRef>,
}

fn setup(contract: &ContractDecl, start: i64, foods: &[(i64, i64)]) -> Walk {
    let mut session = Session::open(contract, MemoryHost::new()).unwrap();
    let cat_tag = session.type_tag("Cat").unwrap();
    let loc_tag = session.type_tag("CatLocation").unwrap();
    let food_tag = session.type_tag("Food").unwrap();

    let cat = session.host_mut().alloc(vec![Value::Int(0), Value::Int(0)]);
    session.fact_insert(cat_tag, cat).unwrap();

    let location = session
        .host_mut()
        .alloc(vec![Value::Int(0), Value::Int(start)]);
    session.fact_insert(loc_tag, location).unwrap();

    let mut food_records = Vec::new();
    for (position, energy) in foods {
        let r = session
            .host_mut()
            .alloc(vec![Value::Int(*position), Value::Int(*energy)]);
        session.fact_insert(food_tag, r).unwrap();
        food_records.push(r);
    }

    Walk {
        session,
        cat,
        location,
        foods: food_records,
    }
}

#[test]
fn cat_eats_everything_on_its_path() {
    let contract = cat_facts().with_rule(eat_rule()).with_rule(move_rule());
    let Walk {
        mut session,
        cat,
        location,
        ..
    } = setup(&contract, 3, &[(3, 5), (7, 2)]);

    let report = session.fire_all_rules().unwrap();
    // two meals plus seven single steps
    assert_eq!(report.firings, 9);

    // 3 (start) + 5 + 2 steps of energy spent walking
    assert_eq!(
        session.host().record(location).unwrap()[1],
        Value::Int(10)
    );
    assert_eq!(session.host().record(cat).unwrap()[1], Value::Int(0));

    // no food remains at or before the final location
    assert_eq!(session.fact_count(), 2);
}

#[test]
fn moving_first_walks_past_food() {
    // same walk, but movement is declared before eating
    let contract = cat_facts().with_rule(move_rule()).with_rule(eat_rule());
    let Walk {
        mut session,
        cat,
        location,
        foods,
    } = setup(&contract, 3, &[(3, 5), (7, 2)]);

    let report = session.fire_all_rules().unwrap();
    // one meal at the start, five steps, and the food at 7 is passed
    // while the cat still has energy to move
    assert_eq!(report.firings, 6);

    assert_eq!(session.host().record(location).unwrap()[1], Value::Int(8));
    assert_eq!(session.host().record(cat).unwrap()[1], Value::Int(0));

    // the food at 7 was never eaten
    assert_eq!(session.fact_count(), 3);
    assert_eq!(
        session.host().record(foods[1]).unwrap()[0],
        Value::Int(7)
    );
}

#[test]
fn cat_without_food_never_moves() {
    let contract = cat_facts().with_rule(eat_rule()).with_rule(move_rule());
    let Walk {
        mut session,
        location,
        ..
    } = setup(&contract, 5, &[]);

    assert_eq!(session.fire_all_rules().unwrap().firings, 0);
    assert_eq!(session.host().record(location).unwrap()[1], Value::Int(5));
}

#[test]
fn stacked_food_at_one_position_is_all_eaten() {
    let contract = cat_facts().with_rule(eat_rule()).with_rule(move_rule());
    let Walk { mut session, cat, .. } = setup(&contract, 2, &[(2, 3), (2, 4)]);

    let report = session.fire_all_rules().unwrap();
    // both meals happen before any step: eating outranks moving
    assert_eq!(report.firings, 2 + 7);
    assert_eq!(session.host().record(cat).unwrap()[1], Value::Int(0));
    assert_eq!(session.fact_count(), 2);
}
