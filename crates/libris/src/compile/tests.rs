use super::*;
use crate::record::Column;

struct Book;

const ID: Column<Book> = Column::new("id");
const AUTHOR: Column<Book> = Column::new("author");
const PUBLISHER: Column<Book> = Column::new("publisher");
const COPIES: Column<Book> = Column::new("totalNumberOfCopies");
const TITLE: Column<Book> = Column::new("title");

fn mysql(expr: &WhereExpr<Book>) -> Fragment {
    compile_where(expr, Dialect::MySql).unwrap()
}

#[test]
fn single_predicate() {
    let f = mysql(&WhereExpr::eq(ID, 5));
    assert_eq!(f.sql, "(`id` = ?)");
    assert_eq!(f.values, vec![Value::Int(5)]);
}

#[test]
fn simple_keys_are_conjoined_in_order() {
    let expr: WhereExpr<Book> = SimpleWhere::new()
        .with(TITLE, Op::StartsWith, "Wise")
        .with(COPIES, Op::LesserThan, 3)
        .into();
    let f = mysql(&expr);
    assert_eq!(f.sql, "(`title` LIKE ? AND `totalNumberOfCopies` < ?)");
    assert_eq!(f.values, vec![Value::from("Wise%"), Value::Int(3)]);
}

#[test]
fn nested_or_of_and() {
    let expr = WhereExpr::or(vec![
        SimpleWhere::new()
            .with(AUTHOR, Op::Contains, "Murthy")
            .with(PUBLISHER, Op::Equals, "Penguin UK")
            .into(),
        WhereExpr::gte(COPIES, 10),
    ]);
    let f = mysql(&expr);
    assert_eq!(
        f.sql,
        "((`author` LIKE ? AND `publisher` = ?) OR (`totalNumberOfCopies` >= ?))"
    );
    assert_eq!(
        f.values,
        vec![
            Value::from("%Murthy%"),
            Value::from("Penguin UK"),
            Value::Int(10)
        ]
    );
}

#[test]
fn contains_binds_pattern_instead_of_inlining() {
    let f = mysql(&WhereExpr::contains(AUTHOR, "Sudha Murthy"));
    assert_eq!(f.sql, "(`author` LIKE ?)");
    assert!(!f.sql.contains("Sudha"));
    assert_eq!(f.values, vec![Value::from("%Sudha Murthy%")]);
}

#[test]
fn every_operator_renders() {
    let expected = [
        (Op::Equals, "=", "x"),
        (Op::NotEquals, "!=", "x"),
        (Op::StartsWith, "LIKE", "x%"),
        (Op::NotStartsWith, "NOT LIKE", "x%"),
        (Op::EndsWith, "LIKE", "%x"),
        (Op::NotEndsWith, "NOT LIKE", "%x"),
        (Op::Contains, "LIKE", "%x%"),
        (Op::NotContains, "NOT LIKE", "%x%"),
        (Op::GreaterThan, ">", "x"),
        (Op::GreaterThanEquals, ">=", "x"),
        (Op::LesserThan, "<", "x"),
        (Op::LesserThanEquals, "<=", "x"),
    ];
    for (op, sql, bound) in expected {
        let f = mysql(&WhereExpr::pred(TITLE, op, "x"));
        assert_eq!(f.sql, format!("(`title` {sql} ?)"), "{op}");
        assert_eq!(f.values, vec![Value::from(bound)], "{op}");
    }
}

#[test]
fn null_equals_has_no_placeholder() {
    let f = mysql(&WhereExpr::is_null(AUTHOR));
    assert_eq!(f.sql, "(`author` IS NULL)");
    assert!(f.values.is_empty());

    let f = mysql(&WhereExpr::is_not_null(AUTHOR));
    assert_eq!(f.sql, "(`author` IS NOT NULL)");
    assert!(f.values.is_empty());
}

#[test]
fn null_mixed_with_bound_predicates_keeps_order() {
    let expr: WhereExpr<Book> = SimpleWhere::new()
        .with(TITLE, Op::Equals, "Dollar Bahu")
        .with(PUBLISHER, Op::Equals, Value::Null)
        .with(COPIES, Op::GreaterThan, 0)
        .into();
    let f = mysql(&expr);
    assert_eq!(
        f.sql,
        "(`title` = ? AND `publisher` IS NULL AND `totalNumberOfCopies` > ?)"
    );
    assert_eq!(f.values, vec![Value::from("Dollar Bahu"), Value::Int(0)]);
}

#[test]
fn null_with_other_operator_is_rejected() {
    let err = compile_where(&WhereExpr::pred(AUTHOR, Op::Contains, Value::Null), Dialect::MySql)
        .unwrap_err();
    match err {
        LibError::NullOperand { column, op } => {
            assert_eq!(column, "author");
            assert_eq!(op, "CONTAINS");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_inputs_compile_to_nothing() {
    assert!(mysql(&WhereExpr::all()).is_empty());
    assert!(mysql(&WhereExpr::and(vec![])).is_empty());
    assert!(mysql(&WhereExpr::or(vec![WhereExpr::all(), WhereExpr::and(vec![])])).is_empty());
}

#[test]
fn empty_members_are_dropped_from_groups() {
    let expr = WhereExpr::and(vec![
        WhereExpr::all(),
        WhereExpr::eq(ID, 1),
        WhereExpr::or(vec![]),
    ]);
    assert_eq!(mysql(&expr).sql, "((`id` = ?))");
}

#[test]
fn postgres_numbers_and_quotes() {
    let expr = WhereExpr::or(vec![WhereExpr::eq(ID, 1), WhereExpr::contains(TITLE, "a")]);
    let f = compile_where(&expr, Dialect::Postgres).unwrap();
    assert_eq!(f.sql, r#"(("id" = $1) OR ("title" LIKE $2))"#);
}

#[test]
fn sink_continues_numbering() {
    let mut sink = ParamSink::new(Dialect::Postgres);
    let mut sql = String::new();
    sink.push(&mut sql, Value::Int(9));
    sql.push_str(" WHERE ");
    write_expr(&WhereExpr::eq(ID, 1), &mut sql, &mut sink).unwrap();
    assert_eq!(sql, r#"$1 WHERE ("id" = $2)"#);
    assert_eq!(sink.len(), 2);
}

#[test]
fn compilation_is_repeatable() {
    let expr = WhereExpr::and(vec![
        WhereExpr::contains(TITLE, "Bakula"),
        WhereExpr::or(vec![WhereExpr::lt(COPIES, 2), WhereExpr::is_null(PUBLISHER)]),
    ]);
    assert_eq!(mysql(&expr), mysql(&expr));
}

#[test]
fn empty_column_name_is_rejected() {
    const BLANK: Column<Book> = Column::new("");
    assert!(matches!(
        compile_where(&WhereExpr::eq(BLANK, 1), Dialect::MySql),
        Err(LibError::Validation(_))
    ));
}
