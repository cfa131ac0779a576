use pretty_assertions::assert_eq;
use relmap_sql::{
    stmt::{
        Assignment, Direction, Expr, Fragment, HoleId, Insert, InsertSource, InsertTarget,
        OrderByExpr, OrderByItem, Query, Select, Substitutions, TableFactor, Update, Values,
    },
    Batch, Serializer, Statement,
};

fn select_with_holes() -> Batch {
    let mut query = Query::new(Select::new(TableFactor::table(
        "Employee",
        Some("Employee".to_string()),
    )));
    query.select.project(Expr::column("Employee", "Id"), None);
    query.select.add_filter(Expr::hole(HoleId(0)));
    query.select.add_filter(Expr::hole(HoleId(1)));
    query.order_by.push(OrderByItem::Hole(HoleId(2)));
    Batch::from(Statement::from(query))
}

#[test]
fn holes_are_replaced_by_bound_fragments() {
    let mut subs = Substitutions::new();
    subs.insert(
        HoleId(0),
        Fragment::Expr(Expr::eq(Expr::column("Employee", "Name"), Expr::param("name"))),
    );
    subs.insert(HoleId(1), Fragment::Expr(Expr::tautology()));
    subs.insert(
        HoleId(2),
        Fragment::OrderBy(vec![OrderByExpr::new(
            Expr::column("Employee", "Name"),
            Some(Direction::Asc),
        )]),
    );

    let sql = Serializer::new().serialize_with(&select_with_holes(), &subs);

    assert_eq!(
        sql,
        "SELECT \"Employee\".\"Id\" FROM \"Employee\" AS \"Employee\" \
         WHERE \"Employee\".\"Name\" = @name AND 1 = 1 \
         ORDER BY \"Employee\".\"Name\" ASC;"
    );
}

#[test]
fn empty_order_by_fragment_drops_clause() {
    let mut subs = Substitutions::new();
    subs.insert(HoleId(0), Fragment::Expr(Expr::tautology()));
    subs.insert(HoleId(1), Fragment::Expr(Expr::contradiction()));
    subs.insert(HoleId(2), Fragment::OrderBy(vec![]));

    let sql = Serializer::new().serialize_with(&select_with_holes(), &subs);

    assert_eq!(
        sql,
        "SELECT \"Employee\".\"Id\" FROM \"Employee\" AS \"Employee\" WHERE 1 = 1 AND 1 = 0;"
    );
}

#[test]
#[should_panic(expected = "no fragment bound")]
fn unbound_hole_panics() {
    Serializer::new().serialize(&select_with_holes());
}

#[test]
fn assignment_and_rows_holes() {
    let mut batch = Batch::new();
    batch.push(Update {
        target: "Employee".to_string(),
        assignments: vec![
            Assignment::set("Version", Expr::param("version")),
            Assignment::Hole(HoleId(0)),
        ],
        from: None,
        filter: Some(Expr::eq(Expr::unqualified("Id"), Expr::param("Id"))),
    });
    batch.push(Insert {
        target: InsertTarget::Variable("lookup0".to_string()),
        columns: vec!["__index".to_string(), "Name".to_string()],
        source: InsertSource::Values(Values::Hole(HoleId(1))),
    });

    let mut subs = Substitutions::new();
    subs.insert(
        HoleId(0),
        Fragment::Assignments(vec![Assignment::set("Name", Expr::param("Name"))]),
    );
    subs.insert(
        HoleId(1),
        Fragment::Rows(vec![
            vec![Expr::int(0), Expr::param("n0_r0_c1")],
            vec![Expr::int(1), Expr::param("n0_r1_c1")],
        ]),
    );

    let sql = Serializer::new().serialize_with(&batch, &subs);

    assert_eq!(
        sql,
        "UPDATE \"Employee\" SET \"Version\" = @version, \"Name\" = @Name WHERE \"Id\" = @Id;\n\
         INSERT INTO @lookup0 (\"__index\", \"Name\") VALUES (0, @n0_r0_c1), (1, @n0_r1_c1);"
    );
}

#[test]
fn empty_rows_insert_nothing() {
    let batch = Batch::from(Statement::from(Insert {
        target: InsertTarget::Variable("lookup1".to_string()),
        columns: vec!["__index".to_string(), "Title".to_string()],
        source: InsertSource::Values(Values::Hole(HoleId(0))),
    }));

    let mut subs = Substitutions::new();
    subs.insert(HoleId(0), Fragment::Rows(vec![]));

    assert_eq!(
        Serializer::new().serialize_with(&batch, &subs),
        "INSERT INTO @lookup1 (\"__index\", \"Title\") SELECT NULL, NULL WHERE 1 = 0;"
    );
}
