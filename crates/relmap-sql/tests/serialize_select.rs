use pretty_assertions::assert_eq;
use relmap_sql::{
    stmt::{
        Direction, Expr, Join, JoinOp, Literal, OrderByExpr, Query, Select, TableFactor,
        TableWithJoins,
    },
    Batch, Serializer,
};

fn render(stmt: impl Into<relmap_sql::Statement>) -> String {
    let stmt: relmap_sql::Statement = stmt.into();
    Serializer::new().serialize(&Batch::from(stmt))
}

fn employee() -> TableFactor {
    TableFactor::table("Employee", Some("Employee".to_string()))
}

#[test]
fn select_with_left_join() {
    let mut select = Select::new(TableWithJoins {
        relation: employee(),
        joins: vec![Join {
            table: TableFactor::table("Department", Some("Department".to_string())),
            op: JoinOp::Left,
            on: Expr::eq(
                Expr::column("Employee", "DepartmentId"),
                Expr::column("Department", "Id"),
            ),
        }],
    });
    select.project(Expr::column("Employee", "Id"), Some("Id".to_string()));
    select.project(
        Expr::column("Department", "Name"),
        Some("Department.Name".to_string()),
    );

    assert_eq!(
        render(select),
        "SELECT \"Employee\".\"Id\" AS \"Id\", \"Department\".\"Name\" AS \"Department.Name\" \
         FROM \"Employee\" AS \"Employee\" \
         LEFT JOIN \"Department\" AS \"Department\" ON \"Employee\".\"DepartmentId\" = \"Department\".\"Id\";"
    );
}

#[test]
fn filter_flattens_conjunctions_and_groups_disjunctions() {
    let mut select = Select::new(employee());
    select.project(Expr::CountStar, None);
    select.add_filter(Expr::eq(Expr::column("Employee", "Id"), Expr::param("id")));
    select.add_filter(Expr::or(
        Expr::is_null(Expr::column("Employee", "Name")),
        Expr::like(
            Expr::column("Employee", "Name"),
            Expr::param("name"),
            true,
        ),
    ));

    assert_eq!(
        render(select),
        "SELECT count(*) FROM \"Employee\" AS \"Employee\" \
         WHERE \"Employee\".\"Id\" = @id \
         AND (\"Employee\".\"Name\" IS NULL OR \"Employee\".\"Name\" NOT LIKE @name);"
    );
}

#[test]
fn paging_without_order_uses_constant_ordering() {
    let mut query = Query::new(Select::new(employee()));
    query.select.project(Expr::column("Employee", "Id"), None);
    query.fetch = Some(Expr::param("fetch"));

    assert_eq!(
        render(query),
        "SELECT \"Employee\".\"Id\" FROM \"Employee\" AS \"Employee\" \
         ORDER BY (SELECT NULL) OFFSET 0 ROWS FETCH NEXT @fetch ROWS ONLY;"
    );
}

#[test]
fn ordered_offset_fetch() {
    let mut query = Query::new(Select::new(employee()));
    query.select.project(Expr::column("Employee", "Id"), None);
    query.order_by.push(OrderByExpr::new(
        Expr::column("Employee", "Name"),
        Some(Direction::Desc),
    ));
    query.order_by.push(OrderByExpr::new(Expr::column("Employee", "Id"), None));
    query.offset = Some(Expr::param("offset"));
    query.fetch = Some(Expr::param("fetch"));

    assert_eq!(
        render(query),
        "SELECT \"Employee\".\"Id\" FROM \"Employee\" AS \"Employee\" \
         ORDER BY \"Employee\".\"Name\" DESC, \"Employee\".\"Id\" \
         OFFSET @offset ROWS FETCH NEXT @fetch ROWS ONLY;"
    );
}

#[test]
fn derived_table_and_exists() {
    let mut inner = Select::new(TableFactor::table("Employee", Some("e".to_string())));
    inner.distinct = true;
    inner.project(Expr::column("e", "Id"), Some("Id".to_string()));

    let mut exists = Select::new(TableFactor::table("Project", Some("p".to_string())));
    exists.project(Expr::int(1), None);
    exists.add_filter(Expr::eq(Expr::column("p", "OwnerId"), Expr::column("e", "Id")));
    inner.add_filter(Expr::not_exists(exists));

    let mut outer = Select::new(TableFactor::Derived {
        query: Box::new(inner.into()),
        alias: "__count".to_string(),
    });
    outer.project(Expr::CountStar, None);

    assert_eq!(
        render(outer),
        "SELECT count(*) FROM (SELECT DISTINCT \"e\".\"Id\" AS \"Id\" FROM \"Employee\" AS \"e\" \
         WHERE NOT EXISTS (SELECT 1 FROM \"Project\" AS \"p\" WHERE \"p\".\"OwnerId\" = \"e\".\"Id\")) AS \"__count\";"
    );
}

#[test]
fn identifiers_and_strings_are_escaped() {
    let mut select = Select::new(TableFactor::table("We\"ird", None));
    select.project(Literal::String("it's".to_string()), Some("a\"b".to_string()));

    assert_eq!(
        render(select),
        "SELECT N'it''s' AS \"a\"\"b\" FROM \"We\"\"ird\";"
    );
}

#[test]
fn in_list_and_grouping() {
    let mut select = Select::new(employee());
    select.project(Expr::column("Employee", "Id"), None);
    select.add_filter(Expr::grouping(Expr::in_list(
        Expr::column("Employee", "Id"),
        vec![Expr::param("ids_0"), Expr::param("ids_1")],
        true,
    )));

    assert_eq!(
        render(select),
        "SELECT \"Employee\".\"Id\" FROM \"Employee\" AS \"Employee\" \
         WHERE (\"Employee\".\"Id\" NOT IN (@ids_0, @ids_1));"
    );
}
