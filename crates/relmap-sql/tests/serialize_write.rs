use pretty_assertions::assert_eq;
use relmap_core::schema::db::Type;
use relmap_sql::{
    stmt::{
        Assignment, ColumnDef, Declare, Delete, Expr, Insert, InsertSource, InsertTarget, Merge,
        MergeInsert, OutputInto, TableFactor, TableWithJoins, Update, Values,
    },
    Batch, Serializer,
};

fn render(batch: &Batch) -> String {
    Serializer::new().serialize(batch)
}

#[test]
fn insert_values() {
    let batch = Batch::from(relmap_sql::Statement::from(Insert {
        target: InsertTarget::Table("Employee".to_string()),
        columns: vec!["Name".to_string(), "DepartmentId".to_string()],
        source: InsertSource::Values(Values::Rows(vec![vec![
            Expr::param("Name"),
            Expr::param("DepartmentId"),
        ]])),
    }));

    assert_eq!(
        render(&batch),
        "INSERT INTO \"Employee\" (\"Name\", \"DepartmentId\") VALUES (@Name, @DepartmentId);"
    );
}

#[test]
fn long_values_lists_split_into_chunks() {
    let rows = (0..2001).map(|i| vec![Expr::int(i)]).collect();
    let batch = Batch::from(relmap_sql::Statement::from(Insert {
        target: InsertTarget::Variable("lookup0".to_string()),
        columns: vec!["__index".to_string()],
        source: InsertSource::Values(Values::Rows(rows)),
    }));

    let sql = render(&batch);
    let statements: Vec<&str> = sql.trim_end_matches(';').split(";\n").collect();

    assert_eq!(statements.len(), 3);
    assert!(statements[0].starts_with("INSERT INTO @lookup0 (\"__index\") VALUES (0), (1), "));
    assert!(statements[0].ends_with(", (999)"));
    assert!(statements[1].starts_with("INSERT INTO @lookup0 (\"__index\") VALUES (1000), "));
    assert_eq!(statements[2], "INSERT INTO @lookup0 (\"__index\") VALUES (2000)");
}

#[test]
fn insert_without_columns_uses_defaults() {
    let batch = Batch::from(relmap_sql::Statement::from(Insert {
        target: InsertTarget::Variable("lookup0".to_string()),
        columns: vec![],
        source: InsertSource::Values(Values::Rows(vec![])),
    }));

    assert_eq!(render(&batch), "INSERT INTO @lookup0 DEFAULT VALUES;");
}

#[test]
fn declare_merge_output_batch() {
    let mut batch = Batch::new();
    batch.push(Declare {
        name: "lookup0".to_string(),
        columns: vec![
            ColumnDef {
                name: "__index".to_string(),
                ty: Type::Integer(4),
                nullable: false,
            },
            ColumnDef {
                name: "Name".to_string(),
                ty: Type::VarChar(100),
                nullable: true,
            },
        ],
    });
    batch.push(Merge {
        target: TableFactor::table("Employee", Some("target".to_string())),
        source: TableFactor::variable("lookup0", "source"),
        on: Expr::contradiction(),
        matched_update: vec![],
        not_matched_insert: Some(MergeInsert {
            columns: vec!["Name".to_string()],
            values: vec![Expr::column("source", "Name")],
        }),
        output: Some(OutputInto {
            exprs: vec![Expr::column("source", "__index"), Expr::inserted("Id")],
            into: "output0".to_string(),
            columns: vec!["__index".to_string(), "Id".to_string()],
        }),
    });

    assert_eq!(
        render(&batch),
        "DECLARE @lookup0 TABLE (\"__index\" int, \"Name\" nvarchar(100) NULL);\n\
         MERGE INTO \"Employee\" AS \"target\" USING @lookup0 AS \"source\" ON 1 = 0 \
         WHEN NOT MATCHED THEN INSERT (\"Name\") VALUES (\"source\".\"Name\") \
         OUTPUT \"source\".\"__index\", inserted.\"Id\" INTO @output0 (\"__index\", \"Id\");"
    );
}

#[test]
fn update_from_join() {
    let batch = Batch::from(relmap_sql::Statement::from(Update {
        target: "target".to_string(),
        assignments: vec![Assignment::set("Name", Expr::column("lookup", "Name"))],
        from: Some(TableWithJoins {
            relation: TableFactor::table("Employee", Some("target".to_string())),
            joins: vec![relmap_sql::stmt::Join {
                table: TableFactor::variable("lookup0", "lookup"),
                op: relmap_sql::stmt::JoinOp::Inner,
                on: Expr::eq(Expr::column("target", "Id"), Expr::column("lookup", "Id")),
            }],
        }),
        filter: None,
    }));

    assert_eq!(
        render(&batch),
        "UPDATE \"target\" SET \"Name\" = \"lookup\".\"Name\" \
         FROM \"Employee\" AS \"target\" INNER JOIN @lookup0 AS \"lookup\" \
         ON \"target\".\"Id\" = \"lookup\".\"Id\";"
    );
}

#[test]
fn delete_with_and_without_alias() {
    let plain = Batch::from(relmap_sql::Statement::from(Delete {
        from: TableFactor::table("Employee", None),
        filter: Some(Expr::eq(Expr::unqualified("Id"), Expr::param("Id"))),
    }));
    assert_eq!(
        render(&plain),
        "DELETE FROM \"Employee\" WHERE \"Id\" = @Id;"
    );

    let aliased = Batch::from(relmap_sql::Statement::from(Delete {
        from: TableFactor::table("Employee", Some("child".to_string())),
        filter: Some(Expr::is_null(Expr::column("child", "DepartmentId"))),
    }));
    assert_eq!(
        render(&aliased),
        "DELETE \"child\" FROM \"Employee\" AS \"child\" WHERE \"child\".\"DepartmentId\" IS NULL;"
    );
}
