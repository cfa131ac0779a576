mod common;

use common::*;
use pretty_assertions::assert_eq;
use relmap::{
    spec::{Operation, QuerySpec, QuerySpecBuilder},
    Compiled, Type, Value,
};

fn compile(operation: Operation, f: impl FnOnce(&mut QuerySpecBuilder)) -> Compiled {
    let mut spec = QuerySpec::builder(operation);
    f(&mut spec);
    compiler().compile(&spec.build(&shapes()).unwrap()).unwrap()
}

fn statements(sql: &str) -> Vec<&str> {
    sql.trim_end_matches(';').split(";\n").collect()
}

#[test]
fn single_entity_insert_names_parameters_after_fields() {
    let compiled = compile(Operation::Insert, |spec| {
        spec.arg("Employee", Type::shape("NewEmployee"));
    });

    let bound = compiled
        .bind(&record([("Employee", record([("Name", "Ada".into())]))]))
        .unwrap();

    assert_eq!(
        bound.sql,
        "INSERT INTO \"Employee\" (\"Name\") VALUES (@Employee_Name);"
    );
    assert_eq!(bound.params["Employee_Name"], Value::from("Ada"));
    assert!(!compiled.returns_rows());
}

#[test]
fn bulk_insert_binds_one_row_per_element() {
    let compiled = compile(Operation::Insert, |spec| {
        spec.arg("Employees", Type::list(Type::shape("NewEmployee")));
    });

    let bound = compiled
        .bind(&record([(
            "Employees",
            Value::List(vec![
                record([("Name", "Ada".into())]),
                record([("Name", "Grace".into())]),
            ]),
        )]))
        .unwrap();

    assert_eq!(
        bound.sql,
        "INSERT INTO \"Employee\" (\"Name\") VALUES (@n0_r0_c0), (@n0_r1_c0);"
    );
    assert_eq!(bound.params["n0_r1_c0"], Value::from("Grace"));
}

#[test]
fn bulk_insert_splits_long_collections() {
    let compiled = compile(Operation::Insert, |spec| {
        spec.arg("Employees", Type::list(Type::shape("NewEmployee")));
    });

    let employees = (0..1001)
        .map(|i| record([("Name", format!("Employee {i}").into())]))
        .collect();
    let bound = compiled
        .bind(&record([("Employees", Value::List(employees))]))
        .unwrap();

    let statements = statements(&bound.sql);
    assert_eq!(statements.len(), 2);
    assert!(statements[0].ends_with("(@n0_r999_c0)"));
    assert_eq!(
        statements[1],
        "INSERT INTO \"Employee\" (\"Name\") VALUES (@n0_r1000_c0)"
    );
    assert_eq!(bound.params.len(), 1001);
}

#[test]
fn empty_bulk_insert_is_rejected() {
    let compiled = compile(Operation::Insert, |spec| {
        spec.arg("Employees", Type::list(Type::shape("NewEmployee")));
    });

    let err = compiled
        .bind(&record([("Employees", Value::List(vec![]))]))
        .unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn nested_insert_propagates_generated_keys() {
    let compiled = compile(Operation::Insert, |spec| {
        spec.arg("Department", Type::shape("NewDepartment"));
    });

    let bound = compiled
        .bind(&record([(
            "Department",
            record([
                ("Name", "Research".into()),
                (
                    "Employees",
                    Value::List(vec![
                        record([("Name", "Ada".into())]),
                        record([("Name", "Bob".into())]),
                    ]),
                ),
            ]),
        )]))
        .unwrap();

    assert_eq!(
        statements(&bound.sql),
        [
            "DECLARE @lookup0 TABLE (\"__index\" int, \"Name\" nvarchar(max) NULL, \"Id\" int NULL)",
            "DECLARE @output0 TABLE (\"__index\" int, \"Id\" int)",
            "DECLARE @lookup1 TABLE (\"__index\" int, \"__parent\" int NULL, \
             \"Name\" nvarchar(max) NULL, \"Id\" int NULL, \"DepartmentId\" int NULL)",
            "DECLARE @output1 TABLE (\"__index\" int, \"Id\" int)",
            "INSERT INTO @lookup0 (\"__index\", \"Name\", \"Id\") VALUES (0, @n0_r0_c1, NULL)",
            "INSERT INTO @lookup1 (\"__index\", \"__parent\", \"Name\", \"Id\", \"DepartmentId\") \
             VALUES (0, 0, @n1_r0_c2, NULL, NULL), (1, 0, @n1_r1_c2, NULL, NULL)",
            "MERGE INTO \"Department\" AS \"target\" USING @lookup0 AS \"source\" ON 1 = 0 \
             WHEN NOT MATCHED THEN INSERT (\"Name\") VALUES (\"source\".\"Name\") \
             OUTPUT \"source\".\"__index\", inserted.\"Id\" INTO @output0 (\"__index\", \"Id\")",
            "UPDATE \"l\" SET \"Id\" = \"o\".\"Id\" FROM @lookup0 AS \"l\" \
             INNER JOIN @output0 AS \"o\" ON \"o\".\"__index\" = \"l\".\"__index\"",
            "UPDATE \"l\" SET \"DepartmentId\" = \"o\".\"Id\" FROM @lookup1 AS \"l\" \
             INNER JOIN @lookup0 AS \"o\" ON \"l\".\"__parent\" = \"o\".\"__index\"",
            "MERGE INTO \"Employee\" AS \"target\" USING @lookup1 AS \"source\" ON 1 = 0 \
             WHEN NOT MATCHED THEN INSERT (\"Name\", \"DepartmentId\") \
             VALUES (\"source\".\"Name\", \"source\".\"DepartmentId\") \
             OUTPUT \"source\".\"__index\", inserted.\"Id\" INTO @output1 (\"__index\", \"Id\")",
            "UPDATE \"l\" SET \"Id\" = \"o\".\"Id\" FROM @lookup1 AS \"l\" \
             INNER JOIN @output1 AS \"o\" ON \"o\".\"__index\" = \"l\".\"__index\"",
        ]
    );

    assert_eq!(
        bound.params.keys().collect::<Vec<_>>(),
        ["n0_r0_c1", "n1_r0_c2", "n1_r1_c2"]
    );
    assert_eq!(bound.params["n1_r1_c2"], Value::from("Bob"));
}

#[test]
fn upsert_merges_on_key_then_updates() {
    let compiled = compile(Operation::Upsert, |spec| {
        spec.arg("Department", Type::shape("Department"));
    });

    let bound = compiled
        .bind(&record([(
            "Department",
            record([("Id", 4.into()), ("Name", "Ops".into())]),
        )]))
        .unwrap();

    assert_eq!(
        statements(&bound.sql),
        [
            "DECLARE @lookup0 TABLE (\"__index\" int, \"Id\" int NULL, \"Name\" nvarchar(max) NULL)",
            "DECLARE @output0 TABLE (\"__index\" int, \"Id\" int)",
            "INSERT INTO @lookup0 (\"__index\", \"Id\", \"Name\") VALUES (0, @n0_r0_c1, @n0_r0_c2)",
            "MERGE INTO \"Department\" AS \"target\" USING @lookup0 AS \"source\" \
             ON \"target\".\"Id\" = \"source\".\"Id\" \
             WHEN NOT MATCHED THEN INSERT (\"Name\") VALUES (\"source\".\"Name\") \
             OUTPUT \"source\".\"__index\", inserted.\"Id\" INTO @output0 (\"__index\", \"Id\")",
            "UPDATE \"l\" SET \"Id\" = \"o\".\"Id\" FROM @lookup0 AS \"l\" \
             INNER JOIN @output0 AS \"o\" ON \"o\".\"__index\" = \"l\".\"__index\"",
            "UPDATE \"target\" SET \"Name\" = \"source\".\"Name\" FROM \"Department\" AS \"target\" \
             INNER JOIN @lookup0 AS \"source\" ON \"target\".\"Id\" = \"source\".\"Id\"",
        ]
    );
    assert_eq!(bound.params["n0_r0_c1"], Value::I32(4));
}

#[test]
fn sync_links_junction_rows_and_removes_stale_ones() {
    let compiled = compile(Operation::Sync, |spec| {
        spec.arg("Employee", Type::shape("EmployeeWithProjects"));
    });

    let bound = compiled
        .bind(&record([(
            "Employee",
            record([
                ("Id", 1.into()),
                ("Name", "Ada".into()),
                (
                    "Projects",
                    Value::List(vec![record([("Id", 20.into()), ("Title", "Apollo".into())])]),
                ),
            ]),
        )]))
        .unwrap();

    let statements = statements(&bound.sql);

    assert!(statements.contains(
        &"INSERT INTO \"EmployeeProject\" (\"EmployeeId\", \"ProjectId\") \
          SELECT \"p\".\"Id\", \"l\".\"Id\" FROM @lookup1 AS \"l\" \
          INNER JOIN @lookup0 AS \"p\" ON \"p\".\"__index\" = \"l\".\"__parent\" \
          WHERE NOT EXISTS (SELECT 1 FROM \"EmployeeProject\" AS \"j\" \
          WHERE \"p\".\"Id\" = \"j\".\"EmployeeId\" AND \"j\".\"ProjectId\" = \"l\".\"Id\")"
    ));

    assert_eq!(
        statements.last(),
        Some(
            &"DELETE \"j\" FROM \"EmployeeProject\" AS \"j\" \
              WHERE EXISTS (SELECT 1 FROM @lookup0 AS \"p\" WHERE \"p\".\"Id\" = \"j\".\"EmployeeId\") \
              AND NOT EXISTS (SELECT 1 FROM @lookup1 AS \"l\" \
              INNER JOIN @lookup0 AS \"p\" ON \"p\".\"__index\" = \"l\".\"__parent\" \
              WHERE \"p\".\"Id\" = \"j\".\"EmployeeId\" AND \"j\".\"ProjectId\" = \"l\".\"Id\")"
        )
    );
}

#[test]
fn sync_removes_stale_children() {
    let compiled = compile(Operation::Sync, |spec| {
        spec.arg("Department", Type::shape("NewDepartment"));
    });

    let bound = compiled
        .bind(&record([(
            "Department",
            record([("Name", "Research".into()), ("Employees", Value::List(vec![]))]),
        )]))
        .unwrap();

    assert_eq!(
        statements(&bound.sql).last(),
        Some(
            &"DELETE \"t\" FROM \"Employee\" AS \"t\" \
              WHERE EXISTS (SELECT 1 FROM @lookup0 AS \"p\" WHERE \"p\".\"Id\" = \"t\".\"DepartmentId\") \
              AND NOT EXISTS (SELECT 1 FROM @lookup1 AS \"l\" WHERE \"l\".\"Id\" = \"t\".\"Id\")"
        )
    );
    assert!(bound.sql.contains(
        "INSERT INTO @lookup1 (\"__index\", \"__parent\", \"Name\", \"Id\", \"DepartmentId\") \
         SELECT NULL, NULL, NULL, NULL, NULL WHERE 1 = 0"
    ));
}

#[test]
fn insert_returning_selects_written_rows_in_input_order() {
    let compiled = compile(Operation::Insert, |spec| {
        spec.arg("Employees", Type::list(Type::shape("NewEmployee")));
        spec.returns_many("EmployeeSummary");
    });
    assert!(compiled.returns_rows());

    let bound = compiled
        .bind(&record([(
            "Employees",
            Value::List(vec![record([("Name", "Ada".into())])]),
        )]))
        .unwrap();

    assert_eq!(
        statements(&bound.sql).last(),
        Some(
            &"SELECT \"Employee\".\"Id\" AS \"Id\", \"Employee\".\"Name\" AS \"Name\" \
              FROM @lookup0 AS \"__lookup\" \
              INNER JOIN \"Employee\" AS \"Employee\" ON \"__lookup\".\"Id\" = \"Employee\".\"Id\" \
              ORDER BY \"__lookup\".\"__index\""
        )
    );
}

#[test]
fn write_needs_a_single_entity_argument() {
    let mut spec = QuerySpec::builder(Operation::Insert);
    spec.table("Employee");
    spec.arg("Name", Type::String);

    let err = compiler()
        .compile(&spec.build(&shapes()).unwrap())
        .unwrap_err();
    assert!(err.is_invalid_attribute());
}

#[test]
fn update_with_set_arguments() {
    let compiled = compile(Operation::Update, |spec| {
        spec.table("Employee");
        spec.arg("NewName", Type::String).column("Name").set().ignore_if_null();
        spec.arg("DepartmentId", Type::I32).set();
        spec.arg("Id", Type::I32);
        spec.returns_affected();
    });

    let bound = compiled
        .bind(&record([
            ("NewName", "Ada".into()),
            ("DepartmentId", 2.into()),
            ("Id", 7.into()),
        ]))
        .unwrap();
    assert_eq!(
        bound.sql,
        "UPDATE \"Employee\" SET \"Name\" = @NewName, \"DepartmentId\" = @DepartmentId \
         WHERE \"Employee\".\"Id\" = @Id;"
    );
    assert_eq!(
        bound.params.keys().collect::<Vec<_>>(),
        ["NewName", "DepartmentId", "Id"]
    );

    let bound = compiled
        .bind(&record([
            ("NewName", Value::Null),
            ("DepartmentId", 2.into()),
            ("Id", 7.into()),
        ]))
        .unwrap();
    assert_eq!(
        bound.sql,
        "UPDATE \"Employee\" SET \"DepartmentId\" = @DepartmentId WHERE \"Employee\".\"Id\" = @Id;"
    );
    assert!(!bound.params.contains_key("NewName"));
}

#[test]
fn update_with_every_assignment_ignored_is_rejected() {
    let compiled = compile(Operation::Update, |spec| {
        spec.table("Employee");
        spec.arg("Name", Type::String).set().ignore_if_null();
        spec.arg("Id", Type::I32);
    });

    let err = compiled
        .bind(&record([("Name", Value::Null), ("Id", 1.into())]))
        .unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn update_single_entity_by_key() {
    let compiled = compile(Operation::Update, |spec| {
        spec.arg("Employee", Type::shape("EmployeeSummary"));
    });

    let bound = compiled
        .bind(&record([(
            "Employee",
            record([("Id", 3.into()), ("Name", "Grace".into())]),
        )]))
        .unwrap();

    assert_eq!(
        bound.sql,
        "UPDATE \"Employee\" SET \"Name\" = @Employee_Name WHERE \"Employee\".\"Id\" = @Employee_Id;"
    );
    assert_eq!(bound.params["Employee_Id"], Value::I32(3));
}

#[test]
fn update_entity_collection_through_lookup() {
    let compiled = compile(Operation::Update, |spec| {
        spec.arg("Employees", Type::list(Type::shape("EmployeeSummary")));
    });

    let bound = compiled
        .bind(&record([(
            "Employees",
            Value::List(vec![
                record([("Id", 1.into()), ("Name", "Ada".into())]),
                record([("Id", 2.into()), ("Name", "Bob".into())]),
            ]),
        )]))
        .unwrap();

    assert_eq!(
        statements(&bound.sql),
        [
            "DECLARE @lookup0 TABLE (\"__index\" int, \"Id\" int NULL, \"Name\" nvarchar(max) NULL)",
            "INSERT INTO @lookup0 (\"__index\", \"Id\", \"Name\") \
             VALUES (0, @n0_r0_c1, @n0_r0_c2), (1, @n0_r1_c1, @n0_r1_c2)",
            "UPDATE \"target\" SET \"Name\" = \"source\".\"Name\" FROM \"Employee\" AS \"target\" \
             INNER JOIN @lookup0 AS \"source\" ON \"target\".\"Id\" = \"source\".\"Id\"",
        ]
    );
}

#[test]
fn update_entity_without_key_field_is_rejected() {
    let mut spec = QuerySpec::builder(Operation::Update);
    spec.arg("Employee", Type::shape("NewEmployee"));

    let err = compiler()
        .compile(&spec.build(&shapes()).unwrap())
        .unwrap_err();
    assert!(err.is_invalid_attribute());
}

#[test]
fn delete_by_filter() {
    let compiled = compile(Operation::Delete, |spec| {
        spec.table("Employee");
        spec.arg("Name", Type::String);
    });

    let bound = compiled.bind(&record([("Name", "Ada".into())])).unwrap();
    assert_eq!(
        bound.sql,
        "DELETE FROM \"Employee\" WHERE \"Employee\".\"Name\" = @Name;"
    );
}

#[test]
fn delete_entities_by_key() {
    let compiled = compile(Operation::Delete, |spec| {
        spec.arg("Employees", Type::list(Type::shape("EmployeeSummary")));
    });

    let bound = compiled
        .bind(&record([(
            "Employees",
            Value::List(vec![
                record([("Id", 1.into()), ("Name", "Ada".into())]),
                record([("Id", 2.into()), ("Name", "Bob".into())]),
            ]),
        )]))
        .unwrap();
    assert_eq!(
        bound.sql,
        "DELETE FROM \"Employee\" WHERE \"Employee\".\"Id\" IN (@Employees_0, @Employees_1);"
    );
    assert_eq!(bound.params["Employees_1"], Value::I32(2));

    let bound = compiled
        .bind(&record([("Employees", Value::List(vec![]))]))
        .unwrap();
    assert_eq!(bound.sql, "DELETE FROM \"Employee\" WHERE 1 = 0;");
}

#[test]
fn delete_by_composite_key() {
    let compiled = compile(Operation::Delete, |spec| {
        spec.arg("Assignments", Type::list(Type::shape("Assignment")));
    });

    let bound = compiled
        .bind(&record([(
            "Assignments",
            Value::List(vec![
                record([("EmployeeId", 1.into()), ("ProjectId", 20.into())]),
                record([("EmployeeId", 2.into()), ("ProjectId", 21.into())]),
            ]),
        )]))
        .unwrap();

    assert_eq!(
        bound.sql,
        "DELETE FROM \"EmployeeProject\" WHERE \
         ((\"EmployeeProject\".\"EmployeeId\" = @Assignments_0_0 \
         AND \"EmployeeProject\".\"ProjectId\" = @Assignments_0_1) \
         OR (\"EmployeeProject\".\"EmployeeId\" = @Assignments_1_0 \
         AND \"EmployeeProject\".\"ProjectId\" = @Assignments_1_1));"
    );
    assert_eq!(bound.params.len(), 4);
}

#[test]
fn writes_cannot_return_counts() {
    let mut spec = QuerySpec::builder(Operation::Delete);
    spec.table("Employee");
    spec.returns_count();

    let err = spec.build(&shapes()).unwrap_err();
    assert!(err.is_invalid_attribute());
}
