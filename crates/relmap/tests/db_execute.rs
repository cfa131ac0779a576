mod common;

use common::*;
use pretty_assertions::assert_eq;
use relmap::{
    spec::{Operation, QuerySpec},
    Db, Type, Value,
};
use uuid::Uuid;

fn db(driver: impl relmap::Driver) -> Db {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    Db::builder()
        .compiler(compiler())
        .driver(driver)
        .build()
        .unwrap()
}

#[tokio::test]
async fn select_reads_and_materializes() {
    let driver = RecordingDriver::returning_rows(rows(
        &["Id", "Name"],
        vec![vec![Value::I32(1), "Ada".into()]],
    ));
    let db = db(driver.clone());

    let mut spec = QuerySpec::builder(Operation::Select);
    spec.arg("Name", Type::String);
    spec.returns_many("EmployeeSummary");
    let spec = spec.build(&shapes()).unwrap();

    let result = db
        .execute(&spec, &record([("Name", "Ada".into())]))
        .await
        .unwrap();

    assert_eq!(
        result,
        Value::List(vec![record([("Id", 1.into()), ("Name", "Ada".into())])])
    );

    let calls = driver.calls();
    assert_eq!(calls.len(), 1);
    let Call::Reader { sql, params } = &calls[0] else {
        panic!("expected a reader call, got {:?}", calls[0]);
    };
    assert_eq!(
        sql,
        "SELECT \"Employee\".\"Id\" AS \"Id\", \"Employee\".\"Name\" AS \"Name\" \
         FROM \"Employee\" AS \"Employee\" WHERE \"Employee\".\"Name\" = @Name;"
    );
    assert_eq!(params["Name"], Value::from("Ada"));
}

#[tokio::test]
async fn write_returns_affected_rows() {
    let driver = RecordingDriver::affecting(3);
    let db = db(driver.clone());

    let mut spec = QuerySpec::builder(Operation::Delete);
    spec.table("Employee");
    spec.arg("Name", Type::String);
    spec.returns_affected();
    let spec = spec.build(&shapes()).unwrap();

    let result = db.execute(&spec, &record([("Name", "Ada".into())])).await.unwrap();
    assert_eq!(result, Value::I64(3));

    let calls = driver.calls();
    assert!(matches!(calls.as_slice(), [Call::NonQuery { .. }]));
}

#[tokio::test]
async fn write_without_result_returns_null() {
    let driver = RecordingDriver::affecting(1);
    let db = db(driver.clone());

    let mut spec = QuerySpec::builder(Operation::Insert);
    spec.arg("Employee", Type::shape("NewEmployee"));
    let compiled = db.compiler().compile(&spec.build(&shapes()).unwrap()).unwrap();

    let args = record([("Employee", record([("Name", "Ada".into())]))]);
    let result = db.exec(&compiled, &args).await.unwrap();
    assert_eq!(result, Value::Null);

    // A compiled statement can be executed again with new arguments
    let args = record([("Employee", record([("Name", "Bob".into())]))]);
    db.exec(&compiled, &args).await.unwrap();

    let calls = driver.calls();
    assert_eq!(calls.len(), 2);
    let Call::NonQuery { params, .. } = &calls[1] else {
        panic!("expected a non-query call, got {:?}", calls[1]);
    };
    assert_eq!(params["Employee_Name"], Value::from("Bob"));
}

#[tokio::test]
async fn uuid_arguments_bind_unchanged() {
    let driver = RecordingDriver::affecting(1);
    let db = db(driver.clone());

    let mut spec = QuerySpec::builder(Operation::Delete);
    spec.table("Employee");
    spec.arg("Token", Type::Uuid).column("Name");
    let spec = spec.build(&shapes()).unwrap();

    let token = Uuid::new_v4();
    db.execute(&spec, &record([("Token", token.into())]))
        .await
        .unwrap();

    let calls = driver.calls();
    let [Call::NonQuery { params, .. }] = calls.as_slice() else {
        panic!("expected one non-query call, got {calls:?}");
    };
    assert_eq!(params["Token"], Value::Uuid(token));
}

#[tokio::test]
async fn driver_errors_pass_through() {
    let db = db(FailingDriver);

    let mut spec = QuerySpec::builder(Operation::Select);
    spec.returns_many("EmployeeSummary");
    let spec = spec.build(&shapes()).unwrap();

    let err = db.execute(&spec, &Value::Null).await.unwrap_err();
    assert!(err.is_driver());
}

#[tokio::test]
async fn bind_errors_never_reach_the_driver() {
    let driver = RecordingDriver::default();
    let db = db(driver.clone());

    let mut spec = QuerySpec::builder(Operation::Select);
    spec.arg("Take", Type::I32).fetch();
    spec.returns_many("EmployeeSummary");
    let spec = spec.build(&shapes()).unwrap();

    let err = db
        .execute(&spec, &record([("Take", Value::Null)]))
        .await
        .unwrap_err();

    assert!(err.is_invalid_argument());
    assert!(driver.calls().is_empty());
}

#[test]
fn db_requires_a_driver() {
    assert!(Db::builder().compiler(compiler()).build().is_err());
}
