#![allow(dead_code)]

use relmap::{
    async_trait,
    schema::db::{Schema, Type as DbType},
    spec::Shapes,
    Compiler, Driver, Params, Result, Rows, Type, Value,
};

use std::sync::{Arc, Mutex};

/// `Department 1-* Employee *-* Project` through `EmployeeProject`, and
/// `Department 1-* Project`.
pub fn schema() -> Schema {
    Schema::builder()
        .table("Department", |t| {
            t.column("Id", DbType::Integer(4)).primary_key().auto_increment();
            t.column("Name", DbType::Text);
        })
        .table("Employee", |t| {
            t.column("Id", DbType::Integer(4)).primary_key().auto_increment();
            t.column("Name", DbType::Text);
            t.column("DepartmentId", DbType::Integer(4)).nullable();
            t.foreign_key(["DepartmentId"], "Department", ["Id"]);
        })
        .table("Project", |t| {
            t.column("Id", DbType::Integer(4)).primary_key().auto_increment();
            t.column("Title", DbType::Text);
            t.column("DepartmentId", DbType::Integer(4)).nullable();
            t.foreign_key(["DepartmentId"], "Department", ["Id"]);
        })
        .table("EmployeeProject", |t| {
            t.column("EmployeeId", DbType::Integer(4)).primary_key();
            t.column("ProjectId", DbType::Integer(4)).primary_key();
            t.foreign_key(["EmployeeId"], "Employee", ["Id"]);
            t.foreign_key(["ProjectId"], "Project", ["Id"]);
        })
        .build()
        .unwrap()
}

pub fn shapes() -> Shapes {
    Shapes::builder()
        .shape("Employee", |s| {
            s.field("Id", Type::I32);
            s.field("Name", Type::String);
            s.field("Department", Type::shape("Department")).nullable();
        })
        .shape("Department", |s| {
            s.field("Id", Type::I32);
            s.field("Name", Type::String);
        })
        .shape("Project", |s| {
            s.field("Id", Type::I32);
            s.field("Title", Type::String);
        })
        .shape("EmployeeSummary", |s| {
            s.table("Employee");
            s.field("Id", Type::I32);
            s.field("Name", Type::String);
        })
        .shape("DepartmentDetail", |s| {
            s.table("Department");
            s.field("Id", Type::I32);
            s.field("Name", Type::String);
            s.field("Employees", Type::list(Type::shape("EmployeeSummary")));
            s.field("Projects", Type::list(Type::shape("Project")));
        })
        .shape("EmployeeWithProjects", |s| {
            s.table("Employee");
            s.field("Id", Type::I32);
            s.field("Name", Type::String);
            s.field("Projects", Type::list(Type::shape("Project")));
        })
        .shape("EmployeeCard", |s| {
            s.table("Employee");
            s.field("Id", Type::I32);
            s.field("Info", Type::shape("NameInfo"));
        })
        .shape("NameInfo", |s| {
            s.field("Name", Type::String);
        })
        .shape("NewEmployee", |s| {
            s.table("Employee");
            s.field("Name", Type::String);
        })
        .shape("NewDepartment", |s| {
            s.table("Department");
            s.field("Name", Type::String);
            s.field("Employees", Type::list(Type::shape("NewEmployee")));
        })
        .shape("Assignment", |s| {
            s.table("EmployeeProject");
            s.field("EmployeeId", Type::I32);
            s.field("ProjectId", Type::I32);
        })
        .build()
}

pub fn compiler() -> Compiler {
    Compiler::builder().schema(schema()).build().unwrap()
}

pub fn record<const N: usize>(fields: [(&str, Value); N]) -> Value {
    Value::record(fields)
}

pub fn rows(columns: &[&str], data: Vec<Vec<Value>>) -> Rows {
    let mut rows = Rows::new(columns.iter().map(|c| c.to_string()).collect());
    for row in data {
        rows.push(row).unwrap();
    }
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Reader { sql: String, params: Params },
    NonQuery { sql: String, params: Params },
}

/// An in-memory driver that records every call and replays canned results.
#[derive(Debug, Clone, Default)]
pub struct RecordingDriver {
    calls: Arc<Mutex<Vec<Call>>>,
    rows: Arc<Mutex<Rows>>,
    affected: Arc<Mutex<u64>>,
}

impl RecordingDriver {
    pub fn returning_rows(rows: Rows) -> RecordingDriver {
        let driver = RecordingDriver::default();
        *driver.rows.lock().unwrap() = rows;
        driver
    }

    pub fn affecting(affected: u64) -> RecordingDriver {
        let driver = RecordingDriver::default();
        *driver.affected.lock().unwrap() = affected;
        driver
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Driver for RecordingDriver {
    async fn execute_reader(&self, sql: &str, params: &Params) -> Result<Rows> {
        self.calls.lock().unwrap().push(Call::Reader {
            sql: sql.to_string(),
            params: params.clone(),
        });
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn execute_non_query(&self, sql: &str, params: &Params) -> Result<u64> {
        self.calls.lock().unwrap().push(Call::NonQuery {
            sql: sql.to_string(),
            params: params.clone(),
        });
        Ok(*self.affected.lock().unwrap())
    }
}

/// A driver whose every call fails.
#[derive(Debug, Default)]
pub struct FailingDriver;

#[async_trait]
impl Driver for FailingDriver {
    async fn execute_reader(&self, _sql: &str, _params: &Params) -> Result<Rows> {
        Err(relmap::Error::driver(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset",
        )))
    }

    async fn execute_non_query(&self, _sql: &str, _params: &Params) -> Result<u64> {
        Err(relmap::Error::driver(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset",
        )))
    }
}
