mod builder;
pub use builder::Builder;

use crate::{Compiled, Compiler};

use relmap_core::{
    driver::Driver,
    spec::{Output, QuerySpec},
    stmt::Value,
    Result,
};

use std::sync::Arc;

/// Compiles, executes and materializes query specifications through a
/// driver. Cloning is cheap; clones share the compiler and the driver.
#[derive(Debug, Clone)]
pub struct Db {
    compiler: Arc<Compiler>,
    driver: Arc<dyn Driver>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Compiles `spec` and executes it with `args`.
    pub async fn execute(&self, spec: &QuerySpec, args: &Value) -> Result<Value> {
        let compiled = self.compiler.compile(spec)?;
        self.exec(&compiled, args).await
    }

    /// Executes an already compiled statement.
    ///
    /// Selects and returning writes yield the materialized output. Other
    /// writes yield the affected row count when asked for one, else null.
    pub async fn exec(&self, compiled: &Compiled, args: &Value) -> Result<Value> {
        let bound = compiled.bind(args)?;

        tracing::debug!(
            sql.len = bound.sql.len(),
            params = ?bound.params.keys().collect::<Vec<_>>(),
            "executing statement"
        );

        if compiled.returns_rows() {
            let rows = self.driver.execute_reader(&bound.sql, &bound.params).await?;
            return compiled.materialize(&rows);
        }

        let affected = self
            .driver
            .execute_non_query(&bound.sql, &bound.params)
            .await?;

        Ok(match compiled.output() {
            Output::Affected => Value::I64(affected as i64),
            _ => Value::Null,
        })
    }
}
