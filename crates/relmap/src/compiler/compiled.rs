use crate::{
    materialize::Materializer,
    token::{self, ParamPath, Token},
};

use relmap_core::{
    driver::{Params, Rows},
    schema::db::Schema,
    spec::Output,
    stmt::Value,
    Error, Result,
};
use relmap_sql::{Batch, Serializer};

use std::sync::Arc;

/// A compiled query specification, ready to be bound to arguments.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub(super) schema: Arc<Schema>,
    pub(super) batch: Batch,
    pub(super) tokens: Vec<Token>,
    pub(super) params: Vec<ParamPath>,
    pub(super) materializer: Option<Materializer>,
    pub(super) output: Output,
}

/// Command text and parameters for one execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub sql: String,
    pub params: Params,
}

impl Compiled {
    /// Binds argument values, given as a record keyed by argument name.
    pub fn bind(&self, args: &Value) -> Result<Bound> {
        if !args.is_null() && !args.is_record() {
            return Err(Error::invalid_argument(format!(
                "arguments must be a record, got {}",
                args.kind_name()
            )));
        }

        let (subs, params) = token::bind(&self.schema, &self.tokens, &self.params, args)?;
        let sql = Serializer::new().serialize_with(&self.batch, &subs);

        Ok(Bound { sql, params })
    }

    /// Folds the rows a bound execution returned into the output value.
    pub fn materialize(&self, rows: &Rows) -> Result<Value> {
        match &self.materializer {
            Some(materializer) => materializer.materialize(rows),
            None => Ok(Value::Null),
        }
    }

    pub fn output(&self) -> Output {
        self.output
    }

    /// True when executing the batch yields a result set.
    pub fn returns_rows(&self) -> bool {
        self.materializer.is_some()
    }

    /// The statement tree, with holes unfilled.
    pub fn batch(&self) -> &Batch {
        &self.batch
    }
}
