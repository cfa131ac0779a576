mod rows;
pub use rows::Rows;

use crate::{async_trait, stmt::Value, Result};

use indexmap::IndexMap;
use std::fmt::Debug;

/// Named command parameters. Null values are present as [`Value::Null`],
/// never omitted.
pub type Params = IndexMap<String, Value>;

/// The database driver boundary.
///
/// relmap hands the driver finished command text plus named parameters and
/// never retries: driver errors propagate to the caller unchanged.
#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Executes a command returning rows. The result set is fully buffered.
    async fn execute_reader(&self, sql: &str, params: &Params) -> Result<Rows>;

    /// Executes a command returning the number of affected rows.
    async fn execute_non_query(&self, sql: &str, params: &Params) -> Result<u64>;
}
