mod assignment;
pub use assignment::Assignment;

mod declare;
pub use declare::{ColumnDef, Declare};

mod delete;
pub use delete::Delete;

mod direction;
pub use direction::Direction;

mod expr;
pub use expr::Expr;

mod expr_and;
pub use expr_and::ExprAnd;

mod expr_binary_op;
pub use expr_binary_op::ExprBinaryOp;

mod expr_column;
pub use expr_column::{ExprColumn, Qualifier};

mod expr_exists;
pub use expr_exists::ExprExists;

mod expr_in_list;
pub use expr_in_list::ExprInList;

mod expr_is_null;
pub use expr_is_null::ExprIsNull;

mod expr_like;
pub use expr_like::ExprLike;

mod expr_or;
pub use expr_or::ExprOr;

mod hole;
pub use hole::{Fragment, HoleId, Substitutions};

mod insert;
pub use insert::{Insert, InsertSource, InsertTarget};

mod join;
pub use join::{Join, JoinOp};

mod literal;
pub use literal::Literal;

mod merge;
pub use merge::{Merge, MergeInsert, OutputInto};

mod op_binary;
pub use op_binary::BinaryOp;

mod order_by;
pub use order_by::{OrderBy, OrderByExpr, OrderByItem};

mod query;
pub use query::Query;

mod select;
pub use select::{Select, SelectItem};

mod statement;
pub use statement::{Batch, Statement};

mod table_factor;
pub use table_factor::{TableFactor, TableWithJoins};

mod update;
pub use update::Update;

mod values;
pub use values::Values;
