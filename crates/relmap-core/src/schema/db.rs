mod builder;
pub use builder::{Builder, ColumnBuilder, TableBuilder};

mod column;
pub use column::{Column, ColumnId};

mod fk;
pub use fk::{ForeignKey, ForeignKeyColumn};

mod pk;
pub use pk::PrimaryKey;

mod schema;
pub use schema::Schema;

mod table;
pub use table::{Table, TableId, TableKind};

mod ty;
pub use ty::Type;
