use super::Statement;
use relmap_core::schema::db;

/// `DECLARE @name TABLE (...)`
#[derive(Debug, Clone, PartialEq)]
pub struct Declare {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub ty: db::Type,
    pub nullable: bool,
}

impl From<Declare> for Statement {
    fn from(value: Declare) -> Self {
        Statement::Declare(value)
    }
}
