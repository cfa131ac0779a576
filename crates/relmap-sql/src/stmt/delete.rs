use super::{Expr, Statement, TableFactor};

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub from: TableFactor,
    pub filter: Option<Expr>,
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Self {
        Statement::Delete(value)
    }
}
