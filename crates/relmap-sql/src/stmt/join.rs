use super::{Expr, TableFactor};

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// The table to join
    pub table: TableFactor,

    pub op: JoinOp,

    /// The join condition
    pub on: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOp {
    Inner,
    Left,
}
