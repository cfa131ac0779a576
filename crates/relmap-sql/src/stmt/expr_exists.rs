use super::{Expr, Query};

#[derive(Debug, Clone, PartialEq)]
pub struct ExprExists {
    pub subquery: Box<Query>,
    pub negated: bool,
}

impl From<ExprExists> for Expr {
    fn from(value: ExprExists) -> Self {
        Expr::Exists(value)
    }
}
