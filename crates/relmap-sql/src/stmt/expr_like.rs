use super::Expr;

#[derive(Debug, Clone, PartialEq)]
pub struct ExprLike {
    pub expr: Box<Expr>,
    pub pattern: Box<Expr>,
    pub negated: bool,
}

impl From<ExprLike> for Expr {
    fn from(value: ExprLike) -> Self {
        Expr::Like(value)
    }
}
