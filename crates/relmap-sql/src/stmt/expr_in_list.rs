use super::Expr;

#[derive(Debug, Clone, PartialEq)]
pub struct ExprInList {
    pub expr: Box<Expr>,

    /// Never empty when rendered; an empty membership test is rewritten to a
    /// constant before it reaches the statement.
    pub list: Vec<Expr>,

    pub negated: bool,
}

impl From<ExprInList> for Expr {
    fn from(value: ExprInList) -> Self {
        Expr::InList(value)
    }
}
