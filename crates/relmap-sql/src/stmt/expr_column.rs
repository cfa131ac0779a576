use super::Expr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprColumn {
    pub qualifier: Option<Qualifier>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualifier {
    /// A table alias introduced in FROM, JOIN or MERGE
    Alias(String),

    /// The `inserted` pseudo table of an OUTPUT clause
    Inserted,
}

impl From<ExprColumn> for Expr {
    fn from(value: ExprColumn) -> Self {
        Expr::Column(value)
    }
}
