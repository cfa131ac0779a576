use super::{Expr, TableWithJoins};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Select {
    pub distinct: bool,

    pub projection: Vec<SelectItem>,

    pub from: Option<TableWithJoins>,

    /// WHERE clause
    pub filter: Option<Expr>,

    pub group_by: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl Select {
    pub fn new(from: impl Into<TableWithJoins>) -> Select {
        Select {
            from: Some(from.into()),
            ..Select::default()
        }
    }

    /// Adds a projected expression with an optional alias.
    pub fn project(&mut self, expr: impl Into<Expr>, alias: Option<String>) {
        self.projection.push(SelectItem {
            expr: expr.into(),
            alias,
        });
    }

    /// ANDs `expr` into the WHERE clause.
    pub fn add_filter(&mut self, expr: impl Into<Expr>) {
        self.filter = Some(match self.filter.take() {
            Some(filter) => Expr::and(filter, expr),
            None => expr.into(),
        });
    }
}
