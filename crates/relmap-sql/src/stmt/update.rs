use super::{Assignment, Expr, Statement, TableWithJoins};

/// `UPDATE target SET ... [FROM ...] [WHERE ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// Table name, or the alias of a source declared in `from`.
    pub target: String,

    pub assignments: Vec<Assignment>,

    pub from: Option<TableWithJoins>,

    pub filter: Option<Expr>,
}

impl From<Update> for Statement {
    fn from(value: Update) -> Self {
        Statement::Update(value)
    }
}
