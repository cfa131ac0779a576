use super::{Declare, Delete, Insert, Merge, Query, Update};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Declare(Declare),
    Delete(Delete),
    Insert(Insert),
    Merge(Merge),
    Query(Query),
    Update(Update),
}

/// Statements executed together, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    pub statements: Vec<Statement>,
}

impl Statement {
    pub fn is_query(&self) -> bool {
        matches!(self, Statement::Query(_))
    }
}

impl Batch {
    pub fn new() -> Batch {
        Batch::default()
    }

    pub fn push(&mut self, stmt: impl Into<Statement>) {
        self.statements.push(stmt.into());
    }

    /// True if any statement produces a result set.
    pub fn has_query(&self) -> bool {
        self.statements.iter().any(Statement::is_query)
    }
}

impl From<Statement> for Batch {
    fn from(value: Statement) -> Self {
        Batch {
            statements: vec![value],
        }
    }
}
