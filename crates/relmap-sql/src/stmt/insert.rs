use super::{Query, Statement, Values};

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub target: InsertTarget,

    /// Target columns. Empty means `DEFAULT VALUES`.
    pub columns: Vec<String>,

    pub source: InsertSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsertTarget {
    Table(String),
    Variable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    Values(Values),
    Query(Box<Query>),
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Statement::Insert(value)
    }
}
