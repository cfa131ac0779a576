use super::{Join, Query};

/// A row source in FROM, JOIN or MERGE.
#[derive(Debug, Clone, PartialEq)]
pub enum TableFactor {
    Table { name: String, alias: Option<String> },

    /// A table variable, `@name`
    Variable { name: String, alias: Option<String> },

    /// `(query) AS alias`
    Derived { query: Box<Query>, alias: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableWithJoins {
    pub relation: TableFactor,
    pub joins: Vec<Join>,
}

impl TableFactor {
    pub fn table(name: impl Into<String>, alias: Option<String>) -> TableFactor {
        TableFactor::Table {
            name: name.into(),
            alias,
        }
    }

    pub fn variable(name: impl Into<String>, alias: impl Into<String>) -> TableFactor {
        TableFactor::Variable {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    /// The name other expressions use to refer to this source.
    pub fn reference(&self) -> &str {
        match self {
            TableFactor::Table { name, alias } | TableFactor::Variable { name, alias } => {
                alias.as_deref().unwrap_or(name)
            }
            TableFactor::Derived { alias, .. } => alias,
        }
    }
}

impl From<TableFactor> for TableWithJoins {
    fn from(value: TableFactor) -> Self {
        TableWithJoins {
            relation: value,
            joins: vec![],
        }
    }
}
