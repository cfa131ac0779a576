use super::{Assignment, Expr, Statement, TableFactor};

/// `MERGE target USING source ON ... WHEN ...`
#[derive(Debug, Clone, PartialEq)]
pub struct Merge {
    pub target: TableFactor,
    pub source: TableFactor,
    pub on: Expr,

    /// `WHEN MATCHED THEN UPDATE SET ...`, omitted when empty
    pub matched_update: Vec<Assignment>,

    /// `WHEN NOT MATCHED THEN INSERT ...`
    pub not_matched_insert: Option<MergeInsert>,

    pub output: Option<OutputInto>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeInsert {
    /// Empty means `DEFAULT VALUES`
    pub columns: Vec<String>,
    pub values: Vec<Expr>,
}

/// `OUTPUT exprs INTO @variable (columns)`
#[derive(Debug, Clone, PartialEq)]
pub struct OutputInto {
    pub exprs: Vec<Expr>,
    pub into: String,
    pub columns: Vec<String>,
}

impl From<Merge> for Statement {
    fn from(value: Merge) -> Self {
        Statement::Merge(value)
    }
}
