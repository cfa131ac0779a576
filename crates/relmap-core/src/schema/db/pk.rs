use super::ColumnId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimaryKey {
    /// Columns composing the primary key, in key order
    pub columns: Vec<ColumnId>,
}
