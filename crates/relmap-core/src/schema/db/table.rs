use super::{Column, ColumnId, ForeignKey, PrimaryKey};

use std::fmt;

/// A database table, view or table-valued function.
#[derive(Debug, Clone)]
pub struct Table {
    /// Uniquely identifies a table
    pub id: TableId,

    /// Name of the table
    pub name: String,

    pub kind: TableKind,

    /// The table's columns
    pub columns: Vec<Column>,

    pub primary_key: PrimaryKey,

    /// Foreign keys declared by this table
    pub foreign_keys: Vec<ForeignKey>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableKind {
    #[default]
    Table,
    View,
    Function,
}

/// Uniquely identifies a table
#[derive(PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct TableId(pub usize);

impl Table {
    pub(crate) fn new(id: TableId, name: String, kind: TableKind) -> Self {
        Self {
            id,
            name,
            kind,
            columns: vec![],
            primary_key: PrimaryKey::default(),
            foreign_keys: vec![],
        }
    }

    pub fn column(&self, id: impl Into<ColumnId>) -> &Column {
        &self.columns[id.into().index]
    }

    /// Finds a column by name, ASCII case-insensitive.
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .find(|column| column.name.eq_ignore_ascii_case(name))
            })
    }

    pub fn primary_key_columns(&self) -> impl ExactSizeIterator<Item = &Column> + '_ {
        self.primary_key
            .columns
            .iter()
            .map(|column_id| &self.columns[column_id.index])
    }

    pub fn has_primary_key(&self) -> bool {
        !self.primary_key.columns.is_empty()
    }

    /// Foreign keys on this table that reference `target`.
    pub fn foreign_keys_to(&self, target: TableId) -> impl Iterator<Item = &ForeignKey> + '_ {
        self.foreign_keys
            .iter()
            .filter(move |fk| fk.primary_table == target)
    }

    /// True if the column is written by foreign keys only.
    pub fn is_foreign_key_column(&self, id: ColumnId) -> bool {
        self.foreign_keys
            .iter()
            .any(|fk| fk.columns.iter().any(|pair| pair.foreign == id))
    }
}

impl fmt::Debug for TableId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "TableId({})", self.0)
    }
}
