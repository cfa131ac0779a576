use super::{ColumnId, Schema, Table, TableId};

/// A foreign key declared on a table, referencing another table's key.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    /// The table declaring the foreign key.
    pub table: TableId,

    /// The table being referenced.
    pub primary_table: TableId,

    /// Column pairs, in the referenced key's order.
    pub columns: Vec<ForeignKeyColumn>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForeignKeyColumn {
    /// Column on the declaring table
    pub foreign: ColumnId,

    /// Column on the referenced table
    pub primary: ColumnId,
}

impl ForeignKey {
    pub fn primary_table<'a>(&self, schema: &'a Schema) -> &'a Table {
        schema.table(self.primary_table)
    }

    pub fn foreign_table<'a>(&self, schema: &'a Schema) -> &'a Table {
        schema.table(self.table)
    }

    /// True if any column of the key starts with `prefix` (ASCII
    /// case-insensitive). Used to pick between several keys referencing the
    /// same table, e.g. `CreatedById` and `UpdatedById` for a field named
    /// `CreatedBy`.
    pub fn column_starts_with(&self, schema: &Schema, prefix: &str) -> bool {
        let prefix = prefix.to_ascii_lowercase();
        self.columns.iter().any(|pair| {
            schema
                .column(pair.foreign)
                .name
                .to_ascii_lowercase()
                .starts_with(&prefix)
        })
    }
}
