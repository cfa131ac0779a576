use super::{Column, ColumnId, ForeignKey, ForeignKeyColumn, Schema, Table, TableId, TableKind, Type};
use crate::{Error, Result};

use indexmap::IndexMap;

/// Declarative schema builder.
///
/// Tables are declared by name; foreign keys reference other tables by name
/// and are resolved when [`Builder::build`] runs, so tables may be declared
/// in any order.
///
/// ```
/// use relmap_core::schema::db::{Schema, Type};
///
/// let schema = Schema::builder()
///     .table("Department", |t| {
///         t.column("Id", Type::Integer(4)).primary_key().auto_increment();
///         t.column("Name", Type::Text);
///     })
///     .table("Employee", |t| {
///         t.column("Id", Type::Integer(4)).primary_key().auto_increment();
///         t.column("DepartmentId", Type::Integer(4)).nullable();
///         t.foreign_key(["DepartmentId"], "Department", ["Id"]);
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.tables.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Builder {
    tables: IndexMap<String, TableBuilder>,

    /// Names declared more than once, reported by `build`
    duplicates: Vec<String>,
}

#[derive(Debug, Default)]
pub struct TableBuilder {
    kind: TableKind,
    columns: Vec<ColumnBuilder>,
    foreign_keys: Vec<PendingForeignKey>,
}

#[derive(Debug)]
pub struct ColumnBuilder {
    name: String,
    ty: Type,
    nullable: bool,
    primary_key: bool,
    auto_increment: bool,
}

#[derive(Debug)]
struct PendingForeignKey {
    columns: Vec<String>,
    primary_table: String,
    primary_columns: Vec<String>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a table. Declaring the same name twice is reported by `build`.
    pub fn table(&mut self, name: &str, f: impl FnOnce(&mut TableBuilder)) -> &mut Self {
        let mut table = TableBuilder::default();
        f(&mut table);

        if self.tables.contains_key(name) {
            self.duplicates.push(name.to_string());
        } else {
            self.tables.insert(name.to_string(), table);
        }

        self
    }

    pub fn build(&self) -> Result<Schema> {
        if let Some(duplicate) = self.duplicates.first() {
            return Err(Error::invalid_schema(format!(
                "table `{duplicate}` declared more than once"
            )));
        }

        let mut tables = vec![];

        for (index, (name, builder)) in self.tables.iter().enumerate() {
            let id = TableId(index);
            let mut table = Table::new(id, name.clone(), builder.kind);

            for (column_index, column) in builder.columns.iter().enumerate() {
                if table.find_column(&column.name).is_some() {
                    return Err(Error::invalid_schema(format!(
                        "column `{}` declared more than once on table `{name}`",
                        column.name
                    )));
                }

                let column_id = ColumnId {
                    table: id,
                    index: column_index,
                };

                if column.primary_key {
                    table.primary_key.columns.push(column_id);
                }

                table.columns.push(Column {
                    id: column_id,
                    name: column.name.clone(),
                    ty: column.ty.clone(),
                    nullable: column.nullable,
                    primary_key: column.primary_key,
                    auto_increment: column.auto_increment,
                });
            }

            tables.push(table);
        }

        // Second pass: foreign keys can reference any declared table.
        for (index, builder) in self.tables.values().enumerate() {
            for pending in &builder.foreign_keys {
                let fk = resolve_foreign_key(&tables, TableId(index), pending)?;
                tables[index].foreign_keys.push(fk);
            }
        }

        tracing::debug!(tables = tables.len(), "schema built");

        Ok(Schema { tables })
    }
}

fn resolve_foreign_key(
    tables: &[Table],
    table: TableId,
    pending: &PendingForeignKey,
) -> Result<ForeignKey> {
    let foreign_table = &tables[table.0];
    let Some(primary_table) = tables
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(&pending.primary_table))
    else {
        return Err(Error::invalid_schema(format!(
            "foreign key on `{}` references unknown table `{}`",
            foreign_table.name, pending.primary_table
        )));
    };

    // An empty target column list means "the referenced primary key".
    let primary_columns: Vec<ColumnId> = if pending.primary_columns.is_empty() {
        primary_table.primary_key.columns.clone()
    } else {
        pending
            .primary_columns
            .iter()
            .map(|name| {
                primary_table.find_column(name).map(|c| c.id).ok_or_else(|| {
                    Error::invalid_schema(format!(
                        "foreign key on `{}` references unknown column `{}.{name}`",
                        foreign_table.name, primary_table.name
                    ))
                })
            })
            .collect::<Result<_>>()?
    };

    if primary_columns.len() != pending.columns.len() || primary_columns.is_empty() {
        return Err(Error::invalid_schema(format!(
            "foreign key on `{}` pairs {} column(s) with {} column(s) of `{}`",
            foreign_table.name,
            pending.columns.len(),
            primary_columns.len(),
            primary_table.name
        )));
    }

    let columns = pending
        .columns
        .iter()
        .zip(primary_columns)
        .map(|(name, primary)| {
            let foreign = foreign_table.find_column(name).ok_or_else(|| {
                Error::invalid_schema(format!(
                    "foreign key column `{name}` not found on `{}`",
                    foreign_table.name
                ))
            })?;

            Ok(ForeignKeyColumn {
                foreign: foreign.id,
                primary,
            })
        })
        .collect::<Result<_>>()?;

    Ok(ForeignKey {
        table,
        primary_table: primary_table.id,
        columns,
    })
}

impl TableBuilder {
    pub fn kind(&mut self, kind: TableKind) -> &mut Self {
        self.kind = kind;
        self
    }

    /// Declares a non-null column.
    pub fn column(&mut self, name: &str, ty: Type) -> &mut ColumnBuilder {
        self.columns.push(ColumnBuilder {
            name: name.to_string(),
            ty,
            nullable: false,
            primary_key: false,
            auto_increment: false,
        });
        self.columns.last_mut().unwrap()
    }

    /// Declares a foreign key from `columns` on this table to
    /// `primary_columns` on `primary_table`. Pass an empty list of primary
    /// columns to reference the target's primary key.
    pub fn foreign_key<'a>(
        &mut self,
        columns: impl IntoIterator<Item = &'a str>,
        primary_table: &str,
        primary_columns: impl IntoIterator<Item = &'a str>,
    ) -> &mut Self {
        self.foreign_keys.push(PendingForeignKey {
            columns: columns.into_iter().map(String::from).collect(),
            primary_table: primary_table.to_string(),
            primary_columns: primary_columns.into_iter().map(String::from).collect(),
        });
        self
    }
}

impl ColumnBuilder {
    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    pub fn primary_key(&mut self) -> &mut Self {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(&mut self) -> &mut Self {
        self.auto_increment = true;
        self
    }
}
