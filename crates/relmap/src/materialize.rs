//! Row materialization: folds a flat, joined result set back into the
//! nested object graph the output shape describes.
//!
//! Materializing runs in two phases. The first walks the physical rows once
//! and upserts every nesting level into a [`RowValueCollection`] keyed by the
//! level's primary key, so the fan-out a to-many join produces collapses
//! into one entity per key. The second projects the distinct root entities
//! into [`Value`] records following the output field tree.

mod row_value;
pub use row_value::{RowKey, RowValue, RowValueCollection};

use crate::relation::{RelationId, Relations};

use relmap_core::{
    driver::Rows,
    err,
    schema::db::Schema,
    spec::{FieldNode, FieldTree, Output},
    stmt::{Path, Value, ValueRecord},
    Result,
};

use std::collections::HashMap;

/// Folds result rows of one compiled statement into output values.
#[derive(Debug, Clone)]
pub struct Materializer {
    /// Level 0 is the root table.
    levels: Vec<Level>,

    output: Option<FieldTree>,

    kind: Output,
}

/// A table-bound nesting level. Junction and hop tables are skipped;
/// embedded projections contribute their columns to the level that owns
/// them.
#[derive(Debug, Clone)]
struct Level {
    /// Navigation path relative to the parent level.
    relative: Path,

    /// (name relative to the level, result-set column)
    columns: Vec<(String, String)>,

    /// Names of the columns identifying a row.
    key: Vec<String>,

    children: Vec<usize>,
}

impl Materializer {
    pub fn new(
        schema: &Schema,
        relations: &Relations,
        output: Option<FieldTree>,
        kind: Output,
    ) -> Materializer {
        let mut levels: Vec<Level> = vec![];
        let mut owners: HashMap<RelationId, usize> = HashMap::new();
        let mut paths: Vec<Path> = vec![];

        for node in relations.iter() {
            let owner = node.parent.map(|parent| owners[&parent]);

            let level = match owner {
                Some(owner) if node.is_transparent() || node.is_embedded() => owner,
                _ => {
                    let index = levels.len();
                    let relative = match owner {
                        Some(owner) => strip(&node.path, &paths[owner]),
                        None => Path::root(),
                    };

                    levels.push(Level {
                        relative,
                        columns: vec![],
                        key: relations.pk_mask(schema, node.id),
                        children: vec![],
                    });
                    paths.push(node.path.clone());

                    if let Some(owner) = owner {
                        levels[owner].children.push(index);
                    }

                    index
                }
            };

            owners.insert(node.id, level);

            let prefix = strip(&node.path, &paths[level]);
            for column in &node.columns {
                levels[level].columns.push((
                    prefix.join(&column.name).to_string(),
                    node.column_alias(column),
                ));
            }
        }

        for level in &mut levels {
            if level.key.is_empty() {
                level.key = level.columns.iter().map(|(name, _)| name.clone()).collect();
            }
        }

        Materializer {
            levels,
            output,
            kind,
        }
    }

    pub fn kind(&self) -> Output {
        self.kind
    }

    pub fn materialize(&self, rows: &Rows) -> Result<Value> {
        if self.kind == Output::Count {
            return match rows.iter().next().and_then(|row| row.first()) {
                Some(value) => Ok(Value::I64(value.to_i64()?)),
                None => Ok(Value::I64(0)),
            };
        }

        let Some(output) = &self.output else {
            return Ok(Value::Null);
        };

        let columns = self.column_indices(rows)?;
        let mut roots = RowValueCollection::default();

        for (row_number, row) in rows.iter().enumerate() {
            self.upsert(0, &mut roots, row_number, row, &columns);
        }

        tracing::debug!(
            rows = rows.len(),
            roots = roots.len(),
            "materialized result set"
        );

        let root = output.root();
        let mut values = roots
            .iter()
            .map(|row| self.project(0, row, output, root, &Path::root()));

        Ok(match self.kind {
            Output::One => values.next().unwrap_or(Value::Null),
            _ => Value::List(values.collect()),
        })
    }

    /// Positions of every level's columns in the result set.
    fn column_indices(&self, rows: &Rows) -> Result<Vec<Vec<usize>>> {
        self.levels
            .iter()
            .map(|level| {
                level
                    .columns
                    .iter()
                    .map(|(_, alias)| {
                        rows.column_index(alias)
                            .ok_or_else(|| err!("result set has no column `{alias}`"))
                    })
                    .collect()
            })
            .collect()
    }

    fn upsert(
        &self,
        index: usize,
        collection: &mut RowValueCollection,
        row_number: usize,
        row: &[Value],
        columns: &[Vec<usize>],
    ) {
        let level = &self.levels[index];

        let values: ValueRecord = level
            .columns
            .iter()
            .zip(&columns[index])
            .map(|((name, _), position)| (name.clone(), row[*position].clone()))
            .collect();

        // An outer join that matched nothing
        if index != 0 && values.is_all_null() {
            return;
        }

        let key = RowKey(
            level
                .key
                .iter()
                .map(|name| values.get(name).cloned().unwrap_or(Value::Null))
                .collect(),
        );

        let entity = collection.upsert(key, row_number, values);

        for &child in &level.children {
            let nested = entity
                .relations
                .entry(self.levels[child].relative.to_string())
                .or_default();

            self.upsert(child, nested, row_number, row, columns);
        }
    }

    /// Projects `row` as the record `field` describes. `prefix` locates
    /// embedded shapes within the level.
    fn project(
        &self,
        index: usize,
        row: &RowValue,
        tree: &FieldTree,
        field: &FieldNode,
        prefix: &Path,
    ) -> Value {
        let level = &self.levels[index];
        let mut record = ValueRecord::new();

        for child in tree.children(field.id) {
            if child.directives.exclude {
                continue;
            }

            let relative = prefix.join(&child.name);

            let value = if child.cyclic {
                if child.is_list() {
                    Value::List(vec![])
                } else {
                    Value::Null
                }
            } else if child.is_scalar() {
                row.values
                    .get(&relative.to_string())
                    .cloned()
                    .unwrap_or(Value::Null)
            } else if let Some(&nested) = level
                .children
                .iter()
                .find(|&&nested| self.levels[nested].relative == relative)
            {
                let rows = row.relations.get(&relative.to_string());
                let mut projected = rows
                    .into_iter()
                    .flat_map(RowValueCollection::iter)
                    .map(|row| self.project(nested, row, tree, child, &Path::root()));

                if child.is_list() {
                    Value::List(projected.collect())
                } else {
                    projected.next().unwrap_or(Value::Null)
                }
            } else {
                match self.project(index, row, tree, child, &relative) {
                    Value::Record(embedded) if embedded.is_all_null() => Value::Null,
                    embedded => embedded,
                }
            };

            record.insert(child.name.clone(), value);
        }

        Value::Record(record)
    }
}

fn strip(path: &Path, prefix: &Path) -> Path {
    path.strip_prefix(prefix).unwrap_or_else(|| path.clone())
}
