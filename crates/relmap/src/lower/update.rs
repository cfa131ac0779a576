use super::{insert::declare_lookup, Lower};
use crate::token::{Action, Transform};

use relmap_core::{schema::db::Column, Error, Result};
use relmap_sql::stmt::{Assignment, Batch, Expr, Update};

impl<'a> Lower<'a> {
    /// `UPDATE "T" SET ... WHERE ...`.
    ///
    /// SET arguments assign their column and may be skipped at bind time;
    /// the remaining arguments filter. Without SET arguments the sole
    /// entity argument supplies both the new values and the key.
    pub(super) fn update(&mut self) -> Result<Batch> {
        if self.args.set.is_empty() {
            return self.update_entity();
        }

        let tree = self.args_tree();
        let mut assignments = vec![];

        for arg in self.args.set.clone() {
            let path = tree.path(arg.id);

            if !arg.is_scalar() {
                return Err(Error::invalid_attribute(format!(
                    "SET argument `{path}` is not a scalar"
                )));
            }

            let column = self.resolver.column(self.table, arg, &path)?;
            let param = self.param(&path, Transform::None);
            let hole = self.token(
                path,
                Action::Assign {
                    column: column.name.clone(),
                    param,
                    ignore: arg.directives.ignore,
                },
            );

            assignments.push(Assignment::Hole(hole));
        }

        let mut filters = vec![];
        for arg in self.args.filters.clone() {
            filters.push(self.filter(None, arg)?.expr);
        }

        let update = Update {
            target: self.table.name.clone(),
            assignments,
            from: None,
            filter: Expr::and_from_vec(filters),
        };

        Ok(Batch::from(relmap_sql::Statement::from(update)))
    }

    /// Updates rows identified by the key fields of the entity argument.
    /// Only the target table's own columns are written.
    fn update_entity(&mut self) -> Result<Batch> {
        let entity = self.entity().map_err(|_| {
            Error::invalid_attribute(format!(
                "update of `{}` needs SET arguments or a single entity argument",
                self.table.name
            ))
        })?;

        let entity_path = self.args_tree().path(entity.id);
        let mut nodes = self.write_nodes(entity)?;
        nodes.truncate(1);
        nodes[0]
            .columns
            .retain(|c| c.source.is_some() || c.column.primary_key);
        let node = &nodes[0];

        let key: Vec<&Column> = self.table.primary_key_columns().collect();
        if key.is_empty() {
            return Err(Error::invalid_attribute(format!(
                "update by entity requires a primary key on `{}`",
                self.table.name
            )));
        }

        for column in &key {
            if node.find(column).and_then(|c| c.source.as_ref()).is_none() {
                return Err(Error::invalid_attribute(format!(
                    "entity `{entity_path}` does not supply key column `{}`",
                    column.name
                )));
            }
        }

        if entity.is_list() {
            let mut batch = Batch::new();
            batch.push(declare_lookup(node));
            let fill = self.fill_lookup(&nodes, node, &entity_path);
            batch.push(fill);

            let Some(update) = self.update_from_lookup(node) else {
                return Err(Error::invalid_attribute(format!(
                    "entity `{entity_path}` supplies no column to update"
                )));
            };

            batch.push(update);
            return Ok(batch);
        }

        let mut assignments = vec![];
        let mut filters = vec![];

        for column in &node.columns {
            let Some(source) = &column.source else {
                continue;
            };

            let param = self.param(&entity_path.concat(source), Transform::None);

            if column.column.primary_key {
                filters.push(Expr::eq(
                    Expr::column(&self.table.name, &column.column.name),
                    Expr::param(param),
                ));
            } else if !column.column.auto_increment {
                assignments.push(Assignment::set(&column.column.name, Expr::param(param)));
            }
        }

        if assignments.is_empty() {
            return Err(Error::invalid_attribute(format!(
                "entity `{entity_path}` supplies no column to update"
            )));
        }

        let update = Update {
            target: self.table.name.clone(),
            assignments,
            from: None,
            filter: Expr::and_from_vec(filters),
        };

        Ok(Batch::from(relmap_sql::Statement::from(update)))
    }
}
