use super::Lower;
use crate::token::Action;

use relmap_core::{
    schema::db::Column,
    spec::FieldNode,
    stmt::Path,
    Error, Result,
};
use relmap_sql::stmt::{Batch, Delete, Expr, TableFactor};

impl<'a> Lower<'a> {
    /// `DELETE FROM "T" WHERE ...`.
    ///
    /// A sole argument shaped like the target table deletes the listed
    /// entities by key; otherwise the arguments filter as they would for
    /// a select.
    pub(super) fn delete(&mut self) -> Result<Batch> {
        let filter = match self.delete_entity()? {
            Some(entity) => Some(self.key_match(entity)?),
            None => {
                let mut filters = vec![];
                for arg in self.args.filters.clone() {
                    filters.push(self.filter(None, arg)?.expr);
                }
                Expr::and_from_vec(filters)
            }
        };

        let delete = Delete {
            from: TableFactor::table(&self.table.name, None),
            filter,
        };

        Ok(Batch::from(relmap_sql::Statement::from(delete)))
    }

    fn delete_entity(&self) -> Result<Option<&'a FieldNode>> {
        let [arg] = self.args.filters[..] else {
            return Ok(None);
        };

        if arg.ty.shape_name().is_none() || arg.directives.join.is_some() {
            return Ok(None);
        }

        let path = self.args_tree().path(arg.id);
        Ok(self
            .resolver
            .shape_table(arg, &path)?
            .filter(|table| table.id == self.table.id)
            .map(|_| arg))
    }

    /// Key equality against every element of the entity argument.
    fn key_match(&mut self, entity: &'a FieldNode) -> Result<Expr> {
        let path = self.args_tree().path(entity.id);

        let columns = self
            .key_fields(entity, &path)?
            .into_iter()
            .map(|(column, field)| (Expr::column(&self.table.name, &column.name), field))
            .collect();

        let param = self.param_base(&path.to_param_name());
        let hole = self.token(path, Action::KeyMatch { columns, param });

        Ok(Expr::hole(hole))
    }

    /// Key columns of the target table paired with the entity fields that
    /// supply them, relative to one element.
    fn key_fields(
        &self,
        entity: &'a FieldNode,
        entity_path: &Path,
    ) -> Result<Vec<(&'a Column, Path)>> {
        let tree = self.args_tree();

        if !self.table.has_primary_key() {
            return Err(Error::invalid_attribute(format!(
                "deleting entities requires a primary key on `{}`",
                self.table.name
            )));
        }

        let mut ret = vec![];

        for column in self.table.primary_key_columns() {
            let field = tree
                .children(entity.id)
                .filter(|child| child.is_scalar() && !child.directives.exclude)
                .find(|child| {
                    self.resolver
                        .find_column(self.table, child)
                        .is_some_and(|found| found.id == column.id)
                });

            let Some(field) = field else {
                return Err(Error::invalid_attribute(format!(
                    "entity `{entity_path}` does not supply key column `{}`",
                    column.name
                )));
            };

            ret.push((column, Path::from_steps([field.name.as_str()])));
        }

        Ok(ret)
    }
}
