use super::Lower;
use crate::{
    relation::{RelationKind, RelationNode, Relations},
    token::{Action, OrderTarget, OrderTerm},
};

use relmap_core::{spec::OrderBy, Error, Result};
use relmap_sql::stmt::{Expr, OrderByItem};

impl<'a> Lower<'a> {
    /// One order hole per order-by argument, in declaration order.
    ///
    /// A paged query with joins orders its key window, which only joins
    /// to-one navigations, so orderings must stay on those.
    pub(super) fn order_items(&mut self, relations: &Relations) -> Result<Vec<OrderByItem>> {
        let tree = self.args_tree();
        let paged = self.args.is_paged();
        let mut items = vec![];

        for arg in self.args.order_by.clone() {
            let path = tree.path(arg.id);
            let Some(order_by) = &arg.directives.order_by else {
                continue;
            };

            let term = match order_by {
                OrderBy::Column { table, column } => {
                    let node = match table {
                        None => relations.root(),
                        Some(name) => self.order_node(relations, name).ok_or_else(|| {
                            Error::invalid_identifier(path.to_string(), format!("table `{name}`"))
                        })?,
                    };

                    if paged && !relations.is_to_one(node.id) {
                        return Err(Error::invalid_attribute(format!(
                            "`{path}` orders a paged query by the collection `{}`",
                            node.path
                        )));
                    }

                    let table = self.schema.table(node.table);
                    let Some(column) = table.find_column(column) else {
                        return Err(Error::invalid_identifier(
                            path.to_string(),
                            format!("column `{column}` on table `{}`", table.name),
                        ));
                    };

                    OrderTerm::Fixed {
                        expr: Expr::column(&node.alias, &column.name),
                    }
                }
                OrderBy::Direction => {
                    let column = self.resolver.column(self.table, arg, &path)?;
                    OrderTerm::Fixed {
                        expr: Expr::column(&relations.root().alias, &column.name),
                    }
                }
                OrderBy::Dynamic => OrderTerm::Dynamic {
                    targets: relations
                        .iter()
                        .filter(|node| {
                            matches!(node.kind, RelationKind::Root | RelationKind::Navigation { .. })
                                && (!paged || relations.is_to_one(node.id))
                        })
                        .map(|node| OrderTarget {
                            alias: node.alias.clone(),
                            table: node.table,
                            path: node.path.clone(),
                        })
                        .collect(),
                },
            };

            let hole = self.token(path, Action::OrderBy(term));
            items.push(OrderByItem::Hole(hole));
        }

        Ok(items)
    }

    /// A table-bound node named by table or by output path.
    fn order_node<'r>(&self, relations: &'r Relations, name: &str) -> Option<&'r RelationNode> {
        relations.iter().find(|node| {
            matches!(node.kind, RelationKind::Root | RelationKind::Navigation { .. })
                && (self.schema.table(node.table).name.eq_ignore_ascii_case(name)
                    || node.path.to_string().eq_ignore_ascii_case(name))
        })
    }
}
