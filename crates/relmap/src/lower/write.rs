use super::Lower;
use crate::relation::Link;

use relmap_core::{
    schema::db::{Column, Table},
    spec::FieldNode,
    stmt::Path,
    Error, Result,
};

/// One table written by an insert, upsert or sync, with the rows it takes
/// from the entity argument.
#[derive(Debug)]
pub(super) struct WriteNode<'a> {
    pub(super) index: usize,

    pub(super) table: &'a Table,

    pub(super) parent: Option<usize>,

    /// How the node relates to its parent. `None` for the root.
    pub(super) link: Option<Link>,

    /// Path from the parent's element to this node's elements. Empty for
    /// the root.
    pub(super) step: Path,

    pub(super) columns: Vec<WriteColumn<'a>>,
}

#[derive(Debug)]
pub(super) struct WriteColumn<'a> {
    pub(super) column: &'a Column,

    /// Field supplying the value, relative to an element. Key and foreign
    /// key columns the entity does not supply are filled in by the batch.
    pub(super) source: Option<Path>,
}

impl<'a> WriteNode<'a> {
    pub(super) fn find(&self, column: &Column) -> Option<&WriteColumn<'a>> {
        self.columns.iter().find(|c| c.column.id == column.id)
    }

    fn add(&mut self, column: &'a Column, source: Option<Path>) {
        if self.find(column).is_none() {
            self.columns.push(WriteColumn { column, source });
        }
    }

    /// The lookup table variable holding this node's rows.
    pub(super) fn lookup(&self) -> String {
        format!("lookup{}", self.index)
    }

    /// The table variable collecting generated keys.
    pub(super) fn output(&self) -> String {
        format!("output{}", self.index)
    }

    /// Columns written by the insert: everything but identity columns.
    pub(super) fn insert_columns(&self) -> impl Iterator<Item = &'a Column> + '_ {
        self.columns
            .iter()
            .map(|c| c.column)
            .filter(|column| !column.auto_increment)
    }

    /// Non-key columns, set by the update pass of an upsert.
    pub(super) fn update_columns(&self) -> impl Iterator<Item = &'a Column> + '_ {
        self.columns
            .iter()
            .map(|c| c.column)
            .filter(|column| !column.primary_key)
    }
}

impl<'a> Lower<'a> {
    /// Builds the write tree for `entity`. Node 0 is the target table.
    pub(super) fn write_nodes(&self, entity: &'a FieldNode) -> Result<Vec<WriteNode<'a>>> {
        let mut nodes = vec![WriteNode {
            index: 0,
            table: self.table,
            parent: None,
            link: None,
            step: Path::root(),
            columns: vec![],
        }];

        self.write_fields(&mut nodes, 0, entity, &Path::root())?;

        // Keys, then the foreign key columns each link fills in.
        for index in 0..nodes.len() {
            for column in nodes[index].table.primary_key_columns() {
                nodes[index].add(column, None);
            }

            let (Some(parent), Some(link)) = (nodes[index].parent, nodes[index].link.clone())
            else {
                continue;
            };

            match link {
                Link::ChildHolds(pairs) => {
                    for pair in pairs {
                        nodes[index].add(self.schema.column(pair.child), None);
                    }
                }
                Link::ParentHolds(pairs) => {
                    for pair in pairs {
                        nodes[parent].add(self.schema.column(pair.parent), None);
                    }
                }
                Link::Junction { .. } => {}
            }
        }

        tracing::debug!(
            table = %self.table.name,
            nodes = nodes.len(),
            "resolved write tree"
        );

        Ok(nodes)
    }

    /// Maps the fields of one element onto `nodes[index]`. Embedded shapes
    /// add their fields under `prefix`.
    fn write_fields(
        &self,
        nodes: &mut Vec<WriteNode<'a>>,
        index: usize,
        field: &'a FieldNode,
        prefix: &Path,
    ) -> Result<()> {
        let tree = self.args_tree();
        let table = nodes[index].table;

        for child in tree.children(field.id) {
            if child.directives.exclude {
                continue;
            }

            let path = tree.path(child.id);
            let source = prefix.join(&child.name);

            if child.directives.via.is_some() {
                return Err(Error::invalid_attribute(format!(
                    "via-relation field `{path}` cannot be written"
                )));
            }

            if child.is_scalar() {
                let column = self.resolver.column(table, child, &path)?;
                nodes[index].add(column, Some(source));
                continue;
            }

            if child.cyclic {
                continue;
            }

            match self.resolver.shape_table(child, &path)? {
                None => self.write_fields(nodes, index, child, &source)?,
                Some(target) => {
                    let link = self
                        .resolver
                        .link(table, target, &child.name, child.is_list(), &path)?;

                    let child_index = nodes.len();
                    nodes.push(WriteNode {
                        index: child_index,
                        table: target,
                        parent: Some(index),
                        link: Some(link),
                        step: source,
                        columns: vec![],
                    });

                    self.write_fields(nodes, child_index, child, &Path::root())?;
                }
            }
        }

        Ok(())
    }
}

/// Orders nodes so every node follows the nodes whose keys it references:
/// a parent holding a foreign key follows that child, a child holding one
/// (or reached through a junction) follows its parent.
pub(super) fn write_order(nodes: &[WriteNode<'_>]) -> Vec<usize> {
    fn visit(nodes: &[WriteNode<'_>], index: usize, order: &mut Vec<usize>) {
        let children = nodes.iter().filter(|node| node.parent == Some(index));

        let (before, after): (Vec<_>, Vec<_>) =
            children.partition(|node| matches!(node.link, Some(Link::ParentHolds(_))));

        for child in before {
            visit(nodes, child.index, order);
        }

        order.push(index);

        for child in after {
            visit(nodes, child.index, order);
        }
    }

    let mut order = Vec::with_capacity(nodes.len());
    visit(nodes, 0, &mut order);
    order
}
