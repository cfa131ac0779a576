//! Table Relations: the resolved binding of a field tree onto the schema.
//!
//! A [`Relations`] tree is an arena of [`RelationNode`]s rooted at the
//! target table. Each node records the table it binds, how it joins its
//! parent, its SQL alias and the columns it projects. Statement builders
//! read it to emit projections and joins; the materializer reads its
//! primary key masks to group rows.

mod link;
pub(crate) use link::Link;

mod merge;

mod node;
pub use node::{JoinPair, ProjectedColumn, RelationId, RelationKind, RelationNode};

mod resolve;
pub(crate) use resolve::Resolver;

use relmap_core::{
    schema::db::{ColumnId, Schema, Table, TableId},
    stmt::Path,
};

use indexmap::IndexMap;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct Relations {
    nodes: Vec<RelationNode>,

    /// Lower-cased aliases in use
    aliases: HashSet<String>,
}

impl Relations {
    /// A tree holding only the root table.
    pub fn new(table: &Table) -> Relations {
        let mut aliases = HashSet::new();
        aliases.insert(table.name.to_ascii_lowercase());

        Relations {
            nodes: vec![RelationNode {
                id: RelationId(0),
                table: table.id,
                name: String::new(),
                path: Path::root(),
                parent: None,
                children: vec![],
                columns: vec![],
                join: vec![],
                alias: table.name.clone(),
                kind: RelationKind::Root,
            }],
            aliases,
        }
    }

    pub fn root(&self) -> &RelationNode {
        &self.nodes[0]
    }

    pub fn node(&self, id: RelationId) -> &RelationNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: RelationId) -> impl ExactSizeIterator<Item = &RelationNode> + '_ {
        self.nodes[id.0]
            .children
            .iter()
            .map(move |child| &self.nodes[child.0])
    }

    /// Nodes in depth-first pre-order, parents before children.
    pub fn iter(&self) -> impl Iterator<Item = &RelationNode> + '_ {
        let mut stack = vec![RelationId(0)];

        std::iter::from_fn(move || {
            let node = &self.nodes[stack.pop()?.0];
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// True when every node on the way from the root to `id` is to-one.
    pub fn is_to_one(&self, id: RelationId) -> bool {
        self.lineage(id).all(|node| node.is_to_one())
    }

    /// `id` and its ancestors, nearest first.
    pub fn lineage(&self, id: RelationId) -> impl Iterator<Item = &RelationNode> + '_ {
        let mut next = Some(id);
        std::iter::from_fn(move || {
            let node = &self.nodes[next?.0];
            next = node.parent;
            Some(node)
        })
    }

    /// True if the tree joins any table besides the root.
    pub fn has_joins(&self) -> bool {
        self.nodes.iter().any(RelationNode::is_joined)
    }

    /// Finds a navigation by output path. Junction and hop nodes are
    /// stepped through.
    pub fn find(&self, path: &Path) -> Option<&RelationNode> {
        let mut current = self.root();

        for step in path.steps() {
            current = self.find_child(current.id, step)?;
        }

        Some(current)
    }

    fn find_child(&self, id: RelationId, name: &str) -> Option<&RelationNode> {
        for child in self.children(id) {
            if child.is_transparent() {
                if let Some(found) = self.find_child(child.id, name) {
                    return Some(found);
                }
            } else if child.name.eq_ignore_ascii_case(name) {
                return Some(child);
            }
        }

        None
    }

    /// Ordered primary key column names per output path, used to group rows
    /// at each nesting level.
    pub fn pk_masks(&self, schema: &Schema) -> IndexMap<Path, Vec<String>> {
        self.iter()
            .filter(|node| !node.is_transparent() && !node.is_embedded())
            .map(|node| (node.path.clone(), self.pk_mask(schema, node.id)))
            .collect()
    }

    /// Names of the projected primary key columns of `id`, in key order.
    pub fn pk_mask(&self, schema: &Schema, id: RelationId) -> Vec<String> {
        let node = self.node(id);

        schema
            .table(node.table)
            .primary_key
            .columns
            .iter()
            .filter_map(|pk| node.column(*pk).map(|column| column.name.clone()))
            .collect()
    }

    pub(crate) fn push(
        &mut self,
        parent: RelationId,
        table: &Table,
        name: &str,
        path: Path,
        join: Vec<JoinPair>,
        kind: RelationKind,
    ) -> RelationId {
        let alias = match kind {
            RelationKind::Embedded => None,
            RelationKind::Junction | RelationKind::Hop => Some(format!("{path}.{}", table.name)),
            RelationKind::Root | RelationKind::Navigation { .. } => Some(path.to_string()),
        };

        self.push_node(parent, table.id, name, path, join, kind, alias)
    }

    /// Pushes a node under `parent`. Without a desired alias the node shares
    /// its parent's; otherwise the alias is made unique with a `_<n>` suffix.
    #[allow(clippy::too_many_arguments)]
    fn push_node(
        &mut self,
        parent: RelationId,
        table: TableId,
        name: &str,
        path: Path,
        join: Vec<JoinPair>,
        kind: RelationKind,
        alias: Option<String>,
    ) -> RelationId {
        let alias = match alias {
            Some(desired) => self.unique_alias(desired),
            None => self.nodes[parent.0].alias.clone(),
        };

        let id = RelationId(self.nodes.len());

        self.nodes.push(RelationNode {
            id,
            table,
            name: name.to_string(),
            path,
            parent: Some(parent),
            children: vec![],
            columns: vec![],
            join,
            alias,
            kind,
        });

        self.nodes[parent.0].children.push(id);
        id
    }

    /// Projects `column` under `name` unless a column of that name is
    /// already projected.
    pub(crate) fn project(&mut self, id: RelationId, column: ColumnId, name: &str) {
        let node = &mut self.nodes[id.0];

        if node.columns.iter().any(|c| c.name == name) {
            return;
        }

        node.columns.push(ProjectedColumn {
            column,
            name: name.to_string(),
            anchor: false,
        });
    }

    /// Projects the primary key of every table-bound node. A key column the
    /// output did not request is projected under its own name, or under
    /// `__pk_<name>` if a field already uses that name.
    pub(crate) fn anchor_keys(&mut self, schema: &Schema) {
        for node in &mut self.nodes {
            if node.is_transparent() || node.is_embedded() {
                continue;
            }

            for pk in &schema.table(node.table).primary_key.columns {
                if node.columns.iter().any(|c| c.column == *pk) {
                    continue;
                }

                let column_name = &schema.column(*pk).name;
                let name = if node.columns.iter().any(|c| c.name == *column_name) {
                    format!("__pk_{column_name}")
                } else {
                    column_name.clone()
                };

                node.columns.push(ProjectedColumn {
                    column: *pk,
                    name,
                    anchor: true,
                });
            }
        }
    }

    fn unique_alias(&mut self, desired: String) -> String {
        let mut alias = desired.clone();
        let mut n = 2;

        while !self.aliases.insert(alias.to_ascii_lowercase()) {
            alias = format!("{desired}_{n}");
            n += 1;
        }

        alias
    }
}
