use relmap_core::{
    schema::db::{ColumnId, TableId},
    stmt::Path,
};

use std::fmt;

#[derive(PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct RelationId(pub usize);

/// One resolved table binding.
#[derive(Debug, Clone)]
pub struct RelationNode {
    pub id: RelationId,

    pub table: TableId,

    /// Field name the parent shape uses for this navigation. Empty for the
    /// root. Junction and hop nodes carry the name of the navigation they
    /// lead to.
    pub name: String,

    /// Output path of the navigation. Junction and hop nodes carry the path
    /// of the navigation they lead to.
    pub path: Path,

    pub parent: Option<RelationId>,

    pub children: Vec<RelationId>,

    pub columns: Vec<ProjectedColumn>,

    /// Equalities joining this node to its parent. Empty for the root and
    /// for embedded projections.
    pub join: Vec<JoinPair>,

    /// SQL alias. Embedded projections share their parent's alias.
    pub alias: String,

    pub kind: RelationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Root,

    /// A nested table reached through a foreign key.
    Navigation { many: bool },

    /// The junction table of a many-to-many navigation.
    Junction,

    /// An intermediate table of an explicit via-relation chain.
    Hop,

    /// A nested shape mapped onto the parent's own table.
    Embedded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedColumn {
    pub column: ColumnId,

    /// Name relative to the node: the field name, or a key anchor name for
    /// primary key columns the output did not ask for.
    pub name: String,

    /// Projected only to identify rows.
    pub anchor: bool,
}

/// `parent.column = child.column`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JoinPair {
    pub parent: ColumnId,
    pub child: ColumnId,
}

impl RelationNode {
    /// Junction and hop nodes do not surface in the materialized output.
    pub fn is_transparent(&self) -> bool {
        matches!(self.kind, RelationKind::Junction | RelationKind::Hop)
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self.kind, RelationKind::Embedded)
    }

    /// True for nodes that join at most one row per parent row.
    pub fn is_to_one(&self) -> bool {
        matches!(
            self.kind,
            RelationKind::Root | RelationKind::Embedded | RelationKind::Navigation { many: false }
        )
    }

    /// True for nodes that appear in FROM as their own table.
    pub fn is_joined(&self) -> bool {
        !matches!(self.kind, RelationKind::Root | RelationKind::Embedded)
    }

    pub fn column(&self, id: ColumnId) -> Option<&ProjectedColumn> {
        self.columns.iter().find(|column| column.column == id)
    }

    /// Result-set alias of a projected column: the dotted output path.
    pub fn column_alias(&self, column: &ProjectedColumn) -> String {
        if self.path.is_root() {
            column.name.clone()
        } else {
            format!("{}.{}", self.path, column.name)
        }
    }
}

impl fmt::Debug for RelationId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "RelationId({})", self.0)
    }
}
