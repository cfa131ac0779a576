use super::JoinPair;
use crate::compiler::JunctionPolicy;

use relmap_core::{
    schema::db::{ColumnId, ForeignKey, Schema, Table, TableId},
    Error, Result,
};

/// How a child table is reached from its parent.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Link {
    /// The parent table declares the foreign key (many-to-one).
    ParentHolds(Vec<JoinPair>),

    /// The child table declares the foreign key (one-to-many).
    ChildHolds(Vec<JoinPair>),

    /// A junction table references both sides (many-to-many).
    Junction {
        table: TableId,

        /// Parent columns paired with junction columns
        to_parent: Vec<JoinPair>,

        /// Junction columns paired with child columns
        to_child: Vec<JoinPair>,
    },
}

impl Link {
    /// Infers the link between `parent` and `child` for a field named
    /// `field`. Returns `Ok(None)` when the schema holds no usable foreign
    /// key.
    ///
    /// Single-valued fields try a key on the parent first, collections a key
    /// on the child first. Junction tables are only considered once both
    /// directions fail.
    pub(crate) fn infer(
        schema: &Schema,
        parent: &Table,
        child: &Table,
        field: &str,
        many: bool,
        policy: JunctionPolicy,
    ) -> Result<Option<Link>> {
        let parent_holds = || {
            pick(schema, parent.foreign_keys_to(child.id), field, &child.name)
                .map(|fk| Link::ParentHolds(forward(fk)))
        };
        let child_holds = || {
            pick(schema, child.foreign_keys_to(parent.id), field, &parent.name)
                .map(|fk| Link::ChildHolds(backward(fk)))
        };

        let direct = if many {
            child_holds().or_else(parent_holds)
        } else {
            parent_holds().or_else(child_holds)
        };

        if direct.is_some() {
            return Ok(direct);
        }

        junction(schema, parent, child, policy)
    }

    /// True when following the link can yield more than one child row per
    /// parent row.
    pub(crate) fn is_many(&self, schema: &Schema) -> bool {
        match self {
            Link::ParentHolds(pairs) => !covers_key(schema, pairs),
            Link::ChildHolds(pairs) => !covers_key(schema, pairs),
            Link::Junction { .. } => true,
        }
    }

    /// Resolves one hop of a via-relation. `left` and `right` are the
    /// declared columns, if any. Falls back to a foreign key consistent with
    /// the declared columns, then to the single-column primary key of the
    /// undeclared side.
    pub(crate) fn hop(
        from: &Table,
        left: Option<ColumnId>,
        to: &Table,
        right: Option<ColumnId>,
    ) -> Option<Vec<JoinPair>> {
        if let (Some(left), Some(right)) = (left, right) {
            return Some(vec![JoinPair {
                parent: left,
                child: right,
            }]);
        }

        let consistent = |pairs: &[JoinPair]| {
            left.map_or(true, |left| pairs.iter().any(|pair| pair.parent == left))
                && right.map_or(true, |right| pairs.iter().any(|pair| pair.child == right))
        };

        let outgoing = from.foreign_keys_to(to.id).map(forward);
        let incoming = to.foreign_keys_to(from.id).map(backward);

        if let Some(pairs) = outgoing.chain(incoming).find(|pairs| consistent(pairs)) {
            return Some(pairs);
        }

        let single_key = |table: &Table| match &table.primary_key.columns[..] {
            [column] => Some(*column),
            _ => None,
        };

        let pair = match (left, right) {
            (Some(left), None) => JoinPair {
                parent: left,
                child: single_key(to)?,
            },
            (None, Some(right)) => JoinPair {
                parent: single_key(from)?,
                child: right,
            },
            _ => return None,
        };

        Some(vec![pair])
    }
}

/// Pairs for a key declared on the parent: parent FK column = child key.
fn forward(fk: &ForeignKey) -> Vec<JoinPair> {
    fk.columns
        .iter()
        .map(|pair| JoinPair {
            parent: pair.foreign,
            child: pair.primary,
        })
        .collect()
}

/// Pairs for a key declared on the child: parent key = child FK column.
fn backward(fk: &ForeignKey) -> Vec<JoinPair> {
    fk.columns
        .iter()
        .map(|pair| JoinPair {
            parent: pair.primary,
            child: pair.foreign,
        })
        .collect()
}

/// Picks among several keys referencing the same table: a key whose column
/// starts with the field name wins, then one starting with the referenced
/// table's name, then the first declared.
fn pick<'a>(
    schema: &Schema,
    fks: impl Iterator<Item = &'a ForeignKey>,
    field: &str,
    referenced: &str,
) -> Option<&'a ForeignKey> {
    let fks: Vec<_> = fks.collect();

    if fks.len() <= 1 {
        return fks.into_iter().next();
    }

    fks.iter()
        .find(|fk| fk.column_starts_with(schema, field))
        .or_else(|| fks.iter().find(|fk| fk.column_starts_with(schema, referenced)))
        .or(fks.first())
        .copied()
}

/// True when the child-side columns of `pairs` cover the child table's
/// primary key.
pub(crate) fn covers_key(schema: &Schema, pairs: &[JoinPair]) -> bool {
    let Some(first) = pairs.first() else {
        return false;
    };

    let table = schema.table(first.child.table);
    table.has_primary_key()
        && table
            .primary_key
            .columns
            .iter()
            .all(|pk| pairs.iter().any(|pair| pair.child == *pk))
}

fn junction(
    schema: &Schema,
    parent: &Table,
    child: &Table,
    policy: JunctionPolicy,
) -> Result<Option<Link>> {
    let mut candidates = vec![];

    for table in &schema.tables {
        if table.id == parent.id || table.id == child.id {
            continue;
        }

        let link = if parent.id == child.id {
            let fks: Vec<_> = table.foreign_keys_to(parent.id).collect();
            let [to_parent, to_child] = fks.as_slice() else {
                continue;
            };
            (*to_parent, *to_child)
        } else {
            let to_parent: Vec<_> = table.foreign_keys_to(parent.id).collect();
            let to_child: Vec<_> = table.foreign_keys_to(child.id).collect();
            let ([to_parent], [to_child]) = (&to_parent[..], &to_child[..]) else {
                continue;
            };
            (*to_parent, *to_child)
        };

        candidates.push((table, link));
    }

    let Some(min) = candidates.iter().map(|(table, _)| table.columns.len()).min() else {
        return Ok(None);
    };

    let minimal: Vec<_> = candidates
        .into_iter()
        .filter(|(table, _)| table.columns.len() == min)
        .collect();

    if minimal.len() > 1 {
        let names: Vec<String> = minimal.iter().map(|(table, _)| table.name.clone()).collect();

        match policy {
            JunctionPolicy::Error => {
                return Err(Error::ambiguous_relation(&parent.name, &child.name, names));
            }
            JunctionPolicy::Warn => {
                tracing::warn!(
                    parent = %parent.name,
                    child = %child.name,
                    candidates = ?names,
                    selected = %names[0],
                    "ambiguous junction table"
                );
            }
        }
    }

    let (table, (to_parent, to_child)) = minimal[0];

    // The junction declares both keys: the parent side joins backward into
    // the junction, the child side forward out of it.
    Ok(Some(Link::Junction {
        table: table.id,
        to_parent: backward(to_parent),
        to_child: forward(to_child),
    }))
}
