use super::{RelationId, RelationNode, Relations};

use relmap_core::{bail, Result};

impl Relations {
    /// Unions `other` into `self`.
    ///
    /// Both trees must be rooted at the same table. Children are matched by
    /// table and (case-insensitive) navigation name and merged recursively;
    /// unmatched children are copied with fresh aliases. Projected columns
    /// are unioned by name. A join survives if only one side declares it;
    /// two different joins for the same navigation are an error.
    pub fn merge(&mut self, other: &Relations) -> Result<()> {
        if self.root().table != other.root().table {
            bail!(
                "cannot merge relations rooted at `{}` and `{}`",
                self.root().alias,
                other.root().alias
            );
        }

        self.merge_node(RelationId(0), other, RelationId(0))
    }

    fn merge_node(&mut self, id: RelationId, other: &Relations, other_id: RelationId) -> Result<()> {
        let source = other.node(other_id);

        for column in &source.columns {
            let node = &mut self.nodes[id.0];
            match node.columns.iter_mut().find(|c| c.name == column.name) {
                // A column requested by either side is no longer only an anchor.
                Some(existing) => existing.anchor &= column.anchor,
                None => node.columns.push(column.clone()),
            }
        }

        for other_child in other.children(other_id) {
            match self.matching_child(id, other_child) {
                Some(child) => {
                    let node = &mut self.nodes[child.0];

                    if node.join.is_empty() {
                        node.join = other_child.join.clone();
                    } else if !other_child.join.is_empty() && node.join != other_child.join {
                        bail!(
                            "conflicting joins for `{}` while merging relations",
                            other_child.path
                        );
                    }

                    self.merge_node(child, other, other_child.id)?;
                }
                None => self.copy_subtree(id, other, other_child.id),
            }
        }

        Ok(())
    }

    fn matching_child(&self, id: RelationId, other: &RelationNode) -> Option<RelationId> {
        self.children(id)
            .find(|child| {
                child.table == other.table
                    && child.kind == other.kind
                    && child.name.eq_ignore_ascii_case(&other.name)
            })
            .map(|child| child.id)
    }

    fn copy_subtree(&mut self, parent: RelationId, other: &Relations, other_id: RelationId) {
        let source = other.node(other_id);

        let id = self.push_node(
            parent,
            source.table,
            &source.name,
            source.path.clone(),
            source.join.clone(),
            source.kind,
            (!source.is_embedded()).then(|| source.alias.clone()),
        );
        self.nodes[id.0].columns = source.columns.clone();

        for child in &source.children {
            self.copy_subtree(id, other, *child);
        }
    }
}
