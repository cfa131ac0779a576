use super::{link::covers_key, JoinPair, Link, RelationId, RelationKind, Relations};
use crate::compiler::JunctionPolicy;

use relmap_core::{
    schema::{
        db::{Column, Schema, Table},
        Inflector,
    },
    spec::{FieldId, FieldNode, FieldTree, Via},
    stmt::Path,
    Error, Result,
};

/// Binds field trees onto the schema.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Resolver<'a> {
    pub(crate) schema: &'a Schema,
    pub(crate) inflector: &'a dyn Inflector,
    pub(crate) policy: JunctionPolicy,
}

impl<'a> Resolver<'a> {
    /// Finds a table by name, trying every inflected candidate.
    pub(crate) fn find_table(&self, name: &str) -> Option<&'a Table> {
        self.inflector
            .candidates(name)
            .iter()
            .find_map(|candidate| self.schema.find_table(candidate))
    }

    /// True when `name` reaches `table` through a plural spelling rather
    /// than the table's own name, hinting at a collection.
    pub(crate) fn names_collection(&self, name: &str, table: &Table) -> bool {
        !name.eq_ignore_ascii_case(&table.name) && self.inflector.is_plural(name)
    }

    /// The column a field maps to. A column override is matched as written,
    /// a field name through its inflected candidates.
    pub(crate) fn find_column(&self, table: &'a Table, field: &FieldNode) -> Option<&'a Column> {
        if let Some(column) = &field.directives.column {
            return table.find_column(column);
        }

        self.inflector
            .candidates(&field.name)
            .iter()
            .find_map(|candidate| table.find_column(candidate))
    }

    /// Like [`find_column`](Self::find_column) but fails with an
    /// InvalidIdentifier naming the field path and the expected column.
    pub(crate) fn column(
        &self,
        table: &'a Table,
        field: &FieldNode,
        path: &Path,
    ) -> Result<&'a Column> {
        self.find_column(table, field).ok_or_else(|| {
            Error::invalid_identifier(
                path.to_string(),
                format!("column `{}` on table `{}`", field.column_name(), table.name),
            )
        })
    }

    /// The table a shape-typed field binds to. `None` means the shape is an
    /// embedded projection of its parent's table.
    pub(crate) fn shape_table(&self, field: &FieldNode, path: &Path) -> Result<Option<&'a Table>> {
        if let Some(table) = &field.table {
            return match self.schema.find_table(table) {
                Some(table) => Ok(Some(table)),
                None => Err(Error::invalid_identifier(
                    path.to_string(),
                    format!("table `{table}`"),
                )),
            };
        }

        Ok(field.ty.shape_name().and_then(|shape| self.find_table(shape)))
    }

    /// The link between `parent` and `child` for `field`, or an
    /// InvalidIdentifier when the schema has none.
    pub(crate) fn link(
        &self,
        parent: &Table,
        child: &Table,
        field: &str,
        many: bool,
        path: &Path,
    ) -> Result<Link> {
        Link::infer(self.schema, parent, child, field, many, self.policy)?.ok_or_else(|| {
            Error::invalid_identifier(
                path.to_string(),
                format!("foreign key between `{}` and `{}`", parent.name, child.name),
            )
        })
    }

    /// Resolves a via-relation into its tables and the join pairs leading
    /// into each one. The first hop must name `start`.
    pub(crate) fn via(
        &self,
        start: &Table,
        via: &Via,
        path: &Path,
    ) -> Result<Vec<(&'a Table, Vec<JoinPair>)>> {
        let hops = via.hops(path)?;
        let missing = |what: String| {
            Error::invalid_identifier(
                path.to_string(),
                format!("{what} in via-relation `{}`", via.path),
            )
        };

        let Some(mut from) = self
            .schema
            .find_table(&hops[0].table)
            .filter(|table| table.id == start.id)
        else {
            return Err(missing(format!(
                "hop `{}` (expected table `{}`)",
                hops[0].table, start.name
            )));
        };

        let mut ret = vec![];

        for (index, hop) in hops.iter().enumerate().skip(1) {
            let to = self
                .schema
                .find_table(&hop.table)
                .ok_or_else(|| missing(format!("table `{}`", hop.table)))?;

            // A declared column on an intermediate hop is the target of the
            // previous hop, so only the first hop declares a left column.
            let left = match (index, &hops[0].column) {
                (1, Some(name)) => Some(
                    from.find_column(name)
                        .ok_or_else(|| missing(format!("column `{}.{name}`", from.name)))?
                        .id,
                ),
                _ => None,
            };

            let right = match &hop.column {
                Some(name) => Some(
                    to.find_column(name)
                        .ok_or_else(|| missing(format!("column `{}.{name}`", to.name)))?
                        .id,
                ),
                None => None,
            };

            let pairs = Link::hop(from, left, to, right).ok_or_else(|| {
                missing(format!("foreign key between `{}` and `{}`", from.name, to.name))
            })?;

            ret.push((to, pairs));
            from = to;
        }

        Ok(ret)
    }

    /// Resolves the output field tree against `table`.
    pub(crate) fn resolve(&self, table: &'a Table, tree: &FieldTree) -> Result<Relations> {
        let mut relations = Relations::new(table);
        self.resolve_fields(&mut relations, RelationId(0), table, tree, tree.root().id)?;
        relations.anchor_keys(self.schema);

        tracing::debug!(
            table = %table.name,
            nodes = relations.len(),
            "resolved table relations"
        );

        Ok(relations)
    }

    fn resolve_fields(
        &self,
        relations: &mut Relations,
        relation: RelationId,
        table: &'a Table,
        tree: &FieldTree,
        field: FieldId,
    ) -> Result<()> {
        for child in tree.children(field) {
            if child.directives.exclude {
                continue;
            }

            let path = tree.path(child.id);

            if child.is_scalar() {
                if child.directives.via.is_some() {
                    return Err(Error::invalid_attribute(format!(
                        "via-relation on scalar output field `{path}`"
                    )));
                }

                let column = self.column(table, child, &path)?;
                relations.project(relation, column.id, &child.name);
                continue;
            }

            if child.cyclic {
                continue;
            }

            if let Some(via) = &child.directives.via {
                let hops = self.via(table, via, &path)?;
                let (target, id) = push_chain(relations, relation, child, &path, hops, self.schema);
                self.resolve_fields(relations, id, target, tree, child.id)?;
                continue;
            }

            match self.shape_table(child, &path)? {
                Some(target) => {
                    let link = self.link(table, target, &child.name, child.is_list(), &path)?;
                    let id = push_link(
                        relations,
                        relation,
                        target,
                        &child.name,
                        &path,
                        link,
                        child.is_list(),
                        self.schema,
                    );
                    self.resolve_fields(relations, id, target, tree, child.id)?;
                }
                None => {
                    let id = relations.push(
                        relation,
                        table,
                        &child.name,
                        path,
                        vec![],
                        RelationKind::Embedded,
                    );
                    self.resolve_fields(relations, id, table, tree, child.id)?;
                }
            }
        }

        Ok(())
    }

    /// Builds a relations tree holding only the navigation chain named by
    /// `path`, each step matched against table names. Used for join-relation
    /// filters whose path the output does not project.
    pub(crate) fn resolve_path(&self, table: &'a Table, path: &Path) -> Result<Relations> {
        let mut relations = Relations::new(table);
        let mut current = (RelationId(0), table);

        for (depth, step) in path.steps().iter().enumerate() {
            let step_path = Path::from_steps(path.steps()[..=depth].iter().cloned());
            let target = self.find_table(step).ok_or_else(|| {
                Error::invalid_identifier(step_path.to_string(), format!("table `{step}`"))
            })?;

            let many = self.names_collection(step, target);
            let link = self.link(current.1, target, step, many, &step_path)?;
            let id = push_link(
                &mut relations,
                current.0,
                target,
                step,
                &step_path,
                link,
                false,
                self.schema,
            );

            current = (id, target);
        }

        relations.anchor_keys(self.schema);
        Ok(relations)
    }
}

#[allow(clippy::too_many_arguments)]
fn push_link(
    relations: &mut Relations,
    parent: RelationId,
    target: &Table,
    name: &str,
    path: &Path,
    link: Link,
    list: bool,
    schema: &Schema,
) -> RelationId {
    let many = list || link.is_many(schema);

    match link {
        Link::ParentHolds(pairs) | Link::ChildHolds(pairs) => relations.push(
            parent,
            target,
            name,
            path.clone(),
            pairs,
            RelationKind::Navigation { many },
        ),
        Link::Junction {
            table,
            to_parent,
            to_child,
        } => {
            let junction = relations.push(
                parent,
                schema.table(table),
                name,
                path.clone(),
                to_parent,
                RelationKind::Junction,
            );
            relations.push(
                junction,
                target,
                name,
                path.clone(),
                to_child,
                RelationKind::Navigation { many: true },
            )
        }
    }
}

/// Pushes the hop nodes of a via-relation. The final hop becomes the field's
/// navigation; returns its table and id.
fn push_chain<'a>(
    relations: &mut Relations,
    parent: RelationId,
    field: &FieldNode,
    path: &Path,
    mut hops: Vec<(&'a Table, Vec<JoinPair>)>,
    schema: &Schema,
) -> (&'a Table, RelationId) {
    let (target, pairs) = hops.pop().expect("via-relation resolves at least one hop");
    let mut current = parent;

    for (table, pairs) in hops {
        current = relations.push(
            current,
            table,
            &field.name,
            path.clone(),
            pairs,
            RelationKind::Hop,
        );
    }

    let many = field.is_list() || !covers_key(schema, &pairs);
    let id = relations.push(
        current,
        target,
        &field.name,
        path.clone(),
        pairs,
        RelationKind::Navigation { many },
    );

    (target, id)
}
