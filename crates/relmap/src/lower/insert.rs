use super::{
    write::{write_order, WriteNode},
    Lower,
};
use crate::{
    relation::{JoinPair, Link, Relations},
    token::{Action, RowColumn, RowNames, RowsSource},
};

use relmap_core::{
    schema::db::{self, Column},
    spec::{FieldNode, Operation, Output},
    stmt::Path,
    Error, Result,
};
use relmap_sql::stmt::{
    Assignment, Batch, ColumnDef, Declare, Delete, Expr, Insert, InsertSource, InsertTarget, Join,
    JoinOp, Merge, MergeInsert, OrderByExpr, OutputInto, Query, Select, TableFactor,
    TableWithJoins, Update, Values,
};

const INDEX: &str = "__index";
const PARENT: &str = "__parent";

impl<'a> Lower<'a> {
    /// Insert, upsert and sync.
    ///
    /// Every written table gets a lookup table variable filled from the
    /// entity argument, one row per element tagged with its position
    /// (`__index`) and its parent element's position (`__parent`). Tables
    /// are then merged in foreign key order: each MERGE captures generated
    /// keys into an output variable, which is written back into the lookup
    /// so dependent tables can copy them.
    pub(super) fn insert(&mut self) -> Result<(Batch, Option<Relations>)> {
        let entity = self.entity()?;
        let entity_path = self.args_tree().path(entity.id);
        let nodes = self.write_nodes(entity)?;

        let operation = self.spec.operation;
        let returning = matches!(self.spec.output_kind, Output::One | Output::Many);

        // One table and no keys to hand back: nothing needs the lookup and
        // MERGE, so a collection is written as one multi-row VALUES insert
        if operation == Operation::Insert && nodes.len() == 1 && !returning {
            let plain = !entity.is_list();
            return Ok((self.plain_insert(&nodes[0], &entity_path, plain), None));
        }

        if returning && !self.table.has_primary_key() {
            return Err(Error::invalid_attribute(format!(
                "returning rows from a write requires a primary key on `{}`",
                self.table.name
            )));
        }

        let mut batch = Batch::new();

        for node in &nodes {
            batch.push(declare_lookup(node));
            if node.table.has_primary_key() {
                batch.push(declare_output(node));
            }
        }

        for node in &nodes {
            let fill = self.fill_lookup(&nodes, node, &entity_path);
            batch.push(fill);
        }

        for index in write_order(&nodes) {
            self.write_node(&mut batch, &nodes, index);
        }

        if operation == Operation::Sync {
            for node in nodes.iter().skip(1).rev() {
                self.remove_stale(&mut batch, &nodes, node);
            }
        }

        let relations = if returning {
            Some(self.returning(&mut batch)?)
        } else {
            None
        };

        Ok((batch, relations))
    }

    /// The single shape-typed argument a write takes its rows from.
    pub(super) fn entity(&self) -> Result<&'a FieldNode> {
        let tree = self.args_tree();
        let operation = self.spec.operation;

        let [entity] = self.args.filters[..] else {
            return Err(Error::invalid_attribute(format!(
                "{operation:?} requires exactly one entity argument, found {}",
                self.args.filters.len()
            )));
        };

        let path = tree.path(entity.id);

        if entity.ty.shape_name().is_none() {
            return Err(Error::invalid_attribute(format!(
                "{operation:?} argument `{path}` is not a record"
            )));
        }

        if let Some(table) = self.resolver.shape_table(entity, &path)? {
            if table.id != self.table.id {
                return Err(Error::invalid_attribute(format!(
                    "{operation:?} argument `{path}` maps to `{}`, not `{}`",
                    table.name, self.table.name
                )));
            }
        }

        Ok(entity)
    }

    /// `INSERT INTO "T" (...) VALUES (...)`. A single entity binds
    /// parameters named after its fields.
    fn plain_insert(&mut self, node: &WriteNode<'a>, entity_path: &Path, plain: bool) -> Batch {
        let columns: Vec<_> = node
            .columns
            .iter()
            .filter(|c| c.source.is_some() && !c.column.auto_increment)
            .collect();

        let fields: Vec<Path> = columns.iter().filter_map(|c| c.source.clone()).collect();

        let names = if plain {
            RowNames::Fields(
                fields
                    .iter()
                    .map(|field| self.names.single(&entity_path.concat(field).to_param_name()))
                    .collect(),
            )
        } else {
            RowNames::Derived(self.param_base(&format!("n{}", node.index)))
        };

        let source = RowsSource {
            names,
            levels: vec![],
            columns: fields.into_iter().map(RowColumn::Field).collect(),
            required: true,
        };

        let hole = self.token(entity_path.clone(), Action::Rows(source));

        Batch::from(relmap_sql::Statement::from(Insert {
            target: InsertTarget::Table(node.table.name.clone()),
            columns: columns.iter().map(|c| c.column.name.clone()).collect(),
            source: InsertSource::Values(Values::Hole(hole)),
        }))
    }

    /// `INSERT INTO @lookupN (__index, [__parent,] ...) VALUES <rows>`
    pub(super) fn fill_lookup(&mut self, nodes: &[WriteNode<'a>], node: &WriteNode<'a>, entity_path: &Path) -> Insert {
        let mut levels = vec![];
        let mut current = node;
        while let Some(parent) = current.parent {
            levels.push(current.step.clone());
            current = &nodes[parent];
        }
        levels.reverse();

        let mut names = vec![INDEX.to_string()];
        let mut columns = vec![RowColumn::Index];

        if node.parent.is_some() {
            names.push(PARENT.to_string());
            columns.push(RowColumn::ParentIndex);
        }

        for column in &node.columns {
            names.push(column.column.name.clone());
            columns.push(match &column.source {
                Some(source) => RowColumn::Field(source.clone()),
                None => RowColumn::Null,
            });
        }

        let row_names = RowNames::Derived(self.param_base(&format!("n{}", node.index)));
        let hole = self.token(
            entity_path.clone(),
            Action::Rows(RowsSource {
                names: row_names,
                levels,
                columns,
                required: node.parent.is_none(),
            }),
        );

        Insert {
            target: InsertTarget::Variable(node.lookup()),
            columns: names,
            source: InsertSource::Values(Values::Hole(hole)),
        }
    }

    fn write_node(&self, batch: &mut Batch, nodes: &[WriteNode<'a>], index: usize) {
        let node = &nodes[index];
        let upsert = self.spec.operation != Operation::Insert;

        // Keys of a parent written earlier
        if let (Some(parent), Some(Link::ChildHolds(pairs))) = (node.parent, &node.link) {
            batch.push(self.copy_keys(
                node,
                &nodes[parent],
                pairs.iter().map(|pair| (pair.child, pair.parent)),
                (PARENT, INDEX),
            ));
        }

        // Keys of children this table references, written earlier
        for child in nodes.iter().filter(|child| child.parent == Some(index)) {
            if let Some(Link::ParentHolds(pairs)) = &child.link {
                batch.push(self.copy_keys(
                    node,
                    child,
                    pairs.iter().map(|pair| (pair.parent, pair.child)),
                    (INDEX, PARENT),
                ));
            }
        }

        batch.push(self.merge(node, upsert));

        if node.table.has_primary_key() {
            batch.push(write_back(node));

            if upsert {
                if let Some(update) = self.update_from_lookup(node) {
                    batch.push(update);
                }
            }
        }

        if let (
            Some(parent),
            Some(Link::Junction {
                table,
                to_parent,
                to_child,
            }),
        ) = (node.parent, &node.link)
        {
            batch.push(self.insert_junction(
                node,
                &nodes[parent],
                self.schema.table(*table),
                to_parent,
                to_child,
                upsert,
            ));
        }
    }

    /// Copies key values from another lookup into `node`'s lookup:
    /// `UPDATE "l" SET "fk" = "o"."pk" FROM @lookupN AS "l" INNER JOIN @lookupM AS "o" ON ...`.
    /// `columns` yields (column in `node`, column in `other`); `link` names
    /// the correlation columns as (in `node`, in `other`).
    fn copy_keys(
        &self,
        node: &WriteNode<'a>,
        other: &WriteNode<'a>,
        columns: impl Iterator<Item = (db::ColumnId, db::ColumnId)>,
        link: (&str, &str),
    ) -> Update {
        let assignments = columns
            .map(|(target, source)| {
                Assignment::set(
                    &self.schema.column(target).name,
                    Expr::column("o", &self.schema.column(source).name),
                )
            })
            .collect();

        let mut from = TableWithJoins::from(TableFactor::variable(node.lookup(), "l"));
        from.joins.push(Join {
            table: TableFactor::variable(other.lookup(), "o"),
            op: JoinOp::Inner,
            on: Expr::eq(Expr::column("l", link.0), Expr::column("o", link.1)),
        });

        Update {
            target: "l".to_string(),
            assignments,
            from: Some(from),
            filter: None,
        }
    }

    /// `MERGE INTO "T" AS "target" USING @lookupN AS "source" ON ...`
    /// inserting unmatched rows and capturing their keys. A plain insert
    /// never matches.
    fn merge(&self, node: &WriteNode<'a>, upsert: bool) -> Merge {
        let key: Vec<&Column> = node.table.primary_key_columns().collect();

        let on = if upsert && !key.is_empty() {
            key_eq("target", "source", &key)
        } else {
            Expr::contradiction()
        };

        let columns: Vec<&Column> = node.insert_columns().collect();

        let output = (!key.is_empty()).then(|| OutputInto {
            exprs: std::iter::once(Expr::column("source", INDEX))
                .chain(key.iter().map(|column| Expr::inserted(&column.name)))
                .collect(),
            into: node.output(),
            columns: std::iter::once(INDEX.to_string())
                .chain(key.iter().map(|column| column.name.clone()))
                .collect(),
        });

        Merge {
            target: TableFactor::table(&node.table.name, Some("target".to_string())),
            source: TableFactor::variable(node.lookup(), "source"),
            on,
            matched_update: vec![],
            not_matched_insert: Some(MergeInsert {
                columns: columns.iter().map(|column| column.name.clone()).collect(),
                values: columns
                    .iter()
                    .map(|column| Expr::column("source", &column.name))
                    .collect(),
            }),
            output,
        }
    }

    /// `UPDATE "target" SET ... FROM "T" AS "target" INNER JOIN @lookupN AS "source" ON <key>`
    pub(super) fn update_from_lookup(&self, node: &WriteNode<'a>) -> Option<Update> {
        let assignments: Vec<Assignment> = node
            .update_columns()
            .filter(|column| !column.auto_increment)
            .map(|column| Assignment::set(&column.name, Expr::column("source", &column.name)))
            .collect();

        if assignments.is_empty() {
            return None;
        }

        let key: Vec<&Column> = node.table.primary_key_columns().collect();

        let mut from = TableWithJoins::from(TableFactor::table(
            &node.table.name,
            Some("target".to_string()),
        ));
        from.joins.push(Join {
            table: TableFactor::variable(node.lookup(), "source"),
            op: JoinOp::Inner,
            on: key_eq("target", "source", &key),
        });

        Some(Update {
            target: "target".to_string(),
            assignments,
            from: Some(from),
            filter: None,
        })
    }

    /// Inserts junction rows pairing each child row with its parent row.
    /// Upserts skip pairs already present.
    fn insert_junction(
        &self,
        node: &WriteNode<'a>,
        parent: &WriteNode<'a>,
        junction: &db::Table,
        to_parent: &[JoinPair],
        to_child: &[JoinPair],
        upsert: bool,
    ) -> Insert {
        let column = |id: db::ColumnId| self.schema.column(id).name.clone();

        let mut select = Select::new(self.lookup_with_parent(node, parent));

        let mut columns = vec![];
        for pair in to_parent {
            columns.push(column(pair.child));
            select.project(Expr::column("p", column(pair.parent)), None);
        }
        for pair in to_child {
            columns.push(column(pair.parent));
            select.project(Expr::column("l", column(pair.child)), None);
        }

        if upsert {
            let mut existing = Select::new(TableFactor::table(&junction.name, Some("j".to_string())));
            existing.project(Expr::int(1), None);
            existing.add_filter(self.pairs_eq("p", "j", to_parent));
            existing.add_filter(self.junction_child_eq(to_child));
            select.add_filter(Expr::not_exists(existing));
        }

        Insert {
            target: InsertTarget::Table(junction.name.clone()),
            columns,
            source: InsertSource::Query(Box::new(Query::new(select))),
        }
    }

    /// `"j"."child_fk" = "l"."pk"` for the child side of a junction.
    fn junction_child_eq(&self, to_child: &[JoinPair]) -> Expr {
        self.pairs_eq("j", "l", to_child)
    }

    /// `@lookupN AS "l" INNER JOIN @lookupP AS "p" ON "p"."__index" = "l"."__parent"`
    fn lookup_with_parent(&self, node: &WriteNode<'a>, parent: &WriteNode<'a>) -> TableWithJoins {
        let mut from = TableWithJoins::from(TableFactor::variable(node.lookup(), "l"));
        from.joins.push(Join {
            table: TableFactor::variable(parent.lookup(), "p"),
            op: JoinOp::Inner,
            on: Expr::eq(Expr::column("p", INDEX), Expr::column("l", PARENT)),
        });
        from
    }

    /// Sync: deletes child rows, or junction rows, of a written parent that
    /// the input no longer lists.
    fn remove_stale(&self, batch: &mut Batch, nodes: &[WriteNode<'a>], node: &WriteNode<'a>) {
        let Some(parent) = node.parent.map(|parent| &nodes[parent]) else {
            return;
        };

        match &node.link {
            Some(Link::ChildHolds(pairs)) if node.table.has_primary_key() => {
                let key: Vec<&Column> = node.table.primary_key_columns().collect();

                let mut owned = Select::new(TableFactor::variable(parent.lookup(), "p"));
                owned.project(Expr::int(1), None);
                owned.add_filter(self.pairs_eq("p", "t", pairs));

                let mut listed = Select::new(TableFactor::variable(node.lookup(), "l"));
                listed.project(Expr::int(1), None);
                listed.add_filter(key_eq("l", "t", &key));

                batch.push(Delete {
                    from: TableFactor::table(&node.table.name, Some("t".to_string())),
                    filter: Some(Expr::and(Expr::exists(owned), Expr::not_exists(listed))),
                });
            }
            Some(Link::Junction {
                table,
                to_parent,
                to_child,
            }) => {
                let junction = self.schema.table(*table);

                let mut owned = Select::new(TableFactor::variable(parent.lookup(), "p"));
                owned.project(Expr::int(1), None);
                owned.add_filter(self.pairs_eq("p", "j", to_parent));

                let mut listed = Select::new(self.lookup_with_parent(node, parent));
                listed.project(Expr::int(1), None);
                listed.add_filter(self.pairs_eq("p", "j", to_parent));
                listed.add_filter(self.junction_child_eq(to_child));

                batch.push(Delete {
                    from: TableFactor::table(&junction.name, Some("j".to_string())),
                    filter: Some(Expr::and(Expr::exists(owned), Expr::not_exists(listed))),
                });
            }
            _ => {}
        }
    }

    /// Selects the written rows back in input order:
    /// `SELECT ... FROM @lookup0 AS "__lookup" INNER JOIN "T" ... ORDER BY "__lookup"."__index"`.
    fn returning(&self, batch: &mut Batch) -> Result<Relations> {
        let Some(output) = &self.spec.output else {
            return Err(Error::invalid_attribute("a returning write needs an output shape"));
        };

        let relations = self.resolver.resolve(self.table, output)?;
        let root = relations.root();
        let key: Vec<&Column> = self.table.primary_key_columns().collect();

        let mut from = TableWithJoins::from(TableFactor::variable("lookup0", "__lookup"));
        from.joins.push(Join {
            table: self.table_factor(root),
            op: JoinOp::Inner,
            on: key_eq("__lookup", &root.alias, &key),
        });

        for node in relations.iter().filter(|node| node.is_joined()) {
            from.joins.push(Join {
                table: self.table_factor(node),
                op: JoinOp::Left,
                on: self.join_condition(&relations, node.id),
            });
        }

        let mut select = Select {
            from: Some(from),
            ..Select::default()
        };

        for node in relations.iter() {
            for column in &node.columns {
                select.project(
                    Expr::column(&node.alias, &self.schema.column(column.column).name),
                    Some(node.column_alias(column)),
                );
            }
        }

        let mut query = Query::new(select);
        query
            .order_by
            .push(OrderByExpr::new(Expr::column("__lookup", INDEX), None));

        batch.push(query);
        Ok(relations)
    }
}

pub(super) fn declare_lookup(node: &WriteNode<'_>) -> Declare {
    let mut columns = vec![ColumnDef {
        name: INDEX.to_string(),
        ty: db::Type::Integer(4),
        nullable: false,
    }];

    if node.parent.is_some() {
        columns.push(ColumnDef {
            name: PARENT.to_string(),
            ty: db::Type::Integer(4),
            nullable: true,
        });
    }

    for column in &node.columns {
        columns.push(ColumnDef {
            name: column.column.name.clone(),
            ty: column.column.ty.clone(),
            nullable: true,
        });
    }

    Declare {
        name: node.lookup(),
        columns,
    }
}

fn declare_output(node: &WriteNode<'_>) -> Declare {
    let columns = std::iter::once(ColumnDef {
        name: INDEX.to_string(),
        ty: db::Type::Integer(4),
        nullable: false,
    })
    .chain(node.table.primary_key_columns().map(|column| ColumnDef {
        name: column.name.clone(),
        ty: column.ty.clone(),
        nullable: false,
    }))
    .collect();

    Declare {
        name: node.output(),
        columns,
    }
}

/// `UPDATE "l" SET "pk" = "o"."pk" FROM @lookupN AS "l" INNER JOIN @outputN AS "o" ON "o"."__index" = "l"."__index"`
fn write_back(node: &WriteNode<'_>) -> Update {
    let assignments = node
        .table
        .primary_key_columns()
        .map(|column| Assignment::set(&column.name, Expr::column("o", &column.name)))
        .collect();

    let mut from = TableWithJoins::from(TableFactor::variable(node.lookup(), "l"));
    from.joins.push(Join {
        table: TableFactor::variable(node.output(), "o"),
        op: JoinOp::Inner,
        on: Expr::eq(Expr::column("o", INDEX), Expr::column("l", INDEX)),
    });

    Update {
        target: "l".to_string(),
        assignments,
        from: Some(from),
        filter: None,
    }
}

/// `"left"."k" = "right"."k" [AND ...]` over same-named key columns.
pub(super) fn key_eq(left: &str, right: &str, key: &[&Column]) -> Expr {
    Expr::and_from_vec(
        key.iter()
            .map(|column| {
                Expr::eq(
                    Expr::column(left, &column.name),
                    Expr::column(right, &column.name),
                )
            })
            .collect(),
    )
    .unwrap_or_else(Expr::tautology)
}
