use super::Lower;
use crate::{
    relation::{JoinPair, Link, RelationId, Relations},
    token::{Action, Predicate, PredicateKind, Transform},
};

use relmap_core::{
    schema::db::Table,
    spec::{FieldNode, Ignore, Via},
    stmt::Path,
    Error, Result,
};
use relmap_sql::stmt::{Expr, Join, JoinOp, Select, TableFactor, TableWithJoins};

/// A lowered filter argument.
#[derive(Debug)]
pub(super) struct Filter {
    pub(super) expr: Expr,

    /// The navigation a join-relation filter compares against.
    pub(super) target: Option<RelationId>,
}

/// The table alias predicates compare against.
#[derive(Debug, Clone)]
struct Scope<'a> {
    alias: String,
    table: &'a Table,
}

impl<'a> Lower<'a> {
    /// Lowers one top-level filter argument. `relations` is only available
    /// to selects, where join-relation filters may extend it.
    pub(super) fn filter(
        &mut self,
        relations: Option<&mut Relations>,
        arg: &'a FieldNode,
    ) -> Result<Filter> {
        let path = self.args_tree().path(arg.id);
        let ignore = arg.directives.ignore;

        let Some(join) = &arg.directives.join else {
            let scope = Scope {
                alias: self.table.name.clone(),
                table: self.table,
            };
            let expr = self.field_filter(&scope, arg, &path, ignore)?;
            return Ok(Filter { expr, target: None });
        };

        let Some(relations) = relations else {
            return Err(Error::invalid_attribute(format!(
                "join-relation filter `{path}` is only valid for select"
            )));
        };

        let id = self.join_target(relations, join, &path)?;
        let node = relations.node(id);
        let scope = Scope {
            alias: node.alias.clone(),
            table: self.schema.table(node.table),
        };

        let expr = self.field_filter(&scope, arg, &path, ignore)?;
        Ok(Filter {
            expr,
            target: Some(id),
        })
    }

    /// Finds the navigation named by a join-relation path, resolving and
    /// merging it in when the output does not already join it.
    fn join_target(&self, relations: &mut Relations, join: &Path, path: &Path) -> Result<RelationId> {
        if let Some(node) = relations.find(join) {
            return Ok(node.id);
        }

        let extra = self.resolver.resolve_path(self.table, join)?;
        relations.merge(&extra)?;

        relations.find(join).map(|node| node.id).ok_or_else(|| {
            Error::invalid_identifier(path.to_string(), format!("navigation `{join}`"))
        })
    }

    fn field_filter(
        &mut self,
        scope: &Scope<'a>,
        field: &'a FieldNode,
        path: &Path,
        ignore: Option<Ignore>,
    ) -> Result<Expr> {
        if let Some(via) = &field.directives.via {
            if !field.is_scalar() {
                return Err(Error::invalid_attribute(format!(
                    "via-relation on nested filter `{path}`"
                )));
            }

            let exists = self.via_exists(scope, via, field, path)?;
            return Ok(self.guard(path, ignore, exists));
        }

        if field.is_scalar() {
            let column = self.resolver.column(scope.table, field, path)?;
            let column = Expr::column(&scope.alias, &column.name);
            return Ok(self.predicate(column, field, path, ignore));
        }

        if field.cyclic {
            return Ok(Expr::tautology());
        }

        if field.is_list() {
            return Err(Error::invalid_attribute(format!(
                "filter `{path}` is a collection of records"
            )));
        }

        let expr = match self.resolver.shape_table(field, path)? {
            Some(target) if target.id != scope.table.id => {
                self.nested_exists(scope, target, field, path)?
            }
            _ => self.nested_filters(scope, field)?,
        };

        Ok(self.guard(path, ignore, expr))
    }

    /// Wraps `expr` in a guard token when the field is ignorable.
    fn guard(&mut self, path: &Path, ignore: Option<Ignore>, expr: Expr) -> Expr {
        match ignore {
            Some(ignore) => Expr::hole(self.token(path.clone(), Action::Guard { ignore, expr })),
            None => expr,
        }
    }

    /// The filters of a nested record, compared in `scope`.
    fn nested_filters(&mut self, scope: &Scope<'a>, field: &'a FieldNode) -> Result<Expr> {
        let tree = self.args_tree();
        let mut operands = vec![];

        for child in tree.children(field.id) {
            if !child.directives.is_filter() {
                continue;
            }

            let path = tree.path(child.id);
            operands.push(self.field_filter(scope, child, &path, child.directives.ignore)?);
        }

        Ok(Expr::and_from_vec(operands).unwrap_or_else(Expr::tautology))
    }

    /// `EXISTS (SELECT 1 FROM <target> WHERE <link> AND <nested filters>)`
    fn nested_exists(
        &mut self,
        scope: &Scope<'a>,
        target: &'a Table,
        field: &'a FieldNode,
        path: &Path,
    ) -> Result<Expr> {
        let many = field.ty.is_list() || self.resolver.names_collection(&field.name, target);
        let link = self
            .resolver
            .link(scope.table, target, &field.name, many, path)?;
        let alias = self.alias("__exists");

        let (from, correlate) = match link {
            Link::ParentHolds(pairs) | Link::ChildHolds(pairs) => (
                TableWithJoins::from(TableFactor::table(&target.name, Some(alias.clone()))),
                self.pairs_eq(&scope.alias, &alias, &pairs),
            ),
            Link::Junction {
                table,
                to_parent,
                to_child,
            } => {
                let junction = self.alias("__exists");
                let mut from = TableWithJoins::from(TableFactor::table(
                    &self.schema.table(table).name,
                    Some(junction.clone()),
                ));
                from.joins.push(Join {
                    table: TableFactor::table(&target.name, Some(alias.clone())),
                    op: JoinOp::Inner,
                    on: self.pairs_eq(&junction, &alias, &to_child),
                });
                (from, self.pairs_eq(&scope.alias, &junction, &to_parent))
            }
        };

        let inner = Scope {
            alias,
            table: target,
        };
        let filters = self.nested_filters(&inner, field)?;

        let mut select = Select::new(from);
        select.project(Expr::int(1), None);
        select.add_filter(correlate);
        if !filters.is_tautology() {
            select.add_filter(filters);
        }

        Ok(Expr::exists(select))
    }

    /// A scalar filter reached through a via-relation:
    /// `EXISTS (SELECT 1 FROM hop1 INNER JOIN hop2 ... WHERE <link> AND <predicate>)`.
    fn via_exists(
        &mut self,
        scope: &Scope<'a>,
        via: &Via,
        field: &'a FieldNode,
        path: &Path,
    ) -> Result<Expr> {
        let hops = self.resolver.via(scope.table, via, path)?;

        let mut from: Option<TableWithJoins> = None;
        let mut correlate = None;
        let mut previous = scope.alias.clone();

        for (table, pairs) in &hops {
            let alias = self.alias("__exists");
            let factor = TableFactor::table(&table.name, Some(alias.clone()));
            let on = self.pairs_eq(&previous, &alias, pairs);

            match &mut from {
                None => {
                    from = Some(TableWithJoins::from(factor));
                    correlate = Some(on);
                }
                Some(from) => from.joins.push(Join {
                    table: factor,
                    op: JoinOp::Inner,
                    on,
                }),
            }

            previous = alias;
        }

        let last = hops.last().map(|(table, _)| *table);
        let (Some(from), Some(correlate), Some(last)) = (from, correlate, last) else {
            unreachable!("via-relation without hops");
        };

        let column = match &via.column {
            Some(name) => last.find_column(name).ok_or_else(|| {
                Error::invalid_identifier(
                    path.to_string(),
                    format!("column `{name}` on table `{}`", last.name),
                )
            })?,
            None => self.resolver.column(last, field, path)?,
        };

        let predicate = self.predicate(Expr::column(&previous, &column.name), field, path, None);

        let mut select = Select::new(from);
        select.project(Expr::int(1), None);
        select.add_filter(correlate);
        select.add_filter(predicate);

        Ok(Expr::exists(select))
    }

    /// A comparison hole for `column` driven by the field's value.
    ///
    /// The shape follows the field's directives: LIKE, then an inequality,
    /// then IN for collections, then equality.
    pub(super) fn predicate(
        &mut self,
        column: Expr,
        field: &FieldNode,
        path: &Path,
        ignore: Option<Ignore>,
    ) -> Expr {
        let directives = &field.directives;

        let kind = if directives.like.is_some() {
            PredicateKind::Like
        } else if let Some(compare) = directives.compare {
            PredicateKind::Compare(compare.into())
        } else if field.ty.is_list() {
            PredicateKind::InList
        } else {
            PredicateKind::Eq
        };

        let param = match (kind, directives.like) {
            (PredicateKind::InList, _) => self.param_base(&path.to_param_name()),
            (_, Some(like)) => self.param(path, Transform::Like(like)),
            (_, None) => self.param(path, Transform::None),
        };

        let hole = self.token(
            path.clone(),
            Action::Predicate(Predicate {
                column,
                kind,
                negate: directives.negate,
                ignore,
                param,
            }),
        );

        Expr::hole(hole)
    }

    /// `"left"."a" = "right"."b" [AND ...]` over join pairs.
    pub(super) fn pairs_eq(
        &self,
        left: &str,
        right: &str,
        pairs: &[JoinPair],
    ) -> Expr {
        let operands = pairs
            .iter()
            .map(|pair| {
                Expr::eq(
                    Expr::column(left, &self.schema.column(pair.parent).name),
                    Expr::column(right, &self.schema.column(pair.child).name),
                )
            })
            .collect();

        Expr::and_from_vec(operands).unwrap_or_else(Expr::tautology)
    }
}
