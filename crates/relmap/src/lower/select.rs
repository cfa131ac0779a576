use super::{predicate::Filter, Lower};
use crate::{
    relation::{RelationId, RelationNode, Relations},
    token::Transform,
};

use relmap_core::{spec::Output, Error, Result};
use relmap_sql::stmt::{
    Expr, Join, JoinOp, OrderByExpr, OrderByItem, Query, Select, TableFactor, TableWithJoins,
};

impl<'a> Lower<'a> {
    pub(super) fn select(&mut self) -> Result<(Query, Relations)> {
        let mut relations = match &self.spec.output {
            Some(output) => self.resolver.resolve(self.table, output)?,
            None => Relations::new(self.table),
        };

        let mut filters = vec![];
        for arg in self.args.filters.clone() {
            filters.push(self.filter(Some(&mut relations), arg)?);
        }

        // Join-relation filters may have merged in new navigations.
        relations.anchor_keys(self.schema);

        let order = self.order_items(&relations)?;
        let paged = self.args.is_paged();

        let query = match self.spec.output_kind {
            Output::Count => {
                if paged {
                    return Err(Error::invalid_attribute("a count cannot be paged"));
                }
                self.count(&relations, filters)
            }
            _ if paged && relations.has_joins() => self.key_window(&relations, filters, order)?,
            _ => {
                let mut select = Select::new(self.from_clause(&relations, JoinOp::Left, |_| true));
                self.project(&mut select, &relations);

                for filter in filters {
                    select.add_filter(filter.expr);
                }

                let mut query = Query::new(select);
                query.order_by.items = order;

                if paged {
                    self.page(&mut query, &relations.root().alias);
                }

                query
            }
        };

        Ok((query, relations))
    }

    /// Every projected column, aliased by its dotted output path.
    fn project(&self, select: &mut Select, relations: &Relations) {
        for node in relations.iter() {
            for column in &node.columns {
                select.project(
                    Expr::column(&node.alias, &self.schema.column(column.column).name),
                    Some(node.column_alias(column)),
                );
            }
        }
    }

    /// Appends the root key as a tie-breaker and binds offset and fetch.
    fn page(&mut self, query: &mut Query, alias: &str) {
        for key in self.root_key(alias) {
            query.order_by.push(OrderByExpr::new(key, None));
        }

        let tree = self.args_tree();

        if let Some(offset) = self.args.offset {
            let name = self.param(&tree.path(offset.id), Transform::Required);
            query.offset = Some(Expr::param(name));
        }

        if let Some(fetch) = self.args.fetch {
            let name = self.param(&tree.path(fetch.id), Transform::Required);
            query.fetch = Some(Expr::param(name));
        }
    }

    /// `SELECT count(*) FROM (SELECT DISTINCT <root key> FROM ... WHERE ...) AS "__count"`
    fn count(&self, relations: &Relations, filters: Vec<Filter>) -> Query {
        let root = relations.root();
        let mut inner = Select::new(self.from_clause(relations, JoinOp::Left, |_| true));

        if self.table.has_primary_key() {
            inner.distinct = true;
            for column in self.table.primary_key_columns() {
                inner.project(
                    Expr::column(&root.alias, &column.name),
                    Some(column.name.clone()),
                );
            }
        } else {
            inner.project(Expr::int(1), Some("__one".to_string()));
        }

        for filter in filters {
            inner.add_filter(filter.expr);
        }

        let mut outer = Select::new(TableFactor::Derived {
            query: Box::new(Query::new(inner)),
            alias: "__count".to_string(),
        });
        outer.project(Expr::CountStar, None);

        Query::new(outer)
    }

    /// Pages root keys in a derived table joined only through to-one
    /// navigations, then joins the page back to the full shape. Joining a
    /// collection before paging would page joined rows instead of roots.
    fn key_window(
        &mut self,
        relations: &Relations,
        filters: Vec<Filter>,
        order: Vec<OrderByItem>,
    ) -> Result<Query> {
        if !self.table.has_primary_key() {
            return Err(Error::invalid_attribute(format!(
                "paging across joins requires a primary key on `{}`",
                self.table.name
            )));
        }

        let root = relations.root();

        let mut inner = Select::new(self.from_clause(relations, JoinOp::Left, |node| {
            relations.is_to_one(node.id)
        }));

        for column in self.table.primary_key_columns() {
            inner.project(
                Expr::column(&root.alias, &column.name),
                Some(column.name.clone()),
            );
        }

        let mut outer_filters = vec![];

        for filter in filters {
            match filter.target {
                Some(id) if !relations.is_to_one(id) => {
                    inner.add_filter(self.exists_along(relations, id, filter.expr.clone()));
                    outer_filters.push(filter.expr);
                }
                _ => inner.add_filter(filter.expr),
            }
        }

        let mut window = Query::new(inner);
        window.order_by.items = order.clone();
        self.page(&mut window, &root.alias);

        let page = self.options.key_window_alias.clone();
        let on = Expr::and_from_vec(
            self.table
                .primary_key_columns()
                .map(|column| {
                    Expr::eq(
                        Expr::column(&page, &column.name),
                        Expr::column(&root.alias, &column.name),
                    )
                })
                .collect(),
        )
        .unwrap_or_else(Expr::tautology);

        let mut from = TableWithJoins::from(TableFactor::Derived {
            query: Box::new(window),
            alias: page,
        });
        from.joins.push(Join {
            table: self.table_factor(root),
            op: JoinOp::Inner,
            on,
        });

        for node in relations.iter().filter(|node| node.is_joined()) {
            from.joins.push(Join {
                table: self.table_factor(node),
                op: JoinOp::Left,
                on: self.join_condition(relations, node.id),
            });
        }

        let mut outer = Select {
            from: Some(from),
            ..Select::default()
        };
        self.project(&mut outer, relations);

        for expr in outer_filters {
            outer.add_filter(expr);
        }

        let mut query = Query::new(outer);
        query.order_by.items = order;
        for key in self.root_key(&root.alias) {
            query.order_by.push(OrderByExpr::new(key, None));
        }

        Ok(query)
    }

    /// `EXISTS` over the collection chain leading to `id`, correlated with
    /// its nearest to-one ancestor.
    fn exists_along(&self, relations: &Relations, id: RelationId, expr: Expr) -> Expr {
        let mut chain: Vec<&RelationNode> = relations
            .lineage(id)
            .take_while(|node| !relations.is_to_one(node.id))
            .collect();
        chain.reverse();

        let first = chain[0];
        let mut from = TableWithJoins::from(self.table_factor(first));

        for node in &chain[1..] {
            from.joins.push(Join {
                table: self.table_factor(node),
                op: JoinOp::Inner,
                on: self.join_condition(relations, node.id),
            });
        }

        let mut select = Select::new(from);
        select.project(Expr::int(1), None);
        select.add_filter(self.join_condition(relations, first.id));
        select.add_filter(expr);

        Expr::exists(select)
    }
}
