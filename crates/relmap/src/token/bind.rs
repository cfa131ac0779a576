use super::{
    Action, OrderTerm, ParamPath, Predicate, PredicateKind, RowColumn, RowNames, RowsSource, Token,
};

use relmap_core::{
    driver::Params,
    schema::db::Schema,
    spec::Ignore,
    stmt::{Path, Value},
    Error, Result,
};
use relmap_sql::stmt::{Assignment, Direction, Expr, Fragment, OrderByExpr, Substitutions};

use std::collections::HashSet;

/// Binds `args` to a compiled statement's tokens and parameters.
///
/// Tokens run first: they add parameters (IN-list elements, VALUES rows)
/// and remove parameters whose predicate collapsed. The remaining
/// parameter paths are then read from `args` in declaration order,
/// followed by the parameters the tokens added.
pub(crate) fn bind(
    schema: &Schema,
    tokens: &[Token],
    params: &[ParamPath],
    args: &Value,
) -> Result<(Substitutions, Params)> {
    let mut binder = Binder {
        schema,
        subs: Substitutions::new(),
        added: Params::new(),
        removed: HashSet::new(),
        assigned: None,
    };

    for token in tokens {
        let value = args.entry(&token.path);
        let fragment = binder.fragment(token, value)?;

        tracing::trace!(hole = ?token.hole, path = %token.path, "substituted hole");
        binder.subs.insert(token.hole, fragment);
    }

    if binder.assigned == Some(false) {
        return Err(Error::invalid_argument(
            "every SET argument was ignored; the update has nothing to assign",
        ));
    }

    let mut bound = Params::new();

    for param in params {
        if binder.removed.contains(&param.name) {
            continue;
        }

        let value = param.transform.apply(&param.path, args.entry(&param.path))?;
        bound.insert(param.name.clone(), value);
    }

    for (name, value) in binder.added {
        let prev = bound.insert(name, value);
        assert!(prev.is_none(), "derived parameter shadows a declared one");
    }

    tracing::debug!(
        holes = binder.subs.len(),
        params = bound.len(),
        "bound arguments"
    );

    Ok((binder.subs, bound))
}

struct Binder<'a> {
    schema: &'a Schema,
    subs: Substitutions,
    added: Params,
    removed: HashSet<String>,

    /// `Some(true)` once an assignment survives, `Some(false)` while every
    /// assignment seen so far was ignored.
    assigned: Option<bool>,
}

impl Binder<'_> {
    fn fragment(&mut self, token: &Token, value: &Value) -> Result<Fragment> {
        Ok(match &token.action {
            Action::Predicate(predicate) => Fragment::Expr(self.predicate(predicate, value)),
            Action::Guard { ignore, expr } => Fragment::Expr(if is_ignored(Some(*ignore), value) {
                Expr::tautology()
            } else {
                expr.clone()
            }),
            Action::OrderBy(OrderTerm::Fixed { expr }) => Fragment::OrderBy(vec![OrderByExpr::new(
                expr.clone(),
                Some(Direction::from_value(value)?),
            )]),
            Action::OrderBy(OrderTerm::Dynamic { targets }) => {
                Fragment::OrderBy(self.dynamic_order(&token.path, targets, value)?)
            }
            Action::Assign {
                column,
                param,
                ignore,
            } => {
                if is_ignored(*ignore, value) {
                    self.removed.insert(param.clone());
                    self.assigned.get_or_insert(false);
                    Fragment::Assignments(vec![])
                } else {
                    self.assigned = Some(true);
                    Fragment::Assignments(vec![Assignment::set(column, Expr::param(param))])
                }
            }
            Action::Rows(source) => Fragment::Rows(self.rows(&token.path, source, value)?),
            Action::KeyMatch { columns, param } => {
                Fragment::Expr(self.key_match(columns, param, value))
            }
        })
    }

    fn predicate(&mut self, predicate: &Predicate, value: &Value) -> Expr {
        let Predicate {
            column,
            kind,
            negate,
            ignore,
            param,
        } = predicate;

        if is_ignored(*ignore, value) {
            self.removed.insert(param.clone());
            return Expr::tautology();
        }

        match kind {
            PredicateKind::InList => self.in_list(column, *negate, param, value),
            PredicateKind::Eq | PredicateKind::Like if value.is_null() => {
                self.removed.insert(param.clone());
                if *negate {
                    Expr::is_not_null(column.clone())
                } else {
                    Expr::is_null(column.clone())
                }
            }
            PredicateKind::Eq if *negate => Expr::ne(column.clone(), Expr::param(param)),
            PredicateKind::Eq => Expr::eq(column.clone(), Expr::param(param)),
            PredicateKind::Compare(op) => {
                let op = if *negate { op.negate() } else { *op };
                Expr::binary_op(column.clone(), op, Expr::param(param))
            }
            PredicateKind::Like => Expr::like(column.clone(), Expr::param(param), *negate),
        }
    }

    /// `c IN (@p_0, ...)`, with an `IS NULL` branch for null members. A
    /// negated list uses `NOT IN` and `IS NOT NULL`.
    fn in_list(&mut self, column: &Expr, negate: bool, param: &str, value: &Value) -> Expr {
        let items = value.items();

        if items.is_empty() {
            return if negate {
                Expr::tautology()
            } else {
                Expr::contradiction()
            };
        }

        let list: Vec<Expr> = items
            .iter()
            .filter(|item| !item.is_null())
            .enumerate()
            .map(|(index, item)| {
                let name = format!("{param}_{index}");
                self.added.insert(name.clone(), item.clone());
                Expr::param(name)
            })
            .collect();

        let null_branch = items.iter().any(Value::is_null).then(|| {
            if negate {
                Expr::is_not_null(column.clone())
            } else {
                Expr::is_null(column.clone())
            }
        });

        let in_list = (!list.is_empty()).then(|| Expr::in_list(column.clone(), list, negate));

        match (in_list, null_branch) {
            (Some(in_list), Some(null_branch)) if negate => Expr::and(in_list, null_branch),
            (Some(in_list), Some(null_branch)) => Expr::or(in_list, null_branch),
            (Some(expr), None) | (None, Some(expr)) => expr,
            (None, None) => unreachable!("non-empty list without members"),
        }
    }

    fn dynamic_order(
        &self,
        path: &Path,
        targets: &[super::OrderTarget],
        value: &Value,
    ) -> Result<Vec<OrderByExpr>> {
        let mut ret = vec![];

        for entry in value.items() {
            let (column, table, direction) = match entry {
                Value::Null => continue,
                Value::String(column) => (column.as_str(), None, &Value::Null),
                Value::Record(record) => {
                    let column = match record.get("column") {
                        Some(Value::String(column)) => column.as_str(),
                        Some(other) => {
                            return Err(Error::type_conversion(other.clone(), "column name"))
                        }
                        None => {
                            return Err(Error::invalid_argument(format!(
                                "order-by argument `{path}` is missing `column`"
                            )))
                        }
                    };

                    let table = match record.get("table") {
                        Some(Value::String(table)) if !table.is_empty() => Some(table.as_str()),
                        Some(Value::Null | Value::String(_)) | None => None,
                        Some(other) => {
                            return Err(Error::type_conversion(other.clone(), "table name"))
                        }
                    };

                    let direction = record.get("direction").unwrap_or(&Value::Null);
                    (column, table, direction)
                }
                other => return Err(Error::type_conversion(other.clone(), "order-by record")),
            };

            let target = match table {
                None => &targets[0],
                Some(table) => targets
                    .iter()
                    .find(|target| {
                        self.schema
                            .table(target.table)
                            .name
                            .eq_ignore_ascii_case(table)
                            || target.path.to_string().eq_ignore_ascii_case(table)
                    })
                    .ok_or_else(|| {
                        Error::invalid_identifier(path.to_string(), format!("table `{table}`"))
                    })?,
            };

            let schema_table = self.schema.table(target.table);
            let Some(column) = schema_table.find_column(column) else {
                return Err(Error::invalid_identifier(
                    path.to_string(),
                    format!("column `{column}` on table `{}`", schema_table.name),
                ));
            };

            ret.push(OrderByExpr::new(
                Expr::column(&target.alias, &column.name),
                Some(Direction::from_value(direction)?),
            ));
        }

        Ok(ret)
    }

    fn rows(&mut self, path: &Path, source: &RowsSource, value: &Value) -> Result<Vec<Vec<Expr>>> {
        let mut level: Vec<(Option<usize>, &Value)> = value
            .items()
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| (None, item))
            .collect();

        if source.required && level.is_empty() {
            return Err(Error::invalid_argument(format!(
                "`{path}` must hold at least one row"
            )));
        }

        if matches!(source.names, RowNames::Fields(_)) && level.len() > 1 {
            return Err(Error::invalid_argument(format!(
                "`{path}` is a single entity, got {} rows",
                level.len()
            )));
        }

        for step in &source.levels {
            level = level
                .iter()
                .enumerate()
                .flat_map(|(parent, (_, element))| {
                    element
                        .entry(step)
                        .items()
                        .iter()
                        .filter(|item| !item.is_null())
                        .map(move |item| (Some(parent), item))
                })
                .collect();
        }

        let mut rows = Vec::with_capacity(level.len());

        for (index, (parent, element)) in level.into_iter().enumerate() {
            let mut row = Vec::with_capacity(source.columns.len());

            for (position, column) in source.columns.iter().enumerate() {
                row.push(match column {
                    RowColumn::Index => Expr::int(index as i64),
                    RowColumn::ParentIndex => parent.map_or_else(Expr::null, |p| Expr::int(p as i64)),
                    RowColumn::Null => Expr::null(),
                    RowColumn::Field(field) => {
                        let name = match &source.names {
                            RowNames::Fields(names) => names[position].clone(),
                            RowNames::Derived(base) => format!("{base}_r{index}_c{position}"),
                        };

                        self.added.insert(name.clone(), element.entry(field).clone());
                        Expr::param(name)
                    }
                });
            }

            rows.push(row);
        }

        Ok(rows)
    }

    /// Key equality against every non-null entity in `value`.
    fn key_match(&mut self, columns: &[(Expr, Path)], param: &str, value: &Value) -> Expr {
        let entities: Vec<&Value> = value.items().iter().filter(|v| !v.is_null()).collect();

        if entities.is_empty() {
            return Expr::contradiction();
        }

        if let [(column, field)] = columns {
            let list = entities
                .iter()
                .enumerate()
                .map(|(index, entity)| {
                    let name = format!("{param}_{index}");
                    self.added.insert(name.clone(), entity.entry(field).clone());
                    Expr::param(name)
                })
                .collect();

            return Expr::in_list(column.clone(), list, false);
        }

        let branches = entities
            .iter()
            .enumerate()
            .filter_map(|(index, entity)| {
                let operands = columns
                    .iter()
                    .enumerate()
                    .map(|(position, (column, field))| {
                        let name = format!("{param}_{index}_{position}");
                        self.added.insert(name.clone(), entity.entry(field).clone());
                        Expr::eq(column.clone(), Expr::param(name))
                    })
                    .collect();

                Expr::and_from_vec(operands).map(Expr::grouping)
            })
            .collect();

        Expr::or_from_vec(branches).unwrap_or_else(Expr::contradiction)
    }
}

fn is_ignored(ignore: Option<Ignore>, value: &Value) -> bool {
    match ignore {
        Some(Ignore::IfNull) => value.is_null(),
        Some(Ignore::IfNullOrEmpty) => value.is_null_or_empty(),
        None => false,
    }
}
