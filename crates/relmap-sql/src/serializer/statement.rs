use super::{Comma, Formatter, Ident, ToSql, Variable, STATEMENT_DELIMITER};

use crate::stmt::{self, Fragment};

impl ToSql for &stmt::Statement {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            stmt::Statement::Declare(stmt) => stmt.to_sql(f),
            stmt::Statement::Delete(stmt) => stmt.to_sql(f),
            stmt::Statement::Insert(stmt) => stmt.to_sql(f),
            stmt::Statement::Merge(stmt) => stmt.to_sql(f),
            stmt::Statement::Query(stmt) => stmt.to_sql(f),
            stmt::Statement::Update(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &stmt::Declare {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, "DECLARE " Variable(&self.name) " TABLE (" Comma(&self.columns) ")");
    }
}

impl ToSql for &stmt::ColumnDef {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let null = if self.nullable { " NULL" } else { "" };
        let ty = &self.ty;
        fmt!(f, Ident(&self.name) " " ty null);
    }
}

impl ToSql for &stmt::Delete {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let from = &self.from;
        match from {
            stmt::TableFactor::Table {
                alias: Some(alias), ..
            } => fmt!(f, "DELETE " Ident(alias) " FROM " from),
            _ => fmt!(f, "DELETE FROM " from),
        }

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }
    }
}

/// Row constructors T-SQL accepts in one `INSERT ... VALUES`.
const MAX_VALUES_ROWS: usize = 1000;

impl ToSql for &stmt::Insert {
    fn to_sql(self, f: &mut Formatter<'_>) {
        if self.columns.is_empty() {
            fmt!(f, InsertInto(self) " DEFAULT VALUES");
            return;
        }

        match &self.source {
            stmt::InsertSource::Values(values) => {
                let rows = match values {
                    stmt::Values::Rows(rows) => rows,
                    stmt::Values::Hole(hole) => match f.fragment(*hole) {
                        Fragment::Rows(rows) => rows,
                        fragment => panic!("{hole:?} is a VALUES list; bound to {fragment:?}"),
                    },
                };

                if rows.is_empty() {
                    // An empty row set inserts nothing
                    let nulls = self.columns.iter().map(|_| "NULL");
                    fmt!(f, InsertInto(self) " SELECT " Comma(nulls) " WHERE 1 = 0");
                    return;
                }

                // Longer row sets become one INSERT per chunk
                for (i, chunk) in rows.chunks(MAX_VALUES_ROWS).enumerate() {
                    if i > 0 {
                        fmt!(f, STATEMENT_DELIMITER);
                    }
                    fmt!(f, InsertInto(self) " VALUES " Comma(chunk.iter().map(Row)));
                }
            }
            stmt::InsertSource::Query(query) => {
                fmt!(f, InsertInto(self) " ");
                fmt!(f, &**query);
            }
        }
    }
}

/// `INSERT INTO <target> [(<columns>)]`
struct InsertInto<'a>(&'a stmt::Insert);

impl ToSql for InsertInto<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, "INSERT INTO ");

        match &self.0.target {
            stmt::InsertTarget::Table(name) => fmt!(f, Ident(name)),
            stmt::InsertTarget::Variable(name) => fmt!(f, Variable(name)),
        }

        if !self.0.columns.is_empty() {
            fmt!(f, " (" Comma(self.0.columns.iter().map(Ident)) ")");
        }
    }
}

struct Row<'a>(&'a Vec<stmt::Expr>);

impl ToSql for Row<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, "(" Comma(self.0) ")");
    }
}

impl ToSql for &stmt::Merge {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let (target, source, on) = (&self.target, &self.source, &self.on);
        fmt!(f, "MERGE INTO " target " USING " source " ON " on);

        let assignments = Assignments::resolve(&self.matched_update, f);
        if !assignments.0.is_empty() {
            fmt!(f, " WHEN MATCHED THEN UPDATE SET " assignments);
        }

        if let Some(insert) = &self.not_matched_insert {
            fmt!(f, " WHEN NOT MATCHED THEN INSERT");

            if insert.columns.is_empty() {
                fmt!(f, " DEFAULT VALUES");
            } else {
                fmt!(f, " (" Comma(insert.columns.iter().map(Ident)) ") VALUES (" Comma(&insert.values) ")");
            }
        }

        if let Some(output) = &self.output {
            fmt!(
                f,
                " OUTPUT " Comma(&output.exprs)
                " INTO " Variable(&output.into)
                " (" Comma(output.columns.iter().map(Ident)) ")"
            );
        }
    }
}

impl ToSql for &stmt::Query {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, &self.select);

        let mut order_by = vec![];
        for item in &self.order_by.items {
            match item {
                stmt::OrderByItem::Expr(expr) => order_by.push(expr),
                stmt::OrderByItem::Hole(hole) => match f.fragment(*hole) {
                    Fragment::OrderBy(exprs) => order_by.extend(exprs),
                    fragment => panic!("{hole:?} is an ordering; bound to {fragment:?}"),
                },
            }
        }

        if !order_by.is_empty() {
            fmt!(f, " ORDER BY " Comma(order_by));
        } else if self.is_paged() {
            // OFFSET requires an ORDER BY clause
            fmt!(f, " ORDER BY (SELECT NULL)");
        }

        match (&self.offset, &self.fetch) {
            (Some(offset), fetch) => {
                fmt!(f, " OFFSET " offset " ROWS");
                if let Some(fetch) = fetch {
                    fmt!(f, " FETCH NEXT " fetch " ROWS ONLY");
                }
            }
            (None, Some(fetch)) => {
                fmt!(f, " OFFSET 0 ROWS FETCH NEXT " fetch " ROWS ONLY");
            }
            (None, None) => {}
        }
    }
}

impl ToSql for &stmt::Select {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let distinct = if self.distinct { "DISTINCT " } else { "" };
        fmt!(f, "SELECT " distinct Comma(&self.projection));

        if let Some(from) = &self.from {
            fmt!(f, " FROM " from);
        }

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }

        if !self.group_by.is_empty() {
            fmt!(f, " GROUP BY " Comma(&self.group_by));
        }
    }
}

impl ToSql for &stmt::SelectItem {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, &self.expr);

        if let Some(alias) = &self.alias {
            fmt!(f, " AS " Ident(alias));
        }
    }
}

impl ToSql for &stmt::TableWithJoins {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, &self.relation);

        for join in &self.joins {
            let op = match join.op {
                stmt::JoinOp::Inner => " INNER JOIN ",
                stmt::JoinOp::Left => " LEFT JOIN ",
            };
            let (table, on) = (&join.table, &join.on);
            fmt!(f, op table " ON " on);
        }
    }
}

impl ToSql for &stmt::TableFactor {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            stmt::TableFactor::Table { name, alias } => {
                fmt!(f, Ident(name));
                if let Some(alias) = alias {
                    fmt!(f, " AS " Ident(alias));
                }
            }
            stmt::TableFactor::Variable { name, alias } => {
                fmt!(f, Variable(name));
                if let Some(alias) = alias {
                    fmt!(f, " AS " Ident(alias));
                }
            }
            stmt::TableFactor::Derived { query, alias } => {
                let query = &**query;
                fmt!(f, "(" query ") AS " Ident(alias));
            }
        }
    }
}

impl ToSql for &stmt::Update {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let assignments = Assignments::resolve(&self.assignments, f);
        assert!(!assignments.0.is_empty(), "UPDATE without assignments");

        fmt!(f, "UPDATE " Ident(&self.target) " SET " assignments);

        if let Some(from) = &self.from {
            fmt!(f, " FROM " from);
        }

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }
    }
}

/// SET assignments with holes expanded.
struct Assignments<'a>(Vec<&'a stmt::Assignment>);

impl<'a> Assignments<'a> {
    fn resolve(assignments: &'a [stmt::Assignment], f: &Formatter<'a>) -> Assignments<'a> {
        let mut ret = vec![];

        for assignment in assignments {
            match assignment {
                stmt::Assignment::Set { .. } => ret.push(assignment),
                stmt::Assignment::Hole(hole) => match f.fragment(*hole) {
                    Fragment::Assignments(bound) => ret.extend(bound),
                    fragment => panic!("{hole:?} is an assignment list; bound to {fragment:?}"),
                },
            }
        }

        Assignments(ret)
    }
}

impl ToSql for Assignments<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, Comma(self.0));
    }
}
