use super::{Comma, Delimited, Formatter, Ident, ToSql};

use crate::stmt::{self, Fragment};

impl ToSql for &stmt::Expr {
    fn to_sql(self, f: &mut Formatter<'_>) {
        use stmt::Expr::*;

        match self {
            And(expr) => {
                fmt!(f, Delimited(&expr.operands, " AND "));
            }
            BinaryOp(expr) => {
                let (lhs, rhs) = (&*expr.lhs, &*expr.rhs);
                fmt!(f, lhs " " expr.op " " rhs);
            }
            Column(expr) => expr.to_sql(f),
            CountStar => fmt!(f, "count(*)"),
            Exists(expr) => {
                let not = if expr.negated { "NOT " } else { "" };
                let subquery = &*expr.subquery;
                fmt!(f, not "EXISTS (" subquery ")");
            }
            Grouping(expr) => {
                let inner = &**expr;
                fmt!(f, "(" inner ")");
            }
            Hole(hole) => match f.fragment(*hole) {
                Fragment::Expr(expr) => expr.to_sql(f),
                fragment => panic!("{hole:?} is an expression; bound to {fragment:?}"),
            },
            InList(expr) => {
                assert!(!expr.list.is_empty(), "empty IN list");
                let not = if expr.negated { " NOT" } else { "" };
                fmt!(f, &*expr.expr not " IN (" Comma(&expr.list) ")");
            }
            IsNull(expr) => {
                if expr.negate {
                    fmt!(f, &*expr.expr " IS NOT NULL");
                } else {
                    fmt!(f, &*expr.expr " IS NULL");
                }
            }
            Like(expr) => {
                let not = if expr.negated { " NOT" } else { "" };
                let pattern = &*expr.pattern;
                fmt!(f, &*expr.expr not " LIKE " pattern);
            }
            Literal(literal) => literal.to_sql(f),
            Or(expr) => {
                fmt!(f, "(" Delimited(&expr.operands, " OR ") ")");
            }
            Param(name) => {
                fmt!(f, "@" name.as_str());
            }
        }
    }
}

impl ToSql for &stmt::ExprColumn {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match &self.qualifier {
            Some(stmt::Qualifier::Alias(alias)) => fmt!(f, Ident(alias) "." Ident(&self.name)),
            Some(stmt::Qualifier::Inserted) => fmt!(f, "inserted." Ident(&self.name)),
            None => fmt!(f, Ident(&self.name)),
        }
    }
}

impl ToSql for &stmt::Literal {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            stmt::Literal::Int(value) => fmt!(f, *value),
            stmt::Literal::String(value) => {
                f.dst.push_str("N'");
                f.dst.push_str(&value.replace('\'', "''"));
                f.dst.push('\'');
            }
            stmt::Literal::Null => fmt!(f, "NULL"),
        }
    }
}

impl ToSql for stmt::BinaryOp {
    fn to_sql(self, f: &mut Formatter<'_>) {
        f.dst.push_str(match self {
            stmt::BinaryOp::Eq => "=",
            stmt::BinaryOp::Ne => "<>",
            stmt::BinaryOp::Gt => ">",
            stmt::BinaryOp::Ge => ">=",
            stmt::BinaryOp::Lt => "<",
            stmt::BinaryOp::Le => "<=",
        })
    }
}

impl ToSql for &stmt::OrderByExpr {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, &self.expr);

        match self.direction {
            Some(stmt::Direction::Asc) => fmt!(f, " ASC"),
            Some(stmt::Direction::Desc) => fmt!(f, " DESC"),
            None => {}
        }
    }
}

impl ToSql for &stmt::Assignment {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            stmt::Assignment::Set { column, value } => fmt!(f, Ident(column) " = " value),
            stmt::Assignment::Hole(hole) => panic!("unexpanded assignment {hole:?}"),
        }
    }
}
