use super::{
    BinaryOp, ExprAnd, ExprBinaryOp, ExprColumn, ExprExists, ExprInList, ExprIsNull, ExprLike,
    ExprOr, HoleId, Literal, Qualifier, Query,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// AND a set of expressions
    And(ExprAnd),

    /// Binary comparison
    BinaryOp(ExprBinaryOp),

    /// Column reference
    Column(ExprColumn),

    /// `count(*)`
    CountStar,

    /// `[NOT] EXISTS (subquery)`
    Exists(ExprExists),

    /// Explicit parentheses around an expression
    Grouping(Box<Expr>),

    /// Filled in when the statement is bound to arguments
    Hole(HoleId),

    /// `expr [NOT] IN (list)`
    InList(ExprInList),

    /// `expr IS [NOT] NULL`
    IsNull(ExprIsNull),

    /// `expr [NOT] LIKE pattern`
    Like(ExprLike),

    Literal(Literal),

    /// OR a set of expressions
    Or(ExprOr),

    /// Named parameter, rendered as `@name`
    Param(String),
}

impl Expr {
    /// Combines two expressions with AND, flattening nested conjunctions.
    pub fn and(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        Expr::and_from_vec(vec![lhs.into(), rhs.into()]).unwrap_or_else(Expr::tautology)
    }

    /// AND of all operands. Returns `None` when there are no operands.
    pub fn and_from_vec(operands: Vec<Expr>) -> Option<Expr> {
        let mut flat = vec![];

        for operand in operands {
            match operand {
                Expr::And(and) => flat.extend(and.operands),
                operand => flat.push(operand),
            }
        }

        match flat.len() {
            0 => None,
            1 => flat.pop(),
            _ => Some(ExprAnd { operands: flat }.into()),
        }
    }

    pub fn or(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        Expr::or_from_vec(vec![lhs.into(), rhs.into()]).unwrap_or_else(Expr::contradiction)
    }

    /// OR of all operands. Returns `None` when there are no operands.
    pub fn or_from_vec(operands: Vec<Expr>) -> Option<Expr> {
        let mut flat = vec![];

        for operand in operands {
            match operand {
                Expr::Or(or) => flat.extend(or.operands),
                operand => flat.push(operand),
            }
        }

        match flat.len() {
            0 => None,
            1 => flat.pop(),
            _ => Some(ExprOr { operands: flat }.into()),
        }
    }

    pub fn binary_op(lhs: impl Into<Expr>, op: BinaryOp, rhs: impl Into<Expr>) -> Expr {
        ExprBinaryOp {
            lhs: Box::new(lhs.into()),
            op,
            rhs: Box::new(rhs.into()),
        }
        .into()
    }

    pub fn eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        Expr::binary_op(lhs, BinaryOp::Eq, rhs)
    }

    pub fn ne(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        Expr::binary_op(lhs, BinaryOp::Ne, rhs)
    }

    /// `1 = 1`
    pub fn tautology() -> Expr {
        Expr::eq(Literal::Int(1), Literal::Int(1))
    }

    /// `1 = 0`
    pub fn contradiction() -> Expr {
        Expr::eq(Literal::Int(1), Literal::Int(0))
    }

    pub fn is_tautology(&self) -> bool {
        *self == Expr::tautology()
    }

    /// A column qualified by a table alias.
    pub fn column(alias: impl Into<String>, name: impl Into<String>) -> Expr {
        ExprColumn {
            qualifier: Some(Qualifier::Alias(alias.into())),
            name: name.into(),
        }
        .into()
    }

    pub fn unqualified(name: impl Into<String>) -> Expr {
        ExprColumn {
            qualifier: None,
            name: name.into(),
        }
        .into()
    }

    /// A column of the `inserted` pseudo table inside an OUTPUT clause.
    pub fn inserted(name: impl Into<String>) -> Expr {
        ExprColumn {
            qualifier: Some(Qualifier::Inserted),
            name: name.into(),
        }
        .into()
    }

    pub fn param(name: impl Into<String>) -> Expr {
        Expr::Param(name.into())
    }

    pub fn int(value: i64) -> Expr {
        Expr::Literal(Literal::Int(value))
    }

    pub fn null() -> Expr {
        Expr::Literal(Literal::Null)
    }

    pub fn is_null(expr: impl Into<Expr>) -> Expr {
        ExprIsNull {
            expr: Box::new(expr.into()),
            negate: false,
        }
        .into()
    }

    pub fn is_not_null(expr: impl Into<Expr>) -> Expr {
        ExprIsNull {
            expr: Box::new(expr.into()),
            negate: true,
        }
        .into()
    }

    pub fn exists(subquery: impl Into<Query>) -> Expr {
        ExprExists {
            subquery: Box::new(subquery.into()),
            negated: false,
        }
        .into()
    }

    pub fn not_exists(subquery: impl Into<Query>) -> Expr {
        ExprExists {
            subquery: Box::new(subquery.into()),
            negated: true,
        }
        .into()
    }

    pub fn like(expr: impl Into<Expr>, pattern: impl Into<Expr>, negated: bool) -> Expr {
        ExprLike {
            expr: Box::new(expr.into()),
            pattern: Box::new(pattern.into()),
            negated,
        }
        .into()
    }

    pub fn in_list(expr: impl Into<Expr>, list: Vec<Expr>, negated: bool) -> Expr {
        ExprInList {
            expr: Box::new(expr.into()),
            list,
            negated,
        }
        .into()
    }

    pub fn grouping(expr: impl Into<Expr>) -> Expr {
        Expr::Grouping(Box::new(expr.into()))
    }

    pub fn hole(id: HoleId) -> Expr {
        Expr::Hole(id)
    }

    pub fn is_hole(&self) -> bool {
        matches!(self, Expr::Hole(_))
    }
}

impl From<Literal> for Expr {
    fn from(value: Literal) -> Self {
        Expr::Literal(value)
    }
}

impl From<HoleId> for Expr {
    fn from(value: HoleId) -> Self {
        Expr::Hole(value)
    }
}
