use super::{Direction, Expr, HoleId};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderBy {
    pub items: Vec<OrderByItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderByItem {
    Expr(OrderByExpr),

    /// Ordering terms supplied at bind time
    Hole(HoleId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub expr: Expr,
    pub direction: Option<Direction>,
}

impl OrderBy {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: impl Into<OrderByItem>) {
        self.items.push(item.into());
    }
}

impl OrderByExpr {
    pub fn new(expr: impl Into<Expr>, direction: Option<Direction>) -> OrderByExpr {
        OrderByExpr {
            expr: expr.into(),
            direction,
        }
    }
}

impl From<OrderByExpr> for OrderByItem {
    fn from(value: OrderByExpr) -> Self {
        OrderByItem::Expr(value)
    }
}

impl From<HoleId> for OrderByItem {
    fn from(value: HoleId) -> Self {
        OrderByItem::Hole(value)
    }
}
