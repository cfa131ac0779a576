use super::{Expr, OrderBy, Select, Statement};

/// A SELECT with ordering and paging.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub select: Select,

    pub order_by: OrderBy,

    /// `OFFSET n ROWS`
    pub offset: Option<Expr>,

    /// `FETCH NEXT n ROWS ONLY`
    pub fetch: Option<Expr>,
}

impl Query {
    pub fn new(select: Select) -> Query {
        Query {
            select,
            order_by: OrderBy::default(),
            offset: None,
            fetch: None,
        }
    }

    pub fn is_paged(&self) -> bool {
        self.offset.is_some() || self.fetch.is_some()
    }
}

impl From<Select> for Query {
    fn from(value: Select) -> Self {
        Query::new(value)
    }
}

impl From<Query> for Statement {
    fn from(value: Query) -> Self {
        Statement::Query(value)
    }
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Statement::Query(value.into())
    }
}
