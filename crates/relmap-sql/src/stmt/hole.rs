use super::{Assignment, Expr, OrderByExpr};

use indexmap::IndexMap;
use std::fmt;

/// Identifies a placeholder in a compiled statement.
#[derive(PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct HoleId(pub usize);

/// What a hole is replaced with when the statement is rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Expr(Expr),

    /// Zero or more ordering terms. An empty list drops the item.
    OrderBy(Vec<OrderByExpr>),

    /// Zero or more SET assignments.
    Assignments(Vec<Assignment>),

    /// VALUES rows.
    Rows(Vec<Vec<Expr>>),
}

/// Bound fragments, keyed by hole.
#[derive(Debug, Clone, Default)]
pub struct Substitutions {
    fragments: IndexMap<HoleId, Fragment>,
}

impl Substitutions {
    pub fn new() -> Substitutions {
        Substitutions::default()
    }

    pub fn insert(&mut self, hole: HoleId, fragment: Fragment) {
        let prev = self.fragments.insert(hole, fragment);
        assert!(prev.is_none(), "hole {hole:?} bound twice");
    }

    pub fn get(&self, hole: HoleId) -> Option<&Fragment> {
        self.fragments.get(&hole)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl fmt::Debug for HoleId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "HoleId({})", self.0)
    }
}
