use super::{Expr, HoleId};

#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// `"column" = value`
    Set { column: String, value: Expr },

    /// Zero or more assignments supplied at bind time
    Hole(HoleId),
}

impl Assignment {
    pub fn set(column: impl Into<String>, value: impl Into<Expr>) -> Assignment {
        Assignment::Set {
            column: column.into(),
            value: value.into(),
        }
    }
}
