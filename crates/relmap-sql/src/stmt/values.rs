use super::{Expr, HoleId};

#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Rows(Vec<Vec<Expr>>),

    /// Rows supplied at bind time
    Hole(HoleId),
}
