use relmap_core::spec::Compare;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl BinaryOp {
    pub fn is_eq(self) -> bool {
        matches!(self, Self::Eq)
    }

    /// Logical negation of the comparison.
    pub fn negate(self) -> BinaryOp {
        match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
            Self::Gt => Self::Le,
            Self::Ge => Self::Lt,
            Self::Lt => Self::Ge,
            Self::Le => Self::Gt,
        }
    }
}

impl From<Compare> for BinaryOp {
    fn from(value: Compare) -> Self {
        match value {
            Compare::Gt => Self::Gt,
            Compare::Ge => Self::Ge,
            Compare::Lt => Self::Lt,
            Compare::Le => Self::Le,
        }
    }
}
