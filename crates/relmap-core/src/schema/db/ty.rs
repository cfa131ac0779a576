/// Database storage types.
///
/// Used when declaring table variables for lookup and output tables, so the
/// declared column types match the target table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Boolean,

    /// A signed integer of `n` bytes
    Integer(u8),

    Float,

    /// Unbounded unicode text
    Text,

    /// Bounded unicode text of at most `n` characters
    VarChar(u64),

    Binary,

    Uuid,

    DateTime,

    /// Any other storage type, rendered verbatim
    Custom(String),
}
