use super::Error;

/// Error when more than one junction table is an equally good candidate for
/// linking two tables.
///
/// Only raised when the compiler is configured to treat junction ambiguity
/// as fatal; otherwise the first candidate (by table order) is used and a
/// warning is logged.
#[derive(Debug)]
pub(super) struct AmbiguousRelationError {
    parent: Box<str>,
    child: Box<str>,
    candidates: Vec<String>,
}

impl std::error::Error for AmbiguousRelationError {}

impl core::fmt::Display for AmbiguousRelationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "ambiguous relation between `{}` and `{}`: junction candidates [{}]",
            self.parent,
            self.child,
            self.candidates.join(", ")
        )
    }
}

impl Error {
    /// Creates an ambiguous relation error naming both tables and every
    /// equally-minimal junction candidate.
    pub fn ambiguous_relation(
        parent: impl Into<String>,
        child: impl Into<String>,
        candidates: Vec<String>,
    ) -> Error {
        Error::from(super::ErrorKind::AmbiguousRelation(AmbiguousRelationError {
            parent: parent.into().into(),
            child: child.into().into(),
            candidates,
        }))
    }

    /// Returns `true` if this error is an ambiguous relation error.
    pub fn is_ambiguous_relation(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::AmbiguousRelation(_))
    }
}
