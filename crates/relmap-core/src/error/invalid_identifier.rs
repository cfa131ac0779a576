use super::Error;

/// Error when a field cannot be matched against the schema.
///
/// Carries the qualified path of the offending field together with a
/// description of what was expected (the table, column, foreign key or
/// via-relation hop that could not be found). These are never retried: they
/// indicate a mismatch between the query specification and the schema.
#[derive(Debug)]
pub(super) struct InvalidIdentifierError {
    path: Box<str>,
    expected: Box<str>,
}

impl std::error::Error for InvalidIdentifierError {}

impl core::fmt::Display for InvalidIdentifierError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid identifier `{}`: {}", self.path, self.expected)
    }
}

impl Error {
    /// Creates an invalid identifier error for the field at `path`.
    pub fn invalid_identifier(path: impl Into<String>, expected: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidIdentifier(InvalidIdentifierError {
            path: path.into().into(),
            expected: expected.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid identifier error.
    pub fn is_invalid_identifier(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidIdentifier(_))
    }
}
