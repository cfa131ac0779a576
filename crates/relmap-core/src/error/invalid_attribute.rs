use super::Error;

/// Error when field directives conflict or are duplicated.
///
/// Raised while compiling, before any SQL is produced. Examples: two
/// `fetch` arguments on one operation, `like` combined with an inequality,
/// or a `set` field on a select.
#[derive(Debug)]
pub(super) struct InvalidAttributeError {
    message: Box<str>,
}

impl std::error::Error for InvalidAttributeError {}

impl core::fmt::Display for InvalidAttributeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid attribute: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid attribute error.
    pub fn invalid_attribute(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidAttribute(InvalidAttributeError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid attribute error.
    pub fn is_invalid_attribute(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidAttribute(_))
    }
}
