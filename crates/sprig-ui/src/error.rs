use sprig_dom::DomError;

/// Errors reported by the tag builder and widgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiError {
    /// An absent value (`None`) was passed as a child.
    AbsentChild,

    /// No element matched the selector used as a builder root.
    NoMatch(String),

    /// The widget already has an element in the document.
    AlreadyAttached(String),

    /// The document rejected an operation.
    Dom(DomError),
}

impl std::fmt::Display for UiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UiError::AbsentChild => write!(f, "Cannot append an absent value to a tag"),
            UiError::NoMatch(selector) => write!(f, "No element matches '{}'", selector),
            UiError::AlreadyAttached(id) => write!(f, "Widget '{}' is already attached", id),
            UiError::Dom(err) => write!(f, "Document error: {}", err),
        }
    }
}

impl std::error::Error for UiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UiError::Dom(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DomError> for UiError {
    fn from(err: DomError) -> Self {
        UiError::Dom(err)
    }
}

/// Result type for builder and widget operations.
pub type UiResult<T> = Result<T, UiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_dom_error_is_source() {
        let err = UiError::from(DomError::InvalidName("1x".into()));
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "Document error: Invalid name: '1x'");
        assert!(UiError::AbsentChild.source().is_none());
    }
}
