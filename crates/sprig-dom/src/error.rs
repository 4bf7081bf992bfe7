use crate::node::NodeId;

/// Errors reported by document operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The node was released; the id no longer refers to anything.
    StaleNode(NodeId),

    /// The operation would produce an invalid tree shape.
    HierarchyRequest(String),

    /// `child` is not a child of `parent`.
    NotAChild { parent: NodeId, child: NodeId },

    /// The selector could not be parsed.
    InvalidSelector { selector: String, reason: String },

    /// Tag or attribute name with characters the document does not accept.
    InvalidName(String),

    /// The operation needs a different kind of node.
    WrongNodeKind {
        node: NodeId,
        expected: &'static str,
    },
}

impl std::fmt::Display for DomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomError::StaleNode(node) => write!(f, "Node {:?} has been released", node),
            DomError::HierarchyRequest(msg) => write!(f, "Hierarchy request error: {}", msg),
            DomError::NotAChild { parent, child } => {
                write!(f, "Node {:?} is not a child of {:?}", child, parent)
            }
            DomError::InvalidSelector { selector, reason } => {
                write!(f, "Invalid selector '{}': {}", selector, reason)
            }
            DomError::InvalidName(name) => write!(f, "Invalid name: '{}'", name),
            DomError::WrongNodeKind { node, expected } => {
                write!(f, "Node {:?} is not {}", node, expected)
            }
        }
    }
}

impl std::error::Error for DomError {}

/// Result type for document operations.
pub type DomResult<T> = Result<T, DomError>;
