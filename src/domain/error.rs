//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Error returned by a listener callback.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Domain errors represent tree contract violations and aborted traversals.
#[derive(Error, Debug)]
pub enum DomainError {
    /// A listener failed; propagation stopped at this node.
    #[error("listener for '{event}' on <{label}> failed: {source}")]
    ListenerFailed {
        event: String,
        label: String,
        #[source]
        source: ListenerError,
    },

    /// The same node was handed to a composite more than once.
    #[error("node <{label}> appears more than once in the tree")]
    DuplicateNode { label: String },

    #[error("render output failed: {0}")]
    Render(#[from] std::io::Error),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
