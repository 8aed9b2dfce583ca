//! Domain layer: the node tree, its listeners and rendering
//!
//! This layer is independent of external concerns (no file I/O, no CLI, no config loading).

pub mod error;
pub mod event;
pub mod node;
pub mod render;

pub use error::{DomainError, DomainResult, ListenerError};
pub use event::{Callback, Event, ListenerRegistry, ListenerResult};
pub use node::{Node, NodePayload, NodeRef, Walk};
pub use render::{Renderer, TreeNodeConvert, DEFAULT_MARKER};
