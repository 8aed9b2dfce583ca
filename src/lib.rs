//! Composite node tree with per-node event listeners.
//!
//! Layers:
//! - [`domain`]: nodes, listener registries, event propagation and rendering
//! - [`application`]: tree documents, session factory, report export
//! - [`config`]: layered settings
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use domain::{DomainError, Event, Node, NodeRef, Renderer};
