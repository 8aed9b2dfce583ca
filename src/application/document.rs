//! TOML tree documents.
//!
//! A document describes one root node; nested `[[children]]` tables describe
//! its subtree and `[[listeners]]` tables attach recording listeners.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Node, NodePayload, NodeRef};

/// Declarative description of a node and its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_text: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub listeners: Vec<ListenerSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

/// Listener declared in a document: records `message` when it fires and,
/// with `fail = true`, then fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListenerSpec {
    pub event: String,
    pub message: String,
    #[serde(default)]
    pub fail: bool,
}

/// One listener call recorded by a document listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub event: String,
    /// `describe()` of the node the event was delivered on
    pub node: String,
    pub message: String,
}

/// Shared, append-only record of document listener calls.
#[derive(Debug, Clone, Default)]
pub struct DeliveryLog {
    entries: Rc<RefCell<Vec<Delivery>>>,
}

impl DeliveryLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, delivery: Delivery) {
        self.entries.borrow_mut().push(delivery);
    }

    pub fn entries(&self) -> Vec<Delivery> {
        self.entries.borrow().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .map(|d| d.message.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// Loader for tree documents.
pub struct TreeDocument;

impl TreeDocument {
    #[instrument(level = "debug")]
    pub fn load(path: &Path) -> ApplicationResult<NodeSpec> {
        let content = fs::read_to_string(path).with_path_context("read tree document", path)?;
        Self::parse(&content, path)
    }

    /// Parse document text; `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path) -> ApplicationResult<NodeSpec> {
        let spec: NodeSpec = toml::from_str(content).map_err(|e| ApplicationError::Document {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        spec.validate(path)?;
        debug!("parsed tree document {}", path.display());
        Ok(spec)
    }
}

impl NodeSpec {
    fn validate(&self, path: &Path) -> ApplicationResult<()> {
        let invalid = |message: String| ApplicationError::Document {
            path: path.to_path_buf(),
            message,
        };
        match self.label.as_str() {
            "" => return Err(invalid("empty label".to_string())),
            "img" => {
                if !self.children.is_empty() {
                    return Err(invalid("<img> cannot have children".to_string()));
                }
                if self.src.is_none() {
                    return Err(invalid("<img> requires src".to_string()));
                }
            }
            "div" => {}
            other => {
                if self.src.is_some() || self.alt.is_some() || self.inner_text.is_some() {
                    return Err(invalid(format!(
                        "<{}> only supports [attributes]",
                        other
                    )));
                }
            }
        }
        self.children.iter().try_for_each(|child| child.validate(path))
    }

    fn payload(&self) -> NodePayload {
        match self.label.as_str() {
            "img" => NodePayload::Image {
                src: self.src.clone().unwrap_or_default(),
                alt: self.alt.clone().unwrap_or_default(),
            },
            "div" => NodePayload::Container {
                inner_text: self.inner_text.clone(),
            },
            _ => NodePayload::Generic {
                attributes: self.attributes.clone(),
            },
        }
    }

    /// Build the node tree, wiring every declared listener to `log`.
    #[instrument(level = "debug", skip(self, log), fields(label = %self.label))]
    pub fn build(&self, log: &DeliveryLog) -> ApplicationResult<NodeRef> {
        let children = self
            .children
            .iter()
            .map(|child| child.build(log))
            .collect::<ApplicationResult<Vec<_>>>()?;
        let node = Node::new(self.label.clone(), self.payload(), children)?;

        for listener in &self.listeners {
            let log = log.clone();
            let listener = listener.clone();
            node.on(listener.event.clone(), move |event| {
                info!("{}", listener.message);
                log.push(Delivery {
                    event: event.name.clone(),
                    node: event.source.describe(),
                    message: listener.message.clone(),
                });
                if listener.fail {
                    return Err(listener.message.clone().into());
                }
                Ok(())
            });
        }
        Ok(node)
    }

    /// Number of nodes described, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }
}

/// Default document file name searched by the CLI.
pub fn default_document_path(dir: &Path) -> PathBuf {
    dir.join("tree.toml")
}
