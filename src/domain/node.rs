//! Composite node tree.
//!
//! There is one node type. A node without children is a leaf, a node with
//! children is a composite; traversal never distinguishes the two.

use std::cell::Cell;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::event::{Event, ListenerRegistry, ListenerResult};

/// Shared handle to a node. Ownership of children is still exclusive:
/// a node appears under at most one parent.
pub type NodeRef = Rc<Node>;

/// Kind-specific attributes carried by a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodePayload {
    Image { src: String, alt: String },
    Container { inner_text: Option<String> },
    Generic { attributes: BTreeMap<String, String> },
}

impl fmt::Display for NodePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodePayload::Image { src, alt } => write!(f, "src={} alt={}", src, alt),
            NodePayload::Container { inner_text: Some(text) } => write!(f, "text={}", text),
            NodePayload::Container { inner_text: None } => Ok(()),
            NodePayload::Generic { attributes } => {
                let pairs: Vec<String> = attributes
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect();
                write!(f, "{}", pairs.join(" "))
            }
        }
    }
}

/// Tree element: label, kind payload, children fixed at construction, and
/// its own listener registry.
pub struct Node {
    label: String,
    payload: NodePayload,
    children: Vec<NodeRef>,
    listeners: ListenerRegistry,
    parented: Cell<bool>,
}

impl Node {
    /// Build a node that adopts `children`.
    ///
    /// Fails without adopting anything if a child already has a parent or is
    /// listed twice.
    pub fn new(
        label: impl Into<String>,
        payload: NodePayload,
        children: Vec<NodeRef>,
    ) -> DomainResult<NodeRef> {
        let mut seen: HashSet<*const Node> = HashSet::with_capacity(children.len());
        for child in &children {
            if child.parented.get() || !seen.insert(Rc::as_ptr(child)) {
                return Err(DomainError::DuplicateNode {
                    label: child.label.clone(),
                });
            }
        }
        for child in &children {
            child.parented.set(true);
        }
        Ok(Rc::new(Self {
            label: label.into(),
            payload,
            children,
            listeners: ListenerRegistry::new(),
            parented: Cell::new(false),
        }))
    }

    fn new_leaf(label: impl Into<String>, payload: NodePayload) -> NodeRef {
        Rc::new(Self {
            label: label.into(),
            payload,
            children: Vec::new(),
            listeners: ListenerRegistry::new(),
            parented: Cell::new(false),
        })
    }

    /// Leaf with arbitrary attributes.
    pub fn leaf(label: impl Into<String>, attributes: BTreeMap<String, String>) -> NodeRef {
        Self::new_leaf(label, NodePayload::Generic { attributes })
    }

    /// `img` leaf.
    pub fn image(src: impl Into<String>, alt: impl Into<String>) -> NodeRef {
        Self::new_leaf(
            "img",
            NodePayload::Image {
                src: src.into(),
                alt: alt.into(),
            },
        )
    }

    /// Composite with no extra attributes.
    pub fn composite(label: impl Into<String>, children: Vec<NodeRef>) -> DomainResult<NodeRef> {
        Self::new(
            label,
            NodePayload::Generic {
                attributes: BTreeMap::new(),
            },
            children,
        )
    }

    /// `div` composite.
    pub fn container(children: Vec<NodeRef>, inner_text: Option<String>) -> DomainResult<NodeRef> {
        Self::new("div", NodePayload::Container { inner_text }, children)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn payload(&self) -> &NodePayload {
        &self.payload
    }

    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_composite(&self) -> bool {
        !self.is_leaf()
    }

    /// Whether a composite has adopted this node.
    pub fn has_parent(&self) -> bool {
        self.parented.get()
    }

    /// Label followed by payload attributes, e.g. `img src=1.png alt=first`.
    pub fn describe(&self) -> String {
        let attributes = self.payload.to_string();
        if attributes.is_empty() {
            self.label.clone()
        } else {
            format!("{} {}", self.label, attributes)
        }
    }

    /// Register a listener on this node only.
    pub fn on<F>(&self, event_name: impl Into<String>, callback: F)
    where
        F: Fn(&Event) -> ListenerResult + 'static,
    {
        self.listeners.register(event_name, callback);
    }

    /// Deliver `event_name` to this node's listeners, then to every
    /// descendant in pre-order.
    ///
    /// Each node receives an [`Event`] whose `source` is that node. The first
    /// failing listener aborts delivery to all nodes not yet visited; already
    /// invoked listeners are not rolled back.
    #[instrument(level = "debug", skip(self), fields(root = %self.label))]
    pub fn emit(self: &Rc<Self>, event_name: &str) -> DomainResult<()> {
        for (depth, node) in self.walk() {
            let event = Event::new(event_name, Rc::clone(&node));
            node.listeners
                .invoke(&event)
                .map_err(|source| DomainError::ListenerFailed {
                    event: event_name.to_string(),
                    label: node.label.clone(),
                    source,
                })?;
            debug!("delivered '{}' to <{}> at depth {}", event_name, node.label, depth);
        }
        Ok(())
    }

    /// Pre-order depth-first iterator over this subtree, yielding
    /// `(depth, node)` with depth 0 for `self`.
    pub fn walk(self: &Rc<Self>) -> Walk {
        Walk::new(Rc::clone(self))
    }

    /// Number of nodes in this subtree.
    pub fn node_count(self: &Rc<Self>) -> usize {
        self.walk().count()
    }

    /// Number of levels in this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| child.depth())
            .max()
            .unwrap_or(0)
    }

    /// Labels of all leaves, left to right.
    pub fn leaf_labels(&self) -> Vec<String> {
        if self.is_leaf() {
            vec![self.label.clone()]
        } else {
            self.children
                .iter()
                .flat_map(|child| child.leaf_labels())
                .collect()
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("label", &self.label)
            .field("payload", &self.payload)
            .field("listeners", &self.listeners)
            .field("children", &self.children)
            .finish()
    }
}

/// Stack-based pre-order walk.
///
/// A node's children are pushed when the node itself is yielded, so each
/// level is read as it is at the moment it is visited.
pub struct Walk {
    stack: Vec<(usize, NodeRef)>,
}

impl Walk {
    fn new(root: NodeRef) -> Self {
        Self {
            stack: vec![(0, root)],
        }
    }
}

impl Iterator for Walk {
    type Item = (usize, NodeRef);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        // Reverse push for left-to-right traversal
        for child in node.children.iter().rev() {
            self.stack.push((depth + 1, Rc::clone(child)));
        }
        Some((depth, node))
    }
}
