//! Textual dumps of a node tree.

use std::io::{self, Write};
use std::rc::Rc;

use termtree::Tree;
use tracing::instrument;

use crate::domain::error::DomainResult;
use crate::domain::node::{Node, NodeRef};

pub const DEFAULT_MARKER: char = '-';

/// Depth-first dump, one line per node: the label, prefixed at depth `d > 0`
/// by `d` markers and a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    marker: char,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

impl Renderer {
    pub fn new(marker: char) -> Self {
        Self { marker }
    }

    pub fn marker(&self) -> char {
        self.marker
    }

    /// Indentation for `depth`: empty at the root.
    pub fn indent(&self, depth: usize) -> String {
        if depth == 0 {
            return String::new();
        }
        let mut indent: String = std::iter::repeat(self.marker).take(depth).collect();
        indent.push(' ');
        indent
    }

    /// Write `root` starting at depth 0.
    pub fn render<W: Write>(&self, root: &NodeRef, out: &mut W) -> DomainResult<()> {
        self.render_at(root, 0, out)
    }

    /// Write `root` as if it sat at `depth`. Stops at the first write error.
    #[instrument(level = "debug", skip(self, root, out), fields(root = %root.label()))]
    pub fn render_at<W: Write>(&self, root: &NodeRef, depth: usize, out: &mut W) -> DomainResult<()> {
        for line in self.lines(root, depth) {
            out.write_all(line.as_bytes())?;
        }
        Ok(())
    }

    pub fn render_to_string(&self, root: &NodeRef) -> String {
        self.lines(root, 0).collect()
    }

    /// Newline-terminated lines of `root`.
    fn lines<'a>(&'a self, root: &NodeRef, depth: usize) -> impl Iterator<Item = String> + 'a {
        root.walk()
            .map(move |(level, node)| format!("{}{}\n", self.indent(depth + level), node.label()))
    }
}

impl Node {
    /// Render this subtree to `out` with the default marker.
    pub fn render<W: Write>(self: &Rc<Self>, out: &mut W) -> DomainResult<()> {
        Renderer::default().render(self, out)
    }

    /// Render this subtree to standard output with the default marker.
    pub fn render_stdout(self: &Rc<Self>) -> DomainResult<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.render(&mut lock)
    }
}

/// Conversion into a `termtree::Tree` for box-drawing display.
pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for NodeRef {
    #[instrument(level = "trace", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self
            .children()
            .iter()
            .map(|child| child.to_tree_string())
            .collect();
        Tree::new(self.describe()).with_leaves(leaves)
    }
}
