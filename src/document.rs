use std::cmp::Ordering;
use std::ops::Range;

use thiserror::Error;

mod parse;

pub use parse::parse;

/// Index of a node inside a [`DocumentTree`] arena. Parent links are ids,
/// not pointers, so the tree stays a strict single-owner structure with
/// O(1) parent lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// Typed payload of a document node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Heading { level: u8 },
    Paragraph,
    BlockQuote,
    List { ordered: bool, start: Option<u64> },
    ListItem,
    TaskMarker { checked: bool },
    CodeBlock { language: Option<String> },
    Emphasis,
    Strong,
    Strikethrough,
    Link { destination: String },
    Image { destination: String },
    InlineCode,
    Text,
    SoftBreak,
    HardBreak,
    Rule,
}

/// One node of the parsed document. Nodes are materialized with their
/// back-references at construction and never mutated afterwards; edits
/// always replace the whole tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisualNode {
    pub source_range: Range<usize>,
    pub data: NodeData,
    parent: Option<NodeId>,
    index_in_parent: usize,
    children: Vec<NodeId>,
}

impl VisualNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn index_in_parent(&self) -> usize {
        self.index_in_parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Contract violations of the parser collaborator. These are hard
/// failures: a malformed tree means the parse step is broken, and guessing
/// would corrupt selection and undo state downstream.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("document tree has no root node")]
    MissingRoot,
    #[error("node {0:?} is not part of this tree")]
    NodeNotFound(NodeId),
    #[error("node {0:?} is detached from the root")]
    OrphanNode(NodeId),
    #[error("node {node:?} has a broken parent back-reference")]
    BrokenBackReference { node: NodeId },
    #[error("child range {child:?} escapes its parent range {parent:?}")]
    RangeOutsideParent {
        parent: Range<usize>,
        child: Range<usize>,
    },
}

/// The parsed document: an immutable tree over source byte ranges. Rebuilt
/// wholesale by [`parse`] on every source edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentTree {
    nodes: Vec<VisualNode>,
}

impl DocumentTree {
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Result<&VisualNode, TreeError> {
        self.nodes.get(id.0).ok_or(TreeError::NodeNotFound(id))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    /// All node ids in document (pre-)order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Whether `ancestor` contains `id` in the tree (a node contains
    /// itself). Unknown ids compare as `false`.
    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        if self.nodes.get(ancestor.0).is_none() {
            return false;
        }
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// The deepest common ancestor of two nodes. With a single root this
    /// always exists for known ids; anything else is a tree-contract
    /// violation.
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Result<NodeId, TreeError> {
        self.node(a)?;
        self.node(b)?;
        let mut seen = Vec::new();
        let mut current = Some(a);
        while let Some(node) = current {
            seen.push(node);
            current = self.parent(node);
        }
        let mut current = Some(b);
        while let Some(node) = current {
            if seen.contains(&node) {
                return Ok(node);
            }
            current = self.parent(node);
        }
        Err(TreeError::OrphanNode(b))
    }

    /// Document-order comparison by child index along the root paths. A
    /// node orders before its descendants.
    pub fn order(&self, a: NodeId, b: NodeId) -> Option<Ordering> {
        self.nodes.get(a.0)?;
        self.nodes.get(b.0)?;
        if a == b {
            return Some(Ordering::Equal);
        }
        let path_a = self.root_path(a);
        let path_b = self.root_path(b);
        for (step_a, step_b) in path_a.iter().zip(path_b.iter()) {
            match step_a.cmp(step_b) {
                Ordering::Equal => continue,
                other => return Some(other),
            }
        }
        Some(path_a.len().cmp(&path_b.len()))
    }

    /// Whether `id` lies between `start` and `end` (inclusive) in document
    /// order, regardless of which of the two comes first. Unknown ids are
    /// `false`, not an error.
    pub fn is_between(&self, id: NodeId, start: NodeId, end: NodeId) -> bool {
        let (Some(to_start), Some(to_end)) = (self.order(id, start), self.order(id, end)) else {
            return false;
        };
        to_start != to_end || to_start == Ordering::Equal
    }

    /// The deepest node whose source range contains the given offset.
    pub fn node_at(&self, offset: usize) -> NodeId {
        let mut current = NodeId::ROOT;
        'descend: loop {
            for &child in self.children(current) {
                let range = &self.nodes[child.0].source_range;
                if offset >= range.start && offset < range.end {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    fn root_path(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            path.push(self.nodes[node.0].index_in_parent);
            current = self.parent(node);
        }
        path.reverse();
        path
    }

    fn validate(&self) -> Result<(), TreeError> {
        let Some(root) = self.nodes.first() else {
            return Err(TreeError::MissingRoot);
        };
        if root.parent.is_some() {
            return Err(TreeError::BrokenBackReference { node: NodeId::ROOT });
        }
        for (index, node) in self.nodes.iter().enumerate().skip(1) {
            let id = NodeId(index);
            let Some(parent) = node.parent else {
                return Err(TreeError::OrphanNode(id));
            };
            let parent_node = self
                .nodes
                .get(parent.0)
                .ok_or(TreeError::NodeNotFound(parent))?;
            if parent_node.children.get(node.index_in_parent) != Some(&id) {
                return Err(TreeError::BrokenBackReference { node: id });
            }
            if node.source_range.start < parent_node.source_range.start
                || node.source_range.end > parent_node.source_range.end
            {
                return Err(TreeError::RangeOutsideParent {
                    parent: parent_node.source_range.clone(),
                    child: node.source_range.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Arena builder used by the parser front end. Nodes are appended in
/// document order, so arena order is pre-order.
pub(crate) struct TreeBuilder {
    nodes: Vec<VisualNode>,
}

impl TreeBuilder {
    pub(crate) fn new(source_len: usize) -> Self {
        Self {
            nodes: vec![VisualNode {
                source_range: 0..source_len,
                data: NodeData::Document,
                parent: None,
                index_in_parent: 0,
                children: Vec::new(),
            }],
        }
    }

    pub(crate) fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub(crate) fn push(
        &mut self,
        parent: NodeId,
        source_range: Range<usize>,
        data: NodeData,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let index_in_parent = self.nodes[parent.0].children.len();
        self.nodes[parent.0].children.push(id);
        self.nodes.push(VisualNode {
            source_range,
            data,
            parent: Some(parent),
            index_in_parent,
            children: Vec::new(),
        });
        id
    }

    pub(crate) fn build(self) -> Result<DocumentTree, TreeError> {
        let tree = DocumentTree { nodes: self.nodes };
        tree.validate()?;
        Ok(tree)
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod document_tests;
