//! Arena-allocated syntax tree.
//!
//! Every node stores its kind, its trivia-free byte range, its ordered child
//! sequence and an optional parent. Parents are linked once after parsing
//! (`link_parents`), so speculative parses can truncate the arena freely.

use super::base::NodeIndex;
use super::syntax_kind_ext;

#[derive(Clone, Debug)]
pub struct Node {
    /// `SyntaxKind as u16` for token nodes, a `syntax_kind_ext` constant otherwise.
    pub kind: u16,
    pub pos: u32,
    pub end: u32,
    pub parent: NodeIndex,
    pub children: Vec<NodeIndex>,
}

impl Node {
    #[inline]
    pub const fn is(&self, kind: u16) -> bool {
        self.kind == kind
    }
}

#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    pub(crate) nodes: Vec<Node>,
}

impl NodeArena {
    /// Maximum pre-allocation to avoid capacity overflow in huge files.
    const MAX_NODE_PREALLOC: usize = 5_000_000;

    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    pub fn with_capacity(capacity: usize) -> NodeArena {
        NodeArena {
            nodes: Vec::with_capacity(capacity.min(Self::MAX_NODE_PREALLOC)),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_node(&mut self, kind: u16, pos: u32, end: u32, children: Vec<NodeIndex>) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            pos,
            end,
            parent: NodeIndex::NONE,
            children,
        });
        index
    }

    pub fn add_token(&mut self, kind: u16, pos: u32, end: u32) -> NodeIndex {
        self.add_node(kind, pos, end, Vec::new())
    }

    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            return None;
        }
        self.nodes.get(index.0 as usize)
    }

    pub fn kind(&self, index: NodeIndex) -> Option<u16> {
        self.get(index).map(|n| n.kind)
    }

    /// Parent of `index`, or `None` for the root and for unknown indices.
    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.get(index)
            .map(|n| n.parent)
            .filter(|p| p.is_some())
    }

    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        self.get(index).map_or(&[], |n| n.children.as_slice())
    }

    /// Set every node's parent from the child lists reachable from `root`.
    pub fn link_parents(&mut self, root: NodeIndex) {
        let mut stack = vec![root];
        while let Some(parent) = stack.pop() {
            let Some(node) = self.nodes.get(parent.0 as usize) else {
                continue;
            };
            let children = node.children.clone();
            for child in children {
                if let Some(child_node) = self.nodes.get_mut(child.0 as usize) {
                    child_node.parent = parent;
                    stack.push(child);
                }
            }
        }
    }

    /// All nodes reachable from `root` in source pre-order.
    pub fn preorder(&self, root: NodeIndex) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            let Some(node) = self.get(index) else {
                continue;
            };
            order.push(index);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    /// Describe the subtree under `index`, one node per line, for debugging.
    pub fn dump(&self, index: NodeIndex) -> String {
        let mut out = String::new();
        self.dump_into(index, 0, &mut out);
        out
    }

    fn dump_into(&self, index: NodeIndex, depth: usize, out: &mut String) {
        let Some(node) = self.get(index) else {
            return;
        };
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!(
            "{} [{}..{}]\n",
            syntax_kind_ext::kind_name(node.kind),
            node.pos,
            node.end
        ));
        for &child in &node.children {
            self.dump_into(child, depth + 1, out);
        }
    }
}
