use std::fmt::Debug;

use crate::movement::Position;
use crate::state::MazeState;

/// A handle to a `SearchTreeNode` within its `SearchTree`.
///
/// Only meaningful for the tree that produced it, and only until that tree is
/// reset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SearchTreeIndex {
    index: usize,
}

impl SearchTreeIndex {
    #[inline(always)]
    fn new(index: usize) -> Self {
        Self { index }
    }
}

#[derive(Debug)]
pub struct SearchTreeNode {
    pub(crate) parent: Option<SearchTreeIndex>,
    pub(crate) children: Vec<SearchTreeIndex>,
    pub(crate) state: MazeState,
}

impl SearchTreeNode {
    fn new(state: MazeState, parent: Option<SearchTreeIndex>) -> Self {
        Self {
            parent,
            children: vec![],
            state,
        }
    }

    #[inline(always)]
    pub fn state(&self) -> &MazeState {
        &self.state
    }
    #[inline(always)]
    pub fn parent(&self) -> Option<SearchTreeIndex> {
        self.parent
    }
    #[inline(always)]
    pub fn children(&self) -> &[SearchTreeIndex] {
        &self.children
    }
}

/// A rooted tree of states, stored as an arena.
///
/// Nodes own their state and know their children. The parent link is only a
/// handle, used to walk back to the root.
pub struct SearchTree {
    nodes: Vec<SearchTreeNode>,
}

impl SearchTree {
    #[must_use]
    pub fn new(root: MazeState) -> Self {
        Self {
            nodes: vec![SearchTreeNode::new(root, None)],
        }
    }

    #[inline(always)]
    pub fn root(&self) -> SearchTreeIndex {
        SearchTreeIndex::new(0)
    }

    /// Appends `state` under `parent`, returning the new node.
    pub fn push(&mut self, parent: SearchTreeIndex, state: MazeState) -> SearchTreeIndex {
        let index = SearchTreeIndex::new(self.nodes.len());
        self.nodes.push(SearchTreeNode::new(state, Some(parent)));
        self[parent].children.push(index);
        index
    }

    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// States from the root down to `node_index`.
    #[must_use]
    pub fn path(&self, mut node_index: SearchTreeIndex) -> Vec<&MazeState> {
        let mut path = vec![self[node_index].state()];
        while let Some(parent_index) = self[node_index].parent {
            debug_assert!(parent_index < node_index);
            path.push(self[parent_index].state());
            node_index = parent_index;
        }
        path.reverse();
        path
    }

    /// Positions from the root down to `node_index`.
    #[must_use]
    pub fn positions(&self, node_index: SearchTreeIndex) -> Vec<Position> {
        self.path(node_index)
            .into_iter()
            .map(MazeState::position)
            .collect()
    }

    /// Diagnostic dump of the whole tree, one indented node per line.
    pub fn trace(&self) -> String {
        let mut out = String::new();
        let mut pending = vec![(self.root(), 0usize)];
        while let Some((index, depth)) = pending.pop() {
            out.push_str(&format!("{:indent$}{}\n", "", self[index].state(), indent = depth * 2));
            for child in self[index].children.iter().rev() {
                pending.push((*child, depth + 1));
            }
        }
        out
    }
}

impl std::ops::Index<SearchTreeIndex> for SearchTree {
    type Output = SearchTreeNode;

    #[inline(always)]
    fn index(&self, index: SearchTreeIndex) -> &Self::Output {
        &self.nodes[index.index]
    }
}

impl std::ops::IndexMut<SearchTreeIndex> for SearchTree {
    #[inline(always)]
    fn index_mut(&mut self, index: SearchTreeIndex) -> &mut SearchTreeNode {
        &mut self.nodes[index.index]
    }
}

impl std::fmt::Debug for SearchTree {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SearchTree{{({} nodes)}}", self.len())
    }
}
