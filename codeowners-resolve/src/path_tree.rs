use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NodeId(pub(crate) usize);

/// A node in a [`PathTree`]. `paths` holds the indices of the inserted paths
/// that end at this node.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) children: HashMap<String, NodeId>,
    pub(crate) paths: Vec<usize>,
}

impl Node {
    fn new() -> Self {
        Self {
            children: HashMap::new(),
            paths: Vec::new(),
        }
    }
}

/// A prefix tree of `/`-separated paths, keyed by segment. Paths that share
/// a directory share the nodes for that directory.
#[derive(Debug)]
pub(crate) struct PathTree {
    nodes: Vec<Node>,
}

impl PathTree {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node::new()],
        }
    }

    pub(crate) fn root_id() -> NodeId {
        NodeId(0)
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Insert a path, recording `index` at its final node. Empty paths are
    /// ignored.
    pub(crate) fn insert(&mut self, path: &str, index: usize) {
        if path.is_empty() {
            return;
        }

        let mut current_node = Self::root_id();
        for segment in path.split('/') {
            let child = self.nodes[current_node.0].children.get(segment);
            if let Some(&node_id) = child {
                current_node = node_id;
            } else {
                let node_id = NodeId(self.nodes.len());
                self.nodes.push(Node::new());
                self.nodes[current_node.0]
                    .children
                    .insert(segment.to_owned(), node_id);
                current_node = node_id;
            }
        }
        self.nodes[current_node.0].paths.push(index);
    }
}

impl Default for PathTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_prefixes() {
        let mut tree = PathTree::new();
        tree.insert("foo/bar", 0);
        tree.insert("foo/bar/baz", 1);
        tree.insert("foo/qux", 2);
        tree.insert("foo/bar", 3);
        tree.insert("", 4);

        let root = tree.node(PathTree::root_id());
        assert_eq!(root.children.len(), 1);
        assert!(root.paths.is_empty());

        let foo = tree.node(root.children["foo"]);
        assert_eq!(foo.children.len(), 2);

        let bar = tree.node(foo.children["bar"]);
        assert_eq!(bar.paths, vec![0, 3]);
        assert_eq!(tree.node(bar.children["baz"]).paths, vec![1]);
        assert_eq!(tree.node(foo.children["qux"]).paths, vec![2]);
    }
}
