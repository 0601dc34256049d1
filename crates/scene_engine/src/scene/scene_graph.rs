//! Arena-backed scene tree
//!
//! Nodes live in a [`SlotMap`] and refer to each other by [`NodeId`]. Every
//! node is created directly at its final [`Placement`], so a node always has
//! exactly one owner (a composite or the root set) and the graph stays a tree.
//! Removing a node removes its whole subtree; stale ids held elsewhere simply
//! stop resolving.

use slotmap::{new_key_type, SlotMap};

use super::node::{Node, NodeKind};
use super::SceneError;

new_key_type! {
    /// Stable handle to a node in a [`SceneGraph`]
    pub struct NodeId;
}

/// Where a new node is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Append to the scene root set
    Root,
    /// Append to the children of a composite node
    ChildOf(NodeId),
}

/// Hierarchical scene of nodes with an ordered root set
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, Node>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the scene holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True if `id` refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Top-level nodes in insertion order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Look up a node
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Look up a node mutably
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Look up a node, failing for stale ids
    pub fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.nodes.get(id).ok_or(SceneError::NodeNotFound(id))
    }

    /// Look up a node mutably, failing for stale ids
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes.get_mut(id).ok_or(SceneError::NodeNotFound(id))
    }

    /// Insert `node` at `placement` and return its id
    ///
    /// Fails if the requested parent does not exist or is not a composite.
    pub fn insert(&mut self, placement: Placement, mut node: Node) -> Result<NodeId, SceneError> {
        if let Placement::ChildOf(parent) = placement {
            let parent_node = self.node(parent)?;
            if !parent_node.kind.is_composite() {
                return Err(SceneError::NotComposite(parent));
            }
        }

        match placement {
            Placement::Root => Ok(self.add_root(node)),
            Placement::ChildOf(parent) => {
                Self::reset_links(&mut node);
                node.parent = Some(parent);
                let id = self.nodes.insert(node);
                if let Some(NodeKind::Composite(children)) =
                    self.nodes.get_mut(parent).map(|p| &mut p.kind)
                {
                    children.0.push(id);
                }
                Ok(id)
            }
        }
    }

    /// Insert a root node
    pub fn add_root(&mut self, mut node: Node) -> NodeId {
        Self::reset_links(&mut node);
        let id = self.nodes.insert(node);
        self.roots.push(id);
        id
    }

    // A node arriving from a clone may still carry its old family ties
    fn reset_links(node: &mut Node) {
        node.parent = None;
        if let NodeKind::Composite(children) = &mut node.kind {
            children.0.clear();
        }
    }

    /// Insert a child of a composite node
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> Result<NodeId, SceneError> {
        self.insert(Placement::ChildOf(parent), node)
    }

    /// Ids of `id` and all its descendants, depth-first, children in insertion order
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children().iter().rev().copied());
        }
        out
    }

    /// `id` followed by each of its ancestors up to the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            graph: self,
            next: Some(id),
        }
    }

    /// Depth of a node: 0 for roots
    pub fn depth(&self, id: NodeId) -> Result<usize, SceneError> {
        self.node(id)?;
        Ok(self.ancestors(id).count() - 1)
    }

    /// Remove a node and everything it owns; returns the number of nodes removed
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<usize, SceneError> {
        let parent = self.node(id)?.parent;
        match parent {
            Some(parent) => {
                if let Some(NodeKind::Composite(children)) =
                    self.nodes.get_mut(parent).map(|p| &mut p.kind)
                {
                    children.0.retain(|&child| child != id);
                }
            }
            None => self.roots.retain(|&root| root != id),
        }

        let doomed = self.subtree(id);
        for node in &doomed {
            self.nodes.remove(*node);
        }
        log::trace!("Removed subtree of {} node(s)", doomed.len());
        Ok(doomed.len())
    }

    /// Deep-copy the subtree rooted at `source` to `placement`
    ///
    /// Animation and swing state are copied with the nodes. Imported meshes are
    /// shared, not duplicated.
    pub fn clone_subtree(&mut self, source: NodeId, placement: Placement) -> Result<NodeId, SceneError> {
        let order = self.subtree(source);
        if order.is_empty() {
            return Err(SceneError::NodeNotFound(source));
        }

        // Snapshot first so cloning into the source subtree terminates
        let copies: Vec<(NodeId, Option<NodeId>, Node)> = order
            .iter()
            .filter_map(|&id| self.nodes.get(id).map(|n| (id, n.parent, n.clone())))
            .collect();

        let mut mapping = std::collections::HashMap::with_capacity(copies.len());
        let mut new_root = None;
        for (old_id, old_parent, node) in copies {
            let target = match new_root {
                None => placement,
                Some(_) => {
                    let parent = old_parent
                        .and_then(|p| mapping.get(&p).copied())
                        .ok_or(SceneError::NodeNotFound(old_id))?;
                    Placement::ChildOf(parent)
                }
            };
            let new_id = self.insert(target, node)?;
            if new_root.is_none() {
                new_root = Some(new_id);
            }
            mapping.insert(old_id, new_id);
        }

        new_root.ok_or(SceneError::NodeNotFound(source))
    }
}

/// Iterator over a node and its ancestors
pub struct Ancestors<'a> {
    graph: &'a SceneGraph,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = self.graph.nodes.get(id)?;
        self.next = node.parent;
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::scene::node::Primitive;

    fn door_frame(graph: &mut SceneGraph) -> (NodeId, NodeId, NodeId) {
        let frame = graph.add_root(Node::composite());
        let door = graph.add_child(frame, Node::composite()).unwrap();
        let pane = graph.add_child(door, Node::primitive(Primitive::Cube)).unwrap();
        (frame, door, pane)
    }

    #[test]
    fn test_insert_links_parent_and_children() {
        let mut graph = SceneGraph::new();
        let (frame, door, pane) = door_frame(&mut graph);

        assert_eq!(graph.roots(), &[frame]);
        assert_eq!(graph.node(frame).unwrap().children(), &[door]);
        assert_eq!(graph.node(pane).unwrap().parent(), Some(door));
        assert_eq!(graph.depth(pane).unwrap(), 2);
    }

    #[test]
    fn test_leaf_cannot_own_children() {
        let mut graph = SceneGraph::new();
        let leaf = graph.add_root(Node::primitive(Primitive::Cube));
        let result = graph.add_child(leaf, Node::text("no"));
        assert!(matches!(result, Err(SceneError::NotComposite(id)) if id == leaf));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_remove_subtree_drops_descendants() {
        let mut graph = SceneGraph::new();
        let (frame, door, pane) = door_frame(&mut graph);
        let other = graph.add_root(Node::primitive(Primitive::Plane));

        assert_eq!(graph.remove_subtree(door).unwrap(), 2);
        assert!(!graph.contains(pane));
        assert!(graph.node(frame).unwrap().children().is_empty());
        assert_eq!(graph.roots(), &[frame, other]);

        assert!(matches!(graph.remove_subtree(door), Err(SceneError::NodeNotFound(_))));
    }

    #[test]
    fn test_clone_subtree_is_deep_and_independent() {
        let mut graph = SceneGraph::new();
        let (frame, door, _) = door_frame(&mut graph);

        let copy = graph.clone_subtree(door, Placement::ChildOf(frame)).unwrap();
        assert_eq!(graph.len(), 5);
        assert_eq!(graph.node(frame).unwrap().children(), &[door, copy]);

        let copied_pane = graph.node(copy).unwrap().children()[0];
        graph.node_mut(copied_pane).unwrap().transform.position = Vec3::new(4.0, 0.0, 0.0);
        let original_pane = graph.node(door).unwrap().children()[0];
        assert_eq!(graph.node(original_pane).unwrap().transform.position, Vec3::zeros());
    }

    #[test]
    fn test_clone_into_own_subtree_terminates() {
        let mut graph = SceneGraph::new();
        let (frame, door, _) = door_frame(&mut graph);
        graph.clone_subtree(frame, Placement::ChildOf(door)).unwrap();
        assert_eq!(graph.len(), 6);
    }
}
