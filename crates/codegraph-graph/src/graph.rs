//! Graph Core (C15): the in-memory typed graph every other stage reads
//! from and writes to, with insertion-ordered iteration and a by-file
//! secondary index for `removeNodesByFile` (spec §4.14).

use codegraph_core::{Edge, EdgeId, GraphNode, NodeId};
use std::collections::{HashMap, HashSet};

/// Insertion-ordered slot storage: `Some` while live, `None` once removed so
/// existing indices into `order` stay valid. `index` maps an id to its slot.
#[derive(Default)]
struct Slots<K, V> {
    order: Vec<Option<(K, V)>>,
    index: HashMap<K, usize>,
}

impl<K: std::hash::Hash + Eq + Clone, V> Slots<K, V> {
    fn insert_if_absent(&mut self, key: K, value: V) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        let slot = self.order.len();
        self.index.insert(key.clone(), slot);
        self.order.push(Some((key, value)));
        true
    }

    fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).and_then(|&slot| self.order[slot].as_ref().map(|(_, v)| v))
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.index.remove(key)?;
        self.order[slot].take().map(|(_, v)| v)
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn iter(&self) -> impl Iterator<Item = &V> {
        self.order.iter().filter_map(|entry| entry.as_ref().map(|(_, v)| v))
    }
}

/// The in-memory knowledge graph. Single-owner per spec §5: only the driver
/// mutates it, and graph construction happens entirely after extraction
/// workers return.
#[derive(Default)]
pub struct GraphCore {
    nodes: Slots<NodeId, GraphNode>,
    edges: Slots<EdgeId, Edge>,
    by_file: HashMap<String, HashSet<NodeId>>,
}

impl GraphCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: a duplicate id is a no-op, first write wins (invariant ii).
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        let id = node.id.clone();
        let file_path = node.file_path.clone();
        let inserted = self.nodes.insert_if_absent(id.clone(), node);
        if inserted {
            if let Some(path) = file_path {
                self.by_file.entry(path).or_default().insert(id);
            }
        }
        inserted
    }

    /// Idempotent on `(sourceId, type, targetId)` (invariant iii). Both
    /// endpoints must already exist (invariant i); callers are expected to
    /// have checked this upstream — `add_relationship` trusts its caller
    /// rather than re-validating, matching every processor's own lookups.
    pub fn add_relationship(&mut self, edge: Edge) -> bool {
        let id = edge.id.clone();
        self.edges.insert_if_absent(id, edge)
    }

    pub fn get_node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn has_node(&self, id: &NodeId) -> bool {
        self.nodes.get(id).is_some()
    }

    pub fn remove_node(&mut self, id: &NodeId) -> bool {
        let removed = self.nodes.remove(id);
        if let Some(node) = &removed {
            if let Some(path) = &node.file_path {
                if let Some(set) = self.by_file.get_mut(path) {
                    set.remove(id);
                }
            }
        }
        removed.is_some()
    }

    /// Removes every node whose `filePath == path` plus every edge incident
    /// to one of them, returning the number of nodes removed (spec §3
    /// lifecycle, invariant P8).
    pub fn remove_nodes_by_file(&mut self, path: &str) -> usize {
        let Some(ids) = self.by_file.remove(path) else {
            return 0;
        };
        for id in &ids {
            self.nodes.remove(id);
        }
        let stale_edges: Vec<EdgeId> = self
            .edges
            .iter()
            .filter(|e| ids.contains(&e.source) || ids.contains(&e.target))
            .map(|e| e.id.clone())
            .collect();
        for edge_id in stale_edges {
            self.edges.remove(&edge_id);
        }
        ids.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.edges.len()
    }

    /// Insertion-ordered snapshot; a fresh `Vec` per call, as specified
    /// ("nodes/relationships read as snapshot arrays").
    pub fn nodes(&self) -> Vec<&GraphNode> {
        self.nodes.iter().collect()
    }

    pub fn relationships(&self) -> Vec<&Edge> {
        self.edges.iter().collect()
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter()
    }

    pub fn iter_relationships(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn for_each_node(&self, mut f: impl FnMut(&GraphNode)) {
        for node in self.nodes.iter() {
            f(node);
        }
    }

    pub fn for_each_relationship(&self, mut f: impl FnMut(&Edge)) {
        for edge in self.edges.iter() {
            f(edge);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::EdgeKind;

    #[test]
    fn adding_the_same_node_twice_is_a_no_op() {
        let mut graph = GraphCore::new();
        assert!(graph.add_node(GraphNode::file("a.rs", "a.rs", None)));
        assert!(!graph.add_node(GraphNode::file("a.rs", "a.rs", Some("different".into()))));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn adding_the_same_edge_twice_is_a_no_op() {
        let mut graph = GraphCore::new();
        let e1 = Edge::new(EdgeKind::Calls, "a".into(), "b".into(), 0.9, "same-file");
        let e2 = Edge::new(EdgeKind::Calls, "a".into(), "b".into(), 0.5, "fuzzy-global");
        assert!(graph.add_relationship(e1));
        assert!(!graph.add_relationship(e2));
        assert_eq!(graph.relationship_count(), 1);
    }

    #[test]
    fn remove_nodes_by_file_drops_incident_edges() {
        let mut graph = GraphCore::new();
        graph.add_node(GraphNode::file("a.rs", "a.rs", None));
        graph.add_node(GraphNode::file("b.rs", "b.rs", None));
        graph.add_relationship(Edge::new(
            EdgeKind::Imports,
            "File:a.rs".into(),
            "File:b.rs".into(),
            1.0,
            "resolved",
        ));
        let removed = graph.remove_nodes_by_file("a.rs");
        assert_eq!(removed, 1);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.relationship_count(), 0);
    }

    #[test]
    fn iteration_order_matches_insertion_order() {
        let mut graph = GraphCore::new();
        graph.add_node(GraphNode::file("b.rs", "b.rs", None));
        graph.add_node(GraphNode::file("a.rs", "a.rs", None));
        let ids: Vec<&str> = graph.iter_nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["File:b.rs", "File:a.rs"]);
    }

    #[test]
    fn snapshot_survives_further_mutation() {
        let mut graph = GraphCore::new();
        graph.add_node(GraphNode::file("a.rs", "a.rs", None));
        let snapshot = graph.nodes();
        assert_eq!(snapshot.len(), 1);
        graph.add_node(GraphNode::file("b.rs", "b.rs", None));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(graph.node_count(), 2);
    }
}
