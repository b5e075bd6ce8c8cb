//! Heritage Processor (C10): turns extends/implements/trait-impl records
//! into typed `EXTENDS`/`IMPLEMENTS` edges (spec §4.9).

use codegraph_core::{symbol_id, Edge, EdgeKind, GraphNode, NodeId, NodeKind};
use codegraph_parser::{HeritageKind, HeritageRecord, SymbolTable};

use crate::graph::GraphCore;

/// Resolves a heritage-clause name to a node id: the first fuzzy hit
/// anywhere in the symbol table, then a synthesised `CodeElement` node
/// (spec's catch-all kind) so the edge's endpoint still exists in the
/// graph per invariant (i) even when extraction never saw a definition
/// for it (a parent defined outside the indexed tree, say).
fn resolve_or_synthesize(graph: &mut GraphCore, file_path: &str, name: &str, symbols: &SymbolTable) -> NodeId {
    if let Some(hit) = symbols.lookup_fuzzy(name).first() {
        return hit.node_id.clone();
    }
    let id = symbol_id(NodeKind::CodeElement, file_path, name, 0);
    graph.add_node(GraphNode::symbol(NodeKind::CodeElement, file_path, name, 0, 0, false, None));
    id
}

fn edge_kind_and_reason(kind: HeritageKind) -> (EdgeKind, &'static str) {
    match kind {
        HeritageKind::Extends => (EdgeKind::Extends, "extends"),
        HeritageKind::Implements => (EdgeKind::Implements, "implements"),
        HeritageKind::TraitImpl => (EdgeKind::Implements, "trait-impl"),
    }
}

pub fn process(graph: &mut GraphCore, heritage: &[HeritageRecord], symbols: &SymbolTable) {
    for record in heritage {
        if record.class_name == record.parent_name {
            continue; // self-inheritance, defensive (extraction already drops this)
        }
        let class_id = resolve_or_synthesize(graph, &record.file_path, &record.class_name, symbols);
        let parent_id = resolve_or_synthesize(graph, &record.file_path, &record.parent_name, symbols);
        let (kind, reason) = edge_kind_and_reason(record.kind);
        graph.add_relationship(Edge::new(kind, class_id, parent_id, 1.0, reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(class_name: &str, parent_name: &str, kind: HeritageKind) -> HeritageRecord {
        HeritageRecord {
            file_path: "src/dog.ts".to_string(),
            class_name: class_name.to_string(),
            parent_name: parent_name.to_string(),
            kind,
        }
    }

    #[test]
    fn extends_produces_an_extends_edge_with_full_confidence() {
        let mut graph = GraphCore::new();
        let symbols = SymbolTable::new();
        process(&mut graph, &[record("Dog", "Animal", HeritageKind::Extends)], &symbols);
        let edge = graph.relationships()[0];
        assert_eq!(edge.kind, EdgeKind::Extends);
        assert_eq!(edge.confidence, 1.0);
    }

    #[test]
    fn trait_impl_maps_to_implements_with_trait_impl_reason() {
        let mut graph = GraphCore::new();
        let symbols = SymbolTable::new();
        process(&mut graph, &[record("Foo", "Greet", HeritageKind::TraitImpl)], &symbols);
        let edge = graph.relationships()[0];
        assert_eq!(edge.kind, EdgeKind::Implements);
        assert_eq!(edge.reason, "trait-impl");
    }

    #[test]
    fn unresolved_parent_gets_a_synthesised_code_element_node() {
        let mut graph = GraphCore::new();
        let symbols = SymbolTable::new();
        process(&mut graph, &[record("Dog", "Animal", HeritageKind::Extends)], &symbols);
        assert!(graph.nodes().iter().any(|n| n.label() == NodeKind::CodeElement && n.name() == "Animal"));
    }

    #[test]
    fn self_inheritance_is_dropped() {
        let mut graph = GraphCore::new();
        let symbols = SymbolTable::new();
        process(&mut graph, &[record("Dog", "Dog", HeritageKind::Extends)], &symbols);
        assert_eq!(graph.relationship_count(), 0);
    }
}
