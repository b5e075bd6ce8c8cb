//! Structure Processor (C8): materialises `Folder`/`File` nodes for every
//! directory prefix of every indexed file, plus `CONTAINS` edges from each
//! parent to its immediate child (spec §4.7).

use codegraph_core::{file_id, folder_id, Edge, EdgeKind, GraphNode};
use std::collections::BTreeSet;

use crate::graph::GraphCore;

pub fn process(graph: &mut GraphCore, file_paths: &[String]) {
    let mut folders: BTreeSet<String> = BTreeSet::new();
    for path in file_paths {
        folders.extend(ancestor_folders(path));
    }

    for folder in &folders {
        let name = folder.rsplit('/').next().unwrap_or(folder);
        graph.add_node(GraphNode::folder(folder.clone(), name));
    }
    for path in file_paths {
        let name = path.rsplit('/').next().unwrap_or(path);
        graph.add_node(GraphNode::file(path.clone(), name, None));
    }

    for folder in &folders {
        if let Some(parent) = parent_of(folder) {
            add_contains(graph, &folder_id(&parent), &folder_id(folder));
        }
    }
    for path in file_paths {
        if let Some(parent) = parent_of(path) {
            add_contains(graph, &folder_id(&parent), &file_id(path));
        }
    }
}

fn add_contains(graph: &mut GraphCore, parent_id: &str, child_id: &str) {
    graph.add_relationship(Edge::new(
        EdgeKind::Contains,
        parent_id.to_string(),
        child_id.to_string(),
        1.0,
        "structural",
    ));
}

/// Every directory prefix of `path`, shallowest first, excluding the file
/// name itself — `a/b/c.rs` yields `["a", "a/b"]`.
fn ancestor_folders(path: &str) -> Vec<String> {
    let mut segments: Vec<&str> = path.split('/').collect();
    segments.pop();
    let mut acc = String::new();
    let mut out = Vec::with_capacity(segments.len());
    for segment in segments {
        if !acc.is_empty() {
            acc.push('/');
        }
        acc.push_str(segment);
        out.push(acc.clone());
    }
    out
}

fn parent_of(path: &str) -> Option<String> {
    path.rsplit_once('/').map(|(dir, _)| dir.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::NodeKind;

    fn files(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn materialises_folders_for_every_directory_prefix() {
        let mut graph = GraphCore::new();
        process(&mut graph, &files(&["src/handlers/user.ts"]));
        assert!(graph.has_node(&folder_id("src")));
        assert!(graph.has_node(&folder_id("src/handlers")));
        assert!(graph.has_node(&file_id("src/handlers/user.ts")));
    }

    #[test]
    fn emits_contains_chain_from_root_to_file() {
        let mut graph = GraphCore::new();
        process(&mut graph, &files(&["src/handlers/user.ts"]));
        let kinds: Vec<_> = graph
            .relationships()
            .iter()
            .map(|e| (e.source.clone(), e.target.clone()))
            .collect();
        assert!(kinds.contains(&(folder_id("src"), folder_id("src/handlers"))));
        assert!(kinds.contains(&(folder_id("src/handlers"), file_id("src/handlers/user.ts"))));
        assert!(graph.relationships().iter().all(|e| e.kind == EdgeKind::Contains && e.confidence == 1.0));
    }

    #[test]
    fn top_level_file_has_no_parent_folder() {
        let mut graph = GraphCore::new();
        process(&mut graph, &files(&["README.md"]));
        assert_eq!(graph.node_count(), 1);
        assert!(graph.get_node(&file_id("README.md")).unwrap().label() == NodeKind::File);
    }

    #[test]
    fn shared_ancestors_are_deduplicated() {
        let mut graph = GraphCore::new();
        process(&mut graph, &files(&["src/a.ts", "src/b.ts"]));
        let folder_nodes = graph
            .nodes()
            .iter()
            .filter(|n| n.label() == NodeKind::Folder)
            .count();
        assert_eq!(folder_nodes, 1);
    }
}
