//! Pipeline-level integration tests for the end-to-end scenarios and
//! invariants named in spec §8, run against the real `codegraph_graph::run`
//! driver rather than individual processor functions.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use codegraph_core::{
    CodeGraphError, Edge, GraphNode, NeverCancelled, NodeKind, NodeProperties, NullProgressSink,
    PipelineConfig, Result, StorageWriter,
};

struct CollectingWriter {
    nodes: Vec<GraphNode>,
    edges: Vec<Edge>,
}

impl CollectingWriter {
    fn new() -> Self {
        Self { nodes: Vec::new(), edges: Vec::new() }
    }
}

#[async_trait]
impl StorageWriter for CollectingWriter {
    async fn write_node(&mut self, node: &GraphNode) -> Result<()> {
        self.nodes.push(node.clone());
        Ok(())
    }
    async fn write_edge(&mut self, edge: &Edge) -> Result<()> {
        self.edges.push(edge.clone());
        Ok(())
    }
    async fn finalize(&mut self) -> Result<()> {
        Ok(())
    }
}

fn write_file(dir: &std::path::Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// Scenario 1: a five-file TypeScript mini-repo where `handleRequest` calls
/// three siblings directly by name.
#[tokio::test]
async fn mini_repo_pipeline_produces_the_documented_shape() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "src/handler.ts",
        "import { validateInput } from './validator';\n\
         import { saveToDb } from './db';\n\
         import { formatResponse } from './formatter';\n\
         export class RequestHandler {}\n\
         export function handleRequest() {\n\
           validateInput();\n\
           saveToDb();\n\
           formatResponse();\n\
         }\n",
    );
    // Every branch out of handleRequest continues one further hop to the
    // same terminal, so whichever edge the greedy single-path traversal
    // (spec §4.13 step 2) picks, the resulting trace still clears minSteps.
    write_file(
        dir.path(),
        "src/validator.ts",
        "import { finalizeRequest } from './finalize';\n\
         export function validateInput() { finalizeRequest(); }\n",
    );
    write_file(
        dir.path(),
        "src/db.ts",
        "import { finalizeRequest } from './finalize';\n\
         export function saveToDb() { finalizeRequest(); }\n",
    );
    write_file(
        dir.path(),
        "src/formatter.ts",
        "import { finalizeRequest } from './finalize';\n\
         export function formatResponse() { finalizeRequest(); }\n",
    );
    write_file(dir.path(), "src/finalize.ts", "export function finalizeRequest() {}\n");
    write_file(dir.path(), "src/index.ts", "export * from './handler';\n");

    let config = PipelineConfig::default();
    let mut writer = CollectingWriter::new();
    let report = codegraph_graph::run(dir.path(), &config, &NullProgressSink, &NeverCancelled, &mut writer)
        .await
        .unwrap();

    assert_eq!(report.total_file_count, 6);
    assert!(report.failed_files.is_empty());

    let file_paths: HashSet<&str> = writer
        .nodes
        .iter()
        .filter(|n| n.label() == NodeKind::File)
        .map(|n| n.file_path.as_deref().unwrap())
        .collect();
    for expected in [
        "src/handler.ts",
        "src/validator.ts",
        "src/db.ts",
        "src/formatter.ts",
        "src/finalize.ts",
        "src/index.ts",
    ] {
        assert!(file_paths.contains(expected), "missing File node for {expected}");
    }

    let symbol_names: HashSet<&str> =
        writer.nodes.iter().filter(|n| n.label().is_symbol()).map(|n| n.name()).collect();
    for expected in ["handleRequest", "validateInput", "saveToDb", "formatResponse", "RequestHandler"] {
        assert!(symbol_names.contains(expected), "missing symbol {expected}");
    }

    let handle_request_id = writer
        .nodes
        .iter()
        .find(|n| n.label().is_symbol() && n.name() == "handleRequest")
        .map(|n| n.id.clone())
        .unwrap();

    let calls_from_handler: HashSet<String> = writer
        .edges
        .iter()
        .filter(|e| e.kind == codegraph_core::EdgeKind::Calls && e.source == handle_request_id)
        .map(|e| e.target.clone())
        .collect();
    assert!(calls_from_handler.len() >= 3, "expected >=3 CALLS edges from handleRequest");

    let called_names: HashSet<&str> = writer
        .nodes
        .iter()
        .filter(|n| calls_from_handler.contains(&n.id))
        .map(|n| n.name())
        .collect();
    for expected in ["validateInput", "saveToDb", "formatResponse"] {
        assert!(called_names.contains(expected));
    }

    assert!(writer.edges.iter().any(|e| e.kind == codegraph_core::EdgeKind::Imports));
    assert!(writer.nodes.iter().any(|n| n.label() == NodeKind::Community));

    let process_with_handler_entry = writer.nodes.iter().find(|n| {
        n.label() == NodeKind::Process
            && matches!(&n.properties, NodeProperties::Process(p) if p.step_count >= 3 && p.entry_point_id == handle_request_id)
    });
    assert!(process_with_handler_entry.is_some(), "expected a process entered at handleRequest with stepCount >= 3");
}

/// Scenario 4: a 3-cycle of mutually calling functions must not loop the
/// driver and every resulting trace must stay acyclic (P4).
#[tokio::test]
async fn cyclic_call_graph_is_handled_without_repeating_nodes_in_a_trace() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "src/cycle.ts",
        "export function a() { b(); }\n\
         export function b() { c(); }\n\
         export function c() { a(); }\n",
    );

    let config = PipelineConfig::default();
    let mut writer = CollectingWriter::new();
    let report = codegraph_graph::run(dir.path(), &config, &NullProgressSink, &NeverCancelled, &mut writer)
        .await
        .unwrap();
    assert!(report.failed_files.is_empty());

    for node in &writer.nodes {
        if let NodeProperties::Process(p) = &node.properties {
            let unique: HashSet<&String> = p.trace.iter().collect();
            assert_eq!(unique.len(), p.trace.len(), "process trace contains a repeated node");
        }
    }
}

/// Scenario 5: a two-node call chain is below the default `minSteps=3` and
/// must not produce any process.
#[tokio::test]
async fn two_node_chain_is_rejected_by_the_default_min_steps() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "src/chain.ts",
        "export function callee() {}\n\
         export function caller() { callee(); }\n",
    );

    let config = PipelineConfig::default();
    let mut writer = CollectingWriter::new();
    codegraph_graph::run(dir.path(), &config, &NullProgressSink, &NeverCancelled, &mut writer)
        .await
        .unwrap();

    assert!(
        !writer.nodes.iter().any(|n| n.label() == NodeKind::Process),
        "a two-step chain must not clear the default minSteps=3 threshold"
    );
}

#[tokio::test]
async fn empty_repository_yields_a_zero_node_graph() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::default();
    let mut writer = CollectingWriter::new();
    let report = codegraph_graph::run(dir.path(), &config, &NullProgressSink, &NeverCancelled, &mut writer)
        .await
        .unwrap();

    assert_eq!(report.total_file_count, 0);
    assert_eq!(report.node_count, 0);
    assert_eq!(report.relationship_count, 0);
    assert!(writer.nodes.is_empty());
    assert!(writer.edges.is_empty());
}

/// P1, P2, P5, P6, P7 checked together over one realistic graph rather than
/// with synthetic fixtures per property.
#[tokio::test]
async fn graph_invariants_hold_over_the_mini_repo_graph() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "src/handler.ts",
        "import { validateInput } from './validator';\n\
         export function handleRequest() { validateInput(); validateInput(); }\n",
    );
    write_file(dir.path(), "src/validator.ts", "export function validateInput() {}\n");

    let config = PipelineConfig::default();
    let mut writer = CollectingWriter::new();
    codegraph_graph::run(dir.path(), &config, &NullProgressSink, &NeverCancelled, &mut writer)
        .await
        .unwrap();

    let node_ids: HashSet<&str> = writer.nodes.iter().map(|n| n.id.as_str()).collect();

    // P1: every edge's endpoints exist.
    for edge in &writer.edges {
        assert!(node_ids.contains(edge.source.as_str()), "dangling source {}", edge.source);
        assert!(node_ids.contains(edge.target.as_str()), "dangling target {}", edge.target);
    }

    // P2: MEMBER_OF is functional.
    let mut member_of_counts: HashMap<&str, usize> = HashMap::new();
    for edge in &writer.edges {
        if edge.kind == codegraph_core::EdgeKind::MemberOf {
            *member_of_counts.entry(edge.source.as_str()).or_insert(0) += 1;
        }
    }
    assert!(member_of_counts.values().all(|&count| count <= 1));

    // P5: every CALLS edge carries one of the four calibrated confidences
    // and a recognised reason.
    for edge in &writer.edges {
        if edge.kind == codegraph_core::EdgeKind::Calls {
            assert!(
                [0.30_f32, 0.50, 0.85, 0.90].iter().any(|c| (c - edge.confidence).abs() < 1e-6),
                "unexpected CALLS confidence {}",
                edge.confidence
            );
            assert!(["same-file", "import-resolved", "fuzzy-global"].contains(&edge.reason.as_str()));
        }
    }

    // P6: CONTAINS edges form a forest — every File/Folder target has at
    // most one CONTAINS parent.
    let mut contains_parent_counts: HashMap<&str, usize> = HashMap::new();
    for edge in &writer.edges {
        if edge.kind == codegraph_core::EdgeKind::Contains {
            *contains_parent_counts.entry(edge.target.as_str()).or_insert(0) += 1;
        }
    }
    assert!(contains_parent_counts.values().all(|&count| count <= 1));

    // P7: re-adding an already-written node/edge through the graph core is
    // a no-op — checked directly against the core rather than the writer.
    let mut graph = codegraph_graph::GraphCore::new();
    let node = GraphNode::file("src/dup.ts", "dup.ts", None);
    graph.add_node(node.clone());
    let count_before = graph.node_count();
    graph.add_node(node);
    assert_eq!(graph.node_count(), count_before);
}

#[tokio::test]
async fn nonexistent_root_is_reported_as_not_a_repository() {
    let config = PipelineConfig::default();
    let mut writer = CollectingWriter::new();
    let result = codegraph_graph::run(
        std::path::Path::new("/nonexistent/for/sure/path"),
        &config,
        &NullProgressSink,
        &NeverCancelled,
        &mut writer,
    )
    .await;
    assert!(matches!(result, Err(CodeGraphError::NotARepository(_))));
}
