//! Process Processor (C14): enumerates bounded, acyclic call chains from
//! high-scoring entry points and materialises them as `Process` nodes with
//! `STEP_IN_PROCESS` edges (spec §4.13).

use std::collections::HashMap;

use codegraph_core::{
    Edge, EdgeKind, GraphNode, NodeId, Phase, ProcessConfig, ProcessProperties, ProcessType,
    ProgressSink,
};

use crate::entry_scorer::is_test_file;
use crate::graph::GraphCore;

pub struct ProcessStats {
    pub process_count: usize,
    pub accepted_trace_count: usize,
}

/// `nodeId -> [(targetId, confidence)]`, insertion-ordered per source so the
/// "first insertion order" tie-break (spec §4.13 step 2) is well-defined.
fn calls_adjacency(graph: &GraphCore) -> HashMap<NodeId, Vec<(NodeId, f32)>> {
    let mut adjacency: HashMap<NodeId, Vec<(NodeId, f32)>> = HashMap::new();
    for edge in graph.relationships() {
        if edge.kind == EdgeKind::Calls && edge.source != edge.target {
            adjacency
                .entry(edge.source.clone())
                .or_default()
                .push((edge.target.clone(), edge.confidence));
        }
    }
    adjacency
}

/// Candidate entry points: symbols scoring above zero, not in a test file,
/// ranked per community and capped so the traversal budget scales with
/// `maxProcesses` rather than the whole symbol population (spec §4.13 step 1).
fn select_entries(
    graph: &GraphCore,
    entry_scores: &HashMap<NodeId, f32>,
    memberships: &HashMap<NodeId, NodeId>,
    max_processes: usize,
) -> Vec<NodeId> {
    let mut by_group: HashMap<Option<NodeId>, Vec<(NodeId, f32)>> = HashMap::new();
    for node in graph.nodes() {
        if !node.label().is_symbol() {
            continue;
        }
        let score = entry_scores.get(&node.id).copied().unwrap_or(0.0);
        if score <= 0.0 {
            continue;
        }
        if node.file_path.as_deref().map(is_test_file).unwrap_or(false) {
            continue;
        }
        let group = memberships.get(&node.id).cloned();
        by_group.entry(group).or_default().push((node.id.clone(), score));
    }

    let group_count = by_group.len().max(1);
    let per_group = ((max_processes as f32 / group_count as f32).ceil() as usize).max(3);

    let mut groups: Vec<(Option<NodeId>, Vec<(NodeId, f32)>)> = by_group.into_iter().collect();
    groups.sort_by(|a, b| a.0.cmp(&b.0));

    let mut entries = Vec::new();
    for (_, mut members) in groups {
        members.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.extend(members.into_iter().take(per_group).map(|(id, _)| id));
    }
    entries
}

/// DFS from `entry`, picking the highest-confidence unvisited outgoing
/// `CALLS` edge at each step; ties broken by the callee's entry score
/// (descending), then by insertion order (spec §4.13 step 2).
fn trace_from(
    entry: &NodeId,
    adjacency: &HashMap<NodeId, Vec<(NodeId, f32)>>,
    entry_scores: &HashMap<NodeId, f32>,
    min_confidence: f32,
    max_depth: usize,
) -> Vec<NodeId> {
    let mut visited: std::collections::HashSet<NodeId> = std::collections::HashSet::new();
    let mut trace = vec![entry.clone()];
    visited.insert(entry.clone());
    let mut current = entry.clone();

    while trace.len() < max_depth {
        let Some(candidates) = adjacency.get(&current) else { break };
        let mut best: Option<(NodeId, f32, f32)> = None;
        for (target, confidence) in candidates {
            if *confidence < min_confidence || visited.contains(target) {
                continue;
            }
            let target_score = entry_scores.get(target).copied().unwrap_or(0.0);
            let better = match &best {
                None => true,
                Some((_, best_conf, best_score)) => {
                    (*confidence, target_score) > (*best_conf, *best_score)
                }
            };
            if better {
                best = Some((target.clone(), *confidence, target_score));
            }
        }
        let Some((next, _, _)) = best else { break };
        visited.insert(next.clone());
        trace.push(next.clone());
        current = next;
    }
    trace
}

fn pascal_case(name: &str) -> String {
    let mut out = String::new();
    let mut start_of_word = true;
    for ch in name.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            start_of_word = true;
            continue;
        }
        if start_of_word {
            out.extend(ch.to_uppercase());
            start_of_word = false;
        } else {
            out.push(ch);
        }
    }
    out
}

struct Accepted {
    trace: Vec<NodeId>,
    avg_confidence: f32,
}

pub fn process(
    graph: &mut GraphCore,
    entry_scores: &HashMap<NodeId, f32>,
    memberships: &HashMap<NodeId, NodeId>,
    config: &ProcessConfig,
    progress: &dyn ProgressSink,
) -> ProcessStats {
    let adjacency = calls_adjacency(graph);
    let entries = select_entries(graph, entry_scores, memberships, config.max_processes);

    let mut accepted: Vec<Accepted> = Vec::new();
    let total = entries.len().max(1);
    for (i, entry) in entries.iter().enumerate() {
        let trace = trace_from(
            entry,
            &adjacency,
            entry_scores,
            config.min_trace_confidence,
            config.max_trace_depth,
        );
        if trace.len() >= config.min_steps {
            let avg_confidence = trace_confidence(&trace, &adjacency) / (trace.len() - 1).max(1) as f32;
            accepted.push(Accepted { trace, avg_confidence });
        }
        if i % 256 == 0 || i + 1 == entries.len() {
            progress.report(Phase::Process, ((i + 1) * 100 / total) as u8, None);
        }
    }

    // Prefer longer, higher-confidence traces when capping (spec §4.13 step 6).
    accepted.sort_by(|a, b| {
        b.trace
            .len()
            .cmp(&a.trace.len())
            .then_with(|| b.avg_confidence.total_cmp(&a.avg_confidence))
    });
    accepted.truncate(config.max_processes);

    let accepted_trace_count = accepted.len();
    for item in accepted {
        materialise(graph, item.trace, memberships);
    }

    progress.report(Phase::Process, 100, None);
    ProcessStats { process_count: graph_process_count(graph), accepted_trace_count }
}

fn trace_confidence(trace: &[NodeId], adjacency: &HashMap<NodeId, Vec<(NodeId, f32)>>) -> f32 {
    let mut sum = 0.0;
    for pair in trace.windows(2) {
        if let Some(edges) = adjacency.get(&pair[0]) {
            if let Some((_, confidence)) = edges.iter().find(|(target, _)| target == &pair[1]) {
                sum += confidence;
            }
        }
    }
    sum
}

fn graph_process_count(graph: &GraphCore) -> usize {
    graph.nodes().iter().filter(|n| n.label() == codegraph_core::NodeKind::Process).count()
}

fn materialise(graph: &mut GraphCore, trace: Vec<NodeId>, memberships: &HashMap<NodeId, NodeId>) {
    let entry_point_id = trace[0].clone();
    let terminal_id = trace[trace.len() - 1].clone();
    let step_count = trace.len();

    let mut communities: Vec<NodeId> = Vec::new();
    for id in &trace {
        if let Some(c) = memberships.get(id) {
            if !communities.contains(c) {
                communities.push(c.clone());
            }
        }
    }
    let process_type = if communities.len() <= 1 {
        ProcessType::IntraCommunity
    } else {
        ProcessType::CrossCommunity
    };

    let entry_name = graph.get_node(&entry_point_id).map(|n| n.name().to_string()).unwrap_or_default();
    let terminal_name = graph.get_node(&terminal_id).map(|n| n.name().to_string()).unwrap_or_default();
    let heuristic_label = format!("{} → {}", pascal_case(&entry_name), pascal_case(&terminal_name));

    let properties = ProcessProperties {
        heuristic_label,
        process_type,
        step_count,
        communities,
        entry_point_id,
        terminal_id,
        trace: Vec::new(), // filled in by GraphNode::process from `trace` below
    };
    let node = GraphNode::process(trace.clone(), properties);
    let process_node_id = node.id.clone();
    graph.add_node(node);

    for (i, symbol_id) in trace.into_iter().enumerate() {
        graph.add_relationship(
            Edge::new(EdgeKind::StepInProcess, symbol_id, process_node_id.clone(), 1.0, "trace-step")
                .with_step((i + 1) as u32),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{symbol_id, Edge as CoreEdge, GraphNode as CoreNode, NodeKind, NullProgressSink};

    fn symbol(file: &str, name: &str, line: u32) -> CoreNode {
        CoreNode::symbol(NodeKind::Function, file, name, line, line + 5, true, None)
    }

    fn id(file: &str, name: &str, line: u32) -> NodeId {
        symbol_id(NodeKind::Function, file, name, line)
    }

    #[test]
    fn accepts_a_three_step_chain_starting_at_the_entry() {
        let mut graph = GraphCore::new();
        graph.add_node(symbol("a.ts", "handleRequest", 1));
        graph.add_node(symbol("a.ts", "validateInput", 10));
        graph.add_node(symbol("a.ts", "saveToDb", 20));
        let (h, v, s) = (id("a.ts", "handleRequest", 1), id("a.ts", "validateInput", 10), id("a.ts", "saveToDb", 20));
        graph.add_relationship(CoreEdge::new(EdgeKind::Calls, h.clone(), v.clone(), 0.85, "same-file"));
        graph.add_relationship(CoreEdge::new(EdgeKind::Calls, v.clone(), s.clone(), 0.85, "same-file"));

        let mut scores = HashMap::new();
        scores.insert(h.clone(), 9.0);
        scores.insert(v.clone(), 1.0);
        scores.insert(s.clone(), 1.0);

        let config = ProcessConfig::default();
        let stats = process(&mut graph, &scores, &HashMap::new(), &config, &NullProgressSink);
        assert_eq!(stats.process_count, 1);

        let process_node = graph.nodes().into_iter().find(|n| n.label() == NodeKind::Process).unwrap();
        match &process_node.properties {
            codegraph_core::NodeProperties::Process(p) => {
                assert_eq!(p.step_count, 3);
                assert_eq!(p.trace[0], h);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn two_step_chain_is_rejected_by_default_min_steps() {
        let mut graph = GraphCore::new();
        graph.add_node(symbol("a.ts", "caller", 1));
        graph.add_node(symbol("a.ts", "callee", 10));
        let (c1, c2) = (id("a.ts", "caller", 1), id("a.ts", "callee", 10));
        graph.add_relationship(CoreEdge::new(EdgeKind::Calls, c1.clone(), c2.clone(), 0.85, "same-file"));

        let mut scores = HashMap::new();
        scores.insert(c1, 5.0);
        scores.insert(c2, 1.0);

        let config = ProcessConfig::default();
        let stats = process(&mut graph, &scores, &HashMap::new(), &config, &NullProgressSink);
        assert_eq!(stats.process_count, 0);
    }

    #[test]
    fn cyclic_calls_terminate_and_never_repeat_a_node() {
        let mut graph = GraphCore::new();
        graph.add_node(symbol("a.ts", "a", 1));
        graph.add_node(symbol("a.ts", "b", 10));
        graph.add_node(symbol("a.ts", "c", 20));
        let (a, b, c) = (id("a.ts", "a", 1), id("a.ts", "b", 10), id("a.ts", "c", 20));
        graph.add_relationship(CoreEdge::new(EdgeKind::Calls, a.clone(), b.clone(), 0.9, "same-file"));
        graph.add_relationship(CoreEdge::new(EdgeKind::Calls, b.clone(), c.clone(), 0.9, "same-file"));
        graph.add_relationship(CoreEdge::new(EdgeKind::Calls, c.clone(), a.clone(), 0.9, "same-file"));

        let mut scores = HashMap::new();
        scores.insert(a.clone(), 9.0);
        scores.insert(b, 1.0);
        scores.insert(c, 1.0);

        let config = ProcessConfig::default();
        process(&mut graph, &scores, &HashMap::new(), &config, &NullProgressSink);

        for node in graph.nodes() {
            if let codegraph_core::NodeProperties::Process(p) = &node.properties {
                let unique: std::collections::HashSet<_> = p.trace.iter().collect();
                assert_eq!(unique.len(), p.trace.len());
            }
        }
    }

    #[test]
    fn cross_community_trace_lists_every_community_touched() {
        let mut graph = GraphCore::new();
        graph.add_node(symbol("a.ts", "entry", 1));
        graph.add_node(symbol("b.ts", "mid", 1));
        graph.add_node(symbol("c.ts", "terminal", 1));
        let (e, m, t) = (id("a.ts", "entry", 1), id("b.ts", "mid", 1), id("c.ts", "terminal", 1));
        graph.add_relationship(CoreEdge::new(EdgeKind::Calls, e.clone(), m.clone(), 0.9, "same-file"));
        graph.add_relationship(CoreEdge::new(EdgeKind::Calls, m.clone(), t.clone(), 0.9, "same-file"));

        let mut scores = HashMap::new();
        scores.insert(e.clone(), 9.0);
        scores.insert(m.clone(), 1.0);
        scores.insert(t.clone(), 1.0);

        let mut memberships = HashMap::new();
        memberships.insert(e, "Community:1".to_string());
        memberships.insert(m, "Community:2".to_string());
        memberships.insert(t, "Community:2".to_string());

        let config = ProcessConfig::default();
        process(&mut graph, &scores, &memberships, &config, &NullProgressSink);

        let process_node = graph.nodes().into_iter().find(|n| n.label() == NodeKind::Process).unwrap();
        match &process_node.properties {
            codegraph_core::NodeProperties::Process(p) => {
                assert_eq!(p.process_type, ProcessType::CrossCommunity);
                assert_eq!(p.communities.len(), 2);
            }
            _ => unreachable!(),
        }
    }
}
