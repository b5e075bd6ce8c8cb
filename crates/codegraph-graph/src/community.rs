//! Community Processor (C13): partitions symbol nodes into disjoint
//! `Community` clusters over the CALLS/IMPORTS subgraph (spec §4.12).
//!
//! The source leaves the refinement algorithm "heuristic" and explicitly
//! under-constrained (only the per-cluster outputs are pinned down), so this
//! builds weakly-connected components via union-find and then refines them
//! with a fixed number of label-propagation passes that greedily move a
//! symbol to whichever neighbouring cluster it shares the most edge weight
//! with — a standard modularity-flavoured heuristic, not a Louvain port.

use std::collections::HashMap;

use codegraph_core::{community_id, CommunityProperties, EdgeKind, GraphNode, NodeId};

use crate::graph::GraphCore;

pub const COMMUNITY_COLORS: [&str; 12] = [
    "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#f032e6", "#bcf60c", "#fabebe",
    "#008080", "#e6beff",
];

const REFINEMENT_PASSES: usize = 10;
/// Below this symbol count, plain connected components are kept as-is —
/// label propagation needs enough density to be meaningful.
const REFINEMENT_MIN_SYMBOLS: usize = 12;

struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect(), rank: vec![0; n] }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Splits `snake_case` and `camelCase`/`PascalCase` identifiers into
/// lowercase word tokens, dropping anything shorter than 3 characters.
fn tokenize(name: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch == '_' || ch == '-' {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        current.push(ch.to_ascii_lowercase());
        prev_lower = ch.is_lowercase();
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens.retain(|t| t.len() >= 3);
    tokens
}

pub struct CommunityStats {
    pub community_count: usize,
    pub symbol_count: usize,
}

/// Assigns every included symbol node to a `Community` node via a
/// `MEMBER_OF` edge (invariant iv: at most one community per symbol) and
/// returns the symbol→community mapping for the Process Processor.
pub fn process(graph: &mut GraphCore, entry_scores: &HashMap<NodeId, f32>) -> (HashMap<NodeId, NodeId>, CommunityStats) {
    let symbol_ids: Vec<NodeId> =
        graph.nodes().iter().filter(|n| n.label().is_symbol()).map(|n| n.id.clone()).collect();
    if symbol_ids.is_empty() {
        return (HashMap::new(), CommunityStats { community_count: 0, symbol_count: 0 });
    }
    let index_of: HashMap<&NodeId, usize> = symbol_ids.iter().enumerate().map(|(i, id)| (id, i)).collect();

    let mut calls_adjacency: HashMap<usize, HashMap<usize, u32>> = HashMap::new();
    let record_edge = |a: usize, b: usize, adjacency: &mut HashMap<usize, HashMap<usize, u32>>| {
        *adjacency.entry(a).or_default().entry(b).or_insert(0) += 1;
        *adjacency.entry(b).or_default().entry(a).or_insert(0) += 1;
    };

    let mut dsu = DisjointSet::new(symbol_ids.len());
    for edge in graph.relationships() {
        if edge.kind != EdgeKind::Calls {
            continue;
        }
        if let (Some(&a), Some(&b)) = (index_of.get(&edge.source), index_of.get(&edge.target)) {
            dsu.union(a, b);
            record_edge(a, b, &mut calls_adjacency);
        }
    }

    // IMPORTS connects files, not symbols directly; project it onto a
    // representative pair of symbols per file so file-level import
    // coupling still pulls their symbols into one weak component.
    let mut file_representative: HashMap<&str, usize> = HashMap::new();
    for (i, id) in symbol_ids.iter().enumerate() {
        if let Some(node) = graph.get_node(id) {
            if let Some(path) = node.file_path.as_deref() {
                file_representative.entry(path).or_insert(i);
            }
        }
    }
    for edge in graph.relationships() {
        if edge.kind != EdgeKind::Imports {
            continue;
        }
        let source_file = edge.source.strip_prefix("File:").unwrap_or(&edge.source);
        let target_file = edge.target.strip_prefix("File:").unwrap_or(&edge.target);
        if let (Some(&a), Some(&b)) = (file_representative.get(source_file), file_representative.get(target_file)) {
            dsu.union(a, b);
            record_edge(a, b, &mut calls_adjacency);
        }
    }

    let mut labels: Vec<usize> = (0..symbol_ids.len()).map(|i| dsu.find(i)).collect();

    if symbol_ids.len() >= REFINEMENT_MIN_SYMBOLS {
        refine_labels(&mut labels, &calls_adjacency);
    }

    let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, &label) in labels.iter().enumerate() {
        groups.entry(label).or_default().push(i);
    }

    let mut ordered_groups: Vec<Vec<usize>> = groups.into_values().collect();
    ordered_groups.sort_by_key(|members| symbol_ids[members[0]].clone());

    let mut memberships = HashMap::new();
    for (i, members) in ordered_groups.iter().enumerate() {
        let member_ids: Vec<NodeId> = members.iter().map(|&idx| symbol_ids[idx].clone()).collect();
        let properties = build_properties(graph, &member_ids, &calls_adjacency, &index_of, entry_scores, i);
        let community_node = GraphNode::community(&member_ids, properties);
        let cid = community_node.id.clone();
        graph.add_node(community_node);
        for member in &member_ids {
            graph.add_relationship(codegraph_core::Edge::new(
                EdgeKind::MemberOf,
                member.clone(),
                cid.clone(),
                1.0,
                "community",
            ));
            memberships.insert(member.clone(), cid.clone());
        }
    }

    let stats = CommunityStats { community_count: ordered_groups.len(), symbol_count: symbol_ids.len() };
    (memberships, stats)
}

fn refine_labels(labels: &mut [usize], adjacency: &HashMap<usize, HashMap<usize, u32>>) {
    for _ in 0..REFINEMENT_PASSES {
        let mut changed = false;
        for node in 0..labels.len() {
            let Some(neighbours) = adjacency.get(&node) else { continue };
            let mut weight_by_label: HashMap<usize, u32> = HashMap::new();
            for (&neighbour, &weight) in neighbours {
                *weight_by_label.entry(labels[neighbour]).or_insert(0) += weight;
            }
            if let Some((&best_label, _)) = weight_by_label.iter().max_by_key(|(&label, &w)| (w, std::cmp::Reverse(label))) {
                if best_label != labels[node] {
                    labels[node] = best_label;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
}

fn build_properties(
    graph: &GraphCore,
    members: &[NodeId],
    adjacency: &HashMap<usize, HashMap<usize, u32>>,
    index_of: &HashMap<&NodeId, usize>,
    entry_scores: &HashMap<NodeId, f32>,
    ordinal: usize,
) -> CommunityProperties {
    let names: Vec<&str> = members.iter().filter_map(|id| graph.get_node(id)).map(|n| n.name()).collect();

    let mut token_counts: HashMap<String, usize> = HashMap::new();
    for name in &names {
        for token in tokenize(name) {
            *token_counts.entry(token).or_insert(0) += 1;
        }
    }
    let mut by_frequency: Vec<(&String, &usize)> = token_counts.iter().collect();
    by_frequency.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let heuristic_label = match by_frequency.first() {
        Some((token, count)) if **count > 1 => capitalize(token),
        _ => members
            .iter()
            .max_by(|a, b| {
                entry_scores.get(*a).copied().unwrap_or(0.0).total_cmp(&entry_scores.get(*b).copied().unwrap_or(0.0))
            })
            .and_then(|id| graph.get_node(id))
            .map(|n| n.name().to_string())
            .unwrap_or_else(|| "Unnamed".to_string()),
    };

    let keywords: Vec<String> = by_frequency.iter().take(8).map(|(token, _)| (*token).clone()).collect();

    let member_set: std::collections::HashSet<usize> =
        members.iter().filter_map(|id| index_of.get(id).copied()).collect();
    let (mut intra, mut boundary) = (0u32, 0u32);
    for &i in &member_set {
        if let Some(neighbours) = adjacency.get(&i) {
            for (&j, &weight) in neighbours {
                if member_set.contains(&j) {
                    intra += weight;
                } else {
                    boundary += weight;
                }
            }
        }
    }
    // each intra-cluster pair is counted from both endpoints
    intra /= 2;
    let cohesion = if intra + boundary == 0 { 1.0 } else { intra as f32 / (intra + boundary) as f32 };

    CommunityProperties {
        name: format!("community-{ordinal}"),
        heuristic_label: heuristic_label.clone(),
        description: format!("Cluster of {} symbols related to {}", members.len(), heuristic_label),
        keywords,
        enriched_by: None,
        cohesion,
        symbol_count: members.len(),
        color: COMMUNITY_COLORS[ordinal % COMMUNITY_COLORS.len()].to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
