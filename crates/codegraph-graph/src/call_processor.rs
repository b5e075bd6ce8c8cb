//! Call Processor (C9): turns each extracted call site into at most one
//! `CALLS` edge under a four-tier resolution-priority policy with
//! calibrated confidence (spec §4.8, invariant P5).

use codegraph_core::{Edge, EdgeKind, Phase, ProgressSink};
use codegraph_parser::{CallSite, ImportMap, SymbolTable};

use crate::graph::GraphCore;

const SAME_FILE_CONFIDENCE: f32 = 0.85;
const IMPORT_RESOLVED_CONFIDENCE: f32 = 0.90;
const FUZZY_UNIQUE_CONFIDENCE: f32 = 0.50;
const FUZZY_AMBIGUOUS_CONFIDENCE: f32 = 0.30;

/// `(targetId, confidence, reason)` for one call site, or `None` when every
/// tier misses (spec §4.8 step 4: dropped silently, no error).
fn resolve(call: &CallSite, symbols: &SymbolTable, imports: &ImportMap) -> Option<(String, f32, &'static str)> {
    if let Some(target) = symbols.lookup_exact(&call.file_path, &call.called_name) {
        return Some((target.clone(), SAME_FILE_CONFIDENCE, "same-file"));
    }

    for imported_file in imports.imports_of(&call.file_path) {
        if let Some(target) = symbols.lookup_exact(imported_file, &call.called_name) {
            return Some((target.clone(), IMPORT_RESOLVED_CONFIDENCE, "import-resolved"));
        }
    }

    let hits = symbols.lookup_fuzzy(&call.called_name);
    if let Some(first) = hits.first() {
        let confidence = if hits.len() == 1 {
            FUZZY_UNIQUE_CONFIDENCE
        } else {
            FUZZY_AMBIGUOUS_CONFIDENCE
        };
        return Some((first.node_id.clone(), confidence, "fuzzy-global"));
    }

    None
}

pub fn process(
    graph: &mut GraphCore,
    calls: &[CallSite],
    symbols: &SymbolTable,
    imports: &ImportMap,
    progress: &dyn ProgressSink,
) {
    let total = calls.len();
    for (processed, call) in calls.iter().enumerate() {
        let Some(source_id) = &call.source_id else {
            continue;
        };
        if let Some((target_id, confidence, reason)) = resolve(call, symbols, imports) {
            if graph.has_node(source_id) && graph.has_node(&target_id) {
                graph.add_relationship(Edge::new(
                    EdgeKind::Calls,
                    source_id.clone(),
                    target_id,
                    confidence,
                    reason,
                ));
            }
        }
        if processed % 256 == 0 || processed + 1 == total {
            let percent = if total == 0 { 100 } else { ((processed + 1) * 100 / total) as u8 };
            progress.report(Phase::Calls, percent, None);
        }
    }
}
