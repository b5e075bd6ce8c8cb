//! Ingestion pipeline driver: walks a repository, fans extraction out
//! across a rayon pool, then runs every processor stage in order and
//! streams the finished graph through a `StorageWriter` exactly once
//! (spec §5).

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use codegraph_core::{
    file_id, CancellationToken, CodeGraphError, Edge, EdgeKind, GraphNode, Language, NodeId,
    Phase, PipelineConfig, ProgressSink, Result, StorageWriter,
};
use codegraph_parser::{
    extract, walk, CallSite, HeritageRecord, ImportRecord, ImportResolver, ParserHost, SymbolTable,
};
use rayon::prelude::*;

use crate::community;
use crate::entry_scorer::{self, SymbolContext};
use crate::framework_hints;
use crate::graph::GraphCore;
use crate::heritage_processor;
use crate::process_processor;
use crate::{call_processor, structure};

/// Run summary returned to the caller: totals plus the per-file failures
/// that never propagate as an error (spec §7 — a run succeeds as long as at
/// least one file indexed).
#[derive(Debug, Clone)]
pub struct Report {
    pub total_file_count: usize,
    pub failed_files: Vec<(String, String)>,
    pub node_count: usize,
    pub relationship_count: usize,
    pub community_count: usize,
    pub process_count: usize,
}

fn language_of(relative_path: &str) -> Option<Language> {
    Path::new(relative_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(Language::from_extension)
}

struct FileExtraction {
    file_path: String,
    content: String,
    language: Language,
    output: codegraph_parser::ExtractionOutput,
}

/// Extracts one file, or `None` with its failure reason recorded by the
/// caller. `Ok(None)` covers both of spec §7's `UnsupportedLanguage` cases
/// (an unrecognised extension, or a language `Language::from_extension`
/// classifies but `ParserHost` has no grammar wired for, e.g. Kotlin) —
/// these are dropped silently and never reach `failed_files`. A real parse
/// or read failure is the only case returned as `Err`, which the caller
/// records as a reportable failure.
fn extract_one(
    host: &ParserHost,
    absolute_path: &Path,
    relative_path: &str,
) -> std::result::Result<Option<FileExtraction>, (String, String)> {
    let Some(language) = language_of(relative_path) else {
        return Ok(None);
    };
    if !host.is_supported(language) {
        return Ok(None);
    }

    let bytes = std::fs::read(absolute_path)
        .map_err(|e| (relative_path.to_string(), format!("read failed: {e}")))?;
    let content = String::from_utf8_lossy(&bytes).into_owned();

    let parsed = host
        .parse(relative_path, language, &content)
        .map_err(|e| (relative_path.to_string(), e.to_string()))?;

    let output = extract(&parsed.tree, &parsed.content, relative_path, language)
        .ok_or_else(|| (relative_path.to_string(), "no extraction rules for language".to_string()))?;

    Ok(Some(FileExtraction {
        file_path: relative_path.to_string(),
        content: parsed.content,
        language,
        output,
    }))
}

/// Runs the full pipeline against `root`, streaming the finished graph
/// through `writer`. Returns `NotARepository` if `root` is not a directory;
/// every other per-file problem is captured in the returned `Report`
/// instead of failing the run.
pub async fn run(
    root: &Path,
    config: &PipelineConfig,
    progress: &dyn ProgressSink,
    cancel: &dyn CancellationToken,
    writer: &mut dyn StorageWriter,
) -> Result<Report> {
    if !root.is_dir() {
        return Err(CodeGraphError::NotARepository(root.display().to_string()));
    }

    progress.report(Phase::Walk, 0, None);
    let mut walked = walk(root)?;
    walked.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    progress.report(Phase::Walk, 100, Some(&format!("{} files", walked.len())));

    if cancel.is_cancelled() {
        return Err(CodeGraphError::Cancelled);
    }

    let host = Arc::new(ParserHost::new());
    let total_files = walked.len();
    let extraction_results: Vec<std::result::Result<Option<FileExtraction>, (String, String)>> = {
        let host = Arc::clone(&host);
        tokio::task::spawn_blocking(move || {
            walked
                .par_iter()
                .map(|file| extract_one(&host, &file.absolute_path, &file.relative_path))
                .collect()
        })
        .await
        .map_err(|e| CodeGraphError::Graph(format!("extraction worker panicked: {e}")))?
    };

    let mut failed_files = Vec::new();
    let mut extractions = Vec::new();
    for result in extraction_results {
        match result {
            Ok(Some(extraction)) => extractions.push(extraction),
            Ok(None) => {}
            Err(failure) => failed_files.push(failure),
        }
    }
    progress.report(Phase::Extraction, 100, Some(&format!("{} files extracted", extractions.len())));

    if cancel.is_cancelled() {
        return Err(CodeGraphError::Cancelled);
    }

    let mut graph = GraphCore::new();
    let file_paths: Vec<String> = extractions.iter().map(|e| e.file_path.clone()).collect();
    structure::process(&mut graph, &file_paths);
    progress.report(Phase::Structure, 100, None);

    let mut symbol_table = SymbolTable::new();
    let mut file_contents: HashMap<String, (Language, String)> = HashMap::new();
    let mut all_imports: Vec<ImportRecord> = Vec::new();
    let mut all_calls: Vec<CallSite> = Vec::new();
    let mut all_heritage: Vec<HeritageRecord> = Vec::new();

    for extraction in &extractions {
        file_contents.insert(
            extraction.file_path.clone(),
            (extraction.language, extraction.content.clone()),
        );
        for definition in &extraction.output.definitions {
            let node = GraphNode::symbol(
                definition.kind,
                &definition.file_path,
                &definition.name,
                definition.start_line,
                definition.end_line,
                definition.is_exported,
                Some(definition.text.clone()),
            );
            graph.add_node(node);
            graph.add_relationship(Edge::new(
                EdgeKind::Defines,
                file_id(&definition.file_path),
                definition.id.clone(),
                1.0,
                "definition",
            ));
            symbol_table.add(&definition.file_path, &definition.name, definition.id.clone(), definition.kind);
        }
        all_imports.extend(extraction.output.imports.iter().cloned());
        all_calls.extend(extraction.output.calls.iter().cloned());
        all_heritage.extend(extraction.output.heritage.iter().cloned());
    }
    progress.report(Phase::SymbolTable, 100, None);

    if cancel.is_cancelled() {
        return Err(CodeGraphError::Cancelled);
    }

    let import_resolver = ImportResolver::new(&file_paths);
    let import_map = import_resolver.resolve_all(&all_imports);
    for (from_file, targets) in import_map.iter() {
        for target in targets {
            graph.add_relationship(Edge::new(
                EdgeKind::Imports,
                file_id(from_file),
                file_id(target),
                1.0,
                "import",
            ));
        }
    }
    progress.report(Phase::ImportResolution, 100, None);

    if cancel.is_cancelled() {
        return Err(CodeGraphError::Cancelled);
    }

    call_processor::process(&mut graph, &all_calls, &symbol_table, &import_map, progress);
    heritage_processor::process(&mut graph, &all_heritage, &symbol_table);
    progress.report(Phase::Heritage, 100, None);

    if cancel.is_cancelled() {
        return Err(CodeGraphError::Cancelled);
    }

    let mut caller_counts: HashMap<NodeId, usize> = HashMap::new();
    let mut callee_counts: HashMap<NodeId, usize> = HashMap::new();
    for edge in graph.relationships() {
        if edge.kind == EdgeKind::Calls {
            *callee_counts.entry(edge.source.clone()).or_insert(0) += 1;
            *caller_counts.entry(edge.target.clone()).or_insert(0) += 1;
        }
    }

    let mut entry_scores: HashMap<NodeId, f32> = HashMap::new();
    let symbol_nodes: Vec<(NodeId, String, String, bool)> = graph
        .nodes()
        .iter()
        .filter(|n| n.label().is_symbol())
        .map(|n| {
            (
                n.id.clone(),
                n.file_path.clone().unwrap_or_default(),
                n.name().to_string(),
                matches!(&n.properties, codegraph_core::NodeProperties::Symbol(_, p) if p.is_exported),
            )
        })
        .collect();

    for (node_id, file_path, name, is_exported) in &symbol_nodes {
        let language = language_of(file_path).unwrap_or(Language::TypeScript);
        let content = file_contents.get(file_path).map(|(_, c)| c.as_str()).unwrap_or("");
        let ctx = SymbolContext {
            name,
            language,
            is_exported: *is_exported,
            caller_count: caller_counts.get(node_id).copied().unwrap_or(0),
            callee_count: callee_counts.get(node_id).copied().unwrap_or(0),
        };
        let path_hint = framework_hints::hint_from_path(file_path);
        let ast_hint = framework_hints::hint_from_ast(language, content);
        let result = entry_scorer::score(&ctx, path_hint.as_ref(), ast_hint.as_ref());
        entry_scores.insert(node_id.clone(), result.score);
    }
    progress.report(Phase::EntryScoring, 100, None);

    if cancel.is_cancelled() {
        return Err(CodeGraphError::Cancelled);
    }

    let (memberships, community_stats) = community::process(&mut graph, &entry_scores);
    progress.report(Phase::Community, 100, None);

    if cancel.is_cancelled() {
        return Err(CodeGraphError::Cancelled);
    }

    let process_stats =
        process_processor::process(&mut graph, &entry_scores, &memberships, &config.process, progress);

    if cancel.is_cancelled() {
        return Err(CodeGraphError::Cancelled);
    }

    let node_count = graph.node_count();
    let relationship_count = graph.relationship_count();
    for node in graph.nodes() {
        writer.write_node(node).await?;
    }
    for edge in graph.relationships() {
        writer.write_edge(edge).await?;
    }
    writer.finalize().await?;
    progress.report(Phase::Finalize, 100, None);

    Ok(Report {
        total_file_count: total_files,
        failed_files,
        node_count,
        relationship_count,
        community_count: community_stats.community_count,
        process_count: process_stats.process_count,
    })
}
