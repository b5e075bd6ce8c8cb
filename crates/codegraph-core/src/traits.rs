use crate::{Edge, GraphNode, Language, NodeId, Result};
use async_trait::async_trait;

/// One source file as seen by the extraction worker (C5): `{filePath, bytes, language}`.
#[async_trait]
pub trait CodeParser: Send + Sync {
    async fn parse_file(&self, file_path: &str, source: &[u8]) -> Result<Vec<GraphNode>>;
    fn supported_languages(&self) -> Vec<Language>;
}

/// Narrow collaborator boundary for the embedded graph database (out of
/// scope for this repo; see `codegraph_graph::storage::CsvStorageWriter`
/// for the one concrete implementation shipped here).
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn add_node(&mut self, node: GraphNode) -> Result<()>;
    async fn get_node(&self, id: &NodeId) -> Result<Option<GraphNode>>;
    async fn remove_node(&mut self, id: &NodeId) -> Result<bool>;
    async fn find_nodes_by_name(&self, name: &str) -> Result<Vec<GraphNode>>;
}

/// The pipeline's stages, in driver order, as surfaced to a `ProgressSink`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Walk,
    Extraction,
    Structure,
    SymbolTable,
    ImportResolution,
    Calls,
    Heritage,
    EntryScoring,
    Community,
    Process,
    Finalize,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Walk => "walk",
            Phase::Extraction => "extraction",
            Phase::Structure => "structure",
            Phase::SymbolTable => "symbol-table",
            Phase::ImportResolution => "import-resolution",
            Phase::Calls => "calls",
            Phase::Heritage => "heritage",
            Phase::EntryScoring => "entry-scoring",
            Phase::Community => "community",
            Phase::Process => "process",
            Phase::Finalize => "finalize",
        }
    }
}

/// Progress reporting boundary, generalising the teacher's
/// `ProgressTracker` trait: the driver calls `report` at stage boundaries
/// and at least every ~500 items within a long-running phase, so the CLI,
/// tests, and any future collaborator can each supply their own sink.
pub trait ProgressSink: Send + Sync {
    fn report(&self, phase: Phase, percent: u8, detail: Option<&str>);
}

/// A sink that discards every report; the default when nothing else is
/// wired up (tests, library callers that don't care about progress).
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn report(&self, _phase: Phase, _percent: u8, _detail: Option<&str>) {}
}

/// The narrow writer interface described in spec §6: once the graph is
/// finalised, every node and edge streams through here exactly once, in
/// `GraphCore` iteration order, and the in-memory graph is discarded.
#[async_trait]
pub trait StorageWriter: Send + Sync {
    async fn write_node(&mut self, node: &GraphNode) -> Result<()>;
    async fn write_edge(&mut self, edge: &Edge) -> Result<()>;
    async fn finalize(&mut self) -> Result<()>;
}

/// Cooperative cancellation signal checked at phase boundaries and
/// progress ticks (spec §5 "Cancellation and timeouts"). No phase is
/// interrupted mid-item; a `true` reading only takes effect the next time
/// the driver checks it.
pub trait CancellationToken: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

/// The default when nothing else is wired up: never cancelled.
pub struct NeverCancelled;

impl CancellationToken for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}
