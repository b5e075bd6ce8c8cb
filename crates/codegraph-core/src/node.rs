use crate::{EdgeId, EdgeKind, NodeId, NodeKind, ProcessType};
use serde::{Deserialize, Serialize};

/// `File:<filePath>` — deterministic per the identity rule in §3.
pub fn file_id(file_path: &str) -> NodeId {
    format!("File:{file_path}")
}

/// `Folder:<filePath>`.
pub fn folder_id(file_path: &str) -> NodeId {
    format!("Folder:{file_path}")
}

/// Symbol ids are constructed from `(kind, filePath, name, startLine)`; the
/// line is always folded in so overloaded names in the same file never
/// collide, and re-extracting an unchanged file reproduces the same id.
pub fn symbol_id(kind: NodeKind, file_path: &str, name: &str, start_line: u32) -> NodeId {
    format!("{}:{}:{}:{}", kind.as_str(), file_path, name, start_line)
}

/// `(sourceId, type, targetId)` per the edge identity rule in §3.
pub fn edge_id(source: &NodeId, kind: EdgeKind, target: &NodeId) -> EdgeId {
    format!("{source}-{kind}-{target}")
}

/// Stable id for a derived `Community` node: content-addressed from its
/// sorted member ids so re-running community detection against the same
/// graph reproduces the same community ids.
pub fn community_id(member_ids: &[NodeId]) -> NodeId {
    let mut sorted: Vec<&str> = member_ids.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    format!("Community:{}", short_digest(&sorted.join(",")))
}

/// Stable id for a derived `Process` node: content-addressed from its trace,
/// so the same entry/terminal/trace combination always yields the same id.
pub fn process_id(trace: &[NodeId]) -> NodeId {
    format!("Process:{}", short_digest(&trace.join(",")))
}

fn short_digest(input: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().take(8).map(|b| format!("{b:02x}")).collect()
}

/// Code-symbol property schema shared by every `NodeKind::is_symbol()` label
/// (`Function`, `Method`, `Class`, ..., `Module`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolProperties {
    pub name: String,
    pub start_line: u32,
    pub end_line: u32,
    pub is_exported: bool,
    pub content: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProperties {
    pub name: String,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderProperties {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityProperties {
    pub name: String,
    pub heuristic_label: String,
    pub keywords: Vec<String>,
    pub description: String,
    pub enriched_by: Option<String>,
    pub cohesion: f32,
    pub symbol_count: usize,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessProperties {
    pub heuristic_label: String,
    pub process_type: ProcessType,
    pub step_count: usize,
    pub communities: Vec<NodeId>,
    pub entry_point_id: NodeId,
    pub terminal_id: NodeId,
    pub trace: Vec<NodeId>,
}

/// Tagged per-label property bag (design note in spec §9: "model each node
/// label as a tagged variant with a fixed schema"). `GraphNode::label()`
/// recovers the `NodeKind` without inspecting the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeProperties {
    File(FileProperties),
    Folder(FolderProperties),
    Symbol(NodeKind, SymbolProperties),
    Community(CommunityProperties),
    Process(ProcessProperties),
}

/// Common header `{id, label, filePath?}` plus the label-specific payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub file_path: Option<String>,
    pub properties: NodeProperties,
}

impl GraphNode {
    pub fn label(&self) -> NodeKind {
        match &self.properties {
            NodeProperties::File(_) => NodeKind::File,
            NodeProperties::Folder(_) => NodeKind::Folder,
            NodeProperties::Symbol(kind, _) => *kind,
            NodeProperties::Community(_) => NodeKind::Community,
            NodeProperties::Process(_) => NodeKind::Process,
        }
    }

    pub fn file(file_path: impl Into<String>, name: impl Into<String>, content: Option<String>) -> Self {
        let file_path = file_path.into();
        Self {
            id: file_id(&file_path),
            properties: NodeProperties::File(FileProperties {
                name: name.into(),
                content,
            }),
            file_path: Some(file_path),
        }
    }

    pub fn folder(file_path: impl Into<String>, name: impl Into<String>) -> Self {
        let file_path = file_path.into();
        Self {
            id: folder_id(&file_path),
            properties: NodeProperties::Folder(FolderProperties { name: name.into() }),
            file_path: Some(file_path),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn symbol(
        kind: NodeKind,
        file_path: impl Into<String>,
        name: impl Into<String>,
        start_line: u32,
        end_line: u32,
        is_exported: bool,
        content: Option<String>,
    ) -> Self {
        debug_assert!(kind.is_symbol(), "GraphNode::symbol called with non-symbol kind");
        let file_path = file_path.into();
        let name = name.into();
        Self {
            id: symbol_id(kind, &file_path, &name, start_line),
            properties: NodeProperties::Symbol(
                kind,
                SymbolProperties {
                    name,
                    start_line,
                    end_line,
                    is_exported,
                    content,
                    description: None,
                },
            ),
            file_path: Some(file_path),
        }
    }

    pub fn community(members: &[NodeId], properties: CommunityProperties) -> Self {
        Self {
            id: community_id(members),
            properties: NodeProperties::Community(properties),
            file_path: None,
        }
    }

    pub fn process(trace: Vec<NodeId>, mut properties: ProcessProperties) -> Self {
        let id = process_id(&trace);
        properties.trace = trace;
        Self {
            id,
            properties: NodeProperties::Process(properties),
            file_path: None,
        }
    }

    pub fn as_symbol(&self) -> Option<&SymbolProperties> {
        match &self.properties {
            NodeProperties::Symbol(_, props) => Some(props),
            _ => None,
        }
    }

    pub fn as_symbol_mut(&mut self) -> Option<&mut SymbolProperties> {
        match &mut self.properties {
            NodeProperties::Symbol(_, props) => Some(props),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match &self.properties {
            NodeProperties::File(p) => &p.name,
            NodeProperties::Folder(p) => &p.name,
            NodeProperties::Symbol(_, p) => &p.name,
            NodeProperties::Community(p) => &p.name,
            NodeProperties::Process(p) => &p.heuristic_label,
        }
    }
}

/// The single edge type, discriminated by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub kind: EdgeKind,
    pub source: NodeId,
    pub target: NodeId,
    pub confidence: f32,
    pub reason: String,
    pub step: Option<u32>,
}

impl Edge {
    pub fn new(
        kind: EdgeKind,
        source: NodeId,
        target: NodeId,
        confidence: f32,
        reason: impl Into<String>,
    ) -> Self {
        let id = edge_id(&source, kind, &target);
        Self {
            id,
            kind,
            source,
            target,
            confidence,
            reason: reason.into(),
            step: None,
        }
    }

    pub fn with_step(mut self, step: u32) -> Self {
        self.step = Some(step);
        self
    }
}
