//! CSV storage writer: the one concrete `StorageWriter` this repo ships,
//! serialising each node label to its own tabular file with a fixed field
//! order plus a `meta.json` summary (spec §6).

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use codegraph_core::{CodeGraphError, Edge, GraphNode, NodeKind, NodeProperties, Result, StorageWriter};
use serde::Serialize;

use crate::text_sanitize::{format_array, sanitize_text};

const SCHEMA_VERSION: u32 = 1;
const LOCK_RETRY_ATTEMPTS: u32 = 3;

fn field(value: impl Into<String>) -> String {
    value.into()
}

fn bool_field(value: bool) -> String {
    value.to_string()
}

fn num_field(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-1".to_string())
}

fn float_field(value: f32) -> String {
    format!("{value}")
}

fn text_or_default(value: &Option<String>) -> String {
    value.as_deref().map(sanitize_text).unwrap_or_default()
}

/// Per-label column headers, matching the property bags in spec §3.
fn header_for(kind: NodeKind) -> Vec<&'static str> {
    match kind {
        NodeKind::File => vec!["id", "label", "filePath", "name", "content"],
        NodeKind::Folder => vec!["id", "label", "filePath", "name"],
        NodeKind::Community => vec![
            "id",
            "label",
            "name",
            "heuristicLabel",
            "keywords",
            "description",
            "enrichedBy",
            "cohesion",
            "symbolCount",
            "color",
        ],
        NodeKind::Process => vec![
            "id",
            "label",
            "heuristicLabel",
            "processType",
            "stepCount",
            "communities",
            "entryPointId",
            "terminalId",
            "trace",
        ],
        _ => vec![
            "id",
            "label",
            "filePath",
            "name",
            "startLine",
            "endLine",
            "isExported",
            "content",
            "description",
        ],
    }
}

fn row_for(node: &GraphNode) -> Vec<String> {
    let label = node.label();
    match &node.properties {
        NodeProperties::File(p) => vec![
            field(&node.id),
            field(label.as_str()),
            field(node.file_path.clone().unwrap_or_default()),
            field(&p.name),
            if p.content.as_deref().map(|c| !super::text_sanitize::is_probably_binary(c)).unwrap_or(false) {
                text_or_default(&p.content)
            } else {
                String::new()
            },
        ],
        NodeProperties::Folder(p) => {
            vec![field(&node.id), field(label.as_str()), field(node.file_path.clone().unwrap_or_default()), field(&p.name)]
        }
        NodeProperties::Community(p) => vec![
            field(&node.id),
            field(label.as_str()),
            field(&p.name),
            field(&p.heuristic_label),
            format_array(&p.keywords),
            field(&p.description),
            field(p.enriched_by.clone().unwrap_or_default()),
            float_field(p.cohesion),
            num_field(Some(p.symbol_count as i64)),
            field(&p.color),
        ],
        NodeProperties::Process(p) => vec![
            field(&node.id),
            field(label.as_str()),
            field(&p.heuristic_label),
            field(p.process_type.as_str()),
            num_field(Some(p.step_count as i64)),
            format_array(&p.communities),
            field(&p.entry_point_id),
            field(&p.terminal_id),
            format_array(&p.trace),
        ],
        NodeProperties::Symbol(_, p) => vec![
            field(&node.id),
            field(label.as_str()),
            field(node.file_path.clone().unwrap_or_default()),
            field(&p.name),
            num_field(Some(p.start_line as i64)),
            num_field(Some(p.end_line as i64)),
            bool_field(p.is_exported),
            text_or_default(&p.content),
            text_or_default(&p.description),
        ],
    }
}

fn edge_header() -> Vec<&'static str> {
    vec!["id", "type", "sourceId", "targetId", "confidence", "reason", "step"]
}

fn edge_row(edge: &Edge) -> Vec<String> {
    vec![
        field(&edge.id),
        field(edge.kind.as_str()),
        field(&edge.source),
        field(&edge.target),
        float_field(edge.confidence),
        field(&edge.reason),
        num_field(edge.step.map(|s| s as i64)),
    ]
}

#[derive(Debug, Serialize)]
struct Meta {
    schema_version: u32,
    node_counts: HashMap<String, usize>,
    edge_counts: HashMap<String, usize>,
    generated_at: String,
    last_commit_sha: Option<String>,
}

/// The narrow writer boundary's one concrete implementation: one CSV file
/// per node label plus a single `relationships.csv`, written once as the
/// driver streams the finalised graph through (spec §6).
pub struct CsvStorageWriter {
    root: PathBuf,
    node_writers: HashMap<NodeKind, csv::Writer<File>>,
    edge_writer: Option<csv::Writer<File>>,
    node_counts: HashMap<NodeKind, usize>,
    edge_counts: HashMap<String, usize>,
    lock_path: PathBuf,
}

impl CsvStorageWriter {
    /// Creates `root` if needed and takes out an advisory lock file,
    /// retrying per spec §7's `StorageLocked` policy (3 attempts, `2s *
    /// attempt` linear backoff) when a prior run's lock is still present.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        let lock_path = root.join(".lock");

        let mut attempt = 1;
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&lock_path) {
                Ok(_) => break,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && attempt < LOCK_RETRY_ATTEMPTS => {
                    std::thread::sleep(Duration::from_secs(2 * attempt as u64));
                    attempt += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    return Err(CodeGraphError::StorageLocked(format!("{}", lock_path.display())));
                }
                Err(e) => return Err(CodeGraphError::from(e)),
            }
        }

        Ok(Self {
            root,
            node_writers: HashMap::new(),
            edge_writer: None,
            node_counts: HashMap::new(),
            edge_counts: HashMap::new(),
            lock_path,
        })
    }

    fn node_writer(&mut self, kind: NodeKind) -> Result<&mut csv::Writer<File>> {
        if !self.node_writers.contains_key(&kind) {
            let path = self.root.join(format!("{}.csv", kind.as_str()));
            let mut writer = csv::WriterBuilder::new().from_path(&path).map_err(csv_err)?;
            writer.write_record(header_for(kind)).map_err(csv_err)?;
            self.node_writers.insert(kind, writer);
        }
        Ok(self.node_writers.get_mut(&kind).unwrap())
    }

    fn edge_writer(&mut self) -> Result<&mut csv::Writer<File>> {
        if self.edge_writer.is_none() {
            let path = self.root.join("relationships.csv");
            let mut writer = csv::WriterBuilder::new().from_path(&path).map_err(csv_err)?;
            writer.write_record(edge_header()).map_err(csv_err)?;
            self.edge_writer = Some(writer);
        }
        Ok(self.edge_writer.as_mut().unwrap())
    }
}

fn csv_err(e: csv::Error) -> CodeGraphError {
    CodeGraphError::StorageUnavailable(e.to_string())
}

#[async_trait]
impl StorageWriter for CsvStorageWriter {
    async fn write_node(&mut self, node: &GraphNode) -> Result<()> {
        let kind = node.label();
        let row = row_for(node);
        self.node_writer(kind)?.write_record(&row).map_err(csv_err)?;
        *self.node_counts.entry(kind).or_insert(0) += 1;
        Ok(())
    }

    async fn write_edge(&mut self, edge: &Edge) -> Result<()> {
        let row = edge_row(edge);
        self.edge_writer()?.write_record(&row).map_err(csv_err)?;
        *self.edge_counts.entry(edge.kind.as_str().to_string()).or_insert(0) += 1;
        Ok(())
    }

    async fn finalize(&mut self) -> Result<()> {
        for writer in self.node_writers.values_mut() {
            writer.flush()?;
        }
        if let Some(writer) = self.edge_writer.as_mut() {
            writer.flush()?;
        }

        let node_counts: HashMap<String, usize> =
            self.node_counts.iter().map(|(k, v)| (k.as_str().to_string(), *v)).collect();
        let meta = Meta {
            schema_version: SCHEMA_VERSION,
            node_counts,
            edge_counts: self.edge_counts.clone(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            last_commit_sha: last_commit_sha(self.root.parent().unwrap_or(&self.root)),
        };
        let meta_json = serde_json::to_string_pretty(&meta)?;
        let mut meta_file = File::create(self.root.join("meta.json"))?;
        meta_file.write_all(meta_json.as_bytes())?;

        let _ = std::fs::remove_file(&self.lock_path);
        Ok(())
    }
}

/// Best-effort last commit SHA, read directly from `.git/HEAD` and the ref
/// it points at — no `git2` dependency or shelling out, matching the
/// "no network-service concerns" non-goal (spec §6's metadata file).
fn last_commit_sha(repo_root: &Path) -> Option<String> {
    let head = std::fs::read_to_string(repo_root.join(".git/HEAD")).ok()?;
    let head = head.trim();
    if let Some(ref_path) = head.strip_prefix("ref: ") {
        std::fs::read_to_string(repo_root.join(".git").join(ref_path))
            .ok()
            .map(|sha| sha.trim().to_string())
    } else {
        Some(head.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{CommunityProperties, NodeKind};

    #[tokio::test]
    async fn writes_one_csv_file_per_node_label_plus_relationships() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = CsvStorageWriter::new(dir.path().join(".codegraph")).unwrap();
        writer.write_node(&GraphNode::file("a.ts", "a.ts", None)).await.unwrap();
        writer.write_node(&GraphNode::folder("src", "src")).await.unwrap();
        writer.finalize().await.unwrap();

        assert!(dir.path().join(".codegraph/File.csv").exists());
        assert!(dir.path().join(".codegraph/Folder.csv").exists());
        assert!(dir.path().join(".codegraph/meta.json").exists());
    }

    #[tokio::test]
    async fn community_keywords_escape_embedded_commas() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = CsvStorageWriter::new(dir.path().join(".codegraph")).unwrap();
        let properties = CommunityProperties {
            name: "community-0".to_string(),
            heuristic_label: "Auth".to_string(),
            keywords: vec!["auth".to_string(), "login".to_string(), "pass,word".to_string()],
            description: "test".to_string(),
            enriched_by: None,
            cohesion: 0.5,
            symbol_count: 3,
            color: "#e6194b".to_string(),
        };
        let node = GraphNode::community(&["a".to_string()], properties);
        writer.write_node(&node).await.unwrap();
        writer.finalize().await.unwrap();

        let content = std::fs::read_to_string(dir.path().join(".codegraph/Community.csv")).unwrap();
        assert!(content.contains("pass\\,word"), "expected escaped comma, got: {content}");
    }

    #[test]
    fn lock_file_is_removed_before_finalize_is_ever_called_again() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".codegraph");
        let writer = CsvStorageWriter::new(&path).unwrap();
        assert!(path.join(".lock").exists());
        drop(writer);
    }

    #[test]
    fn git_head_pointing_at_a_branch_resolves_to_the_branch_tip_sha() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".git/refs/heads")).unwrap();
        std::fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        std::fs::write(dir.path().join(".git/refs/heads/main"), "deadbeef\n").unwrap();
        assert_eq!(last_commit_sha(dir.path()), Some("deadbeef".to_string()));
    }

    #[test]
    fn missing_git_directory_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(last_commit_sha(dir.path()), None);
    }

    fn _kind_is_used(_: NodeKind) {}
}
