//! Integration coverage for `CsvStorageWriter` against a real pipeline run:
//! verifies the persisted file layout and the CSV escaping boundary
//! (scenario 6) end to end, rather than against a hand-built node only.

use codegraph_core::{NeverCancelled, NullProgressSink, PipelineConfig};
use codegraph_graph::CsvStorageWriter;

fn write_file(dir: &std::path::Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

#[tokio::test]
async fn analyzing_a_repo_persists_one_csv_per_label_plus_relationships_and_meta() {
    let repo = tempfile::tempdir().unwrap();
    write_file(
        repo.path(),
        "src/main.rs",
        "fn helper() {}\nfn main() { helper(); }\n",
    );

    let storage_root = repo.path().join(".codegraph");
    let mut writer = CsvStorageWriter::new(storage_root.clone()).unwrap();
    let config = PipelineConfig::default();
    let report = codegraph_graph::run(repo.path(), &config, &NullProgressSink, &NeverCancelled, &mut writer)
        .await
        .unwrap();

    assert!(report.node_count > 0);
    assert!(storage_root.join("File.csv").exists());
    assert!(storage_root.join("Function.csv").exists());
    assert!(storage_root.join("relationships.csv").exists());
    assert!(storage_root.join("meta.json").exists());
    assert!(!storage_root.join(".lock").exists(), "lock file must be cleared by finalize");

    let meta: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(storage_root.join("meta.json")).unwrap()).unwrap();
    assert_eq!(meta["schema_version"], 1);
    assert!(meta["node_counts"]["File"].as_u64().unwrap() >= 1);
}

/// Scenario 6: a community keyword containing a literal comma is escaped
/// with `\,` so the array-field separator stays unambiguous, and the row
/// round-trips through the `csv` crate's own quoting unharmed.
#[tokio::test]
async fn community_keyword_with_a_literal_comma_round_trips_through_the_persisted_file() {
    use codegraph_core::{CommunityProperties, GraphNode, StorageWriter};

    let dir = tempfile::tempdir().unwrap();
    let mut writer = CsvStorageWriter::new(dir.path().join(".codegraph")).unwrap();
    let properties = CommunityProperties {
        name: "community-0".to_string(),
        heuristic_label: "Auth".to_string(),
        keywords: vec!["auth".to_string(), "login".to_string(), "pass,word".to_string()],
        description: "authentication cluster".to_string(),
        enriched_by: None,
        cohesion: 0.75,
        symbol_count: 3,
        color: "#e6194b".to_string(),
    };
    let node = GraphNode::community(&["Function:a.ts:login:1".to_string()], properties);
    writer.write_node(&node).await.unwrap();
    writer.finalize().await.unwrap();

    let mut reader = csv::Reader::from_path(dir.path().join(".codegraph/Community.csv")).unwrap();
    let headers = reader.headers().unwrap().clone();
    let keywords_col = headers.iter().position(|h| h == "keywords").unwrap();
    let record = reader.records().next().unwrap().unwrap();
    assert_eq!(&record[keywords_col], "auth,login,pass\\,word");
}
