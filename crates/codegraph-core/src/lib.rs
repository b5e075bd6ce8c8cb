pub mod config;
pub mod error;
pub mod node;
pub mod traits;
pub mod types;

pub use config::{LoggingConfig, ParserConfig, PipelineConfig, ProcessConfig};
pub use error::{CodeGraphError, Result};
pub use node::{
    community_id, edge_id, file_id, folder_id, process_id, symbol_id, CommunityProperties, Edge,
    FileProperties, FolderProperties, GraphNode, NodeProperties, ProcessProperties,
    SymbolProperties,
};
pub use traits::{
    CancellationToken, CodeParser, GraphStore, NeverCancelled, NullProgressSink, Phase,
    ProgressSink, StorageWriter,
};
pub use types::{EdgeId, EdgeKind, Language, NodeId, NodeKind, ProcessType};
