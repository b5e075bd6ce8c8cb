//! Symbol Table (C6): two in-memory indices built once, after every
//! extraction worker has returned (spec §4.5).

use codegraph_core::{NodeId, NodeKind};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct FuzzyHit {
    pub node_id: NodeId,
    pub file_path: String,
    pub kind: NodeKind,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    exact: HashMap<(String, String), NodeId>,
    fuzzy: HashMap<String, Vec<FuzzyHit>>,
    file_count: std::collections::HashSet<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct SymbolTableStats {
    pub file_count: usize,
    pub global_symbol_count: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// O(1) insert. `exact` is last-writer-wins on an (file, name) collision
    /// (e.g. two overloads spanning the same file+name — the later
    /// extraction-order definition wins); `fuzzy` is append-only so every
    /// candidate for a name survives for later disambiguation.
    pub fn add(&mut self, file_path: &str, name: &str, node_id: NodeId, kind: NodeKind) {
        self.file_count.insert(file_path.to_string());
        self.exact
            .insert((file_path.to_string(), name.to_string()), node_id.clone());
        self.fuzzy
            .entry(name.to_string())
            .or_default()
            .push(FuzzyHit { node_id, file_path: file_path.to_string(), kind });
    }

    pub fn lookup_exact(&self, file_path: &str, name: &str) -> Option<&NodeId> {
        self.exact.get(&(file_path.to_string(), name.to_string()))
    }

    pub fn lookup_fuzzy(&self, name: &str) -> &[FuzzyHit] {
        self.fuzzy.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn clear(&mut self) {
        self.exact.clear();
        self.fuzzy.clear();
        self.file_count.clear();
    }

    pub fn get_stats(&self) -> SymbolTableStats {
        SymbolTableStats {
            file_count: self.file_count.len(),
            global_symbol_count: self.fuzzy.len(),
        }
    }
}
