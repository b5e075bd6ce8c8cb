use lru::LruCache;
use std::num::NonZeroUsize;
use tree_sitter::Tree;

/// Bounded LRU cache of parsed trees, keyed by file path (C4). Accessed
/// only from the single orchestrator — per-file parsing on extraction
/// workers uses isolated parser instances instead, per spec §4.3's
/// concurrency note, so this needs no internal locking.
pub struct AstCache {
    inner: LruCache<String, Tree>,
}

impl AstCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            inner: LruCache::new(capacity),
        }
    }

    pub fn get(&mut self, file_path: &str) -> Option<&Tree> {
        self.inner.get(file_path)
    }

    pub fn put(&mut self, file_path: String, tree: Tree) {
        self.inner.put(file_path, tree);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::Language;
    use tree_sitter::Parser;

    fn parse_rust(src: &str) -> Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .unwrap();
        parser.parse(src, None).unwrap()
    }

    #[test]
    fn evicts_least_recently_used_entry_on_overflow() {
        let _ = Language::Rust;
        let mut cache = AstCache::new(2);
        cache.put("a.rs".into(), parse_rust("fn a() {}"));
        cache.put("b.rs".into(), parse_rust("fn b() {}"));
        // touch a.rs so b.rs becomes the least-recently-used entry
        assert!(cache.get("a.rs").is_some());
        cache.put("c.rs".into(), parse_rust("fn c() {}"));

        assert!(cache.get("b.rs").is_none(), "b.rs should have been evicted");
        assert!(cache.get("a.rs").is_some());
        assert!(cache.get("c.rs").is_some());
    }

    #[test]
    fn miss_after_eviction_returns_none() {
        let mut cache = AstCache::new(1);
        cache.put("a.rs".into(), parse_rust("fn a() {}"));
        cache.put("b.rs".into(), parse_rust("fn b() {}"));
        assert!(cache.get("a.rs").is_none());
    }
}
