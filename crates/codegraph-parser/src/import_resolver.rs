//! Import Resolver (C7): resolves each file's raw import specifiers to
//! in-repo file paths using a suffix index built once over the indexed
//! file list (spec §4.6).

use crate::extraction::ImportRecord;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Extensions tried when a specifier omits one, drawn from every
/// classifier extension (spec §4.2) plus the bare specifier itself.
const TRY_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "jsx", "py", "go", "rs", "java", "c", "h", "cpp", "cc", "cxx", "hpp", "cs",
    "php", "swift", "kt",
];

/// `fromFile -> {toFile}`, insertion-ordered per `fromFile` so the Call
/// Processor's "first match in insertion order" tie-break (spec §4.8) is
/// well-defined.
#[derive(Debug, Default, Clone)]
pub struct ImportMap {
    edges: HashMap<String, Vec<String>>,
}

impl ImportMap {
    pub fn imports_of(&self, from_file: &str) -> &[String] {
        self.edges.get(from_file).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.edges.iter()
    }

    fn insert(&mut self, from: &str, to: String) {
        let list = self.edges.entry(from.to_string()).or_default();
        if !list.contains(&to) {
            list.push(to);
        }
    }
}

pub struct ImportResolver {
    all_file_paths: HashSet<String>,
    suffix_index: HashMap<String, String>,
    resolve_cache: RefCell<HashMap<(String, String), Option<String>>>,
}

impl ImportResolver {
    /// Pre-builds the immutable resolution context from the list of
    /// indexed (already forward-slash-normalised) file paths.
    pub fn new(file_paths: &[String]) -> Self {
        let all_file_paths: HashSet<String> = file_paths.iter().cloned().collect();
        let mut suffix_index = HashMap::new();
        for path in file_paths {
            for suffix in path_suffixes(path) {
                // first file wins on a suffix collision (spec §4.6: "the
                // index stores the first"), so only insert if absent.
                suffix_index.entry(suffix).or_insert_with(|| path.clone());
            }
        }
        Self {
            all_file_paths,
            suffix_index,
            resolve_cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn resolve(&self, from_file: &str, specifier: &str) -> Option<String> {
        let key = (from_file.to_string(), specifier.to_string());
        if let Some(cached) = self.resolve_cache.borrow().get(&key) {
            return cached.clone();
        }
        let result = self.resolve_uncached(from_file, specifier);
        self.resolve_cache.borrow_mut().insert(key, result.clone());
        result
    }

    fn resolve_uncached(&self, from_file: &str, specifier: &str) -> Option<String> {
        if specifier.starts_with('.') {
            if let Some(joined) = self.join_relative(from_file, specifier) {
                if self.all_file_paths.contains(&joined) {
                    return Some(joined);
                }
                for ext in TRY_EXTENSIONS {
                    let candidate = format!("{joined}.{ext}");
                    if self.all_file_paths.contains(&candidate) {
                        return Some(candidate);
                    }
                }
                // directory-style import: `./utils` -> `utils/index.ts`.
                for ext in TRY_EXTENSIONS {
                    let candidate = format!("{joined}/index.{ext}");
                    if self.all_file_paths.contains(&candidate) {
                        return Some(candidate);
                    }
                }
            }
        }

        if let Some(hit) = self.suffix_index.get(specifier) {
            return Some(hit.clone());
        }
        for ext in TRY_EXTENSIONS {
            if let Some(hit) = self.suffix_index.get(&format!("{specifier}.{ext}")) {
                return Some(hit.clone());
            }
        }
        let stripped = specifier.trim_start_matches("./").trim_start_matches("../");
        if stripped != specifier {
            if let Some(hit) = self.suffix_index.get(stripped) {
                return Some(hit.clone());
            }
        }
        None
    }

    fn join_relative(&self, from_file: &str, specifier: &str) -> Option<String> {
        let dir: Vec<&str> = from_file.rsplit_once('/').map(|(d, _)| d).unwrap_or("").split('/').filter(|s| !s.is_empty()).collect();
        let mut segments: Vec<&str> = dir;
        for part in specifier.split('/') {
            match part {
                "." | "" => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }
        if segments.is_empty() {
            None
        } else {
            Some(segments.join("/"))
        }
    }

    pub fn resolve_all(&self, imports: &[ImportRecord]) -> ImportMap {
        let mut map = ImportMap::default();
        for import in imports {
            if let Some(target) = self.resolve(&import.file_path, &import.specifier) {
                if target != import.file_path {
                    map.insert(&import.file_path, target);
                }
            }
        }
        map
    }
}

/// Every suffix of `path` split on `/`, from the full path down to the
/// basename — `a/b/c.rs` yields `["a/b/c.rs", "b/c.rs", "c.rs"]`.
fn path_suffixes(path: &str) -> Vec<String> {
    let segments: Vec<&str> = path.split('/').collect();
    (0..segments.len()).map(|i| segments[i..].join("/")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolves_relative_specifier_with_extension_inference() {
        let resolver = ImportResolver::new(&files(&["src/index.ts", "src/utils.ts"]));
        assert_eq!(
            resolver.resolve("src/index.ts", "./utils"),
            Some("src/utils.ts".to_string())
        );
    }

    #[test]
    fn falls_back_to_suffix_index_for_bare_specifiers() {
        let resolver = ImportResolver::new(&files(&["src/lib/helpers.rs", "src/main.rs"]));
        assert_eq!(
            resolver.resolve("src/main.rs", "lib/helpers"),
            Some("src/lib/helpers.rs".to_string())
        );
    }

    #[test]
    fn unresolved_specifier_returns_none() {
        let resolver = ImportResolver::new(&files(&["src/main.rs"]));
        assert_eq!(resolver.resolve("src/main.rs", "nonexistent"), None);
    }

    #[test]
    fn suffix_collision_keeps_first_inserted_file() {
        let resolver = ImportResolver::new(&files(&["pkg-a/utils.ts", "pkg-b/utils.ts"]));
        assert_eq!(
            resolver.resolve("elsewhere.ts", "utils"),
            Some("pkg-a/utils.ts".to_string())
        );
    }

    #[test]
    fn parent_relative_specifier_walks_up_a_directory() {
        let resolver = ImportResolver::new(&files(&["src/a/mod.rs", "src/b.rs"]));
        assert_eq!(
            resolver.resolve("src/a/mod.rs", "../b"),
            Some("src/b.rs".to_string())
        );
    }
}
