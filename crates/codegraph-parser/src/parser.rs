//! Parser Host (C3): owns the tree-sitter grammar registry and turns raw
//! file bytes into a `tree_sitter::Tree`, retrying once against a
//! comment/attribute-stripped copy of the source when the first parse
//! yields an error node (spec §4.3).

use codegraph_core::{CodeGraphError, Language, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use tree_sitter::{Parser, Tree};

use crate::language::LanguageRegistry;

pub struct ParsedFile {
    pub tree: Tree,
    /// The content the tree was actually parsed from — the original
    /// source unless a tolerant retry substituted a sanitized copy.
    pub content: String,
    pub retried: bool,
}

/// Each worker thread borrows a `{language -> Parser}` map from here
/// instead of building a fresh `Parser` per file, since `set_language`
/// dominates tree-sitter's per-call overhead far more than reuse does.
pub struct ParserHost {
    registry: LanguageRegistry,
    pool: Mutex<Vec<HashMap<Language, Parser>>>,
}

impl Default for ParserHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserHost {
    pub fn new() -> Self {
        Self {
            registry: LanguageRegistry::new(),
            pool: Mutex::new(Vec::new()),
        }
    }

    pub fn is_supported(&self, language: Language) -> bool {
        self.registry.is_supported(language)
    }

    pub fn parse(&self, file_path: &str, language: Language, content: &str) -> Result<ParsedFile> {
        let mut parser = self.checkout(language, file_path)?;

        let first_tree = parser.parse(content, None);
        let needs_retry = match &first_tree {
            Some(tree) => tree.root_node().has_error(),
            None => true,
        };

        let parsed = if needs_retry {
            let sanitized = sanitize(content, language);
            match parser.parse(&sanitized, None) {
                Some(tree) => Some(ParsedFile {
                    tree,
                    content: sanitized,
                    retried: true,
                }),
                // sanitized parse failed outright: fall back to the
                // original error-bearing tree rather than dropping the file.
                None => first_tree.map(|tree| ParsedFile {
                    tree,
                    content: content.to_string(),
                    retried: true,
                }),
            }
        } else {
            first_tree.map(|tree| ParsedFile {
                tree,
                content: content.to_string(),
                retried: false,
            })
        };

        self.checkin(language, parser);
        parsed.ok_or_else(|| CodeGraphError::ParseFailure {
            path: file_path.to_string(),
            reason: "tree-sitter returned no tree".to_string(),
        })
    }

    fn checkout(&self, language: Language, file_path: &str) -> Result<Parser> {
        {
            let mut pool = self.pool.lock();
            if let Some(mut map) = pool.pop() {
                if let Some(parser) = map.remove(&language) {
                    pool.push(map);
                    return Ok(parser);
                }
                pool.push(map);
            }
        }
        self.registry
            .create_parser_for_file(language, file_path)
            .ok_or_else(|| CodeGraphError::UnsupportedLanguage(format!("{language:?}")))
    }

    fn checkin(&self, language: Language, parser: Parser) {
        let mut pool = self.pool.lock();
        let mut map = pool.pop().unwrap_or_default();
        map.insert(language, parser);
        pool.push(map);
    }
}

/// Strips block comments everywhere, and Rust attribute lines in
/// addition, replacing stripped spans with equivalent whitespace so line
/// numbers (and therefore symbol ids) stay stable across the retry.
fn sanitize(content: &str, language: Language) -> String {
    let without_comments = strip_block_comments(content);
    match language {
        Language::Rust => strip_rust_attribute_lines(&without_comments),
        _ => without_comments,
    }
}

fn strip_block_comments(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let bytes = content.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if content[i..].starts_with("/*") {
            let close = content[i + 2..]
                .find("*/")
                .map(|p| i + 2 + p + 2)
                .unwrap_or(content.len());
            for b in content[i..close].bytes() {
                out.push(if b == b'\n' { '\n' } else { ' ' });
            }
            i = close;
        } else {
            let ch = content[i..].chars().next().unwrap();
            out.push(ch);
            i += ch.len_utf8();
        }
    }
    out
}

fn strip_rust_attribute_lines(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            if line.trim_start().starts_with('#') {
                " ".repeat(line.len())
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_rust_without_retry() {
        let host = ParserHost::new();
        let parsed = host.parse("a.rs", Language::Rust, "fn main() {}").unwrap();
        assert!(!parsed.retried);
        assert!(!parsed.tree.root_node().has_error());
    }

    #[test]
    fn retries_with_attribute_lines_stripped_on_error() {
        let host = ParserHost::new();
        // malformed attribute body the grammar chokes on; the retry
        // blanks the line and the surrounding function still parses.
        let src = "#[totally not valid attribute syntax(((]\nfn main() {}\n";
        let parsed = host.parse("a.rs", Language::Rust, src).unwrap();
        assert!(parsed.retried);
    }

    #[test]
    fn unsupported_language_errors() {
        let host = ParserHost::new();
        assert!(host.parse("a.kt", Language::Kotlin, "fun main() {}").is_err());
    }

    #[test]
    fn block_comments_are_blanked_preserving_line_count() {
        let src = "fn a() {}\n/* comment\nspans lines */\nfn b() {}\n";
        let stripped = strip_block_comments(src);
        assert_eq!(src.lines().count(), stripped.lines().count());
        assert!(!stripped.contains("comment"));
    }
}
