pub mod ast_cache;
pub mod extraction;
pub mod file_collect;
pub mod import_resolver;
pub mod lang_rules;
pub mod language;
pub mod parser;
pub mod symbol_table;
pub mod walk_util;

pub use ast_cache::AstCache;
pub use extraction::{extract, CallSite, Definition, ExtractionOutput, HeritageRecord, ImportRecord};
pub use file_collect::{is_ignored, walk, WalkedFile};
pub use import_resolver::{ImportMap, ImportResolver};
pub use lang_rules::{rules_for, HeritageKind, LangRules};
pub use language::LanguageRegistry;
pub use parser::{ParsedFile, ParserHost};
pub use symbol_table::{FuzzyHit, SymbolTable, SymbolTableStats};
