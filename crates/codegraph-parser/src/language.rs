use codegraph_core::Language;
use std::collections::HashMap;
use std::path::Path;
use tree_sitter::Parser;

pub struct LanguageConfig {
    pub language: tree_sitter::Language,
}

/// Maps each `Language` with a wired grammar to its `tree_sitter::Language`.
/// Kotlin is recognised by `classify` (C2) but has no entry here — matching
/// the teacher's own `tree-sitter-kotlin` being left disabled for
/// version-compatibility reasons — so files classified as Kotlin are
/// skipped at parse time with a `ParseFailure` recorded per file.
pub struct LanguageRegistry {
    configs: HashMap<Language, LanguageConfig>,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageRegistry {
    pub fn new() -> Self {
        let mut configs = HashMap::new();

        configs.insert(
            Language::Rust,
            LanguageConfig {
                language: tree_sitter_rust::LANGUAGE.into(),
            },
        );
        configs.insert(
            Language::TypeScript,
            LanguageConfig {
                language: tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            },
        );
        configs.insert(
            Language::JavaScript,
            LanguageConfig {
                language: tree_sitter_javascript::LANGUAGE.into(),
            },
        );
        configs.insert(
            Language::Python,
            LanguageConfig {
                language: tree_sitter_python::LANGUAGE.into(),
            },
        );
        configs.insert(
            Language::Go,
            LanguageConfig {
                language: tree_sitter_go::LANGUAGE.into(),
            },
        );
        configs.insert(
            Language::Java,
            LanguageConfig {
                language: tree_sitter_java::LANGUAGE.into(),
            },
        );
        configs.insert(
            Language::Cpp,
            LanguageConfig {
                language: tree_sitter_cpp::LANGUAGE.into(),
            },
        );
        configs.insert(
            Language::C,
            LanguageConfig {
                language: tree_sitter_cpp::LANGUAGE.into(),
            },
        );
        configs.insert(
            Language::Swift,
            LanguageConfig {
                language: tree_sitter_swift::LANGUAGE.into(),
            },
        );
        configs.insert(
            Language::CSharp,
            LanguageConfig {
                language: tree_sitter_c_sharp::LANGUAGE.into(),
            },
        );
        configs.insert(
            Language::Php,
            LanguageConfig {
                language: tree_sitter_php::LANGUAGE_PHP.into(),
            },
        );

        Self { configs }
    }

    /// Chooses the `.tsx` flavour of the TypeScript grammar by filename,
    /// per spec §4.3 ("the `.tsx` flavour is selected by filename when
    /// loading the TypeScript grammar").
    pub fn create_parser_for_file(&self, language: Language, file_path: &str) -> Option<Parser> {
        if language == Language::TypeScript
            && Path::new(file_path)
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("tsx"))
                .unwrap_or(false)
        {
            let mut parser = Parser::new();
            parser
                .set_language(&tree_sitter_typescript::LANGUAGE_TSX.into())
                .ok()?;
            return Some(parser);
        }
        self.create_parser(language)
    }

    pub fn create_parser(&self, language: Language) -> Option<Parser> {
        let config = self.configs.get(&language)?;
        let mut parser = Parser::new();
        parser.set_language(&config.language).ok()?;
        Some(parser)
    }

    pub fn is_supported(&self, language: Language) -> bool {
        self.configs.contains_key(&language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::{LANGUAGE_VERSION, MIN_COMPATIBLE_LANGUAGE_VERSION};

    #[test]
    fn registered_languages_use_supported_versions() {
        let registry = LanguageRegistry::new();
        for (language, config) in &registry.configs {
            let version = config.language.version();
            assert!(
                (MIN_COMPATIBLE_LANGUAGE_VERSION..=LANGUAGE_VERSION).contains(&version),
                "Language {:?} uses incompatible Tree-sitter version {} (supported {}..={})",
                language,
                version,
                MIN_COMPATIBLE_LANGUAGE_VERSION,
                LANGUAGE_VERSION
            );
        }
    }

    #[test]
    fn kotlin_is_classified_but_has_no_grammar() {
        let registry = LanguageRegistry::new();
        assert!(!registry.is_supported(Language::Kotlin));
        assert_eq!(Language::from_extension("kt"), Some(Language::Kotlin));
    }

    #[test]
    fn tsx_files_select_the_tsx_grammar_flavour() {
        let registry = LanguageRegistry::new();
        assert!(registry
            .create_parser_for_file(Language::TypeScript, "src/app.tsx")
            .is_some());
        assert!(registry
            .create_parser_for_file(Language::TypeScript, "src/app.ts")
            .is_some());
    }
}
