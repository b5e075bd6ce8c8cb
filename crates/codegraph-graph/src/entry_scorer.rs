//! Entry-Point Scorer (C12): combines export status, caller/callee fan-out,
//! naming conventions and framework hints into a numeric entry-point score
//! (spec §4.11).

use codegraph_core::Language;

use crate::framework_hints::FrameworkHint;

enum Pattern {
    Exact(&'static str),
    Prefix(&'static str),
    Suffix(&'static str),
}

fn matches(name: &str, pattern: &Pattern) -> bool {
    match pattern {
        Pattern::Exact(p) => name == *p,
        Pattern::Prefix(p) => name.starts_with(p),
        Pattern::Suffix(p) => name.ends_with(p),
    }
}

const UNIVERSAL_ENTRY_PATTERNS: &[Pattern] = &[
    Pattern::Exact("main"),
    Pattern::Exact("init"),
    Pattern::Exact("bootstrap"),
    Pattern::Exact("start"),
    Pattern::Exact("run"),
    Pattern::Exact("setup"),
    Pattern::Exact("configure"),
    Pattern::Prefix("handle"),
    Pattern::Prefix("on"),
    Pattern::Suffix("Handler"),
    Pattern::Suffix("Controller"),
    Pattern::Prefix("process"),
    Pattern::Prefix("execute"),
    Pattern::Prefix("perform"),
    Pattern::Prefix("dispatch"),
    Pattern::Prefix("trigger"),
    Pattern::Prefix("fire"),
    Pattern::Prefix("emit"),
];

const UTILITY_PATTERNS: &[Pattern] = &[
    Pattern::Prefix("get"),
    Pattern::Prefix("set"),
    Pattern::Prefix("is"),
    Pattern::Prefix("has"),
    Pattern::Prefix("can"),
    Pattern::Prefix("format"),
    Pattern::Prefix("parse"),
    Pattern::Prefix("validate"),
    Pattern::Prefix("to"),
    Pattern::Prefix("from"),
    Pattern::Prefix("encode"),
    Pattern::Prefix("serialize"),
    Pattern::Prefix("clone"),
    Pattern::Prefix("merge"),
];

/// Per-language extensions to the universal entry-pattern table. The
/// source leaves this unspecified beyond "languagePatterns(language)"; no
/// language currently contributes anything beyond the universal set.
fn language_patterns(_language: Language) -> &'static [Pattern] {
    &[]
}

fn matches_any(name: &str, patterns: &[Pattern]) -> bool {
    patterns.iter().any(|p| matches(name, p))
}

const TEST_PATH_MARKERS: &[&str] = &[".test.", ".spec.", "__tests__", "__mocks__", "/test/", "/tests/", "/testing/"];

/// Case-insensitive, backslash-normalised per spec §4.11.
pub fn is_test_file(path: &str) -> bool {
    let normalized = path.replace('\\', "/").to_ascii_lowercase();
    if TEST_PATH_MARKERS.iter().any(|m| normalized.contains(m)) {
        return true;
    }
    normalized.ends_with("_test.go")
        || normalized.ends_with("_test.py")
        || normalized.ends_with("tests.swift")
        || normalized.contains(".tests/")
        || normalized.contains("tests/feature/")
        || normalized.contains("tests/unit/")
}

pub struct SymbolContext<'a> {
    pub name: &'a str,
    pub language: Language,
    pub is_exported: bool,
    pub caller_count: usize,
    pub callee_count: usize,
}

#[derive(Debug, Clone)]
pub struct EntryScore {
    pub score: f32,
    pub reasons: Vec<String>,
}

pub fn score(
    ctx: &SymbolContext,
    path_hint: Option<&FrameworkHint>,
    ast_hint: Option<&FrameworkHint>,
) -> EntryScore {
    let mut reasons = Vec::new();
    if ctx.callee_count == 0 {
        reasons.push("no-outgoing-calls".to_string());
        return EntryScore { score: 0.0, reasons };
    }

    let mut value = ctx.callee_count as f32 / (ctx.caller_count as f32 + 1.0);

    if ctx.is_exported {
        value *= 2.0;
        reasons.push("exported".to_string());
    }
    if matches_any(ctx.name, UNIVERSAL_ENTRY_PATTERNS) || matches_any(ctx.name, language_patterns(ctx.language)) {
        value *= 1.5;
        reasons.push("entry-pattern".to_string());
    }
    if matches_any(ctx.name, UTILITY_PATTERNS) || ctx.name.starts_with('_') {
        value *= 0.3;
        reasons.push("utility-pattern".to_string());
    }
    if let Some(hint) = path_hint {
        value *= hint.multiplier;
        reasons.push(format!("framework:{}", hint.reason));
    }
    if let Some(hint) = ast_hint {
        value *= hint.multiplier;
    }

    EntryScore { score: value, reasons }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(name: &str, is_exported: bool, caller: usize, callee: usize) -> SymbolContext<'_> {
        SymbolContext { name, language: Language::TypeScript, is_exported, caller_count: caller, callee_count: callee }
    }

    #[test]
    fn no_outgoing_calls_scores_zero() {
        let result = score(&ctx("leaf", true, 0, 0), None, None);
        assert_eq!(result.score, 0.0);
        assert!(result.reasons.contains(&"no-outgoing-calls".to_string()));
    }

    #[test]
    fn exported_entry_pattern_doubles_then_multiplies() {
        let result = score(&ctx("handleRequest", true, 0, 3), None, None);
        // base = 3/1 = 3; exported *2 = 6; entry-pattern *1.5 = 9
        assert!((result.score - 9.0).abs() < 1e-6);
        assert!(result.reasons.contains(&"exported".to_string()));
        assert!(result.reasons.contains(&"entry-pattern".to_string()));
    }

    #[test]
    fn utility_prefix_suppresses_score() {
        let result = score(&ctx("getUser", true, 0, 2), None, None);
        // base=2, exported*2=4, utility*0.3=1.2
        assert!((result.score - 1.2).abs() < 1e-6);
    }

    #[test]
    fn framework_hint_multiplies_score() {
        let hint = FrameworkHint { framework: "nextjs-pages".into(), multiplier: 3.0, reason: "path:nextjs-pages".into() };
        let result = score(&ctx("Dashboard", true, 0, 1), Some(&hint), None);
        assert!(result.reasons.iter().any(|r| r.starts_with("framework:")));
    }

    #[test]
    fn test_file_paths_are_detected() {
        assert!(is_test_file("src/handler.test.ts"));
        assert!(is_test_file("pkg/service_test.go"));
        assert!(is_test_file("Tests/FooTests.swift"));
        assert!(!is_test_file("src/handler.ts"));
    }
}
