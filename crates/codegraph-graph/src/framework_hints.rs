//! Framework Hinter (C11): scores a file path, and separately a symbol's
//! source text, against curated pattern tables to produce an entry-point
//! score multiplier (spec §4.10).

use codegraph_core::Language;
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub struct FrameworkHint {
    pub framework: String,
    pub multiplier: f32,
    pub reason: String,
}

impl FrameworkHint {
    fn new(framework: impl Into<String>, multiplier: f32, reason: impl Into<String>) -> Self {
        Self { framework: framework.into(), multiplier, reason: reason.into() }
    }
}

fn normalize_path(path: &str) -> String {
    let forward = path.replace('\\', "/").to_ascii_lowercase();
    if forward.starts_with('/') {
        forward
    } else {
        format!("/{forward}")
    }
}

fn extension_of(path: &str) -> &str {
    path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("")
}

fn ext_language_tag(ext: &str) -> &'static str {
    match ext {
        "go" => "go",
        "rs" => "rust",
        "c" => "c",
        "cpp" | "cc" | "cxx" => "cpp",
        "kt" => "kotlin",
        "ts" | "tsx" => "typescript",
        "js" | "jsx" => "javascript",
        _ => "unknown",
    }
}

static NEXTJS_APP_PAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/app/.*/page\.(tsx|ts|jsx|js)$").unwrap());
static NEXTJS_APP_API: Lazy<Regex> = Lazy::new(|| Regex::new(r"/app/.*/api/.*/route\.ts$").unwrap());
static NEXTJS_APP_LAYOUT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/app/.*/layout\.(tsx|ts)$").unwrap());
static PAGES_DIR: Lazy<Regex> = Lazy::new(|| Regex::new(r"/pages/([^_][^/]*)\.(tsx|ts|jsx|js)$").unwrap());
static ROUTES_TS_JS: Lazy<Regex> = Lazy::new(|| Regex::new(r"/routes/[^/]*\.(ts|js)$").unwrap());
static CONTROLLERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"/controllers?/[^/]*\.(ts|js|java|kt|cs|go|php)$").unwrap());
static SPRING_CONTROLLER_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"controller\.java$").unwrap());
static ROUTERS_PY: Lazy<Regex> = Lazy::new(|| Regex::new(r"/routers/[^/]*\.py$").unwrap());
static HANDLERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"/handlers/[^/]*\.(go|ts|js|rs)$").unwrap());
static MAIN_FILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(^|/)main\.(go|rs|c|cpp|kt)$").unwrap());
static RUST_BIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"/src/bin/[^/]*\.rs$").unwrap());
static LARAVEL_ROUTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(/routes/[^/]*\.php$|/http/controllers/[^/]*\.php$)").unwrap());
static LARAVEL_SUPPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/(jobs|listeners|middleware)/[^/]*\.php$").unwrap());
static IOS_VIEW_CONTROLLER: Lazy<Regex> = Lazy::new(|| Regex::new(r"/viewcontrollers/[^/]*\.swift$").unwrap());

/// Normalises `path` and matches the ordered rule table; returns the first
/// hit, per spec §4.10 ("return the first match").
pub fn hint_from_path(path: &str) -> Option<FrameworkHint> {
    let p = normalize_path(path);

    if NEXTJS_APP_API.is_match(&p) || p.contains("/pages/api/") {
        return Some(FrameworkHint::new("nextjs-api", 3.0, "path:nextjs-api"));
    }
    if PAGES_DIR.is_match(&p) {
        return Some(FrameworkHint::new("nextjs-pages", 3.0, "path:nextjs-pages"));
    }
    if NEXTJS_APP_PAGE.is_match(&p) {
        return Some(FrameworkHint::new("nextjs-app", 3.0, "path:nextjs-app-page"));
    }
    if NEXTJS_APP_LAYOUT.is_match(&p) {
        return Some(FrameworkHint::new("nextjs-app", 2.0, "path:nextjs-app-layout"));
    }
    if ROUTES_TS_JS.is_match(&p) {
        return Some(FrameworkHint::new("express", 2.5, "path:express-routes"));
    }
    if SPRING_CONTROLLER_SUFFIX.is_match(&p) {
        return Some(FrameworkHint::new("spring", 3.0, "path:spring-controller"));
    }
    if CONTROLLERS.is_match(&p) {
        let ext = extension_of(&p);
        return Some(match ext {
            "java" | "kt" => FrameworkHint::new("spring", 3.0, "path:controller"),
            _ => FrameworkHint::new("controller", 2.5, "path:controller"),
        });
    }
    if p.ends_with("/views.py") || p.ends_with("/urls.py") || p == "/views.py" || p == "/urls.py" {
        return Some(FrameworkHint::new("django", 2.0, "path:django"));
    }
    if ROUTERS_PY.is_match(&p) {
        return Some(FrameworkHint::new("fastapi", 3.0, "path:fastapi-router"));
    }
    if p.contains("/controller") {
        return Some(FrameworkHint::new("spring", 3.0, "path:spring"));
    }
    if HANDLERS.is_match(&p) {
        let lang = ext_language_tag(extension_of(&p));
        return Some(FrameworkHint::new(format!("{lang}-http"), 2.5, "path:handler"));
    }
    if MAIN_FILE.is_match(&p) {
        let lang = ext_language_tag(extension_of(&p));
        return Some(FrameworkHint::new(lang, 3.0, "path:main"));
    }
    if RUST_BIN.is_match(&p) {
        return Some(FrameworkHint::new("rust", 2.5, "path:rust-bin"));
    }
    if LARAVEL_ROUTES.is_match(&p) {
        return Some(FrameworkHint::new("laravel", 3.0, "path:laravel-routes"));
    }
    if LARAVEL_SUPPORT.is_match(&p) {
        return Some(FrameworkHint::new("laravel", 2.5, "path:laravel-support"));
    }
    if p.ends_with("/appdelegate.swift") || p == "/appdelegate.swift" {
        return Some(FrameworkHint::new("ios", 3.0, "path:app-delegate"));
    }
    if IOS_VIEW_CONTROLLER.is_match(&p) {
        return Some(FrameworkHint::new("uikit", 2.5, "path:view-controller"));
    }
    None
}

/// Matches the first ~300 chars of a definition's text (case-insensitive
/// substring) against a per-language pattern table.
pub fn hint_from_ast(language: Language, text: &str) -> Option<FrameworkHint> {
    let window: String = text.chars().take(300).collect::<String>().to_ascii_lowercase();
    let patterns: &[(&str, &str, f32)] = match language {
        Language::TypeScript | Language::JavaScript => {
            &[("@controller", "nestjs", 3.2), ("@get", "nestjs", 3.2), ("@injectable", "nestjs", 2.5)]
        }
        Language::Python => &[("@app.get", "fastapi", 3.0), ("@app.route", "flask", 2.5)],
        Language::Java => &[("@restcontroller", "spring", 3.2), ("@controller", "spring", 3.0)],
        Language::CSharp => &[("[apicontroller]", "aspnet", 3.2)],
        Language::Php => &[("route::get", "laravel", 3.0), ("route::post", "laravel", 3.0)],
        Language::Swift => &[("viewdidload", "uikit", 2.0)],
        _ => &[],
    };
    patterns
        .iter()
        .find(|(needle, _, _)| window.contains(needle))
        .map(|(_, framework, mult)| FrameworkHint::new(framework, *mult, format!("ast:{framework}")))
}
