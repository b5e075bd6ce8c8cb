//! Per-language extraction tables (spec §4.4). Extraction itself is one
//! generic tree-sitter cursor walk (`extraction::walk`) parameterised by one
//! of these tables per language, rather than a hand-written visitor per
//! grammar — the walker is data-driven, the grammar knowledge lives here.

use codegraph_core::{Language, NodeKind};
use tree_sitter::Node;

#[derive(Clone, Copy)]
pub struct DefinitionRule {
    pub node_kind: &'static str,
    pub result_kind: NodeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeritageKind {
    Extends,
    Implements,
    TraitImpl,
}

impl HeritageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeritageKind::Extends => "extends",
            HeritageKind::Implements => "implements",
            HeritageKind::TraitImpl => "trait-impl",
        }
    }
}

/// How a node carrying heritage information (a class/impl/interface
/// definition) exposes its parent(s).
#[derive(Clone, Copy)]
pub struct HeritageRule {
    /// Node kind that owns the heritage clause (usually the definition node
    /// itself, but Rust's `impl_item` is both the definition and the clause).
    pub node_kind: &'static str,
    /// Field to read the owning class/struct name from on `node_kind`
    /// itself; `None` means "use the name of the innermost enclosing
    /// definition" (the usual case — heritage lives on or under the class
    /// node, which is already on the context stack).
    pub class_name_field: Option<&'static str>,
    /// Field holding the single "primary" parent (extends-like); `None` if
    /// this grammar never expresses single inheritance this way.
    pub primary_field: Option<&'static str>,
    pub primary_kind: HeritageKind,
    /// Field holding zero-or-more additional parents (implements-like).
    pub secondary_field: Option<&'static str>,
    pub secondary_kind: HeritageKind,
}

pub type ExportFn = fn(&Node, &str) -> bool;

#[derive(Clone, Copy)]
pub struct LangRules {
    pub language: Language,
    pub definitions: &'static [DefinitionRule],
    /// Definition kinds that, when found as a descendant of another
    /// definition already classified `Class`/`Struct`/`Trait`/`Impl`, get
    /// reclassified from `Function` to `Method` (spec's `CodeElement`
    /// catch-all is intentionally unused: every language table here maps
    /// onto a named kind).
    pub method_container_kinds: &'static [NodeKind],
    pub import_kinds: &'static [&'static str],
    pub import_spec: fn(&Node, &str) -> Option<String>,
    pub call_kinds: &'static [&'static str],
    pub callee_field: &'static str,
    pub heritage: &'static [HeritageRule],
    pub is_exported: ExportFn,
}

use crate::walk_util::{
    child_text_with_kind, definition_name, has_child_of_kind, node_text, unquote,
};

fn import_spec_string_field(node: &Node, content: &str) -> Option<String> {
    // Generic: first quoted string literal found anywhere under the import node.
    fn find<'a>(n: &Node, content: &'a str) -> Option<&'a str> {
        if n.kind().contains("string") {
            return Some(unquote(node_text(n, content)));
        }
        let mut cursor = n.walk();
        for child in n.children(&mut cursor) {
            if let Some(found) = find(&child, content) {
                return Some(found);
            }
        }
        None
    }
    find(node, content).map(|s| s.to_string())
}

fn rust_import_spec(node: &Node, content: &str) -> Option<String> {
    node.child_by_field_name("argument")
        .map(|n| node_text(&n, content).to_string())
}

fn go_import_spec(node: &Node, content: &str) -> Option<String> {
    import_spec_string_field(node, content)
}

fn java_import_spec(node: &Node, content: &str) -> Option<String> {
    let text = node_text(node, content);
    Some(
        text.trim_start_matches("import")
            .trim_start_matches("static")
            .trim()
            .trim_end_matches(';')
            .trim()
            .to_string(),
    )
}

fn csharp_import_spec(node: &Node, content: &str) -> Option<String> {
    let text = node_text(node, content);
    Some(
        text.trim_start_matches("using")
            .trim()
            .trim_end_matches(';')
            .trim()
            .to_string(),
    )
}

fn php_import_spec(node: &Node, content: &str) -> Option<String> {
    let text = node_text(node, content);
    Some(
        text.trim_start_matches("use")
            .trim()
            .trim_end_matches(';')
            .trim()
            .to_string(),
    )
}

fn swift_import_spec(node: &Node, content: &str) -> Option<String> {
    let text = node_text(node, content);
    Some(text.trim_start_matches("import").trim().to_string())
}

fn preproc_include_spec(node: &Node, content: &str) -> Option<String> {
    import_spec_string_field(node, content)
}

// --- export rules ----------------------------------------------------------

fn export_rust(node: &Node, _content: &str) -> bool {
    has_child_of_kind(node, "visibility_modifier")
}

fn export_python(node: &Node, content: &str) -> bool {
    definition_name(node, content)
        .map(|n| !n.starts_with('_'))
        .unwrap_or(false)
}

fn export_go(node: &Node, content: &str) -> bool {
    definition_name(node, content)
        .and_then(|n| n.chars().next())
        .map(|c| c.is_uppercase())
        .unwrap_or(false)
}

fn ancestor_matches(node: &Node, pred: impl Fn(&Node) -> bool) -> bool {
    let mut cur = *node;
    while let Some(parent) = cur.parent() {
        if pred(&parent) {
            return true;
        }
        cur = parent;
    }
    false
}

fn export_ts_js(node: &Node, content: &str) -> bool {
    if ancestor_matches(node, |n| n.kind() == "export_statement") {
        return true;
    }
    node_text(node, content).trim_start().starts_with("export ")
}

fn export_csharp(node: &Node, content: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|c| c.kind() == "modifier" && node_text(&c, content).trim() == "public")
}

fn export_swift(node: &Node, content: &str) -> bool {
    ancestor_matches(node, |n| {
        n.kind() == "modifiers" && {
            let text = n.utf8_text(content.as_bytes()).unwrap_or("");
            text.contains("public") || text.contains("open")
        }
    })
}

fn export_php(node: &Node, content: &str) -> bool {
    // Top-level functions/classes are always exported; methods/properties
    // need an explicit `public` visibility_modifier sibling (absent => not public).
    let is_top_level = node
        .parent()
        .map(|p| p.kind() == "program" || p.kind() == "namespace_body")
        .unwrap_or(true);
    if matches!(node.kind(), "function_definition" | "class_declaration") && is_top_level {
        return true;
    }
    match child_text_with_kind(node, "visibility_modifier", content) {
        Some(text) => text.trim() == "public",
        None => false,
    }
}

fn export_never(_node: &Node, _content: &str) -> bool {
    false
}

// --- per-language tables -----------------------------------------------------

pub static RUST: LangRules = LangRules {
    language: Language::Rust,
    definitions: &[
        DefinitionRule { node_kind: "function_item", result_kind: NodeKind::Function },
        DefinitionRule { node_kind: "struct_item", result_kind: NodeKind::Struct },
        DefinitionRule { node_kind: "enum_item", result_kind: NodeKind::Enum },
        DefinitionRule { node_kind: "trait_item", result_kind: NodeKind::Trait },
        DefinitionRule { node_kind: "impl_item", result_kind: NodeKind::Impl },
        DefinitionRule { node_kind: "mod_item", result_kind: NodeKind::Module },
        DefinitionRule { node_kind: "macro_definition", result_kind: NodeKind::Macro },
        DefinitionRule { node_kind: "const_item", result_kind: NodeKind::Const },
        DefinitionRule { node_kind: "static_item", result_kind: NodeKind::Static },
        DefinitionRule { node_kind: "type_item", result_kind: NodeKind::TypeAlias },
    ],
    method_container_kinds: &[NodeKind::Impl, NodeKind::Trait],
    import_kinds: &["use_declaration"],
    import_spec: rust_import_spec,
    call_kinds: &["call_expression", "macro_invocation"],
    callee_field: "function",
    heritage: &[HeritageRule {
        node_kind: "impl_item",
        class_name_field: Some("type"),
        primary_field: Some("trait"),
        primary_kind: HeritageKind::TraitImpl,
        secondary_field: None,
        secondary_kind: HeritageKind::TraitImpl,
    }],
    is_exported: export_rust,
};

pub static TYPESCRIPT: LangRules = LangRules {
    language: Language::TypeScript,
    definitions: &[
        DefinitionRule { node_kind: "function_declaration", result_kind: NodeKind::Function },
        DefinitionRule { node_kind: "method_definition", result_kind: NodeKind::Method },
        DefinitionRule { node_kind: "class_declaration", result_kind: NodeKind::Class },
        DefinitionRule { node_kind: "interface_declaration", result_kind: NodeKind::Interface },
        DefinitionRule { node_kind: "type_alias_declaration", result_kind: NodeKind::TypeAlias },
        DefinitionRule { node_kind: "enum_declaration", result_kind: NodeKind::Enum },
    ],
    method_container_kinds: &[NodeKind::Class, NodeKind::Interface],
    import_kinds: &["import_statement"],
    import_spec: import_spec_string_field,
    call_kinds: &["call_expression"],
    callee_field: "function",
    heritage: &[HeritageRule {
        node_kind: "class_heritage",
        class_name_field: None,
        primary_field: None,
        primary_kind: HeritageKind::Extends,
        secondary_field: None,
        secondary_kind: HeritageKind::Implements,
    }],
    is_exported: export_ts_js,
};

pub static JAVASCRIPT: LangRules = LangRules {
    language: Language::JavaScript,
    definitions: &[
        DefinitionRule { node_kind: "function_declaration", result_kind: NodeKind::Function },
        DefinitionRule { node_kind: "method_definition", result_kind: NodeKind::Method },
        DefinitionRule { node_kind: "class_declaration", result_kind: NodeKind::Class },
    ],
    method_container_kinds: &[NodeKind::Class],
    import_kinds: &["import_statement"],
    import_spec: import_spec_string_field,
    call_kinds: &["call_expression"],
    callee_field: "function",
    heritage: &[HeritageRule {
        node_kind: "class_heritage",
        class_name_field: None,
        primary_field: None,
        primary_kind: HeritageKind::Extends,
        secondary_field: None,
        secondary_kind: HeritageKind::Implements,
    }],
    is_exported: export_ts_js,
};

pub static PYTHON: LangRules = LangRules {
    language: Language::Python,
    definitions: &[
        DefinitionRule { node_kind: "function_definition", result_kind: NodeKind::Function },
        DefinitionRule { node_kind: "class_definition", result_kind: NodeKind::Class },
    ],
    method_container_kinds: &[NodeKind::Class],
    import_kinds: &["import_statement", "import_from_statement"],
    import_spec: python_import_spec,
    call_kinds: &["call"],
    callee_field: "function",
    heritage: &[HeritageRule {
        node_kind: "class_definition",
        class_name_field: None,
        primary_field: Some("superclasses"),
        primary_kind: HeritageKind::Extends,
        secondary_field: None,
        secondary_kind: HeritageKind::Extends,
    }],
    is_exported: export_python,
};

fn python_import_spec(node: &Node, content: &str) -> Option<String> {
    if node.kind() == "import_from_statement" {
        node.child_by_field_name("module_name")
            .map(|n| node_text(&n, content).to_string())
    } else {
        node.child_by_field_name("name")
            .map(|n| node_text(&n, content).to_string())
            .or_else(|| import_spec_string_field(node, content))
    }
}

pub static GO: LangRules = LangRules {
    language: Language::Go,
    definitions: &[
        DefinitionRule { node_kind: "function_declaration", result_kind: NodeKind::Function },
        DefinitionRule { node_kind: "method_declaration", result_kind: NodeKind::Method },
        DefinitionRule { node_kind: "type_spec", result_kind: NodeKind::Struct },
        DefinitionRule { node_kind: "const_spec", result_kind: NodeKind::Const },
        DefinitionRule { node_kind: "var_spec", result_kind: NodeKind::Static },
    ],
    method_container_kinds: &[],
    import_kinds: &["import_declaration"],
    import_spec: go_import_spec,
    call_kinds: &["call_expression"],
    callee_field: "function",
    heritage: &[],
    is_exported: export_go,
};

pub static JAVA: LangRules = LangRules {
    language: Language::Java,
    definitions: &[
        DefinitionRule { node_kind: "class_declaration", result_kind: NodeKind::Class },
        DefinitionRule { node_kind: "interface_declaration", result_kind: NodeKind::Interface },
        DefinitionRule { node_kind: "method_declaration", result_kind: NodeKind::Method },
        DefinitionRule { node_kind: "constructor_declaration", result_kind: NodeKind::Constructor },
        DefinitionRule { node_kind: "enum_declaration", result_kind: NodeKind::Enum },
        DefinitionRule { node_kind: "annotation_type_declaration", result_kind: NodeKind::Annotation },
        DefinitionRule { node_kind: "record_declaration", result_kind: NodeKind::Record },
    ],
    method_container_kinds: &[NodeKind::Class, NodeKind::Interface, NodeKind::Enum],
    import_kinds: &["import_declaration"],
    import_spec: java_import_spec,
    call_kinds: &["method_invocation"],
    callee_field: "name",
    heritage: &[HeritageRule {
        node_kind: "class_declaration",
        class_name_field: None,
        primary_field: Some("superclass"),
        primary_kind: HeritageKind::Extends,
        secondary_field: Some("interfaces"),
        secondary_kind: HeritageKind::Implements,
    }],
    is_exported: export_java,
};

fn export_java(node: &Node, content: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| {
        c.kind() == "modifiers" && {
            let mut inner = c.walk();
            c.children(&mut inner)
                .any(|m| node_text(&m, content).trim() == "public")
        }
    })
}

pub static CPP: LangRules = LangRules {
    language: Language::Cpp,
    definitions: &[
        DefinitionRule { node_kind: "function_definition", result_kind: NodeKind::Function },
        DefinitionRule { node_kind: "struct_specifier", result_kind: NodeKind::Struct },
        DefinitionRule { node_kind: "class_specifier", result_kind: NodeKind::Class },
        DefinitionRule { node_kind: "enum_specifier", result_kind: NodeKind::Enum },
        DefinitionRule { node_kind: "union_specifier", result_kind: NodeKind::Union },
        DefinitionRule { node_kind: "namespace_definition", result_kind: NodeKind::Namespace },
        DefinitionRule { node_kind: "type_definition", result_kind: NodeKind::Typedef },
    ],
    method_container_kinds: &[NodeKind::Class, NodeKind::Struct],
    import_kinds: &["preproc_include"],
    import_spec: preproc_include_spec,
    call_kinds: &["call_expression"],
    callee_field: "function",
    heritage: &[HeritageRule {
        node_kind: "class_specifier",
        class_name_field: None,
        primary_field: Some("base_class_clause"),
        primary_kind: HeritageKind::Extends,
        secondary_field: None,
        secondary_kind: HeritageKind::Extends,
    }],
    is_exported: export_never,
};

pub static C: LangRules = LangRules {
    language: Language::C,
    definitions: &[
        DefinitionRule { node_kind: "function_definition", result_kind: NodeKind::Function },
        DefinitionRule { node_kind: "struct_specifier", result_kind: NodeKind::Struct },
        DefinitionRule { node_kind: "enum_specifier", result_kind: NodeKind::Enum },
        DefinitionRule { node_kind: "union_specifier", result_kind: NodeKind::Union },
        DefinitionRule { node_kind: "type_definition", result_kind: NodeKind::Typedef },
    ],
    method_container_kinds: &[],
    import_kinds: &["preproc_include"],
    import_spec: preproc_include_spec,
    call_kinds: &["call_expression"],
    callee_field: "function",
    heritage: &[],
    is_exported: export_never,
};

pub static CSHARP: LangRules = LangRules {
    language: Language::CSharp,
    definitions: &[
        DefinitionRule { node_kind: "class_declaration", result_kind: NodeKind::Class },
        DefinitionRule { node_kind: "interface_declaration", result_kind: NodeKind::Interface },
        DefinitionRule { node_kind: "struct_declaration", result_kind: NodeKind::Struct },
        DefinitionRule { node_kind: "method_declaration", result_kind: NodeKind::Method },
        DefinitionRule { node_kind: "enum_declaration", result_kind: NodeKind::Enum },
        DefinitionRule { node_kind: "record_declaration", result_kind: NodeKind::Record },
        DefinitionRule { node_kind: "delegate_declaration", result_kind: NodeKind::Delegate },
    ],
    method_container_kinds: &[NodeKind::Class, NodeKind::Interface, NodeKind::Struct],
    import_kinds: &["using_directive"],
    import_spec: csharp_import_spec,
    call_kinds: &["invocation_expression"],
    callee_field: "function",
    heritage: &[HeritageRule {
        // C# doesn't distinguish base class vs. interface syntactically;
        // every `base_list` entry is treated as IMPLEMENTS (documented in
        // DESIGN.md — avoids guessing which entry, if any, is the superclass).
        node_kind: "class_declaration",
        class_name_field: None,
        primary_field: None,
        primary_kind: HeritageKind::Implements,
        secondary_field: Some("bases"),
        secondary_kind: HeritageKind::Implements,
    }],
    is_exported: export_csharp,
};

pub static PHP: LangRules = LangRules {
    language: Language::Php,
    definitions: &[
        DefinitionRule { node_kind: "function_definition", result_kind: NodeKind::Function },
        DefinitionRule { node_kind: "method_declaration", result_kind: NodeKind::Method },
        DefinitionRule { node_kind: "class_declaration", result_kind: NodeKind::Class },
        DefinitionRule { node_kind: "interface_declaration", result_kind: NodeKind::Interface },
        DefinitionRule { node_kind: "trait_declaration", result_kind: NodeKind::Trait },
    ],
    method_container_kinds: &[NodeKind::Class, NodeKind::Interface, NodeKind::Trait],
    import_kinds: &["namespace_use_declaration"],
    import_spec: php_import_spec,
    call_kinds: &["function_call_expression", "member_call_expression"],
    callee_field: "function",
    heritage: &[HeritageRule {
        node_kind: "class_declaration",
        class_name_field: None,
        primary_field: Some("base_clause"),
        primary_kind: HeritageKind::Extends,
        secondary_field: Some("class_interface_clause"),
        secondary_kind: HeritageKind::Implements,
    }],
    is_exported: export_php,
};

pub static SWIFT: LangRules = LangRules {
    language: Language::Swift,
    definitions: &[
        DefinitionRule { node_kind: "function_declaration", result_kind: NodeKind::Function },
        DefinitionRule { node_kind: "class_declaration", result_kind: NodeKind::Class },
        DefinitionRule { node_kind: "protocol_declaration", result_kind: NodeKind::Interface },
        DefinitionRule { node_kind: "struct_declaration", result_kind: NodeKind::Struct },
        DefinitionRule { node_kind: "enum_declaration", result_kind: NodeKind::Enum },
    ],
    method_container_kinds: &[NodeKind::Class, NodeKind::Struct],
    import_kinds: &["import_declaration"],
    import_spec: swift_import_spec,
    call_kinds: &["call_expression"],
    callee_field: "function",
    heritage: &[HeritageRule {
        // Swift's inheritance clause lists the (optional) superclass first,
        // then adopted protocols; same first-entry-is-the-class heuristic as C#.
        node_kind: "class_declaration",
        class_name_field: None,
        primary_field: Some("inheritance_clause"),
        primary_kind: HeritageKind::Extends,
        secondary_field: None,
        secondary_kind: HeritageKind::Implements,
    }],
    is_exported: export_swift,
};

pub fn rules_for(language: Language) -> Option<&'static LangRules> {
    Some(match language {
        Language::Rust => &RUST,
        Language::TypeScript => &TYPESCRIPT,
        Language::JavaScript => &JAVASCRIPT,
        Language::Python => &PYTHON,
        Language::Go => &GO,
        Language::Java => &JAVA,
        Language::Cpp => &CPP,
        Language::C => &C,
        Language::CSharp => &CSHARP,
        Language::Php => &PHP,
        Language::Swift => &SWIFT,
        Language::Kotlin => return None,
    })
}
