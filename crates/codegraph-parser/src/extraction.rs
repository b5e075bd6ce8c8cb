//! Extraction Worker (C5): turns one parsed file into the four streams
//! spec §4.4 describes — definitions, imports, calls, heritage — by
//! walking the tree once with the file's `LangRules` table.

use codegraph_core::{symbol_id, Language, NodeId, NodeKind};
use tree_sitter::{Node, Tree};

use crate::lang_rules::{rules_for, HeritageKind, LangRules};
use crate::walk_util::{collect_identifiers, end_line, last_segment, node_text, start_line};

#[derive(Debug, Clone)]
pub struct Definition {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub is_exported: bool,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ImportRecord {
    pub file_path: String,
    pub specifier: String,
}

#[derive(Debug, Clone)]
pub struct CallSite {
    pub file_path: String,
    pub called_name: String,
    pub source_id: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct HeritageRecord {
    pub file_path: String,
    pub class_name: String,
    pub parent_name: String,
    pub kind: HeritageKind,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionOutput {
    pub definitions: Vec<Definition>,
    pub imports: Vec<ImportRecord>,
    pub calls: Vec<CallSite>,
    pub heritage: Vec<HeritageRecord>,
}

struct Frame {
    id: NodeId,
    kind: NodeKind,
    name: String,
}

/// Runs the language's table against an already-parsed tree. Returns
/// `None` for languages with no table (Kotlin: classified, never parsed —
/// see `language.rs`), which callers treat as a `ParseFailure`/drop per
/// spec §7.
pub fn extract(tree: &Tree, content: &str, file_path: &str, language: Language) -> Option<ExtractionOutput> {
    let rules = rules_for(language)?;
    let mut out = ExtractionOutput::default();
    let mut stack: Vec<Frame> = Vec::new();
    walk_node(tree.root_node(), content, file_path, rules, &mut stack, &mut out);
    Some(out)
}

fn walk_node(
    node: Node,
    content: &str,
    file_path: &str,
    rules: &LangRules,
    stack: &mut Vec<Frame>,
    out: &mut ExtractionOutput,
) {
    let kind_str = node.kind();
    let mut pushed = false;

    if let Some(def_rule) = rules.definitions.iter().find(|d| d.node_kind == kind_str) {
        if let Some(name) = crate::walk_util::definition_name(&node, content) {
            let mut result_kind = def_rule.result_kind;
            if result_kind == NodeKind::Function {
                if let Some(parent) = stack.last() {
                    if rules.method_container_kinds.contains(&parent.kind) {
                        result_kind = NodeKind::Method;
                    }
                }
            }
            let sl = start_line(&node);
            let el = end_line(&node);
            let id = symbol_id(result_kind, file_path, name, sl);
            let is_exported = (rules.is_exported)(&node, content);
            out.definitions.push(Definition {
                id: id.clone(),
                kind: result_kind,
                name: name.to_string(),
                file_path: file_path.to_string(),
                start_line: sl,
                end_line: el,
                is_exported,
                text: node_text(&node, content).to_string(),
            });
            stack.push(Frame { id, kind: result_kind, name: name.to_string() });
            pushed = true;
        }
    }

    if rules.import_kinds.contains(&kind_str) {
        if let Some(spec) = (rules.import_spec)(&node, content) {
            if !spec.is_empty() {
                out.imports.push(ImportRecord {
                    file_path: file_path.to_string(),
                    specifier: spec,
                });
            }
        }
    }

    if rules.call_kinds.contains(&kind_str) {
        if let Some(callee) = node.child_by_field_name(rules.callee_field) {
            let called_name = last_segment(node_text(&callee, content)).to_string();
            if !called_name.is_empty() {
                out.calls.push(CallSite {
                    file_path: file_path.to_string(),
                    called_name,
                    source_id: stack.last().map(|f| f.id.clone()),
                });
            }
        }
    }

    for h in rules.heritage {
        if h.node_kind == kind_str {
            let class_name = match h.class_name_field {
                Some(field) => node
                    .child_by_field_name(field)
                    .map(|n| node_text(&n, content).to_string()),
                None => stack.last().map(|f| f.name.clone()),
            };
            if let Some(class_name) = class_name {
                if let Some(field) = h.primary_field {
                    if let Some(parent_node) = node.child_by_field_name(field) {
                        emit_parents(&parent_node, content, file_path, &class_name, h.primary_kind, out);
                    }
                }
                if let Some(field) = h.secondary_field {
                    if let Some(parent_node) = node.child_by_field_name(field) {
                        emit_parents(&parent_node, content, file_path, &class_name, h.secondary_kind, out);
                    }
                }
            }
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_node(child, content, file_path, rules, stack, out);
    }

    if pushed {
        stack.pop();
    }
}

fn emit_parents(
    parent_clause: &Node,
    content: &str,
    file_path: &str,
    class_name: &str,
    kind: HeritageKind,
    out: &mut ExtractionOutput,
) {
    let mut names = Vec::new();
    collect_identifiers(parent_clause, content, &mut names);
    for parent_name in names {
        if parent_name == class_name {
            continue; // self-inheritance is dropped per spec §4.9
        }
        out.heritage.push(HeritageRecord {
            file_path: file_path.to_string(),
            class_name: class_name.to_string(),
            parent_name: parent_name.to_string(),
            kind,
        });
    }
}
