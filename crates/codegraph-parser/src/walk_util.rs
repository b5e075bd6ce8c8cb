use tree_sitter::Node;

/// Text a node spans, defaulting to empty on invalid UTF-8 rather than panicking.
#[inline]
pub fn node_text<'a>(node: &Node, content: &'a str) -> &'a str {
    node.utf8_text(content.as_bytes()).unwrap_or("")
}

/// 1-based start line, matching the `startLine` field in spec §4.4.
#[inline]
pub fn start_line(node: &Node) -> u32 {
    node.start_position().row as u32 + 1
}

#[inline]
pub fn end_line(node: &Node) -> u32 {
    node.end_position().row as u32 + 1
}

/// A definition's name: the `name` field if the grammar exposes one,
/// otherwise the first identifier-shaped child. Covers grammars (Go's
/// `type_spec`, C's declarators) that bury the name a level deeper than a
/// plain field.
pub fn definition_name<'a>(node: &Node, content: &'a str) -> Option<&'a str> {
    if let Some(name) = node.child_by_field_name("name") {
        return Some(node_text(&name, content));
    }
    first_identifier_text(node, content)
}

const IDENTIFIER_KINDS: &[&str] = &[
    "identifier",
    "type_identifier",
    "field_identifier",
    "property_identifier",
    "constant",
];

pub fn first_identifier_text<'a>(node: &Node, content: &'a str) -> Option<&'a str> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if IDENTIFIER_KINDS.contains(&child.kind()) {
            return Some(node_text(&child, content));
        }
    }
    // one level deeper, for declarator-wrapped names (C/C++ function_definition).
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_identifier_text(&child, content) {
            return Some(found);
        }
    }
    None
}

/// Every identifier-shaped leaf under `node`, in document order — used for
/// heritage clauses that list several parents (`implements A, B`).
pub fn collect_identifiers<'a>(node: &Node, content: &'a str, out: &mut Vec<&'a str>) {
    if IDENTIFIER_KINDS.contains(&node.kind()) {
        out.push(node_text(node, content));
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_identifiers(&child, content, out);
    }
}

/// The last dotted/`::`/arrow-separated segment of a callee expression's
/// text — `a.b.c()` and `a->b()` both resolve the called name to `c`/`b`.
/// Name-based only, per the Non-goal on type inference.
pub fn last_segment(text: &str) -> &str {
    let trimmed = text.trim_end_matches(|c: char| c == '!' || c.is_whitespace());
    trimmed
        .rsplit(['.', ':', '>'])
        .find(|s| !s.is_empty())
        .unwrap_or(trimmed)
}

/// Strips a quoted string literal's surrounding quotes (import specifiers,
/// PHP/C include paths).
pub fn unquote(text: &str) -> &str {
    let t = text.trim();
    for (open, close) in [('"', '"'), ('\'', '\''), ('<', '>'), ('`', '`')] {
        if t.len() >= 2 && t.starts_with(open) && t.ends_with(close) {
            return &t[open.len_utf8()..t.len() - close.len_utf8()];
        }
    }
    t
}

pub fn has_child_of_kind(node: &Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| c.kind() == kind)
}

pub fn child_text_with_kind<'a>(node: &Node, kind: &str, content: &'a str) -> Option<&'a str> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find(|c| c.kind() == kind)
        .map(|c| node_text(&c, content))
}
