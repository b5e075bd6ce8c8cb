use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable, content-derived identifiers. Unlike a random UUID, the same
/// logical entity always produces the same id across runs, which is what
/// makes `GraphCore::add_node`/`add_relationship` idempotent (see node.rs).
pub type NodeId = String;
pub type EdgeId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Java,
    C,
    Cpp,
    CSharp,
    Go,
    Rust,
    Php,
    Swift,
    Kotlin,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::CSharp => "csharp",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Php => "php",
            Language::Swift => "swift",
            Language::Kotlin => "kotlin",
        }
    }

    /// Extension table backing the classifier (C2). Extensions are matched
    /// case-insensitively; the dot is not part of the stored suffix.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::TypeScript => &["ts", "tsx"],
            Language::JavaScript => &["js", "jsx"],
            Language::Python => &["py"],
            Language::Java => &["java"],
            Language::C => &["c", "h"],
            Language::Cpp => &["cpp", "cc", "cxx", "hpp", "hxx", "hh"],
            Language::CSharp => &["cs"],
            Language::Go => &["go"],
            Language::Rust => &["rs"],
            Language::Php => &["php", "phtml", "php3", "php4", "php5", "php8"],
            Language::Swift => &["swift"],
            Language::Kotlin => &["kt", "kts"],
        }
    }

    pub fn all() -> &'static [Language] {
        &[
            Language::TypeScript,
            Language::JavaScript,
            Language::Python,
            Language::Java,
            Language::C,
            Language::Cpp,
            Language::CSharp,
            Language::Go,
            Language::Rust,
            Language::Php,
            Language::Swift,
            Language::Kotlin,
        ]
    }

    /// Classifies a file extension (without the leading dot) into a
    /// `Language`, or `None` for anything outside the supported set.
    pub fn from_extension(ext: &str) -> Option<Language> {
        let lower = ext.to_ascii_lowercase();
        Language::all()
            .iter()
            .copied()
            .find(|lang| lang.extensions().contains(&lower.as_str()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The label every graph node carries. Code-symbol kinds beyond
/// `Function`/`Method`/`Class`/`Interface` share one property schema
/// (`SymbolProperties`) and exist purely to round-trip the source
/// construct's name into storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Folder,
    Function,
    Method,
    Class,
    Interface,
    CodeElement,
    Struct,
    Enum,
    Macro,
    Typedef,
    Union,
    Namespace,
    Trait,
    Impl,
    TypeAlias,
    Const,
    Static,
    Property,
    Record,
    Delegate,
    Annotation,
    Constructor,
    Template,
    Module,
    Community,
    Process,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "File",
            NodeKind::Folder => "Folder",
            NodeKind::Function => "Function",
            NodeKind::Method => "Method",
            NodeKind::Class => "Class",
            NodeKind::Interface => "Interface",
            NodeKind::CodeElement => "CodeElement",
            NodeKind::Struct => "Struct",
            NodeKind::Enum => "Enum",
            NodeKind::Macro => "Macro",
            NodeKind::Typedef => "Typedef",
            NodeKind::Union => "Union",
            NodeKind::Namespace => "Namespace",
            NodeKind::Trait => "Trait",
            NodeKind::Impl => "Impl",
            NodeKind::TypeAlias => "TypeAlias",
            NodeKind::Const => "Const",
            NodeKind::Static => "Static",
            NodeKind::Property => "Property",
            NodeKind::Record => "Record",
            NodeKind::Delegate => "Delegate",
            NodeKind::Annotation => "Annotation",
            NodeKind::Constructor => "Constructor",
            NodeKind::Template => "Template",
            NodeKind::Module => "Module",
            NodeKind::Community => "Community",
            NodeKind::Process => "Process",
        }
    }

    /// Whether this label uses the code-symbol property schema
    /// (`{name, filePath, startLine, endLine, isExported, content?, description?}`).
    pub fn is_symbol(&self) -> bool {
        !matches!(
            self,
            NodeKind::File | NodeKind::Folder | NodeKind::Community | NodeKind::Process
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "File" => NodeKind::File,
            "Folder" => NodeKind::Folder,
            "Function" => NodeKind::Function,
            "Method" => NodeKind::Method,
            "Class" => NodeKind::Class,
            "Interface" => NodeKind::Interface,
            "CodeElement" => NodeKind::CodeElement,
            "Struct" => NodeKind::Struct,
            "Enum" => NodeKind::Enum,
            "Macro" => NodeKind::Macro,
            "Typedef" => NodeKind::Typedef,
            "Union" => NodeKind::Union,
            "Namespace" => NodeKind::Namespace,
            "Trait" => NodeKind::Trait,
            "Impl" => NodeKind::Impl,
            "TypeAlias" => NodeKind::TypeAlias,
            "Const" => NodeKind::Const,
            "Static" => NodeKind::Static,
            "Property" => NodeKind::Property,
            "Record" => NodeKind::Record,
            "Delegate" => NodeKind::Delegate,
            "Annotation" => NodeKind::Annotation,
            "Constructor" => NodeKind::Constructor,
            "Template" => NodeKind::Template,
            "Module" => NodeKind::Module,
            "Community" => NodeKind::Community,
            "Process" => NodeKind::Process,
            other => return Err(format!("unknown node kind: {other}")),
        })
    }
}

/// The single edge type, discriminated by `kind`, per the data model's
/// "single edge type with a `type` discriminator" design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Contains,
    Defines,
    Imports,
    Calls,
    Extends,
    Implements,
    MemberOf,
    StepInProcess,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Contains => "CONTAINS",
            EdgeKind::Defines => "DEFINES",
            EdgeKind::Imports => "IMPORTS",
            EdgeKind::Calls => "CALLS",
            EdgeKind::Extends => "EXTENDS",
            EdgeKind::Implements => "IMPLEMENTS",
            EdgeKind::MemberOf => "MEMBER_OF",
            EdgeKind::StepInProcess => "STEP_IN_PROCESS",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EdgeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "CONTAINS" => EdgeKind::Contains,
            "DEFINES" => EdgeKind::Defines,
            "IMPORTS" => EdgeKind::Imports,
            "CALLS" => EdgeKind::Calls,
            "EXTENDS" => EdgeKind::Extends,
            "IMPLEMENTS" => EdgeKind::Implements,
            "MEMBER_OF" => EdgeKind::MemberOf,
            "STEP_IN_PROCESS" => EdgeKind::StepInProcess,
            other => return Err(format!("unknown edge kind: {other}")),
        })
    }
}

/// `Process.processType`: whether every symbol on the trace shares one
/// community, or the trace crosses community boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessType {
    IntraCommunity,
    CrossCommunity,
}

impl ProcessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessType::IntraCommunity => "intra_community",
            ProcessType::CrossCommunity => "cross_community",
        }
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_extensions_case_insensitively() {
        assert_eq!(Language::from_extension("RS"), Some(Language::Rust));
        assert_eq!(Language::from_extension("tsx"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("TXT"), None);
    }

    #[test]
    fn node_kind_round_trips_through_display_and_from_str() {
        for kind in [
            NodeKind::File,
            NodeKind::Function,
            NodeKind::Trait,
            NodeKind::Process,
        ] {
            let s = kind.to_string();
            assert_eq!(NodeKind::from_str(&s).unwrap(), kind);
        }
    }

    #[test]
    fn edge_kind_round_trips_through_display_and_from_str() {
        for kind in [
            EdgeKind::Contains,
            EdgeKind::Calls,
            EdgeKind::MemberOf,
            EdgeKind::StepInProcess,
        ] {
            let s = kind.to_string();
            assert_eq!(EdgeKind::from_str(&s).unwrap(), kind);
        }
    }

    #[test]
    fn symbol_classification_excludes_structural_and_derived_kinds() {
        assert!(NodeKind::Function.is_symbol());
        assert!(NodeKind::Trait.is_symbol());
        assert!(!NodeKind::File.is_symbol());
        assert!(!NodeKind::Folder.is_symbol());
        assert!(!NodeKind::Community.is_symbol());
        assert!(!NodeKind::Process.is_symbol());
    }
}
