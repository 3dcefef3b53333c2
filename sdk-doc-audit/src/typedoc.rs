//! Serde model of the TypeDoc JSON snapshot.
//!
//! Only the fields the audit reads are modelled; everything else in the
//! snapshot is ignored during deserialization.

use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tag marking a symbol as internal to the library.
pub const INTERNAL_TAG: &str = "@internal";

/// Block tag carrying an example.
pub const EXAMPLE_TAG: &str = "@example";

/// Root of a TypeDoc snapshot: a named collection of library roots.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiSnapshot {
    /// Project name.
    #[serde(default)]
    pub name: Option<String>,
    /// One node per library (package).
    #[serde(default)]
    pub children: Vec<ApiNode>,
}

impl ApiSnapshot {
    /// Parse a snapshot from its JSON text. `origin` is only used in errors.
    pub fn from_json(json: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|source| AuditError::Json { path: origin.to_path_buf(), source })
    }

    /// Library roots of the snapshot.
    pub fn libraries(&self) -> &[ApiNode] {
        &self.children
    }
}

/// Structural kind of a symbol, decoded from TypeDoc's numeric reflection kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum SymbolKind {
    Project,
    Module,
    Namespace,
    Enum,
    EnumMember,
    Variable,
    Function,
    Class,
    Interface,
    Constructor,
    Property,
    Method,
    Accessor,
    TypeAlias,
    Reference,
    Other(u32),
}

impl From<u32> for SymbolKind {
    fn from(code: u32) -> Self {
        match code {
            1 => SymbolKind::Project,
            2 => SymbolKind::Module,
            4 => SymbolKind::Namespace,
            8 => SymbolKind::Enum,
            16 => SymbolKind::EnumMember,
            32 => SymbolKind::Variable,
            64 => SymbolKind::Function,
            128 => SymbolKind::Class,
            256 => SymbolKind::Interface,
            512 => SymbolKind::Constructor,
            1024 => SymbolKind::Property,
            2048 => SymbolKind::Method,
            262144 => SymbolKind::Accessor,
            2097152 => SymbolKind::TypeAlias,
            4194304 => SymbolKind::Reference,
            other => SymbolKind::Other(other),
        }
    }
}

impl From<SymbolKind> for u32 {
    fn from(kind: SymbolKind) -> Self {
        match kind {
            SymbolKind::Project => 1,
            SymbolKind::Module => 2,
            SymbolKind::Namespace => 4,
            SymbolKind::Enum => 8,
            SymbolKind::EnumMember => 16,
            SymbolKind::Variable => 32,
            SymbolKind::Function => 64,
            SymbolKind::Class => 128,
            SymbolKind::Interface => 256,
            SymbolKind::Constructor => 512,
            SymbolKind::Property => 1024,
            SymbolKind::Method => 2048,
            SymbolKind::Accessor => 262144,
            SymbolKind::TypeAlias => 2097152,
            SymbolKind::Reference => 4194304,
            SymbolKind::Other(code) => code,
        }
    }
}

impl SymbolKind {
    /// Methods and constructors are the only symbols that get reference pages.
    pub fn is_callable_member(self) -> bool {
        matches!(self, SymbolKind::Method | SymbolKind::Constructor)
    }

    /// Classes and interfaces can own documented methods.
    pub fn is_class_like(self) -> bool {
        matches!(self, SymbolKind::Class | SymbolKind::Interface)
    }
}

/// Visibility flags of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flags {
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_protected: bool,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub is_inherited: bool,
    #[serde(default)]
    pub is_external: bool,
}

/// A node of the symbol tree. Each node owns its children.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiNode {
    pub name: String,
    pub kind: SymbolKind,
    #[serde(default)]
    pub flags: Flags,
    #[serde(default)]
    pub children: Vec<ApiNode>,
    #[serde(default)]
    pub signatures: Vec<Signature>,
    #[serde(default)]
    pub comment: Option<Comment>,
    #[serde(default)]
    pub sources: Vec<SourceLocation>,
    /// Present when TypeDoc copied the member from a base class.
    #[serde(default)]
    pub inherited_from: Option<serde_json::Value>,
}

impl ApiNode {
    /// Doc-comment of the node. Callables keep theirs on the call signature,
    /// so signatures are checked before the node itself.
    pub fn effective_comment(&self) -> Option<&Comment> {
        self.signatures.iter().find_map(|sig| sig.comment.as_ref()).or(self.comment.as_ref())
    }

    /// Whether TypeDoc marks this member as inherited from a base type.
    pub fn is_inherited(&self) -> bool {
        self.flags.is_inherited || self.inherited_from.is_some()
    }

    /// First source location, if TypeDoc recorded one.
    pub fn source(&self) -> Option<&SourceLocation> {
        self.sources.first()
    }
}

/// A call signature of a function, method or constructor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub comment: Option<Comment>,
}

/// A TSDoc comment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub summary: Vec<CommentPart>,
    #[serde(default)]
    pub block_tags: Vec<BlockTag>,
    #[serde(default)]
    pub modifier_tags: Vec<String>,
}

/// A run of text or code inside a comment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPart {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

/// A tagged block such as `@example` or `@returns`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockTag {
    pub tag: String,
    #[serde(default)]
    pub content: Vec<CommentPart>,
}

/// Where a symbol is declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub file_name: String,
    #[serde(default)]
    pub line: u32,
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file_name, self.line)
    }
}

fn join_parts(parts: &[CommentPart]) -> String {
    parts.iter().map(|part| part.text.as_str()).collect::<String>().trim().to_string()
}

impl Comment {
    /// Summary text, or `None` when the summary is blank.
    pub fn description(&self) -> Option<String> {
        let text = join_parts(&self.summary);
        if text.is_empty() { None } else { Some(text) }
    }

    /// Text of every non-empty `@example` block, in order.
    pub fn examples(&self) -> Vec<String> {
        self.block_tags
            .iter()
            .filter(|tag| tag.tag == EXAMPLE_TAG)
            .map(|tag| join_parts(&tag.content))
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Whether the comment carries `@internal`.
    pub fn has_internal_tag(&self) -> bool {
        self.modifier_tags.iter().any(|tag| tag == INTERNAL_TAG)
            || self.block_tags.iter().any(|tag| tag.tag == INTERNAL_TAG)
    }
}
