//! Index of the API snapshot keyed by normalized symbol path.
//!
//! The indexer walks the symbol tree once per mode. Keeping a public-only
//! index next to the unfiltered one is what lets reconciliation tell a
//! removed symbol from a private one.

use crate::path::{join, normalize_path};
use crate::rules::{INTERNAL_NAME_PREFIX, is_error_type};
use crate::typedoc::{ApiNode, ApiSnapshot, Flags, SourceLocation, SymbolKind};
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info, instrument};

/// Which symbols an [`ApiIndex`] registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    /// Only symbols passing [`is_public_api`].
    PublicOnly,
    /// Every symbol in the tree.
    All,
}

/// Metadata of an indexed symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Normalized dotted path.
    pub path: String,
    pub name: String,
    pub kind: SymbolKind,
    pub flags: Flags,
    /// Whether the member was copied from a base type.
    pub inherited: bool,
    /// Doc-comment summary.
    pub description: Option<String>,
    /// `@example` blocks of the doc-comment.
    pub examples: Vec<String>,
    pub source: Option<SourceLocation>,
}

impl Symbol {
    fn from_node(path: String, node: &ApiNode) -> Self {
        let comment = node.effective_comment();
        Self {
            path,
            name: node.name.clone(),
            kind: node.kind,
            flags: node.flags,
            inherited: node.is_inherited(),
            description: comment.and_then(|c| c.description()),
            examples: comment.map(|c| c.examples()).unwrap_or_default(),
            source: node.source().cloned(),
        }
    }

    /// Whether the symbol carries any doc-comment content.
    pub fn has_doc_comment(&self) -> bool {
        self.description.is_some() || !self.examples.is_empty()
    }

    /// `file:line` of the declaration.
    pub fn location(&self) -> Option<String> {
        self.source.as_ref().map(ToString::to_string)
    }
}

/// Whether a node is part of the public API: not named with the internal
/// prefix, not private or protected, and not tagged `@internal`.
pub fn is_public_api(node: &ApiNode) -> bool {
    if node.name.starts_with(INTERNAL_NAME_PREFIX) {
        return false;
    }
    if node.flags.is_private || node.flags.is_protected {
        return false;
    }
    !node.effective_comment().is_some_and(|comment| comment.has_internal_tag())
}

/// Lookup from normalized path to symbol, in tree pre-order.
#[derive(Debug, Clone)]
pub struct ApiIndex {
    mode: IndexMode,
    symbols: IndexMap<String, Symbol>,
}

impl ApiIndex {
    /// Walk every library of the snapshot and index it.
    #[instrument(skip(snapshot))]
    pub fn build(snapshot: &ApiSnapshot, mode: IndexMode) -> Self {
        let mut index = Self { mode, symbols: IndexMap::new() };
        for library in snapshot.libraries() {
            index.visit(library, "");
        }
        info!("Indexed {} symbols ({:?})", index.symbols.len(), mode);
        index
    }

    fn visit(&mut self, node: &ApiNode, parent: &str) {
        let raw_path = join(parent, &node.name);
        let path = normalize_path(&raw_path);

        if !path.is_empty() {
            if self.mode == IndexMode::All || is_public_api(node) {
                self.symbols.insert(path.clone(), Symbol::from_node(path, node));
            } else {
                debug!(path = %path, "skipping non-public symbol");
            }
        }

        // Children of a skipped symbol are still visited.
        for child in &node.children {
            self.visit(child, &raw_path);
        }
    }

    pub fn mode(&self) -> IndexMode {
        self.mode
    }

    pub fn get(&self, path: &str) -> Option<&Symbol> {
        self.symbols.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.symbols.contains_key(path)
    }

    /// Symbols in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Symbol)> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Paths of every documentable class: a public, non-error class or
/// interface owning at least one public method or constructor.
pub fn documentable_classes(snapshot: &ApiSnapshot) -> IndexSet<String> {
    fn visit(node: &ApiNode, parent: &str, out: &mut IndexSet<String>) {
        let raw_path = join(parent, &node.name);

        if node.kind.is_class_like() && is_public_api(node) && !is_error_type(&node.name) {
            let owns_public_callable = node
                .children
                .iter()
                .any(|child| child.kind.is_callable_member() && is_public_api(child));
            if owns_public_callable {
                out.insert(normalize_path(&raw_path));
            }
        }

        for child in &node.children {
            visit(child, &raw_path, out);
        }
    }

    let mut classes = IndexSet::new();
    for library in snapshot.libraries() {
        visit(library, "", &mut classes);
    }
    classes
}
