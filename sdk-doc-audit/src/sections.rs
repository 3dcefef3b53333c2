//! Navigation sections built from the reference spec.
//!
//! Every documented entry is routed to one of the product categories by the
//! tables below. The canonical category tree is then merged into the
//! persisted navigation file: existing nodes keep all of their fields, nodes
//! the builder does not know about are left in place, and static scaffolding
//! is never touched.

use crate::error::{AuditError, Result};
use crate::path::{last_segment, normalize_path, segments};
use crate::rules::UMBRELLA_PACKAGE;
use crate::spec::{DocEntry, DocSpec};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Product category of a navigation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Database,
    Auth,
    EdgeFunctions,
    Realtime,
    Storage,
}

impl Category {
    /// Categories in display order.
    pub const ALL: [Category; 5] =
        [Category::Database, Category::Auth, Category::EdgeFunctions, Category::Realtime, Category::Storage];

    pub fn title(self) -> &'static str {
        match self {
            Category::Database => "Database",
            Category::Auth => "Auth",
            Category::EdgeFunctions => "Edge Functions",
            Category::Realtime => "Realtime",
            Category::Storage => "Storage",
        }
    }

    pub fn from_title(title: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.title() == title)
    }
}

/// Kind of a navigation node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Markdown,
    Function,
    Category,
}

/// A navigation node as the builder produces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavNode {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<NavNode>,
}

impl NavNode {
    /// A leaf or group header linking to an entry.
    pub fn item(node_type: NodeType, id: &str, title: &str) -> Self {
        Self {
            node_type,
            title: title.to_string(),
            id: Some(id.to_string()),
            slug: Some(id.to_string()),
            items: Vec::new(),
        }
    }

    /// A category holding `items`.
    pub fn category(title: &str, items: Vec<NavNode>) -> Self {
        Self { node_type: NodeType::Category, title: title.to_string(), id: None, slug: None, items }
    }
}

/// A fixed navigation entry outside the dynamic categories.
#[derive(Debug, Clone, Copy)]
pub struct StaticItem {
    pub id: &'static str,
    pub title: &'static str,
    pub node_type: NodeType,
}

/// A group header that collects entries whose reference contains `pattern`.
#[derive(Debug, Clone, Copy)]
pub struct StructuralGroup {
    pub id: &'static str,
    pub title: &'static str,
    pub pattern: &'static str,
}

/// Items at the top of the navigation.
pub const TOP_ITEMS: &[StaticItem] = &[
    StaticItem { id: "introduction", title: "Introduction", node_type: NodeType::Markdown },
    StaticItem { id: "installing", title: "Installing", node_type: NodeType::Markdown },
    StaticItem { id: "initializing", title: "Initializing", node_type: NodeType::Function },
    StaticItem { id: "typescript-support", title: "TypeScript support", node_type: NodeType::Markdown },
];

/// Title of the trailing miscellaneous category.
pub const MISC_CATEGORY: &str = "Misc";

/// Items of the miscellaneous category.
pub const MISC_ITEMS: &[StaticItem] =
    &[StaticItem { id: "release-notes", title: "Release Notes", node_type: NodeType::Markdown }];

/// Entries routed to a category by id, before any reference rule.
pub const ID_OVERRIDES: &[(&str, Category)] =
    &[("using-filters", Category::Database), ("using-modifiers", Category::Database)];

/// Category of each source package.
pub const PACKAGE_CATEGORIES: &[(&str, Category)] = &[
    ("@supabase/postgrest-js", Category::Database),
    ("@supabase/auth-js", Category::Auth),
    ("@supabase/gotrue-js", Category::Auth),
    ("@supabase/functions-js", Category::EdgeFunctions),
    ("@supabase/realtime-js", Category::Realtime),
    ("@supabase/storage-js", Category::Storage),
];

/// Umbrella package members with a category of their own.
pub const UMBRELLA_MEMBERS: &[(&str, Category)] = &[
    ("from", Category::Database),
    ("schema", Category::Database),
    ("rpc", Category::Database),
    ("channel", Category::Realtime),
    ("getChannels", Category::Realtime),
    ("removeChannel", Category::Realtime),
    ("removeAllChannels", Category::Realtime),
];

/// Entries never placed in a dynamic category.
pub const SUPPRESSED_IDS: &[&str] = &["initializing"];

/// Group headers and the references they collect.
pub const STRUCTURAL_GROUPS: &[StructuralGroup] = &[
    StructuralGroup { id: "using-filters", title: "Using filters", pattern: ".PostgrestFilterBuilder." },
    StructuralGroup { id: "using-modifiers", title: "Using modifiers", pattern: ".PostgrestTransformBuilder." },
];

fn lookup<T: Copy>(table: &[(&str, T)], key: &str) -> Option<T> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn is_static_id(id: &str) -> bool {
    TOP_ITEMS.iter().chain(MISC_ITEMS).any(|item| item.id == id)
}

/// Category an entry belongs to, if any.
pub fn category_for_entry(entry: &DocEntry) -> Option<Category> {
    if SUPPRESSED_IDS.contains(&entry.id.as_str()) {
        return None;
    }
    if let Some(category) = lookup(ID_OVERRIDES, &entry.id) {
        return Some(category);
    }

    let path = normalize_path(entry.reference.as_deref()?);
    let package = *segments(&path).first()?;
    if package == UMBRELLA_PACKAGE {
        return lookup(UMBRELLA_MEMBERS, last_segment(&path));
    }
    lookup(PACKAGE_CATEGORIES, package)
}

/// Structural group collecting an entry's reference, if any.
pub fn group_for_reference(reference: &str) -> Option<&'static StructuralGroup> {
    STRUCTURAL_GROUPS.iter().find(|group| reference.contains(group.pattern))
}

fn entry_item(entry: &DocEntry, node_type: NodeType) -> NavNode {
    NavNode::item(node_type, &entry.id, entry.title.as_deref().unwrap_or(&entry.id))
}

enum Slot {
    Item(NavNode),
    Group(usize),
}

/// Build the canonical dynamic categories, in display order, skipping
/// categories without items.
pub fn build_categories(spec: &DocSpec) -> Vec<NavNode> {
    let dynamic: Vec<&DocEntry> = spec.functions.iter().filter(|entry| !is_static_id(&entry.id)).collect();

    // Group headers first, so children listed before their header still attach.
    let mut groups: Vec<NavNode> = Vec::new();
    let mut group_index: IndexMap<&'static str, usize> = IndexMap::new();
    for entry in &dynamic {
        let Some(group) = STRUCTURAL_GROUPS.iter().find(|group| group.id == entry.id) else {
            continue;
        };
        if category_for_entry(entry).is_none() || group_index.contains_key(group.id) {
            continue;
        }
        let title = entry.title.as_deref().unwrap_or(group.title);
        group_index.insert(group.id, groups.len());
        groups.push(NavNode::item(NodeType::Markdown, group.id, title));
    }

    let mut slots: IndexMap<Category, Vec<Slot>> = IndexMap::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for entry in &dynamic {
        let Some(category) = category_for_entry(entry) else {
            continue;
        };
        if !seen.insert(entry.id.as_str()) {
            debug!(id = %entry.id, "duplicate entry id, keeping the first");
            continue;
        }

        if let Some(&index) = group_index.get(entry.id.as_str()) {
            slots.entry(category).or_default().push(Slot::Group(index));
            continue;
        }

        let node_type = if entry.reference.is_some() { NodeType::Function } else { NodeType::Markdown };
        let item = entry_item(entry, node_type);
        let group = entry
            .reference
            .as_deref()
            .and_then(group_for_reference)
            .and_then(|group| group_index.get(group.id).copied());
        match group {
            Some(index) => groups[index].items.push(item),
            None => slots.entry(category).or_default().push(Slot::Item(item)),
        }
    }

    let mut categories = Vec::new();
    for category in Category::ALL {
        let Some(category_slots) = slots.shift_remove(&category) else {
            continue;
        };
        let items: Vec<NavNode> = category_slots
            .into_iter()
            .map(|slot| match slot {
                Slot::Item(item) => item,
                Slot::Group(index) => groups[index].clone(),
            })
            .collect();
        if !items.is_empty() {
            categories.push(NavNode::category(category.title(), items));
        }
    }
    categories
}

fn static_node(item: &StaticItem) -> NavNode {
    NavNode::item(item.node_type, item.id, item.title)
}

/// Navigation used when no sections file exists yet: the top items and the
/// miscellaneous category.
pub fn default_sections() -> Vec<Value> {
    let mut nodes: Vec<NavNode> = TOP_ITEMS.iter().map(static_node).collect();
    nodes.push(NavNode::category(MISC_CATEGORY, MISC_ITEMS.iter().map(static_node).collect()));
    nodes.iter().map(to_value).collect()
}

fn to_value(node: &NavNode) -> Value {
    serde_json::to_value(node).unwrap_or(Value::Null)
}

/// Parse a sections file: a JSON array of objects.
pub fn parse_sections(text: &str, origin: &Path) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|source| AuditError::Json { path: origin.to_path_buf(), source })?;
    let Value::Array(nodes) = value else {
        return Err(AuditError::InvalidSections(format!("{}: expected a JSON array", origin.display())));
    };
    if let Some(position) = nodes.iter().position(|node| !node.is_object()) {
        return Err(AuditError::InvalidSections(format!(
            "{}: node #{position} is not an object",
            origin.display()
        )));
    }
    Ok(nodes)
}

/// Render sections as pretty JSON with a trailing newline.
pub fn render_sections(sections: &[Value]) -> Result<String> {
    let mut text =
        serde_json::to_string_pretty(sections).map_err(|e| AuditError::Serialization(e.to_string()))?;
    text.push('\n');
    Ok(text)
}

fn field<'a>(node: &'a Value, key: &str) -> Option<&'a str> {
    node.get(key).and_then(Value::as_str)
}

fn dynamic_category(node: &Value) -> Option<Category> {
    if field(node, "type") != Some("category") {
        return None;
    }
    field(node, "title").and_then(Category::from_title)
}

fn items_of(node: &Value) -> &[Value] {
    node.get("items").and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default()
}

/// Merge canonical items into a category's existing items, matching by id.
///
/// Canonical items come first, in canonical order. A matching existing item
/// keeps every field but takes the freshly built nested list. Existing items
/// the builder does not produce follow, in their original order.
pub fn merge_items(existing: &[Value], canonical: &[Value]) -> Vec<Value> {
    let canonical_ids: HashSet<&str> = canonical.iter().filter_map(|item| field(item, "id")).collect();

    let mut merged: Vec<Value> = canonical
        .iter()
        .map(|item| {
            let id = field(item, "id");
            let current = id.and_then(|id| existing.iter().find(|old| field(old, "id") == Some(id)));
            match current {
                Some(current) => refresh_item(current, item),
                None => item.clone(),
            }
        })
        .collect();

    merged.extend(
        existing
            .iter()
            .filter(|old| field(old, "id").is_none_or(|id| !canonical_ids.contains(id)))
            .cloned(),
    );
    merged
}

/// Keep all fields of an existing item, replacing its nested list with the
/// canonical one.
fn refresh_item(existing: &Value, canonical: &Value) -> Value {
    let mut node = existing.clone();
    if let Some(object) = node.as_object_mut() {
        match items_of(canonical) {
            [] => {
                object.shift_remove("items");
            }
            items => {
                object.insert("items".to_string(), Value::Array(items.to_vec()));
            }
        }
    }
    node
}

/// Keep all fields of an existing category, merging in the canonical items.
fn merge_category(existing: &Value, canonical: &Value) -> Value {
    let mut node = existing.clone();
    let items = merge_items(items_of(existing), items_of(canonical));
    if let Some(object) = node.as_object_mut() {
        object.insert("items".to_string(), Value::Array(items));
    }
    node
}

/// Merge canonical categories into an existing navigation.
///
/// The canonical block replaces the existing dynamic categories at the
/// position of the first of them, or is appended when there is none. Dynamic
/// categories the builder no longer produces stay where they were unless
/// they are empty; every other node is left untouched.
pub fn merge_sections(existing: Vec<Value>, canonical: &[NavNode]) -> Vec<Value> {
    let canonical_titles: HashSet<&str> = canonical.iter().map(|node| node.title.as_str()).collect();
    let block: Vec<Value> = canonical
        .iter()
        .map(|category| {
            let fresh = to_value(category);
            let current = existing
                .iter()
                .find(|node| dynamic_category(node).is_some() && field(node, "title") == Some(category.title.as_str()));
            match current {
                Some(current) => merge_category(current, &fresh),
                None => fresh,
            }
        })
        .collect();

    let mut merged = Vec::with_capacity(existing.len() + block.len());
    let mut block = Some(block);
    for node in existing {
        if dynamic_category(&node).is_none() {
            merged.push(node);
            continue;
        }
        if let Some(block) = block.take() {
            merged.extend(block);
        }
        if field(&node, "title").is_some_and(|title| canonical_titles.contains(title)) {
            continue;
        }
        if items_of(&node).is_empty() {
            debug!(title = ?field(&node, "title"), "dropping empty category");
        } else {
            debug!(title = ?field(&node, "title"), "keeping dynamic category without entries");
            merged.push(node);
        }
    }
    if let Some(block) = block {
        merged.extend(block);
    }

    info!("Merged {} categories into navigation", canonical.len());
    merged
}
