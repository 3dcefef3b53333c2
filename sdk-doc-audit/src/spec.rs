//! Logical model of the authored reference spec and its reference index.

use crate::error::{AuditError, Result};
use crate::path::normalize_path;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The authored reference spec.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocSpec {
    /// Opaque metadata section.
    #[serde(default)]
    pub info: serde_yaml::Value,
    /// Reference entries in display order.
    #[serde(default)]
    pub functions: Vec<DocEntry>,
}

impl DocSpec {
    /// Parse the spec from YAML text. `origin` is only used in errors.
    pub fn from_yaml(yaml: &str, origin: &Path) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|source| AuditError::Yaml { path: origin.to_path_buf(), source })
    }

    /// Position of the entry with the given id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.functions.iter().position(|entry| entry.id == id)
    }

    /// Whether an entry with the given id exists.
    pub fn has_id(&self, id: &str) -> bool {
        self.position(id).is_some()
    }
}

/// A single reference entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Dotted path of the documented symbol. Markdown-only entries have none.
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<DocExample>>,
    /// Keys the audit does not interpret (`notes`, `isSpotlight`, ...).
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl DocEntry {
    /// Create an entry with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Default::default() }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the reference path.
    pub fn with_ref(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Examples of the entry, empty when it has none.
    pub fn examples(&self) -> &[DocExample] {
        self.examples.as_deref().unwrap_or_default()
    }
}

/// A code example attached to an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocExample {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl DocExample {
    /// Create an example.
    pub fn new(id: impl Into<String>, name: impl Into<String>, code: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), code: code.into(), extra: IndexMap::new() }
    }
}

/// Lookup from normalized reference path to the entry documenting it.
#[derive(Debug, Clone, Default)]
pub struct DocIndex {
    entries: IndexMap<String, DocRef>,
}

/// An entry registered in the [`DocIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRef {
    /// Entry id.
    pub id: String,
    /// Position of the entry in the spec.
    pub position: usize,
}

impl DocIndex {
    /// Index every entry that carries a reference path. When two entries
    /// normalize to the same path the later one wins.
    pub fn build(spec: &DocSpec) -> Self {
        let mut entries = IndexMap::new();
        for (position, entry) in spec.functions.iter().enumerate() {
            let Some(reference) = entry.reference.as_deref() else {
                continue;
            };
            let path = normalize_path(reference);
            if path.is_empty() {
                continue;
            }
            entries.insert(path, DocRef { id: entry.id.clone(), position });
        }
        Self { entries }
    }

    /// Whether a normalized path is documented.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Entry documenting a normalized path.
    pub fn get(&self, path: &str) -> Option<&DocRef> {
        self.entries.get(path)
    }

    /// Documented paths in spec order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &DocRef)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r#"
openref:
  version: 2
info:
  id: reference/supabase-js
  title: Supabase Client
functions:
  - id: introduction
    title: Introduction
  - id: sign-up
    title: 'signUp()'
    $ref: '@supabase/auth-js.index.GoTrueClient.signUp'
    notes: |
      Some notes.
    examples:
      - id: sign-up
        name: Sign up
        isSpotlight: true
        code: |
          ```js
          await supabase.auth.signUp()
          ```
  - id: sign-up-duplicate
    $ref: '@supabase/auth-js.GoTrueClient.signUp'
"#;

    fn spec() -> DocSpec {
        DocSpec::from_yaml(SPEC, Path::new("spec.yml")).unwrap()
    }

    #[test]
    fn test_parses_entries_and_extra_keys() {
        let spec = spec();
        assert_eq!(spec.functions.len(), 3);
        let entry = &spec.functions[1];
        assert_eq!(entry.reference.as_deref(), Some("@supabase/auth-js.index.GoTrueClient.signUp"));
        assert!(entry.extra.contains_key("notes"));
        assert_eq!(entry.examples().len(), 1);
        assert!(entry.examples()[0].extra.contains_key("isSpotlight"));
        assert!(spec.functions[0].reference.is_none());
        assert!(spec.functions[0].examples().is_empty());
    }

    #[test]
    fn test_index_skips_markdown_entries_and_last_wins() {
        let index = DocIndex::build(&spec());
        assert_eq!(index.len(), 1);
        let entry = index.get("@supabase/auth-js.GoTrueClient.signUp").unwrap();
        assert_eq!(entry.id, "sign-up-duplicate");
        assert_eq!(entry.position, 2);
    }

    #[test]
    fn test_position_lookup() {
        let spec = spec();
        assert_eq!(spec.position("sign-up"), Some(1));
        assert!(!spec.has_id("missing"));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let err = DocSpec::from_yaml("functions: [", Path::new("bad.yml")).unwrap_err();
        assert!(matches!(err, AuditError::Yaml { .. }));
    }
}
