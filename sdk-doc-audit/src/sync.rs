//! Sync of descriptions and examples from doc-comments into the spec.
//!
//! Once a symbol carries a doc-comment description, that text is the
//! reference and the hand-written `description` is dropped. Examples only
//! ever grow: new `@example` blocks are appended, existing ones are never
//! touched.

use crate::api_index::{ApiIndex, Symbol};
use crate::document::SpecFile;
use crate::error::Result;
use crate::path::{normalize_path, parent};
use crate::spec::DocExample;
use crate::typedoc::SymbolKind;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// What a sync pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Entries whose manual description was removed.
    pub descriptions_removed: usize,
    /// Examples appended across all entries.
    pub examples_added: usize,
    /// Ids of every entry that changed, in spec order.
    pub changed_entries: Vec<String>,
}

impl SyncOutcome {
    pub fn is_empty(&self) -> bool {
        self.changed_entries.is_empty()
    }
}

/// Symbol whose doc-comment documents `path`. A constructor without a
/// doc-comment borrows its class's.
pub fn doc_source<'a>(index: &'a ApiIndex, path: &str) -> Option<&'a Symbol> {
    let symbol = index.get(path)?;
    if symbol.kind == SymbolKind::Constructor && !symbol.has_doc_comment() {
        if let Some(class) = parent(path).and_then(|class| index.get(class)) {
            return Some(class);
        }
    }
    Some(symbol)
}

/// Examples of `codes` not yet present among `existing`, with fresh ids
/// `<entry_id>-typedoc-example-<n>`.
pub fn new_examples(entry_id: &str, existing: &[DocExample], codes: &[String]) -> Vec<DocExample> {
    let mut known_code: HashSet<&str> = existing.iter().map(|example| example.code.trim()).collect();
    let mut taken_ids: HashSet<String> = existing.iter().map(|example| example.id.clone()).collect();
    let mut next = 1;
    let mut added = Vec::new();

    for code in codes {
        let code = code.trim();
        if code.is_empty() || !known_code.insert(code) {
            continue;
        }
        let id = loop {
            let candidate = format!("{entry_id}-typedoc-example-{next}");
            next += 1;
            if taken_ids.insert(candidate.clone()) {
                break candidate;
            }
        };
        let name = format!("Example {}", existing.len() + added.len() + 1);
        added.push(DocExample::new(id, name, code));
    }
    added
}

/// Sync every entry that has both an id and a reference.
#[instrument(skip_all)]
pub fn sync_entries(file: &mut SpecFile, index: &ApiIndex) -> Result<SyncOutcome> {
    let mut outcome = SyncOutcome::default();

    for position in 0..file.entries().len() {
        let entry = &file.entries()[position];
        let Some(reference) = entry.reference.as_deref().filter(|_| !entry.id.is_empty()) else {
            continue;
        };
        let Some(symbol) = doc_source(index, &normalize_path(reference)) else {
            debug!(entry = %entry.id, "reference not in the index, nothing to sync");
            continue;
        };

        let id = entry.id.clone();
        let strip_description = symbol.description.is_some() && entry.description.is_some();
        let added = new_examples(&id, entry.examples(), &symbol.examples);
        let mut changed = false;

        if strip_description && file.remove_description(position)? {
            debug!(entry = %id, "description superseded by doc-comment");
            outcome.descriptions_removed += 1;
            changed = true;
        }
        if !added.is_empty() {
            debug!(entry = %id, count = added.len(), "appending doc-comment examples");
            outcome.examples_added += added.len();
            file.append_examples(position, added)?;
            changed = true;
        }
        if changed {
            outcome.changed_entries.push(id);
        }
    }

    info!(
        descriptions_removed = outcome.descriptions_removed,
        examples_added = outcome.examples_added,
        "Synced doc-comments into spec"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_index::IndexMode;
    use crate::typedoc::ApiSnapshot;
    use std::path::Path;

    const SNAPSHOT: &str = r#"{
        "children": [{
            "name": "@supabase/storage-js",
            "kind": 2,
            "children": [{
                "name": "StorageClient",
                "kind": 128,
                "comment": {
                    "summary": [{ "kind": "text", "text": "Client for Storage buckets." }],
                    "blockTags": [{ "tag": "@example", "content": [{ "kind": "code", "text": "new StorageClient(url)" }] }]
                },
                "children": [
                    { "name": "constructor", "kind": 512 },
                    { "name": "listBuckets", "kind": 2048, "signatures": [{ "comment": {
                        "summary": [{ "kind": "text", "text": "Lists all buckets." }],
                        "blockTags": [
                            { "tag": "@example", "content": [{ "kind": "code", "text": "await listBuckets()" }] },
                            { "tag": "@example", "content": [{ "kind": "code", "text": "\nawait listBuckets({ limit: 1 })\n" }] }
                        ]
                    } }] },
                    { "name": "getBucket", "kind": 2048 }
                ]
            }]
        }]
    }"#;

    const SPEC: &str = "\
functions:
  - id: list-buckets
    title: listBuckets()
    $ref: '@supabase/storage-js.index.StorageClient.listBuckets'
    description: |
      Hand-written text.
    examples:
      - id: list-buckets-typedoc-example-1
        name: Existing
        code: |
          await listBuckets()
  - id: get-bucket
    $ref: '@supabase/storage-js.StorageClient.getBucket'
    description: Kept, no doc-comment.
  - id: storage-client
    $ref: '@supabase/storage-js.StorageClient.constructor'
  - id: overview
    title: Overview
";

    fn index() -> ApiIndex {
        let snapshot = ApiSnapshot::from_json(SNAPSHOT, Path::new("api.json")).unwrap();
        ApiIndex::build(&snapshot, IndexMode::All)
    }

    fn file() -> SpecFile {
        SpecFile::parse(SPEC, Path::new("spec.yml")).unwrap()
    }

    #[test]
    fn test_sync_removes_superseded_description_and_appends_new_examples() {
        let mut file = file();
        let outcome = sync_entries(&mut file, &index()).unwrap();

        let entry = &file.entries()[0];
        assert!(entry.description.is_none());
        let examples = entry.examples();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].name, "Existing");
        assert_eq!(examples[1].id, "list-buckets-typedoc-example-2");
        assert_eq!(examples[1].name, "Example 2");
        assert_eq!(examples[1].code, "await listBuckets({ limit: 1 })");

        assert_eq!(outcome.descriptions_removed, 1);
        assert_eq!(outcome.changed_entries, vec!["list-buckets", "storage-client"]);
    }

    #[test]
    fn test_description_kept_without_doc_comment() {
        let mut file = file();
        sync_entries(&mut file, &index()).unwrap();
        assert_eq!(file.entries()[1].description.as_deref(), Some("Kept, no doc-comment."));
    }

    #[test]
    fn test_constructor_falls_back_to_class_comment() {
        let mut file = file();
        sync_entries(&mut file, &index()).unwrap();
        let examples = file.entries()[2].examples();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].code, "new StorageClient(url)");
        assert_eq!(examples[0].id, "storage-client-typedoc-example-1");
    }

    #[test]
    fn test_sync_is_idempotent() {
        let mut file = file();
        sync_entries(&mut file, &index()).unwrap();
        let once = file.render();

        let mut again = SpecFile::parse(&once, Path::new("spec.yml")).unwrap();
        let outcome = sync_entries(&mut again, &index()).unwrap();
        assert!(outcome.is_empty());
        assert!(!again.is_changed());
        assert_eq!(again.render(), once);
    }

    #[test]
    fn test_document_matches_model_after_sync() {
        let mut file = file();
        sync_entries(&mut file, &index()).unwrap();
        let reparsed = crate::spec::DocSpec::from_yaml(&file.render(), Path::new("spec.yml")).unwrap();
        assert_eq!(reparsed.functions, file.entries());
    }

    #[test]
    fn test_new_examples_skips_known_code_and_taken_ids() {
        let existing = vec![DocExample::new("e-typedoc-example-1", "One", "  a()  ")];
        let added = new_examples("e", &existing, &["a()".to_string(), "b()".to_string(), "b()".to_string()]);
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].id, "e-typedoc-example-2");
        assert_eq!(added[0].code, "b()");
    }
}
