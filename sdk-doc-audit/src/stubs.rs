//! Stub entries for undocumented public APIs.
//!
//! Only error-severity missing-documentation issues get a stub. Drafts are
//! built from the symbol's doc-comment and appended to the spec through
//! [`SpecFile`], so the document and the logical model stay in step.

use crate::api_index::{ApiIndex, Symbol};
use crate::document::SpecFile;
use crate::error::Result;
use crate::path::{last_segment, parent};
use crate::report::{Issue, IssueKind};
use crate::spec::{DocEntry, DocExample, DocSpec};
use crate::typedoc::SymbolKind;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Package scope stripped from stub ids.
pub const PACKAGE_SCOPE_PREFIX: &str = "@supabase/";

/// Description of a stub whose symbol has no doc-comment.
pub const PLACEHOLDER_DESCRIPTION: &str = "No description provided yet.";

static NON_ALPHANUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-z0-9]+").expect("unreachable error: failed to compile stub id pattern")
});

/// Derive an entry id from a normalized symbol path.
///
/// `@supabase/auth-js.GoTrueClient.signUp` becomes
/// `auth-js-gotrueclient-signup`.
pub fn stub_id(path: &str) -> String {
    let unscoped = path.strip_prefix(PACKAGE_SCOPE_PREFIX).unwrap_or(path);
    let lowered = unscoped.to_lowercase();
    NON_ALPHANUMERIC.replace_all(&lowered, "-").trim_matches('-').to_string()
}

/// `new ClassName()` for constructors, `ClassName.method()` otherwise.
pub fn stub_title(symbol: &Symbol) -> String {
    let class = parent(&symbol.path).map(last_segment);
    match (symbol.kind, class) {
        (SymbolKind::Constructor, Some(class)) => format!("new {class}()"),
        (_, Some(class)) => format!("{class}.{}()", symbol.name),
        (_, None) => format!("{}()", symbol.name),
    }
}

fn stub_examples(id: &str, codes: &[String]) -> Option<Vec<DocExample>> {
    if codes.is_empty() {
        return None;
    }
    let examples = codes
        .iter()
        .enumerate()
        .map(|(i, code)| {
            let n = i + 1;
            DocExample::new(format!("{id}-example-{n}"), format!("Example {n}"), code.as_str())
        })
        .collect();
    Some(examples)
}

/// Build the draft entry documenting a symbol.
pub fn draft_entry(symbol: &Symbol) -> DocEntry {
    let id = stub_id(&symbol.path);
    let description = symbol.description.clone().unwrap_or_else(|| PLACEHOLDER_DESCRIPTION.to_string());
    let mut entry = DocEntry::new(id.as_str())
        .with_title(stub_title(symbol))
        .with_ref(symbol.path.as_str())
        .with_description(description);
    entry.examples = stub_examples(&id, &symbol.examples);
    entry
}

/// One draft per error-severity missing-documentation issue, in issue order.
pub fn generate_stubs(issues: &[Issue], index: &ApiIndex) -> Vec<DocEntry> {
    issues
        .iter()
        .filter(|issue| issue.kind == IssueKind::MissingDocumentation && issue.is_error())
        .filter_map(|issue| {
            let path = issue.path.as_deref()?;
            let Some(symbol) = index.get(path) else {
                warn!(path, "issue refers to a symbol missing from the index, no stub generated");
                return None;
            };
            Some(draft_entry(symbol))
        })
        .collect()
}

/// First id derived from `base` that no entry of the spec uses yet.
pub fn unique_id(spec: &DocSpec, base: &str) -> String {
    if !spec.has_id(base) {
        return base.to_string();
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}-{n}");
        if !spec.has_id(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Append drafts to the spec, renaming colliding ids. Returns the ids that
/// were inserted, in order.
pub fn merge_stubs(file: &mut SpecFile, drafts: Vec<DocEntry>) -> Result<Vec<String>> {
    let mut inserted = Vec::with_capacity(drafts.len());

    for mut draft in drafts {
        let id = unique_id(file.spec(), &draft.id);
        if id != draft.id {
            debug!(draft = %draft.id, id = %id, "stub id already taken, using suffixed id");
            for example in draft.examples.iter_mut().flatten() {
                if let Some(n) = example.id.strip_prefix(&format!("{}-", draft.id)) {
                    example.id = format!("{id}-{n}");
                }
            }
            draft.id = id.clone();
        }
        file.append_entry(draft)?;
        inserted.push(id);
    }

    if !inserted.is_empty() {
        info!("Added {} stub entries", inserted.len());
    }
    Ok(inserted)
}
