//! Reconciliation of the API indices against the documentation index.
//!
//! Three independent passes produce the issue stream, in this order:
//! broken references, missing documentation, private APIs exposed. Each
//! pass iterates its source map in insertion order, so the output is
//! deterministic for a given pair of inputs.

use crate::api_index::{ApiIndex, Symbol};
use crate::path::{last_segment, parent, segments};
use crate::report::{Issue, Severity};
use crate::rules::{is_documented_reexport, is_internal_symbol, is_top_level_export, is_user_facing_class};
use crate::spec::DocIndex;
use indexmap::IndexSet;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// The nearest documentable class enclosing a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwningClass<'a> {
    /// Path of the class.
    pub path: &'a str,
    /// Whether the method sits exactly one level below the class.
    pub direct_child: bool,
}

/// Runs the reconciliation passes over prebuilt indices.
pub struct Reconciler<'a> {
    public: &'a ApiIndex,
    all: &'a ApiIndex,
    docs: &'a DocIndex,
    documentable: &'a IndexSet<String>,
    /// Classes that already have at least one documented method or constructor.
    documented_owners: HashSet<&'a str>,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        public: &'a ApiIndex,
        all: &'a ApiIndex,
        docs: &'a DocIndex,
        documentable: &'a IndexSet<String>,
    ) -> Self {
        let documented_owners = docs
            .iter()
            .filter(|(path, _)| all.get(path).is_some_and(|symbol| symbol.kind.is_callable_member()))
            .filter_map(|(path, _)| parent(path))
            .collect();
        Self { public, all, docs, documentable, documented_owners }
    }

    /// Run all passes and concatenate their issues.
    #[instrument(skip(self))]
    pub fn run(&self) -> Vec<Issue> {
        let mut issues = self.broken_references();
        let broken = issues.len();
        issues.extend(self.missing_documentation());
        let missing = issues.len() - broken;
        issues.extend(self.private_api_exposure());
        let private = issues.len() - broken - missing;

        info!(broken, missing, private, "Reconciliation complete");
        issues
    }

    /// Documented paths that do not exist anywhere in the API.
    pub fn broken_references(&self) -> Vec<Issue> {
        self.docs
            .iter()
            .filter(|(path, _)| !self.all.contains(path))
            .map(|(path, entry)| Issue::broken_reference(&entry.id, path))
            .collect()
    }

    /// Public methods and constructors without a spec entry.
    pub fn missing_documentation(&self) -> Vec<Issue> {
        let mut issues = Vec::new();

        for (path, symbol) in self.public.iter() {
            if self.docs.contains(path) || !symbol.kind.is_callable_member() || symbol.inherited {
                continue;
            }
            if is_internal_symbol(path) {
                debug!(path = %path, "internal implementation symbol, not reported");
                continue;
            }
            if is_documented_reexport(path, self.docs) {
                continue;
            }

            let Some(owner) = self.owning_class(path) else {
                debug!(path = %path, "no documentable class encloses this member");
                continue;
            };

            let severity = if owner.direct_child && self.is_user_facing(owner.path) {
                Severity::Error
            } else {
                Severity::Warning
            };
            issues.push(Issue::missing_documentation(path, severity, symbol.location()));
        }

        issues
    }

    /// Documented paths that exist but are not public.
    pub fn private_api_exposure(&self) -> Vec<Issue> {
        self.docs
            .iter()
            .filter(|(path, _)| !self.public.contains(path))
            .filter_map(|(path, entry)| {
                self.all.get(path).map(|symbol: &Symbol| {
                    Issue::private_api_exposed(&entry.id, path, symbol.location())
                })
            })
            .collect()
    }

    /// Nearest ancestor of `path` that is a documentable class.
    pub fn owning_class(&self, path: &str) -> Option<OwningClass<'a>> {
        let parts = segments(path);
        (1..parts.len()).rev().find_map(|depth| {
            let prefix = parts[..depth].join(".");
            self.documentable.get(&prefix).map(|class_path| OwningClass {
                path: class_path.as_str(),
                direct_child: depth + 1 == parts.len(),
            })
        })
    }

    /// A class is user-facing when its name says so, when it is exported
    /// from a package root, or when one of its members is already documented.
    pub fn is_user_facing(&self, class_path: &str) -> bool {
        is_user_facing_class(last_segment(class_path))
            || is_top_level_export(class_path)
            || self.documented_owners.contains(class_path)
    }
}

/// Build the reconciler and run every pass.
pub fn reconcile(
    public: &ApiIndex,
    all: &ApiIndex,
    docs: &DocIndex,
    documentable: &IndexSet<String>,
) -> Vec<Issue> {
    Reconciler::new(public, all, docs, documentable).run()
}
