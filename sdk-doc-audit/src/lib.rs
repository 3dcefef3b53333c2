//! # sdk-doc-audit
//!
//! Reconciles the hand-written reference spec of a multi-package client SDK
//! against the TypeDoc JSON describing its public surface.
//!
//! The audit:
//! - reports broken references, undocumented public methods, and documented
//!   private symbols, graded by severity
//! - optionally appends stub entries for the undocumented methods that matter
//! - syncs doc-comment descriptions and examples into existing entries
//! - regenerates the navigation sections from the spec
//!
//! Spec edits are applied to the original YAML text, so formatting and
//! comments outside the edited entries survive a `--fix` run unchanged.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sdk_doc_audit::{AuditConfig, AuditOrchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AuditConfig::new("api/supabase.json", "spec/supabase_js_v2.yml").with_fix(true);
//!     let outcome = AuditOrchestrator::new(config).run().await?;
//!
//!     println!("{} issues found", outcome.report.summary.total);
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Validate, writing validation-report.json and the navigation file
//! sdk-doc-audit audit --api api/supabase.json --spec spec/supabase_js_v2.yml
//!
//! # Also append stubs and sync doc-comments into the spec
//! sdk-doc-audit audit --api api/supabase.json --spec spec/supabase_js_v2.yml --fix
//!
//! # Regenerate the navigation only
//! sdk-doc-audit sections --spec spec/supabase_js_v2.yml
//! ```

pub mod api_index;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod path;
pub mod reconcile;
pub mod report;
pub mod rules;
pub mod sections;
pub mod spec;
pub mod stubs;
pub mod sync;
pub mod typedoc;

// Re-export commonly used types
pub use api_index::{ApiIndex, IndexMode, Symbol, documentable_classes, is_public_api};
pub use config::{AuditConfig, OutputFormat};
pub use document::{SpecDocument, SpecFile};
pub use error::{AuditError, Result};
pub use logging::init_logging;
pub use orchestrator::{AuditOrchestrator, AuditOutcome};
pub use path::normalize_path;
pub use reconcile::{Reconciler, reconcile};
pub use report::{Issue, IssueKind, ReportSummary, Severity, ValidationReport};
pub use sections::{Category, NavNode, build_categories, category_for_entry, default_sections, merge_sections};
pub use spec::{DocEntry, DocExample, DocIndex, DocSpec};
pub use stubs::{generate_stubs, merge_stubs, stub_id};
pub use sync::{SyncOutcome, sync_entries};
pub use typedoc::{ApiNode, ApiSnapshot, SymbolKind};

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the crate.
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        assert!(!VERSION.is_empty());
        assert_eq!(CRATE_NAME, "sdk-doc-audit");
    }

    #[test]
    fn test_config_creation() {
        let config = AuditConfig::new("api.json", "spec.yml");
        assert!(!config.fix);
        assert!(config.validate().is_err());
    }
}
