//! Control flow of an audit run.
//!
//! Phases run strictly in sequence: load inputs, build indices, reconcile,
//! optionally fix the spec, rebuild the navigation, then write outputs. Every
//! input is loaded and parsed before anything is written, so a fatal input
//! error leaves all output files untouched.

use crate::api_index::{ApiIndex, IndexMode, documentable_classes};
use crate::config::AuditConfig;
use crate::document::SpecFile;
use crate::error::{AuditError, Result};
use crate::reconcile::reconcile;
use crate::report::ValidationReport;
use crate::sections::{build_categories, default_sections, merge_sections, parse_sections, render_sections};
use crate::spec::{DocIndex, DocSpec};
use crate::stubs::{generate_stubs, merge_stubs};
use crate::sync::{SyncOutcome, sync_entries};
use crate::typedoc::ApiSnapshot;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Result of a full audit run.
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub report: ValidationReport,
    /// Ids of stub entries appended to the spec.
    pub stubs_added: Vec<String>,
    /// Changes made by the doc-comment sync.
    pub sync: SyncOutcome,
    /// Whether the spec file was rewritten.
    pub spec_written: bool,
    /// Whether the navigation file was rewritten.
    pub sections_written: bool,
}

impl AuditOutcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self, strict: bool) -> i32 {
        self.report.exit_code(strict)
    }
}

/// Spec text and its parsed model.
struct LoadedSpec {
    text: String,
    spec: DocSpec,
}

/// Navigation loaded from disk, or the defaults when the file is absent.
struct LoadedSections {
    path: PathBuf,
    original: Option<String>,
    nodes: Vec<Value>,
}

/// Runs audits for one configuration.
#[derive(Debug, Clone)]
pub struct AuditOrchestrator {
    config: AuditConfig,
}

impl AuditOrchestrator {
    pub fn new(config: AuditConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Run the full audit and write the report, the navigation, and when
    /// fixing, the spec.
    #[instrument(skip(self), fields(api = %self.config.api_path.display(), spec = %self.config.spec_path.display()))]
    pub async fn run(&self) -> Result<AuditOutcome> {
        self.config.validate()?;

        let snapshot = load_snapshot(&self.config.api_path).await?;
        let LoadedSpec { text: spec_text, mut spec } = load_spec(&self.config.spec_path).await?;
        let sections = load_sections(self.config.resolved_sections_path()).await?;

        let public = ApiIndex::build(&snapshot, IndexMode::PublicOnly);
        let all = ApiIndex::build(&snapshot, IndexMode::All);
        let documentable = documentable_classes(&snapshot);
        let docs = DocIndex::build(&spec);
        info!(
            public = public.len(),
            all = all.len(),
            documented = docs.len(),
            classes = documentable.len(),
            "Built indices"
        );

        let report = ValidationReport::new(reconcile(&public, &all, &docs, &documentable));

        let mut stubs_added = Vec::new();
        let mut sync = SyncOutcome::default();
        let mut updated_spec = None;
        if self.config.fix {
            match SpecFile::with_spec(spec.clone(), &spec_text, &self.config.spec_path) {
                Ok(mut file) => {
                    // Stubs go in before the sync so their descriptions are
                    // already superseded in this run.
                    stubs_added = merge_stubs(&mut file, generate_stubs(&report.issues, &public))?;
                    sync = sync_entries(&mut file, &all)?;
                    if file.is_changed() {
                        updated_spec = Some(file.render());
                    }
                    spec = file.into_spec();
                }
                Err(err) => warn!(error = %err, "Spec layout cannot be edited in place, skipping fixes"),
            }
        }

        let canonical = build_categories(&spec);
        let merged = merge_sections(sections.nodes, &canonical);

        write_file(&self.config.report_path, &report_json(&report)?).await?;
        info!(path = %self.config.report_path.display(), "Wrote validation report");

        let spec_written = updated_spec.is_some();
        if let Some(text) = updated_spec {
            write_file(&self.config.spec_path, &text).await?;
            info!(path = %self.config.spec_path.display(), "Updated spec");
        }

        let sections_written =
            write_if_changed(&sections.path, sections.original.as_deref(), &render_sections(&merged)?).await?;

        Ok(AuditOutcome { report, stubs_added, sync, spec_written, sections_written })
    }

    /// Regenerate the navigation from the spec alone. Returns the merged
    /// sections and whether the file was rewritten.
    #[instrument(skip(self), fields(spec = %self.config.spec_path.display()))]
    pub async fn run_sections(&self) -> Result<(Vec<Value>, bool)> {
        self.config.validate_for_sections()?;

        let LoadedSpec { spec, .. } = load_spec(&self.config.spec_path).await?;
        let sections = load_sections(self.config.resolved_sections_path()).await?;

        let merged = merge_sections(sections.nodes, &build_categories(&spec));
        let written =
            write_if_changed(&sections.path, sections.original.as_deref(), &render_sections(&merged)?).await?;
        Ok((merged, written))
    }
}

fn report_json(report: &ValidationReport) -> Result<String> {
    report.to_json().map_err(|e| AuditError::Serialization(e.to_string()))
}

async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| AuditError::io(path, e))
}

async fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await.map_err(|e| AuditError::io(dir, e))?;
    }
    tokio::fs::write(path, contents).await.map_err(|e| AuditError::io(path, e))
}

async fn write_if_changed(path: &Path, original: Option<&str>, contents: &str) -> Result<bool> {
    if original == Some(contents) {
        debug!(path = %path.display(), "navigation unchanged");
        return Ok(false);
    }
    write_file(path, contents).await?;
    info!(path = %path.display(), "Wrote navigation sections");
    Ok(true)
}

async fn load_snapshot(path: &Path) -> Result<ApiSnapshot> {
    let text = read_file(path).await?;
    let snapshot = ApiSnapshot::from_json(&text, path)?;
    debug!(libraries = snapshot.libraries().len(), "Loaded API snapshot");
    Ok(snapshot)
}

async fn load_spec(path: &Path) -> Result<LoadedSpec> {
    let text = read_file(path).await?;
    let spec = DocSpec::from_yaml(&text, path)?;
    debug!(entries = spec.functions.len(), "Loaded spec");
    Ok(LoadedSpec { text, spec })
}

async fn load_sections(path: PathBuf) -> Result<LoadedSections> {
    if !tokio::fs::try_exists(&path).await.map_err(|e| AuditError::io(&path, e))? {
        debug!(path = %path.display(), "no sections file, starting from defaults");
        return Ok(LoadedSections { path, original: None, nodes: default_sections() });
    }
    let text = read_file(&path).await?;
    let nodes = parse_sections(&text, &path)?;
    Ok(LoadedSections { path, original: Some(text), nodes })
}
