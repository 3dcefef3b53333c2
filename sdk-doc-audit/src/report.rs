//! Issues and the validation report.
//!
//! Issues are a reported stream: the engine produces them, the report
//! summarizes them, and only their severities influence the exit code.

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a reconciliation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A spec entry references a path that does not exist in the API.
    BrokenReference,
    /// A public method or constructor has no spec entry.
    MissingDocumentation,
    /// A spec entry references a symbol that exists but is not public.
    PrivateApiExposed,
}

impl IssueKind {
    /// Heading used in console output.
    pub fn heading(self) -> &'static str {
        match self {
            IssueKind::BrokenReference => "Broken references",
            IssueKind::MissingDocumentation => "Missing documentation",
            IssueKind::PrivateApiExposed => "Private APIs exposed",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssueKind::BrokenReference => "broken_reference",
            IssueKind::MissingDocumentation => "missing_documentation",
            IssueKind::PrivateApiExposed => "private_api_exposed",
        };
        f.write_str(name)
    }
}

/// Severity of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A single reconciliation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: Severity,
    /// Id of the spec entry involved, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Normalized symbol path involved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
    /// Source location (`file:line`) of the symbol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Issue {
    /// A spec entry whose reference does not resolve.
    pub fn broken_reference(entry_id: &str, path: &str) -> Self {
        Self {
            kind: IssueKind::BrokenReference,
            severity: Severity::Error,
            reference: Some(entry_id.to_string()),
            path: Some(path.to_string()),
            message: format!(
                "Entry '{entry_id}' references '{path}', which is not in the API snapshot. \
                 API may have been removed."
            ),
            location: None,
        }
    }

    /// A public method or constructor without a spec entry.
    pub fn missing_documentation(path: &str, severity: Severity, location: Option<String>) -> Self {
        Self {
            kind: IssueKind::MissingDocumentation,
            severity,
            reference: None,
            path: Some(path.to_string()),
            message: format!("Public API '{path}' is not documented."),
            location,
        }
    }

    /// A spec entry pointing at a symbol that is not public.
    pub fn private_api_exposed(entry_id: &str, path: &str, location: Option<String>) -> Self {
        Self {
            kind: IssueKind::PrivateApiExposed,
            severity: Severity::Warning,
            reference: Some(entry_id.to_string()),
            path: Some(path.to_string()),
            message: format!(
                "Entry '{entry_id}' documents '{path}', which is documented but appears private."
            ),
            location,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Issue counts of a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub broken_references: usize,
    pub missing_documentation: usize,
    pub private_apis_exposed: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl ReportSummary {
    /// Count issues by kind and severity.
    pub fn from_issues(issues: &[Issue]) -> Self {
        let count = |kind: IssueKind| issues.iter().filter(|issue| issue.kind == kind).count();
        let errors = issues.iter().filter(|issue| issue.is_error()).count();
        Self {
            total: issues.len(),
            broken_references: count(IssueKind::BrokenReference),
            missing_documentation: count(IssueKind::MissingDocumentation),
            private_apis_exposed: count(IssueKind::PrivateApiExposed),
            errors,
            warnings: issues.len() - errors,
        }
    }
}

/// The persisted outcome of a validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub timestamp: DateTime<Utc>,
    pub summary: ReportSummary,
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    /// Create a report stamped with the current time.
    pub fn new(issues: Vec<Issue>) -> Self {
        let summary = ReportSummary::from_issues(&issues);
        Self { timestamp: Utc::now(), summary, issues }
    }

    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.summary.warnings > 0
    }

    /// Process exit code: 1 when an error exists, or any issue under strict mode.
    pub fn exit_code(&self, strict: bool) -> i32 {
        if self.has_errors() || (strict && self.has_warnings()) { 1 } else { 0 }
    }

    /// Issues of one kind, in report order.
    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |issue| issue.kind == kind)
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Format as a human-readable string for the terminal.
    pub fn format_console(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", "Reference validation report".bold()));
        output.push_str(&format!("Generated: {}\n", self.timestamp.to_rfc3339()));

        for kind in
            [IssueKind::BrokenReference, IssueKind::MissingDocumentation, IssueKind::PrivateApiExposed]
        {
            let issues: Vec<&Issue> = self.issues_of(kind).collect();
            if issues.is_empty() {
                continue;
            }
            output.push_str(&format!("\n{} ({}):\n", kind.heading().bold(), issues.len()));
            for issue in issues {
                let severity = match issue.severity {
                    Severity::Error => "error".red().bold(),
                    Severity::Warning => "warning".yellow().bold(),
                };
                output.push_str(&format!("  {severity}: {}\n", issue.message));
                if let Some(location) = &issue.location {
                    output.push_str(&format!("    at {}\n", location.as_str().dimmed()));
                }
            }
        }

        output.push_str("\nSummary:\n");
        output.push_str(&format!("  Total: {}\n", self.summary.total));
        output.push_str(&format!("  Broken references: {}\n", self.summary.broken_references));
        output.push_str(&format!("  Missing documentation: {}\n", self.summary.missing_documentation));
        output.push_str(&format!("  Private APIs exposed: {}\n", self.summary.private_apis_exposed));
        output.push_str(&format!(
            "  Errors: {}, warnings: {}\n",
            self.summary.errors, self.summary.warnings
        ));
        output
    }
}
