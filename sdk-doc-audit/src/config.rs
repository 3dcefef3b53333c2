//! Configuration of an audit run.
//!
//! Settings come from an optional TOML file and from command-line flags,
//! with flags taking precedence. Relative paths in the file are resolved
//! against the file's directory.
//!
//! ```toml
//! api_path = "api/supabase.json"
//! spec_path = "spec/supabase_js_v2.yml"
//! report_path = "validation-report.json"
//! strict = true
//! ```

use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the validation report.
pub const DEFAULT_REPORT_FILE: &str = "validation-report.json";

/// Default name of the navigation file, next to the spec.
pub const DEFAULT_SECTIONS_FILE: &str = "common-client-libs-sections.json";

/// How the report is printed to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable, colored output.
    #[default]
    Console,
    /// The JSON report.
    Json,
}

/// Settings of an audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// TypeDoc JSON snapshot.
    pub api_path: PathBuf,
    /// Reference spec (YAML).
    pub spec_path: PathBuf,
    /// Navigation file; defaults to [`DEFAULT_SECTIONS_FILE`] next to the spec.
    pub sections_path: Option<PathBuf>,
    /// Where the JSON report is written.
    pub report_path: PathBuf,
    /// Append stubs and sync doc-comments into the spec.
    pub fix: bool,
    /// Treat warnings as failures.
    pub strict: bool,
    pub output_format: OutputFormat,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            api_path: PathBuf::new(),
            spec_path: PathBuf::new(),
            sections_path: None,
            report_path: PathBuf::from(DEFAULT_REPORT_FILE),
            fix: false,
            strict: false,
            output_format: OutputFormat::default(),
        }
    }
}

impl AuditConfig {
    /// Create a config for the given snapshot and spec.
    pub fn new(api_path: impl Into<PathBuf>, spec_path: impl Into<PathBuf>) -> Self {
        Self { api_path: api_path.into(), spec_path: spec_path.into(), ..Default::default() }
    }

    /// Load settings from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| AuditError::io(path, e))?;
        let mut config: AuditConfig = toml::from_str(&text)?;

        if let Some(base) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            let resolve = |p: &mut PathBuf| {
                if !p.as_os_str().is_empty() && p.is_relative() {
                    *p = base.join(&*p);
                }
            };
            resolve(&mut config.api_path);
            resolve(&mut config.spec_path);
            resolve(&mut config.report_path);
            if let Some(sections) = config.sections_path.as_mut() {
                resolve(sections);
            }
        }
        Ok(config)
    }

    pub fn with_api_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.api_path = path.into();
        self
    }

    pub fn with_spec_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.spec_path = path.into();
        self
    }

    pub fn with_sections_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sections_path = Some(path.into());
        self
    }

    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = path.into();
        self
    }

    /// Enable or disable writing fixes back to the spec.
    pub fn with_fix(mut self, fix: bool) -> Self {
        self.fix = fix;
        self
    }

    /// Enable or disable strict mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Navigation file path, falling back to the default next to the spec.
    pub fn resolved_sections_path(&self) -> PathBuf {
        match &self.sections_path {
            Some(path) => path.clone(),
            None => self
                .spec_path
                .parent()
                .map(|dir| dir.join(DEFAULT_SECTIONS_FILE))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SECTIONS_FILE)),
        }
    }

    /// Check everything a full audit needs.
    pub fn validate(&self) -> Result<()> {
        require_file("api_path", &self.api_path)?;
        self.validate_for_sections()?;
        if self.report_path.as_os_str().is_empty() {
            return Err(AuditError::config("report_path must not be empty"));
        }
        Ok(())
    }

    /// Check what regenerating the navigation alone needs.
    pub fn validate_for_sections(&self) -> Result<()> {
        require_file("spec_path", &self.spec_path)
    }
}

fn require_file(field: &str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(AuditError::config(format!("{field} is required")));
    }
    if !path.is_file() {
        return Err(AuditError::config(format!("{field}: {} does not exist", path.display())));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AuditConfig::new("api.json", "spec/spec.yml");
        assert_eq!(config.report_path, PathBuf::from(DEFAULT_REPORT_FILE));
        assert_eq!(config.output_format, OutputFormat::Console);
        assert!(!config.fix);
        assert_eq!(config.resolved_sections_path(), PathBuf::from("spec").join(DEFAULT_SECTIONS_FILE));
    }

    #[test]
    fn test_builder() {
        let config = AuditConfig::new("a.json", "s.yml")
            .with_sections_path("nav.json")
            .with_report_path("out.json")
            .with_fix(true)
            .with_strict(true)
            .with_output_format(OutputFormat::Json);
        assert_eq!(config.resolved_sections_path(), PathBuf::from("nav.json"));
        assert_eq!(config.report_path, PathBuf::from("out.json"));
        assert!(config.fix && config.strict);
        assert_eq!(config.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_validate_requires_existing_inputs() {
        let dir = TempDir::new().unwrap();
        let api = dir.path().join("api.json");
        let spec = dir.path().join("spec.yml");

        let err = AuditConfig::default().validate().unwrap_err();
        assert!(matches!(err, AuditError::Config(_)));

        let config = AuditConfig::new(&api, &spec);
        assert!(config.validate().is_err());

        std::fs::write(&api, "{}").unwrap();
        std::fs::write(&spec, "functions: []").unwrap();
        config.validate().unwrap();
        AuditConfig::default().with_spec_path(&spec).validate_for_sections().unwrap();
    }

    #[test]
    fn test_from_file_resolves_relative_paths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.toml");
        std::fs::write(&path, "api_path = \"api.json\"\nspec_path = \"/abs/spec.yml\"\nstrict = true\noutput_format = \"json\"\n")
            .unwrap();

        let config = AuditConfig::from_file(&path).unwrap();
        assert_eq!(config.api_path, dir.path().join("api.json"));
        assert_eq!(config.spec_path, PathBuf::from("/abs/spec.yml"));
        assert_eq!(config.report_path, dir.path().join(DEFAULT_REPORT_FILE));
        assert!(config.strict);
        assert_eq!(config.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_from_file_rejects_bad_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.toml");
        std::fs::write(&path, "strict = \"maybe\"").unwrap();
        assert!(matches!(AuditConfig::from_file(&path).unwrap_err(), AuditError::Toml(_)));
        assert!(matches!(AuditConfig::from_file(dir.path().join("missing.toml")).unwrap_err(), AuditError::Io { .. }));
    }
}
