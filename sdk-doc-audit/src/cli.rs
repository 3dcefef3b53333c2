//! Command-line interface definition.

use clap::{Args, Parser, Subcommand};
use crate::{AuditConfig, OutputFormat, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sdk-doc-audit", version)]
#[command(about = "Reconcile the client library reference spec against a TypeDoc snapshot", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the spec against the API snapshot and regenerate the navigation
    Audit(AuditArgs),

    /// Regenerate the navigation from the spec only
    Sections(SectionsArgs),
}

#[derive(Args, Debug, Default)]
pub struct AuditArgs {
    /// TypeDoc JSON snapshot
    #[arg(long)]
    pub api: Option<PathBuf>,

    /// Reference spec (YAML)
    #[arg(long)]
    pub spec: Option<PathBuf>,

    /// Navigation sections file
    #[arg(long)]
    pub sections: Option<PathBuf>,

    /// Where to write the JSON report
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Append stubs and sync doc-comments into the spec
    #[arg(long)]
    pub fix: bool,

    /// Fail on warnings too
    #[arg(long)]
    pub strict: bool,

    /// Output format for the report
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// TOML config file; flags override its values
    #[arg(long, env = "SDK_DOC_AUDIT_CONFIG")]
    pub config: Option<PathBuf>,
}

impl AuditArgs {
    /// Merge the flags over the config file, if any.
    pub fn into_config(self) -> Result<AuditConfig> {
        let mut config = match &self.config {
            Some(path) => AuditConfig::from_file(path)?,
            None => AuditConfig::default(),
        };
        if let Some(api) = self.api {
            config = config.with_api_path(api);
        }
        if let Some(spec) = self.spec {
            config = config.with_spec_path(spec);
        }
        if let Some(sections) = self.sections {
            config = config.with_sections_path(sections);
        }
        if let Some(report) = self.report {
            config = config.with_report_path(report);
        }
        if let Some(format) = self.format {
            config = config.with_output_format(format);
        }
        let (fix, strict) = (config.fix || self.fix, config.strict || self.strict);
        Ok(config.with_fix(fix).with_strict(strict))
    }
}

#[derive(Args, Debug)]
pub struct SectionsArgs {
    /// Reference spec (YAML)
    #[arg(long)]
    pub spec: PathBuf,

    /// Navigation sections file
    #[arg(long)]
    pub sections: Option<PathBuf>,
}

impl SectionsArgs {
    pub fn into_config(self) -> AuditConfig {
        let config = AuditConfig::default().with_spec_path(self.spec);
        match self.sections {
            Some(sections) => config.with_sections_path(sections),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_audit_flags() {
        let cli = Cli::parse_from([
            "sdk-doc-audit", "-v", "audit", "--api", "a.json", "--spec", "s.yml", "--fix", "--format", "json",
        ]);
        assert!(cli.verbose);
        let Commands::Audit(args) = cli.command else { panic!("expected audit") };
        let config = args.into_config().unwrap();
        assert_eq!(config.api_path, PathBuf::from("a.json"));
        assert!(config.fix);
        assert!(!config.strict);
        assert_eq!(config.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("audit.toml");
        std::fs::write(&file, "api_path = \"/x/api.json\"\nspec_path = \"/x/spec.yml\"\nstrict = true\n").unwrap();

        let args = AuditArgs { spec: Some("other.yml".into()), config: Some(file), ..Default::default() };
        let config = args.into_config().unwrap();
        assert_eq!(config.api_path, PathBuf::from("/x/api.json"));
        assert_eq!(config.spec_path, PathBuf::from("other.yml"));
        assert!(config.strict);
    }

    #[test]
    fn test_sections_args() {
        let cli = Cli::parse_from(["sdk-doc-audit", "sections", "--spec", "s.yml"]);
        let Commands::Sections(args) = cli.command else { panic!("expected sections") };
        let config = args.into_config();
        assert_eq!(config.spec_path, PathBuf::from("s.yml"));
        assert!(config.sections_path.is_none());
    }
}
