use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use sdk_doc_audit::cli::{Cli, Commands};
use sdk_doc_audit::{AuditOrchestrator, AuditOutcome, OutputFormat, init_logging};
use std::process::ExitCode;

/// Exit code for runs aborted by an unreadable or invalid input.
const EXIT_FATAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn run(cli: Cli) -> Result<u8> {
    match cli.command {
        Commands::Audit(args) => {
            let config = args.into_config().context("failed to load configuration")?;
            let (strict, format) = (config.strict, config.output_format);
            let outcome = AuditOrchestrator::new(config).run().await?;
            print_outcome(&outcome, format)?;
            Ok(if outcome.exit_code(strict) == 0 { 0 } else { 1 })
        }
        Commands::Sections(args) => {
            let orchestrator = AuditOrchestrator::new(args.into_config());
            let (_, written) = orchestrator.run_sections().await?;
            let path = orchestrator.config().resolved_sections_path();
            if written {
                println!("{} {}", "Updated".green(), path.display());
            } else {
                println!("{} is up to date", path.display());
            }
            Ok(0)
        }
    }
}

fn print_outcome(outcome: &AuditOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", outcome.report.to_json()?),
        OutputFormat::Console => {
            print!("{}", outcome.report.format_console());
            if !outcome.stubs_added.is_empty() {
                println!("\n{} {} stub entries", "Added".green(), outcome.stubs_added.len());
                for id in &outcome.stubs_added {
                    println!("  {id}");
                }
            }
            if !outcome.sync.is_empty() {
                println!(
                    "{} {} descriptions removed, {} examples added",
                    "Synced:".green(),
                    outcome.sync.descriptions_removed,
                    outcome.sync.examples_added
                );
            }
            if outcome.spec_written {
                println!("{}", "Spec updated".green());
            }
        }
    }
    Ok(())
}
