//! Quire CLI - hierarchical document templates.
//!
//! Provides commands for:
//! - `validate`: Check a template definition before saving it
//! - `preview`: Render a stored template to preview HTML
//! - `generate`: Render a stored template to PDF
//! - `quotation preview|generate`: Render quotation documents
//! - `template add|list|delete`: Manage the template store

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{
    GenerateArgs, GlobalArgs, PreviewArgs, QuotationCommand, TemplateCommand, ValidateArgs,
};
use output::Output;

/// Quire - hierarchical document template engine.
#[derive(Parser)]
#[command(name = "quire", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    /// Enable verbose output (info-level logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a template definition file.
    Validate(ValidateArgs),
    /// Render a stored template to preview HTML.
    Preview(PreviewArgs),
    /// Render a stored template to PDF.
    Generate(GenerateArgs),
    /// Quotation document commands.
    #[command(subcommand)]
    Quotation(QuotationCommand),
    /// Template store commands.
    #[command(subcommand)]
    Template(TemplateCommand),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Validate(args) => args.execute(),
        Commands::Preview(args) => args.execute(&cli.global),
        Commands::Generate(args) => args.execute(&cli.global),
        Commands::Quotation(cmd) => cmd.execute(&cli.global),
        Commands::Template(cmd) => cmd.execute(&cli.global),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
