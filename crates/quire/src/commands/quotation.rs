//! `quire quotation` subcommand group.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use quire_config::Config;
use quire_pdf::generate_quotation_pdf;
use quire_template::{QuotationInput, QuotationRenderer, QuotationTemplate};

use super::{GlobalArgs, pdf_options, pdf_sink, read_json, write_html, write_pdf};
use crate::error::CliError;
use crate::output::Output;

/// Quotation commands.
#[derive(Subcommand)]
pub(crate) enum QuotationCommand {
    /// Render a quotation to preview HTML.
    Preview(QuotationPreviewArgs),
    /// Render a quotation to PDF.
    Generate(QuotationGenerateArgs),
}

impl QuotationCommand {
    /// Execute the quotation subcommand.
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        match self {
            Self::Preview(args) => args.execute(global),
            Self::Generate(args) => args.execute(global),
        }
    }
}

/// Files every quotation command reads.
#[derive(Args)]
pub(crate) struct QuotationSource {
    /// Quotation template (JSON).
    #[arg(long)]
    template: PathBuf,

    /// Quotation input with variables, areas and term conditions (JSON).
    #[arg(short, long)]
    input: PathBuf,

    /// Company the quotation is rendered for.
    #[arg(long)]
    company: Option<String>,
}

impl QuotationSource {
    fn read(&self) -> Result<(QuotationTemplate, QuotationInput), CliError> {
        let template: QuotationTemplate = read_json(&self.template)?;
        let template = template.prepare(self.company.as_deref())?;
        Ok((template, read_json(&self.input)?))
    }
}

fn renderer<'a>(template: &'a QuotationTemplate, config: &Config) -> QuotationRenderer<'a> {
    QuotationRenderer::new(template).with_price_decimals(config.render.price_decimals)
}

/// Arguments for the quotation preview command.
#[derive(Args)]
pub(crate) struct QuotationPreviewArgs {
    #[command(flatten)]
    source: QuotationSource,

    /// Write the HTML here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl QuotationPreviewArgs {
    fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let config = global.load_config(None)?;
        let (template, input) = self.source.read()?;

        let html = renderer(&template, &config).preview(&input)?;

        write_html(self.output.as_deref(), &html)?;
        if let Some(path) = &self.output {
            Output::new().success(&format!("Preview written to {}", path.display()));
        }
        Ok(())
    }
}

/// Arguments for the quotation generate command.
#[derive(Args)]
pub(crate) struct QuotationGenerateArgs {
    #[command(flatten)]
    source: QuotationSource,

    /// Directory for the generated PDF (default: current directory).
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Chrome/Chromium executable (overrides config and `CHROME_BIN`).
    #[arg(long, env = "QUIRE_CHROME")]
    chrome: Option<PathBuf>,
}

impl QuotationGenerateArgs {
    fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = global.load_config(self.chrome.clone())?;
        let (template, input) = self.source.read()?;
        let sink = pdf_sink(&config)?;

        if !template.is_enabled {
            output.warning(&format!("Template \"{}\" is disabled", template.name));
        }

        let pdf = generate_quotation_pdf(
            &renderer(&template, &config),
            &input,
            &sink,
            &pdf_options(&config),
        )?;
        let path = write_pdf(&self.output_dir, &pdf.filename, &pdf.bytes)?;

        output.pdf_written(&path, pdf.bytes.len());
        Ok(())
    }
}
