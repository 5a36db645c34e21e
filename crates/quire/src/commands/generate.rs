//! `quire generate` command implementation.

use std::path::PathBuf;

use clap::Args;
use quire_pdf::generate_pdf;
use quire_template::payload_from_json;

use super::{GlobalArgs, open_templates, pdf_options, pdf_sink, read_json, write_pdf};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the generate command.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Document type to look up.
    #[arg(short = 't', long = "type")]
    template_type: String,

    /// Company whose template should be preferred.
    #[arg(long)]
    company: Option<String>,

    /// Render payload (JSON object).
    #[arg(short, long)]
    data: PathBuf,

    /// Directory for the generated PDF (default: current directory).
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Chrome/Chromium executable (overrides config and `CHROME_BIN`).
    #[arg(long, env = "QUIRE_CHROME")]
    chrome: Option<PathBuf>,
}

impl GenerateArgs {
    /// Execute the generate command.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is missing, rendering fails or the
    /// PDF conversion fails.
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = global.load_config(self.chrome.clone())?;
        let templates = open_templates(&config);

        let template = templates.find_by_type(&self.template_type, self.company.as_deref())?;
        let payload = payload_from_json(read_json(&self.data)?);
        let sink = pdf_sink(&config)?;

        output.info(&format!(
            "Rendering \"{}\" with {}...",
            template.name,
            sink.chrome().display()
        ));
        let pdf = generate_pdf(&template, &payload, &sink, &pdf_options(&config))?;
        let path = write_pdf(&self.output_dir, &pdf.filename, &pdf.bytes)?;

        output.pdf_written(&path, pdf.bytes.len());
        Ok(())
    }
}
