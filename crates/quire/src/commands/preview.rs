//! `quire preview` command implementation.

use std::path::PathBuf;

use clap::Args;
use quire_template::{Renderer, payload_from_json};

use super::{GlobalArgs, open_templates, read_json, write_html};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the preview command.
#[derive(Args)]
pub(crate) struct PreviewArgs {
    /// Document type to look up.
    #[arg(short = 't', long = "type")]
    template_type: String,

    /// Company whose template should be preferred.
    #[arg(long)]
    company: Option<String>,

    /// Render payload (JSON object).
    #[arg(short, long)]
    data: PathBuf,

    /// Write the HTML here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl PreviewArgs {
    /// Execute the preview command.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is missing or rendering fails.
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = global.load_config(None)?;
        let templates = open_templates(&config);

        let template = templates.find_by_type(&self.template_type, self.company.as_deref())?;
        let payload = payload_from_json(read_json(&self.data)?);
        let html = Renderer::new(&template).preview(&payload)?;

        write_html(self.output.as_deref(), &html)?;
        if let Some(path) = &self.output {
            output.success(&format!(
                "Preview of \"{}\" written to {}",
                template.name,
                path.display()
            ));
        }
        Ok(())
    }
}
