//! `quire validate` command implementation.

use std::path::PathBuf;

use clap::Args;
use quire_template::{TemplateDefinition, validate_definition};

use super::read_json;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the validate command.
#[derive(Args)]
pub(crate) struct ValidateArgs {
    /// Path to the template definition (JSON).
    template: PathBuf,
}

impl ValidateArgs {
    /// Execute the validate command.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the template is invalid.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let template: TemplateDefinition = read_json(&self.template)?;

        validate_definition(&template)?;

        output.success(&format!(
            "Template \"{}\" ({}) is valid",
            template.name, template.template_type
        ));
        output.info(&format!(
            "Variable fragments: {}, embedded fragments: {}",
            template.variable_fragments.len(),
            template.embedded_fragments.len()
        ));
        Ok(())
    }
}
