//! `quire template` subcommand group.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use quire_storage::PageRequest;
use quire_template::TemplateDefinition;
use uuid::Uuid;

use super::{GlobalArgs, open_templates, read_json};
use crate::error::CliError;
use crate::output::Output;

/// Template store commands.
#[derive(Subcommand)]
pub(crate) enum TemplateCommand {
    /// Validate and save a template definition.
    Add(AddArgs),
    /// List live templates, newest first.
    List(ListArgs),
    /// Soft-delete a template.
    Delete(DeleteArgs),
}

impl TemplateCommand {
    /// Execute the template subcommand.
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        match self {
            Self::Add(args) => args.execute(global),
            Self::List(args) => args.execute(global),
            Self::Delete(args) => args.execute(global),
        }
    }
}

/// Arguments for the template add command.
#[derive(Args)]
pub(crate) struct AddArgs {
    /// Template definition (JSON).
    file: PathBuf,

    /// Scope the template to a company (overrides the file).
    #[arg(long)]
    company: Option<String>,
}

impl AddArgs {
    fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = global.load_config(None)?;
        let templates = open_templates(&config);

        let mut template: TemplateDefinition = read_json(&self.file)?;
        if let Some(company) = self.company {
            template.company = Some(company);
        }

        let saved = templates.create(template)?;

        output.success(&format!(
            "Saved \"{}\" ({}) as {}",
            saved.name, saved.template_type, saved.id
        ));
        Ok(())
    }
}

/// Arguments for the template list command.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// Only list templates of this company.
    #[arg(long)]
    company: Option<String>,

    /// Page number, starting at 1.
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Templates per page (1-100).
    #[arg(long, default_value_t = PageRequest::DEFAULT_LIMIT)]
    limit: usize,
}

impl ListArgs {
    fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = global.load_config(None)?;
        let templates = open_templates(&config);

        let page = templates
            .service()
            .list(PageRequest::new(self.page, self.limit), self.company.as_deref())?;

        output.listing_header(&config.storage_resolved.templates_dir, page.page, page.total);
        for template in &page.items {
            output.template_row(template);
        }
        Ok(())
    }
}

/// Arguments for the template delete command.
#[derive(Args)]
pub(crate) struct DeleteArgs {
    /// Template id.
    id: Uuid,
}

impl DeleteArgs {
    fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let config = global.load_config(None)?;
        open_templates(&config).delete(self.id)?;

        Output::new().success(&format!("Deleted {}", self.id));
        Ok(())
    }
}
