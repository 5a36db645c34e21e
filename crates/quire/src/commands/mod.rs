//! CLI command implementations.

mod generate;
mod preview;
mod quotation;
mod template;
mod validate;

use std::path::{Path, PathBuf};

use clap::Args;
use quire_cache::{Cache, MemoryCache, NullCache};
use quire_config::{CliSettings, Config};
use quire_pdf::{ChromePdfSink, PdfOptions};
use quire_storage::{CachedTemplates, FsTemplateStore, TemplateService};
use serde::de::DeserializeOwned;

pub(crate) use generate::GenerateArgs;
pub(crate) use preview::PreviewArgs;
pub(crate) use quotation::QuotationCommand;
pub(crate) use template::TemplateCommand;
pub(crate) use validate::ValidateArgs;

use crate::error::CliError;

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct GlobalArgs {
    /// Path to configuration file (default: auto-discover quire.toml).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Template store directory (overrides config).
    #[arg(long, global = true)]
    pub templates_dir: Option<PathBuf>,
}

impl GlobalArgs {
    /// Load configuration with the global overrides plus `chrome_path`.
    fn load_config(&self, chrome_path: Option<PathBuf>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            templates_dir: self.templates_dir.clone(),
            chrome_path,
            ..CliSettings::default()
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Open the configured template store behind the lookup cache.
fn open_templates(config: &Config) -> CachedTemplates<FsTemplateStore> {
    let store = FsTemplateStore::new(config.storage_resolved.templates_dir.clone());
    let cache: Box<dyn Cache> = if config.cache.enabled {
        Box::new(MemoryCache::new())
    } else {
        Box::new(NullCache)
    };
    CachedTemplates::new(TemplateService::new(store), cache.as_ref())
}

fn pdf_options(config: &Config) -> PdfOptions {
    PdfOptions::default()
        .with_paper(
            config.pdf_resolved.paper_width_in,
            config.pdf_resolved.paper_height_in,
        )
        .with_timeout(config.pdf_resolved.timeout)
}

fn pdf_sink(config: &Config) -> Result<ChromePdfSink, CliError> {
    Ok(ChromePdfSink::discover(
        config.pdf_resolved.chrome_path.as_deref(),
    )?)
}

/// Read and parse a JSON file.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| CliError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Write rendered HTML to `output`, or stdout when not given.
fn write_html(output: Option<&Path>, html: &str) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(path, html)?,
        None => crate::output::Output::document(html)?,
    }
    Ok(())
}

/// Write PDF bytes as `filename` under `dir`, creating it if needed.
///
/// Only the final component of `filename` is used, so the file always lands
/// directly in `dir`.
fn write_pdf(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, CliError> {
    let name = Path::new(filename)
        .file_name()
        .ok_or_else(|| CliError::InvalidFilename(filename.to_owned()))?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    std::fs::write(&path, bytes)?;
    Ok(path)
}
