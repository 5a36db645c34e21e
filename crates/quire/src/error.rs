//! CLI error types.

use quire_config::ConfigError;
use quire_pdf::PdfError;
use quire_storage::ServiceError;
use quire_template::TemplateError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Template(#[from] TemplateError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("{0}")]
    Pdf(#[from] PdfError),

    #[error("invalid output filename: {0}")]
    InvalidFilename(String),
}
