//! Error types for PDF generation.

use std::path::PathBuf;
use std::time::Duration;

use quire_template::TemplateError;

/// Error raised while producing a PDF.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// The document could not be rendered.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// No browser binary could be located.
    #[error("no Chrome/Chromium binary found (set CHROME_BIN or [pdf] chrome_path)")]
    ChromeNotFound,

    /// The configured browser path does not point to a file.
    #[error("browser binary not found: {}", .0.display())]
    InvalidChromePath(PathBuf),

    /// Filesystem or process I/O failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being attempted.
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The browser did not finish in time and was killed.
    #[error("browser timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The browser exited unsuccessfully.
    #[error("browser exited with {status}: {stderr}")]
    ChromeFailed {
        /// Exit status description.
        status: String,
        /// Tail of the browser's stderr.
        stderr: String,
    },

    /// The browser exited cleanly but wrote no PDF.
    #[error("browser produced no PDF output")]
    EmptyOutput,
}

impl PdfError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
