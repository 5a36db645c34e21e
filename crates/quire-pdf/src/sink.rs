//! PDF sink trait and options.

use std::time::Duration;

use crate::consts::{A4_HEIGHT_IN, A4_WIDTH_IN, DEFAULT_TIMEOUT};
use crate::error::PdfError;

/// Paper and runtime settings for one conversion.
#[derive(Clone, Debug, PartialEq)]
pub struct PdfOptions {
    /// Paper width in inches.
    pub paper_width_in: f64,
    /// Paper height in inches.
    pub paper_height_in: f64,
    /// Hard limit for the conversion.
    pub timeout: Duration,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            paper_width_in: A4_WIDTH_IN,
            paper_height_in: A4_HEIGHT_IN,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PdfOptions {
    /// Set the paper size in inches.
    #[must_use]
    pub fn with_paper(mut self, width_in: f64, height_in: f64) -> Self {
        self.paper_width_in = width_in;
        self.paper_height_in = height_in;
        self
    }

    /// Set the conversion timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `@page` rule enforcing the paper size.
    #[must_use]
    pub fn page_css(&self) -> String {
        format!(
            "<style>@page {{ size: {}in {}in; margin: 0; }}</style>",
            self.paper_width_in, self.paper_height_in
        )
    }
}

/// Converts finished HTML into PDF bytes.
///
/// Implementations must not leave processes or files behind, whether the
/// conversion succeeds, fails or times out.
pub trait PdfSink: Send + Sync {
    /// Convert a complete HTML document.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the backend fails or exceeds `options.timeout`.
    fn convert(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, PdfError>;
}
