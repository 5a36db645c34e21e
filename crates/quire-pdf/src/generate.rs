//! Render-then-convert helpers used by the generate paths.

use quire_template::{Payload, QuotationInput, QuotationRenderer, Renderer, TemplateDefinition};

use crate::error::PdfError;
use crate::sink::{PdfOptions, PdfSink};

/// A generated PDF and the filename to deliver it under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// Render a document template for print and convert it.
///
/// # Errors
///
/// Returns [`PdfError::Template`] if rendering fails (nothing is sent to the
/// sink), or the sink's error.
pub fn generate_pdf(
    template: &TemplateDefinition,
    payload: &Payload,
    sink: &dyn PdfSink,
    options: &PdfOptions,
) -> Result<GeneratedPdf, PdfError> {
    let document = Renderer::new(template).print(payload)?;
    let bytes = sink.convert(&document.html, options)?;
    Ok(GeneratedPdf {
        bytes,
        filename: document.filename,
    })
}

/// Render a quotation document and convert it.
///
/// # Errors
///
/// Same as [`generate_pdf`].
pub fn generate_quotation_pdf(
    renderer: &QuotationRenderer<'_>,
    input: &QuotationInput,
    sink: &dyn PdfSink,
    options: &PdfOptions,
) -> Result<GeneratedPdf, PdfError> {
    let html = renderer.document(input)?;
    let bytes = sink.convert(&html, options)?;
    Ok(GeneratedPdf {
        bytes,
        filename: renderer.filename(),
    })
}
