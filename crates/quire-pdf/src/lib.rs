//! PDF output for Quire.
//!
//! Rendering produces HTML; turning it into PDF is delegated to a
//! [`PdfSink`]. The shipped sink, [`ChromePdfSink`], prints through a headless
//! Chrome/Chromium child process with a hard timeout.
//!
//! [`generate_pdf`] and [`generate_quotation_pdf`] tie rendering and
//! conversion together and compute the delivery filename.

mod chrome;
mod consts;
mod error;
mod generate;
mod sink;

pub use chrome::ChromePdfSink;
pub use consts::{A4_HEIGHT_IN, A4_WIDTH_IN, DEFAULT_TIMEOUT};
pub use error::PdfError;
pub use generate::{GeneratedPdf, generate_pdf, generate_quotation_pdf};
pub use sink::{PdfOptions, PdfSink};
