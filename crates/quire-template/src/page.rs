//! Page shells for rendered documents.
//!
//! Previews are wrapped in a fixed-size A4 sheet so the browser shows the
//! document the way it will print. Print output keeps the template's own
//! markup and only gains a small print stylesheet.

use std::fmt::Write;

/// A4 width at 96 DPI.
pub const A4_WIDTH_PX: u32 = 794;

/// A4 height at 96 DPI.
pub const A4_HEIGHT_PX: u32 = 1123;

/// Inner padding of the preview sheet.
pub const PAGE_PADDING_PX: u32 = 48;

/// Wrap rendered body HTML in a standalone A4 preview document.
#[must_use]
pub fn wrap_preview(body: &str) -> String {
    let mut html = String::with_capacity(body.len() + 2048);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str("<title>Document Preview</title>\n");
    push_preview_css(&mut html);
    html.push_str("</head>\n<body>\n");

    html.push_str("<div class=\"a4-preview-container\">\n");
    html.push_str("<div class=\"a4-page\">\n");
    html.push_str(body);
    html.push_str("\n</div>\n</div>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Stylesheet for the preview shell, including print overrides.
fn push_preview_css(html: &mut String) {
    html.push_str("<style>\n");
    html.push_str("* { box-sizing: border-box; }\n");
    html.push_str(
        "body { margin: 0; padding: 20px; background: #f5f5f5; \
         font-family: Arial, sans-serif; }\n",
    );
    html.push_str(".a4-preview-container { max-width: 890px; margin: 0 auto; }\n");
    let _ = write!(
        html,
        ".a4-page {{ width: {A4_WIDTH_PX}px; min-height: {A4_HEIGHT_PX}px; \
         padding: {PAGE_PADDING_PX}px; margin: 0 auto 20px; background: white; \
         box-shadow: 0 0 10px rgba(0,0,0,0.1); position: relative; }}\n"
    );
    html.push_str(".a4-page:last-child { margin-bottom: 0; }\n");
    html.push_str("@media print {\n");
    html.push_str("  body { background: white; padding: 0; }\n");
    html.push_str("  .a4-preview-container { max-width: none; }\n");
    html.push_str(
        "  .a4-page { box-shadow: none; margin: 0; padding: 0; \
         page-break-after: always; }\n",
    );
    html.push_str("  .a4-page:last-child { page-break-after: auto; }\n");
    html.push_str("}\n");
    html.push_str("</style>\n");
}

/// Print stylesheet injected into documents sent to the PDF sink.
const PRINT_CSS: &str = "<style>\n\
@page { size: A4; margin: 0; }\n\
html, body { -webkit-print-color-adjust: exact; print-color-adjust: exact; }\n\
</style>\n";

/// Inject the print stylesheet into a rendered document.
///
/// Goes right before `</head>` when the template has a head, otherwise the
/// stylesheet is prepended.
#[must_use]
pub fn with_print_css(html: &str) -> String {
    match html.find("</head>") {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + PRINT_CSS.len());
            out.push_str(&html[..pos]);
            out.push_str(PRINT_CSS);
            out.push_str(&html[pos..]);
            out
        }
        None => format!("{PRINT_CSS}{html}"),
    }
}
