//! Hierarchical HTML template engine.
//!
//! Templates are HTML documents with `{{name}}` placeholders plus two maps of
//! named fragments:
//!
//! - **variable fragments** wrap a single payload value in extra markup;
//! - **embedded fragments** are bound to dotted payload paths and repeat once
//!   per array element, nesting through child keys such as `items.tags`.
//!
//! # Pipeline
//!
//! [`validate_definition`] checks a template's structure when it is saved.
//! [`Renderer`] turns a saved template plus a payload into HTML:
//!
//! 1. required variables are checked;
//! 2. top-level embedded fragments are expanded by [`FragmentExpander`];
//! 3. variable fragments are applied;
//! 4. the main HTML is substituted and leftover placeholders are stripped;
//! 5. previews are wrapped in an A4 page, print output gains print CSS.
//!
//! Quotations use a simpler, non-recursive strategy, see [`QuotationRenderer`].
//!
//! # Example
//!
//! ```
//! use quire_template::{Renderer, TemplateDefinition, payload_from_json, validate_definition};
//!
//! let template = TemplateDefinition::new("List", "list", "<ul>{{items}}</ul>", "list")
//!     .with_embedded_fragment("items", "<li>{{items.label}}</li>");
//! validate_definition(&template).unwrap();
//!
//! let payload = payload_from_json(serde_json::json!({
//!     "items": [{"label": "A"}, {"label": "B"}]
//! }));
//! let doc = Renderer::new(&template).print(&payload).unwrap();
//!
//! assert!(doc.html.ends_with("<ul><li>A</li><li>B</li></ul>"));
//! assert_eq!(doc.filename, "list.pdf");
//! ```

mod definition;
mod error;
mod expander;
mod page;
mod quotation;
mod renderer;
mod resolver;
mod validation;
mod value;

pub use definition::{
    FragmentMap, QuotationTemplate, TemplateDefinition, key_depth, keys_by_depth, last_segment,
    parent_key,
};
pub use error::{ErrorKind, TemplateError};
pub use expander::FragmentExpander;
pub use page::{A4_HEIGHT_PX, A4_WIDTH_PX, PAGE_PADDING_PX, with_print_css, wrap_preview};
pub use quotation::{
    AREA_SECTION, Area, AreaItem, DEFAULT_PRICE_DECIMALS, QuotationInput, QuotationRenderer,
    TERM_CONDITION_SECTION, area_section, term_condition_section,
};
pub use renderer::{PrintDocument, RenderMode, Renderer};
pub use resolver::{
    ensure_pdf_suffix, extract_placeholders, format_price, format_value, is_price_like,
    placeholder, render_filename, strip_unresolved_placeholders, substitute,
};
pub use validation::{validate_definition, validate_embedded_fragments, validate_variable_fragments};
pub use value::{Map, Payload, Value, payload_from_json};
