//! Template rendering pipeline.
//!
//! Rendering runs as a fixed sequence of passes over a private copy of the
//! payload:
//!
//! ```text
//! required variables -> embedded fragments -> variable fragments
//!     -> main substitution -> strip leftovers -> [preview shell]
//! ```
//!
//! Only the first pass can fail on user data. Every later pass is total:
//! values of an unexpected shape degrade to empty strings or their plain
//! string form.

use std::collections::BTreeSet;

use crate::definition::{TemplateDefinition, key_depth, keys_by_depth};
use crate::error::TemplateError;
use crate::expander::FragmentExpander;
use crate::page::{with_print_css, wrap_preview};
use crate::resolver::{
    format_value, placeholder, render_filename, strip_unresolved_placeholders, substitute,
};
use crate::value::{Payload, Value};

/// Output flavour of a render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Standalone HTML page with the A4 preview shell.
    #[default]
    Preview,
    /// Substituted body only. [`Renderer::print`] adds the print stylesheet.
    Print,
}

/// A document ready for PDF conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrintDocument {
    /// Final HTML including print CSS.
    pub html: String,
    /// Output filename, always ending in `.pdf`.
    pub filename: String,
}

/// Renders one [`TemplateDefinition`] against payloads.
///
/// Holds no mutable state, so a single renderer can serve any number of
/// payloads.
///
/// # Example
///
/// ```
/// use quire_template::{RenderMode, Renderer, TemplateDefinition, payload_from_json};
///
/// let template = TemplateDefinition::new("Note", "note", "<p>{{name}}</p>", "note");
/// let payload = payload_from_json(serde_json::json!({"name": "Acme"}));
///
/// let html = Renderer::new(&template).render(&payload, RenderMode::Print).unwrap();
/// assert!(html.ends_with("<p>Acme</p>"));
/// ```
pub struct Renderer<'a> {
    template: &'a TemplateDefinition,
}

impl<'a> Renderer<'a> {
    /// Create a renderer for a template.
    #[must_use]
    pub fn new(template: &'a TemplateDefinition) -> Self {
        Self { template }
    }

    /// Render the template body.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingVariable`] if a required variable is
    /// absent or null, and [`TemplateError::Cycle`] if fragment expansion
    /// re-enters itself.
    pub fn render(&self, payload: &Payload, mode: RenderMode) -> Result<String, TemplateError> {
        self.check_required(payload)?;

        let mut data = payload.clone();
        let embedded = self.expand_embedded(&mut data)?;
        self.expand_variables(&mut data, &embedded);

        let body = substitute(&self.template.main_html, &data);
        let body = strip_unresolved_placeholders(&body);

        tracing::debug!(
            template_type = %self.template.template_type,
            ?mode,
            embedded = embedded.len(),
            "rendered template"
        );

        Ok(match mode {
            RenderMode::Preview => wrap_preview(&body),
            RenderMode::Print => body,
        })
    }

    /// Render a preview page.
    ///
    /// # Errors
    ///
    /// Same as [`render`](Self::render).
    pub fn preview(&self, payload: &Payload) -> Result<String, TemplateError> {
        self.render(payload, RenderMode::Preview)
    }

    /// Render a print document together with its output filename.
    ///
    /// # Errors
    ///
    /// Same as [`render`](Self::render).
    pub fn print(&self, payload: &Payload) -> Result<PrintDocument, TemplateError> {
        let body = self.render(payload, RenderMode::Print)?;
        Ok(PrintDocument {
            html: with_print_css(&body),
            filename: render_filename(&self.template.default_file_name, payload),
        })
    }

    fn check_required(&self, payload: &Payload) -> Result<(), TemplateError> {
        for name in &self.template.required_variables {
            if payload.get(name).is_none_or(Value::is_null) {
                return Err(TemplateError::MissingVariable { name: name.clone() });
            }
        }
        Ok(())
    }

    /// Expand top-level embedded fragments into the payload.
    ///
    /// Returns the keys that now hold rendered HTML.
    fn expand_embedded(&self, data: &mut Payload) -> Result<BTreeSet<String>, TemplateError> {
        let fragments = &self.template.embedded_fragments;
        let mut embedded = BTreeSet::new();
        let mut expander = FragmentExpander::new(fragments);

        for key in keys_by_depth(fragments) {
            // Nested keys are reached through their parents
            if key_depth(key) > 0 {
                continue;
            }
            let html = expander.expand(key, &fragments[key], data)?;
            tracing::debug!(key, bytes = html.len(), "expanded embedded fragment");
            data.insert(key.to_owned(), Value::String(html));
            embedded.insert(key.to_owned());
        }

        Ok(embedded)
    }

    /// Apply variable fragments, handling embedded keys first.
    fn expand_variables(&self, data: &mut Payload, embedded: &BTreeSet<String>) {
        let (first, rest): (Vec<_>, Vec<_>) = self
            .template
            .variable_fragments
            .iter()
            .partition(|(key, _)| embedded.contains(key.as_str()));

        for (key, snippet) in first.into_iter().chain(rest) {
            let Some(value) = data.get(key).filter(|v| !v.is_null()) else {
                continue;
            };
            let token = placeholder(key);
            // Already-final content is left alone to avoid double wrapping
            if !snippet.contains(&token) {
                continue;
            }
            let rendered = snippet.replace(&token, &format_value(value));
            let rendered = substitute(&rendered, data);
            data.insert(key.clone(), Value::String(rendered));
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::value::payload_from_json;

    fn render(template: &TemplateDefinition, data: serde_json::Value) -> String {
        Renderer::new(template)
            .render(&payload_from_json(data), RenderMode::Print)
            .unwrap()
    }

    #[test]
    fn test_scenario_a_simple_substitution() {
        let template = TemplateDefinition::new("Note", "note", "<p>{{name}}</p>", "note");
        assert_eq!(render(&template, json!({"name": "Acme"})), "<p>Acme</p>");
    }

    #[test]
    fn test_scenario_b_embedded_list_in_main() {
        let template = TemplateDefinition::new("List", "list", "<ul>{{items}}</ul>", "list")
            .with_embedded_fragment("items", "<li>{{items.label}}</li>");
        let html = render(
            &template,
            json!({"items": [{"label": "A"}, {"label": "B"}]}),
        );
        assert_eq!(html, "<ul><li>A</li><li>B</li></ul>");
    }

    #[test]
    fn test_scenario_c_nested_fragments() {
        let template = TemplateDefinition::new("List", "list", "<ul>{{items}}</ul>", "list")
            .with_embedded_fragment("items", "<li>{{items.name}}<ol>{{items.tags}}</ol></li>")
            .with_embedded_fragment("items.tags", "<li>{{items.tags.label}}</li>");
        let html = render(
            &template,
            json!({"items": [{"name": "n", "tags": [{"label": "x"}, {"label": "y"}]}]}),
        );
        assert_eq!(html, "<ul><li>n<ol><li>x</li><li>y</li></ol></li></ul>");
    }

    #[test]
    fn test_scenario_d_missing_required_variable() {
        let template = TemplateDefinition::new("Invoice", "invoice", "<p>{{number}}</p>", "inv")
            .with_required_variable("number")
            .with_required_variable("customer");
        let result = Renderer::new(&template)
            .preview(&payload_from_json(json!({"number": "1", "customer": null})));

        assert_eq!(
            result,
            Err(TemplateError::MissingVariable {
                name: "customer".to_owned()
            })
        );
    }

    #[test]
    fn test_unresolved_placeholders_stripped() {
        let template =
            TemplateDefinition::new("Note", "note", "<p>{{name}}{{missing}}{{a.b}}</p>", "note");
        assert_eq!(render(&template, json!({"name": "x"})), "<p>x</p>");
    }

    #[test]
    fn test_variable_fragment_wraps_value_and_resolves_chained_refs() {
        let template = TemplateDefinition::new("Invoice", "invoice", "<p>{{total}}</p>", "inv")
            .with_variable_fragment("total", "<b>{{currency}} {{total}}</b>");
        let html = render(&template, json!({"total": 12.5, "currency": "MYR"}));
        assert_eq!(html, "<p><b>MYR 12.50</b></p>");
    }

    #[test]
    fn test_variable_fragment_skipped_when_value_missing() {
        let template = TemplateDefinition::new("Invoice", "invoice", "<p>{{total}}</p>", "inv")
            .with_variable_fragment("total", "<b>{{total}}</b>");
        assert_eq!(render(&template, json!({})), "<p></p>");
    }

    #[test]
    fn test_variable_fragment_over_embedded_output() {
        let template = TemplateDefinition::new("List", "list", "{{items}}", "list")
            .with_embedded_fragment("items", "<li>{{items.label}}</li>")
            .with_variable_fragment("items", "<ul class=\"items\">{{items}}</ul>");
        let html = render(&template, json!({"items": [{"label": "A"}]}));
        assert_eq!(html, "<ul class=\"items\"><li>A</li></ul>");
    }

    #[test]
    fn test_variable_fragment_without_own_placeholder_keeps_value() {
        // Not saveable, but rendering must not replace the value with the snippet
        let template = TemplateDefinition::new("Note", "note", "<p>{{note}}</p>", "note")
            .with_variable_fragment("note", "<i>fixed</i>");
        assert_eq!(render(&template, json!({"note": "hello"})), "<p>hello</p>");
    }

    #[test]
    fn test_embedded_keys_wrapped_before_other_variable_fragments() {
        // "count" sorts before "items" but must see the wrapped list
        let template = TemplateDefinition::new("List", "list", "{{count}}", "list")
            .with_embedded_fragment("items", "<li>{{items.label}}</li>")
            .with_variable_fragment("items", "<ul>{{items}}</ul>")
            .with_variable_fragment("count", "<p>{{count}}: {{items}}</p>");
        let html = render(&template, json!({"count": "1", "items": [{"label": "A"}]}));
        assert_eq!(html, "<p>1: <ul><li>A</li></ul></p>");
    }

    #[test]
    fn test_empty_embedded_list_removes_section() {
        let template = TemplateDefinition::new("List", "list", "<ul>{{items}}</ul>", "list")
            .with_embedded_fragment("items", "<li>{{items.label}}</li>");
        assert_eq!(render(&template, json!({"items": []})), "<ul></ul>");
    }

    #[test]
    fn test_preview_wraps_in_page_shell() {
        let template = TemplateDefinition::new("Note", "note", "<p>{{name}}</p>", "note");
        let html = Renderer::new(&template)
            .preview(&payload_from_json(json!({"name": "Acme"})))
            .unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<div class=\"a4-page\">\n<p>Acme</p>"));
    }

    #[test]
    fn test_print_document_filename_and_css() {
        let template = TemplateDefinition::new("Invoice", "invoice", "<p>{{number}}</p>", "INV-{{number}}");
        let doc = Renderer::new(&template)
            .print(&payload_from_json(json!({"number": "042"})))
            .unwrap();
        assert_eq!(doc.filename, "INV-042.pdf");
        assert!(doc.html.contains("@page"));
        assert!(doc.html.ends_with("<p>042</p>"));
    }

    #[test]
    fn test_render_does_not_mutate_input() {
        let template = TemplateDefinition::new("List", "list", "{{items}}", "list")
            .with_embedded_fragment("items", "<li>{{items.label}}</li>");
        let payload = payload_from_json(json!({"items": [{"label": "A"}]}));
        let before = payload.clone();
        Renderer::new(&template)
            .render(&payload, RenderMode::Print)
            .unwrap();
        assert_eq!(payload, before);
    }
}
