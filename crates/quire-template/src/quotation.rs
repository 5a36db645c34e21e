//! Quotation documents.
//!
//! Quotations do not use fragment expansion. Their main HTML carries two
//! system sections, `[[areaSection]]` and `[[termConditionSection]]`, that
//! are built from structured input, and plain `{{variable}}` placeholders.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::definition::QuotationTemplate;
use crate::error::TemplateError;
use crate::resolver::{ensure_pdf_suffix, format_price, is_price_like, placeholder};
use crate::value::Map;

/// System section replaced with the rendered areas.
pub const AREA_SECTION: &str = "[[areaSection]]";

/// System section replaced with the terms and conditions list.
pub const TERM_CONDITION_SECTION: &str = "[[termConditionSection]]";

/// Placeholder in the area snippet replaced with the item rows.
const AREA_ITEM_ROWS: &str = "{{areaItemRowFunc}}";

/// Decimals used for price-like variables unless configured otherwise.
pub const DEFAULT_PRICE_DECIMALS: usize = 2;

/// Runtime data for one quotation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationInput {
    /// Values for the template's `{{variable}}` placeholders.
    #[serde(default)]
    pub variables: Map,
    /// Quotation areas, rendered in order.
    #[serde(default)]
    pub areas: Vec<Area>,
    /// Terms and conditions, one list entry each.
    #[serde(default)]
    pub term_conditions: Vec<String>,
}

/// A titled group of line items.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Area {
    pub area_name_title: String,
    pub area_name: String,
    pub area_detail: String,
    pub area_items: Vec<AreaItem>,
    pub area_sub_total_title: String,
    pub area_sub_total: String,
}

/// One line item. All fields are preformatted strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AreaItem {
    pub item_no: String,
    pub item_name: String,
    pub item_description: String,
    pub item_quantity: String,
    pub item_unit: String,
    pub item_unit_price: String,
    pub item_total_price: String,
}

/// Renders a [`QuotationTemplate`] against [`QuotationInput`].
pub struct QuotationRenderer<'a> {
    template: &'a QuotationTemplate,
    price_decimals: usize,
}

impl<'a> QuotationRenderer<'a> {
    /// Create a renderer using the default price precision.
    #[must_use]
    pub fn new(template: &'a QuotationTemplate) -> Self {
        Self {
            template,
            price_decimals: DEFAULT_PRICE_DECIMALS,
        }
    }

    /// Override the number of decimals for price-like variables.
    #[must_use]
    pub fn with_price_decimals(mut self, decimals: usize) -> Self {
        self.price_decimals = decimals;
        self
    }

    /// Render the quotation body with the stylesheet prepended.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingVariable`] when a declared variable is
    /// absent from the input.
    pub fn preview(&self, input: &QuotationInput) -> Result<String, TemplateError> {
        let body = self.render_body(input)?;
        if self.template.css_content.is_empty() {
            return Ok(body);
        }
        Ok(format!("<style>{}</style>{body}", self.template.css_content))
    }

    /// Render a full HTML document for PDF conversion.
    ///
    /// The body is wrapped in a document shell only when the template has a
    /// stylesheet.
    ///
    /// # Errors
    ///
    /// Same as [`preview`](Self::preview).
    pub fn document(&self, input: &QuotationInput) -> Result<String, TemplateError> {
        let body = self.render_body(input)?;
        if self.template.css_content.is_empty() {
            return Ok(body);
        }
        Ok(format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<style>{}</style>\n</head>\n<body>{body}</body>\n</html>",
            self.template.css_content
        ))
    }

    /// Output filename for generated PDFs.
    #[must_use]
    pub fn filename(&self) -> String {
        ensure_pdf_suffix(&self.template.default_file_name)
    }

    fn render_body(&self, input: &QuotationInput) -> Result<String, TemplateError> {
        // Presence only; null is an acceptable value here
        if let Some(name) = self
            .template
            .variable_list
            .iter()
            .find(|name| !input.variables.contains_key(name.as_str()))
        {
            return Err(TemplateError::MissingVariable { name: name.clone() });
        }

        let mut html = self
            .template
            .main_html
            .replace(AREA_SECTION, &area_section(&input.areas, &self.template.area_html))
            .replace(
                TERM_CONDITION_SECTION,
                &term_condition_section(&input.term_conditions),
            );

        for (name, value) in &input.variables {
            let rendered = if is_price_like(name) {
                format_price(value, self.price_decimals)
            } else {
                value.to_string()
            };
            html = html.replace(&placeholder(name), &rendered);
        }

        tracing::debug!(
            template = %self.template.name,
            areas = input.areas.len(),
            terms = input.term_conditions.len(),
            "rendered quotation"
        );
        Ok(html)
    }
}

/// Render every area through the area snippet, concatenated.
#[must_use]
pub fn area_section(areas: &[Area], area_html: &str) -> String {
    let mut html = String::new();
    for area in areas {
        let section = area_html
            .replace("{{areaNameTitle}}", &area.area_name_title)
            .replace("{{areaName}}", &area.area_name)
            .replace("{{areaDetail}}", &area.area_detail)
            .replace("{{areaSubTotalTitle}}", &area.area_sub_total_title)
            .replace("{{areaSubTotal}}", &area.area_sub_total);
        html.push_str(&section.replace(AREA_ITEM_ROWS, &item_rows(&area.area_items)));
    }
    html
}

fn item_rows(items: &[AreaItem]) -> String {
    let mut rows = String::new();
    for item in items {
        let _ = write!(
            rows,
            "<tr><td class=\"item-number\">{}</td>\
             <td class=\"description\">{}<br />{}</td>\
             <td class=\"qty\">{}</td>\
             <td class=\"unit\">{}</td>\
             <td class=\"unit-price amount\">{}</td>\
             <td class=\"total-price amount\">{}</td></tr>",
            item.item_no,
            item.item_name,
            item.item_description,
            item.item_quantity,
            item.item_unit,
            item.item_unit_price,
            item.item_total_price,
        );
    }
    rows
}

/// Render terms and conditions as an ordered list, empty when there are none.
#[must_use]
pub fn term_condition_section(conditions: &[String]) -> String {
    if conditions.is_empty() {
        return String::new();
    }
    let mut html = String::from("<ol class=\"term-conditions\">");
    for condition in conditions {
        let _ = write!(html, "<li class=\"term-condition-item\">{condition}</li>");
    }
    html.push_str("</ol>");
    html
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::value::Value;

    fn template() -> QuotationTemplate {
        QuotationTemplate::new(
            "Standard",
            "<h1>{{customerName}}</h1>[[areaSection]]<p>{{grandTotal}}</p>[[termConditionSection]]",
            "<h2>{{areaNameTitle}}: {{areaName}}</h2><table>{{areaItemRowFunc}}</table>\
             <p>{{areaSubTotalTitle}} {{areaSubTotal}}</p>",
            "quotation",
        )
    }

    fn input() -> QuotationInput {
        serde_json::from_value(json!({
            "variables": {"customerName": "Acme", "grandTotal": "1200"},
            "areas": [{
                "areaNameTitle": "Area",
                "areaName": "Kitchen",
                "areaItems": [{
                    "itemNo": "1",
                    "itemName": "Cabinet",
                    "itemDescription": "Oak",
                    "itemQuantity": "2",
                    "itemUnit": "pcs",
                    "itemUnitPrice": "600.00",
                    "itemTotalPrice": "1200.00"
                }],
                "areaSubTotalTitle": "Subtotal",
                "areaSubTotal": "1200.00"
            }],
            "termConditions": ["50% deposit", "Valid 30 days"]
        }))
        .unwrap()
    }

    #[test]
    fn test_preview_builds_sections_and_formats_prices() {
        let template = template();
        let html = QuotationRenderer::new(&template).preview(&input()).unwrap();

        assert_eq!(
            html,
            "<h1>Acme</h1>\
             <h2>Area: Kitchen</h2><table>\
             <tr><td class=\"item-number\">1</td>\
             <td class=\"description\">Cabinet<br />Oak</td>\
             <td class=\"qty\">2</td><td class=\"unit\">pcs</td>\
             <td class=\"unit-price amount\">600.00</td>\
             <td class=\"total-price amount\">1200.00</td></tr>\
             </table><p>Subtotal 1200.00</p>\
             <p>1200.00</p>\
             <ol class=\"term-conditions\">\
             <li class=\"term-condition-item\">50% deposit</li>\
             <li class=\"term-condition-item\">Valid 30 days</li></ol>"
        );
    }

    #[test]
    fn test_missing_declared_variable_rejected() {
        let template = template();
        let mut input = input();
        input.variables.remove("grandTotal");

        assert_eq!(
            QuotationRenderer::new(&template).preview(&input),
            Err(TemplateError::MissingVariable {
                name: "grandTotal".to_owned()
            })
        );
    }

    #[test]
    fn test_null_declared_variable_accepted() {
        let template = template();
        let mut input = input();
        input.variables.insert("customerName".to_owned(), Value::Null);

        let html = QuotationRenderer::new(&template).preview(&input).unwrap();
        assert!(html.starts_with("<h1></h1>"));
    }

    #[test]
    fn test_price_decimals_configurable() {
        let template = QuotationTemplate::new("T", "{{totalAmount}}|{{qty}}", "", "q");
        let mut input = QuotationInput::default();
        input.variables.insert("totalAmount".to_owned(), Value::Number(5.0));
        input.variables.insert("qty".to_owned(), Value::Number(3.0));

        let html = QuotationRenderer::new(&template)
            .with_price_decimals(3)
            .preview(&input)
            .unwrap();
        assert_eq!(html, "5.000|3");
    }

    #[test]
    fn test_css_handling() {
        let template = QuotationTemplate::new("T", "<p>x</p>", "", "q").with_css("p{color:red}");
        let renderer = QuotationRenderer::new(&template);
        let input = QuotationInput::default();

        assert_eq!(
            renderer.preview(&input).unwrap(),
            "<style>p{color:red}</style><p>x</p>"
        );
        assert_eq!(
            renderer.document(&input).unwrap(),
            "<!DOCTYPE html>\n<html>\n<head>\n<style>p{color:red}</style>\n</head>\n\
             <body><p>x</p></body>\n</html>"
        );
    }

    #[test]
    fn test_document_without_css_is_bare_body() {
        let template = QuotationTemplate::new("T", "<p>x</p>", "", "q");
        let html = QuotationRenderer::new(&template)
            .document(&QuotationInput::default())
            .unwrap();
        assert_eq!(html, "<p>x</p>");
    }

    #[test]
    fn test_empty_sections() {
        assert_eq!(term_condition_section(&[]), "");
        assert_eq!(area_section(&[], "<div>{{areaName}}</div>"), "");
    }

    #[test]
    fn test_area_without_items() {
        let area = Area {
            area_name: "Hall".to_owned(),
            ..Area::default()
        };
        assert_eq!(
            area_section(&[area], "<h2>{{areaName}}</h2><table>{{areaItemRowFunc}}</table>"),
            "<h2>Hall</h2><table></table>"
        );
    }

    #[test]
    fn test_filename_forced_to_pdf() {
        let template = QuotationTemplate::new("T", "", "", "quote-{{number}}");
        assert_eq!(
            QuotationRenderer::new(&template).filename(),
            "quote-{{number}}.pdf"
        );
        let template = QuotationTemplate::new("T", "", "", "quote.pdf");
        assert_eq!(QuotationRenderer::new(&template).filename(), "quote.pdf");
    }
}
