//! Placeholder extraction, substitution and value formatting.
//!
//! Placeholders use the `{{name}}` syntax, where `name` may be a dotted path
//! such as `items.label`. Substitution is purely textual: a placeholder is
//! replaced only when the payload carries the exact same key.

use std::sync::LazyLock;

use regex::Regex;

use crate::value::{Payload, Value};

/// Any `{{...}}` token, capturing the inner text.
static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").unwrap());

/// A well-formed identifier placeholder left over after substitution.
static UNRESOLVED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[a-zA-Z0-9_.]+\}\}").unwrap());

/// Keywords that mark a variable name as a monetary amount.
const PRICE_KEYWORDS: [&str; 9] = [
    "price", "total", "subtotal", "amount", "cost", "discount", "tax", "sst", "grand",
];

/// Precision used before trimming trailing zeros in [`format_value`].
const MAX_DECIMALS: usize = 10;

/// Minimum number of decimals kept by [`format_value`].
const MIN_DECIMALS: usize = 2;

/// Build the literal placeholder token for a name.
#[must_use]
pub fn placeholder(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

/// Extract placeholder names in first-occurrence order, without duplicates.
///
/// Inner text is trimmed, so `{{ name }}` yields `name`. Empty names are skipped.
///
/// # Example
///
/// ```
/// use quire_template::extract_placeholders;
///
/// let names = extract_placeholders("{{b}} {{a}} {{b}}");
/// assert_eq!(names, vec!["b", "a"]);
/// ```
#[must_use]
pub fn extract_placeholders(html: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER_PATTERN.captures_iter(html) {
        let name = caps[1].trim();
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_owned());
        }
    }
    names
}

/// Format a payload value for insertion into HTML.
///
/// Numbers keep up to ten decimals with trailing zeros trimmed, but never
/// fewer than two: `1` becomes `1.00`, `1.23456` stays `1.23456`. Strings pass
/// through untouched and every other value uses its plain string form.
#[must_use]
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => format_number(*n),
        other => other.to_string(),
    }
}

fn format_number(n: f64) -> String {
    let full = format!("{n:.MAX_DECIMALS$}");
    let Some((int_part, decimals)) = full.split_once('.') else {
        // NaN and infinities have no decimal point
        return full;
    };
    let significant = decimals.trim_end_matches('0').len().max(MIN_DECIMALS);
    format!("{int_part}.{}", &decimals[..significant])
}

/// Whether a variable name denotes a monetary amount.
///
/// Case-insensitive containment check, so `grandTotal` and `unit_price` match.
#[must_use]
pub fn is_price_like(name: &str) -> bool {
    let lower = name.to_lowercase();
    PRICE_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Format a value as a fixed-decimal amount.
///
/// Numeric strings are parsed first. Blank strings format as empty, and
/// values that are not numeric keep their plain string form.
#[must_use]
pub fn format_price(value: &Value, decimals: usize) -> String {
    let amount = match value {
        Value::Number(n) => *n,
        Value::String(s) if s.trim().is_empty() => return String::new(),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(n) => n,
            Err(_) => return s.clone(),
        },
        other => return other.to_string(),
    };
    format!("{amount:.decimals$}")
}

/// Replace `{{key}}` with the formatted value for every key in the payload.
#[must_use]
pub fn substitute(html: &str, payload: &Payload) -> String {
    let mut out = html.to_owned();
    for (key, value) in payload {
        let token = placeholder(key);
        if out.contains(&token) {
            out = out.replace(&token, &format_value(value));
        }
    }
    out
}

/// Remove every placeholder that is still present.
///
/// Only identifier-shaped placeholders (`[A-Za-z0-9_.]`) are removed, so
/// stray braces in scripts or styles survive.
#[must_use]
pub fn strip_unresolved_placeholders(html: &str) -> String {
    UNRESOLVED_PATTERN.replace_all(html, "").into_owned()
}

/// Render a default filename pattern into a `.pdf` filename.
///
/// Placeholders are looked up by their last path segment against the
/// top-level payload; missing values render as empty. Path separators in
/// payload values become `-`, so a value cannot move the file elsewhere.
#[must_use]
pub fn render_filename(pattern: &str, payload: &Payload) -> String {
    static FILENAME_VAR: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\{\{([a-zA-Z0-9_.]+)\}\}").unwrap());

    let name = FILENAME_VAR.replace_all(pattern, |caps: &regex::Captures<'_>| {
        let path = &caps[1];
        let field = path.rsplit('.').next().unwrap_or(path);
        payload
            .get(field)
            .map(|value| format_value(value).replace(['/', '\\'], "-"))
            .unwrap_or_default()
    });
    ensure_pdf_suffix(&name)
}

/// Append `.pdf` unless the name already ends with it.
#[must_use]
pub fn ensure_pdf_suffix(name: &str) -> String {
    if name.ends_with(".pdf") {
        name.to_owned()
    } else {
        format!("{name}.pdf")
    }
}
