//! Save-time structural validation of templates.
//!
//! All checks are pure and fail fast on the first violation, so a template is
//! either accepted as a whole or rejected before anything is persisted.

use crate::definition::{FragmentMap, TemplateDefinition, keys_by_depth, parent_key};
use crate::error::TemplateError;
use crate::resolver::{extract_placeholders, placeholder};

/// Check that every variable fragment references its own key.
///
/// # Errors
///
/// Returns [`TemplateError::VariableFragmentMissingSelf`] naming the first
/// fragment whose HTML lacks `{{key}}`.
pub fn validate_variable_fragments(fragments: &FragmentMap) -> Result<(), TemplateError> {
    for (key, html) in fragments {
        if !extract_placeholders(html).iter().any(|name| name == key) {
            return Err(TemplateError::VariableFragmentMissingSelf { key: key.clone() });
        }
    }
    Ok(())
}

/// Check namespace and nesting rules of embedded fragments.
///
/// Keys are visited shallow first. For each fragment:
/// - every placeholder must be the key itself or live under `key.`;
/// - a nested key needs its parent fragment, and the parent must contain
///   the nested placeholder.
///
/// # Errors
///
/// Returns the first [`TemplateError::ForeignPlaceholder`],
/// [`TemplateError::MissingParent`] or
/// [`TemplateError::MissingNestedPlaceholder`] encountered.
pub fn validate_embedded_fragments(fragments: &FragmentMap) -> Result<(), TemplateError> {
    for key in keys_by_depth(fragments) {
        let html = &fragments[key];
        let prefix = format!("{key}.");

        if let Some(foreign) = extract_placeholders(html)
            .into_iter()
            .find(|name| name != key && !name.starts_with(&prefix))
        {
            return Err(TemplateError::ForeignPlaceholder {
                key: key.to_owned(),
                placeholder: foreign,
            });
        }

        let Some(parent) = parent_key(key) else {
            continue;
        };
        let Some(parent_html) = fragments.get(parent) else {
            return Err(TemplateError::MissingParent {
                key: key.to_owned(),
                parent: parent.to_owned(),
            });
        };
        if !parent_html.contains(&placeholder(key)) {
            return Err(TemplateError::MissingNestedPlaceholder {
                key: key.to_owned(),
                parent: parent.to_owned(),
            });
        }
    }
    Ok(())
}

/// Validate a whole template definition before it is saved.
///
/// Checks required fields first, then both fragment maps.
///
/// # Errors
///
/// Returns [`TemplateError::MissingField`] for blank required fields, or
/// the first fragment violation.
pub fn validate_definition(definition: &TemplateDefinition) -> Result<(), TemplateError> {
    let required = [
        ("name", &definition.name),
        ("mainHtml", &definition.main_html),
        ("type", &definition.template_type),
        ("defaultFileName", &definition.default_file_name),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(TemplateError::MissingField { field });
        }
    }

    validate_variable_fragments(&definition.variable_fragments)?;
    validate_embedded_fragments(&definition.embedded_fragments)?;
    Ok(())
}
