//! Persisted template records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TemplateError;
use crate::resolver::extract_placeholders;

/// Fragment name to HTML snippet.
pub type FragmentMap = BTreeMap<String, String>;

/// Number of `.` separators in a fragment key.
#[must_use]
pub fn key_depth(key: &str) -> usize {
    key.matches('.').count()
}

/// Key with its last segment removed, or `None` for top-level keys.
#[must_use]
pub fn parent_key(key: &str) -> Option<&str> {
    key.rsplit_once('.').map(|(parent, _)| parent)
}

/// Last segment of a dotted key.
#[must_use]
pub fn last_segment(key: &str) -> &str {
    key.rsplit_once('.').map_or(key, |(_, last)| last)
}

/// Fragment keys ordered shallow first, alphabetically within a depth.
#[must_use]
pub fn keys_by_depth(fragments: &FragmentMap) -> Vec<&str> {
    let mut keys: Vec<&str> = fragments.keys().map(String::as_str).collect();
    keys.sort_by(|a, b| key_depth(a).cmp(&key_depth(b)).then_with(|| a.cmp(b)));
    keys
}

/// A document template with nested fragments.
///
/// `company` scopes a template to one tenant; templates without a company
/// are shared, and the one flagged `is_default` is the fallback for its type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDefinition {
    /// Record id.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Display name, unique per scope.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Document type (e.g. "quotation", "invoice"), unique per scope.
    #[serde(rename = "type")]
    pub template_type: String,
    /// Main document body.
    pub main_html: String,
    /// Single-value wrappers, keyed by payload variable.
    #[serde(default)]
    pub variable_fragments: FragmentMap,
    /// Repeated or nested sections, keyed by dotted payload path.
    #[serde(default)]
    pub embedded_fragments: FragmentMap,
    /// Filename pattern for generated PDFs; may contain placeholders.
    pub default_file_name: String,
    /// Variables every render payload must carry.
    #[serde(default)]
    pub required_variables: Vec<String>,
    /// Owning tenant, `None` for shared templates.
    #[serde(default)]
    pub company: Option<String>,
    /// Fallback template for its type when no tenant template exists.
    #[serde(default)]
    pub is_default: bool,
    /// Whether the template may be used for rendering.
    #[serde(default = "enabled_by_default")]
    pub is_enabled: bool,
    /// Soft-delete marker.
    #[serde(default)]
    pub is_deleted: bool,
    /// Creation timestamp.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn enabled_by_default() -> bool {
    true
}

impl TemplateDefinition {
    /// Create a shared, enabled template with empty fragment maps.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        template_type: impl Into<String>,
        main_html: impl Into<String>,
        default_file_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            template_type: template_type.into(),
            main_html: main_html.into(),
            variable_fragments: FragmentMap::new(),
            embedded_fragments: FragmentMap::new(),
            default_file_name: default_file_name.into(),
            required_variables: Vec::new(),
            company: None,
            is_default: false,
            is_enabled: true,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a variable fragment.
    #[must_use]
    pub fn with_variable_fragment(mut self, key: impl Into<String>, html: impl Into<String>) -> Self {
        self.variable_fragments.insert(key.into(), html.into());
        self
    }

    /// Add an embedded fragment.
    #[must_use]
    pub fn with_embedded_fragment(mut self, key: impl Into<String>, html: impl Into<String>) -> Self {
        self.embedded_fragments.insert(key.into(), html.into());
        self
    }

    /// Declare a variable the render payload must carry.
    #[must_use]
    pub fn with_required_variable(mut self, name: impl Into<String>) -> Self {
        self.required_variables.push(name.into());
        self
    }

    /// Scope the template to a tenant.
    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Mark the template as the shared fallback for its type.
    #[must_use]
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// A quotation template rendered with fixed system sections.
///
/// Templates without a company are shared; a company template serves only
/// that company. Records are loaded through [`QuotationTemplate::prepare`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationTemplate {
    /// Record id.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Main document body with `[[areaSection]]` and `[[termConditionSection]]`.
    pub main_html: String,
    /// Stylesheet injected into previews and generated documents.
    #[serde(default)]
    pub css_content: String,
    /// Snippet rendered once per quotation area.
    #[serde(default)]
    pub area_html: String,
    /// Variables declared by `main_html`. Re-derived whenever the template
    /// is prepared, so a stored list is never trusted.
    #[serde(default)]
    pub variable_list: Vec<String>,
    /// Filename for generated PDFs.
    pub default_file_name: String,
    /// Owning tenant.
    #[serde(default)]
    pub company: Option<String>,
    /// Whether the template may be used.
    #[serde(default = "enabled_by_default")]
    pub is_enabled: bool,
    /// Soft-delete marker.
    #[serde(default)]
    pub is_deleted: bool,
}

impl QuotationTemplate {
    /// Create a quotation template, extracting its variable list from `main_html`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        main_html: impl Into<String>,
        area_html: impl Into<String>,
        default_file_name: impl Into<String>,
    ) -> Self {
        let main_html = main_html.into();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            variable_list: extract_placeholders(&main_html),
            main_html,
            css_content: String::new(),
            area_html: area_html.into(),
            default_file_name: default_file_name.into(),
            company: None,
            is_enabled: true,
            is_deleted: false,
        }
    }

    /// Set the stylesheet.
    #[must_use]
    pub fn with_css(mut self, css: impl Into<String>) -> Self {
        self.css_content = css.into();
        self
    }

    /// Scope the template to a tenant.
    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Re-derive `variable_list` from the current `main_html`.
    pub fn refresh_variables(&mut self) {
        self.variable_list = extract_placeholders(&self.main_html);
    }

    /// Make a loaded record ready to render on behalf of `company`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::DeletedTemplate`] for soft-deleted records and
    /// [`TemplateError::ForeignTemplate`] when the record belongs to a
    /// different company than the one asking.
    pub fn prepare(mut self, company: Option<&str>) -> Result<Self, TemplateError> {
        if self.is_deleted {
            return Err(TemplateError::DeletedTemplate { name: self.name });
        }
        if let Some(owner) = &self.company
            && company != Some(owner.as_str())
        {
            return Err(TemplateError::ForeignTemplate {
                name: self.name,
                owner: owner.clone(),
            });
        }
        self.refresh_variables();
        Ok(self)
    }
}
