//! Error types for template validation and rendering.

/// Coarse error category surfaced to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-supplied data or template is invalid.
    Validation,
    /// Requested template does not exist.
    NotFound,
    /// Fragment graph contains a cycle.
    Cycle,
    /// Failure in a collaborator (storage, PDF conversion).
    Internal,
}

/// Error raised by the template engine.
///
/// Every variant carries the offending key or name so the caller can point
/// the template author at the broken piece.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// A required template field is blank.
    #[error("{field} is required")]
    MissingField {
        /// Field name (e.g. "name", "mainHtml").
        field: &'static str,
    },

    /// A variable fragment does not reference its own key.
    #[error("variable fragment '{key}' must contain the placeholder {{{{{key}}}}}")]
    VariableFragmentMissingSelf {
        /// Fragment key.
        key: String,
    },

    /// A placeholder in an embedded fragment escapes the fragment's namespace.
    #[error("placeholder '{placeholder}' in embedded fragment '{key}' must start with '{key}.'")]
    ForeignPlaceholder {
        /// Fragment key.
        key: String,
        /// Offending placeholder name.
        placeholder: String,
    },

    /// A nested embedded fragment has no parent fragment.
    #[error("nested fragment '{key}' requires missing parent fragment '{parent}'")]
    MissingParent {
        /// Nested fragment key.
        key: String,
        /// Expected parent key.
        parent: String,
    },

    /// A parent fragment does not reference its nested child.
    #[error("parent fragment '{parent}' must contain the placeholder {{{{{key}}}}}")]
    MissingNestedPlaceholder {
        /// Nested fragment key.
        key: String,
        /// Parent fragment key.
        parent: String,
    },

    /// A variable required for rendering is absent from the payload.
    #[error("variable '{name}' is required")]
    MissingVariable {
        /// Variable name.
        name: String,
    },

    /// A quotation template was soft-deleted.
    #[error("quotation template '{name}' has been deleted")]
    DeletedTemplate {
        /// Template name.
        name: String,
    },

    /// A company-scoped quotation template was requested for another company.
    #[error("quotation template '{name}' belongs to company '{owner}'")]
    ForeignTemplate {
        /// Template name.
        name: String,
        /// Owning company.
        owner: String,
    },

    /// Fragment expansion re-entered a fragment that is still being expanded.
    #[error("embedded fragment cycle: {}", .path.join(" -> "))]
    Cycle {
        /// Fragment keys along the cycle, ending with the repeated key.
        path: Vec<String>,
    },
}

impl TemplateError {
    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Cycle { .. } => ErrorKind::Cycle,
            Self::DeletedTemplate { .. } | Self::ForeignTemplate { .. } => ErrorKind::NotFound,
            _ => ErrorKind::Validation,
        }
    }
}
