//! Template lifecycle rules on top of a [`TemplateStore`].
//!
//! Saves are all-or-nothing: a template is validated, checked for name and
//! type clashes within its company, and only then written. Deletes are soft;
//! deleted records stay in the store but are invisible to every read here.

use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use quire_template::{ErrorKind, TemplateDefinition, TemplateError, validate_definition};
use uuid::Uuid;

use crate::store::{StoreError, StoreErrorKind, TemplateStore};

/// Error returned by [`TemplateService`].
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Template failed structural validation.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Another live template in the same company has this name.
    #[error("template name '{name}' already exists")]
    NameTaken {
        /// Conflicting name.
        name: String,
    },

    /// A company template was flagged as the shared default.
    #[error("template for company '{company}' cannot be the default; defaults are shared")]
    CompanyDefault {
        /// Owning company.
        company: String,
    },

    /// Another live template in the same company has this type.
    #[error("template type '{template_type}' already exists for this company")]
    TypeTaken {
        /// Conflicting type.
        template_type: String,
    },

    /// No live template has this id.
    #[error("document template not found: {id}")]
    NotFound {
        /// Requested id.
        id: Uuid,
    },

    /// Neither a company template nor a default exists for the type.
    #[error("document template not found for type: {template_type}")]
    TypeNotFound {
        /// Requested type.
        template_type: String,
    },

    /// Backend failure. Details are logged, not shown.
    #[error("template storage failed")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Template(err) => err.kind(),
            Self::NameTaken { .. } | Self::TypeTaken { .. } | Self::CompanyDefault { .. } => {
                ErrorKind::Validation
            }
            Self::NotFound { .. } | Self::TypeNotFound { .. } => ErrorKind::NotFound,
            Self::Store(_) => ErrorKind::Internal,
        }
    }
}

/// Pagination parameters, clamped to sane values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: usize,
    /// Page size, at most [`PageRequest::MAX_LIMIT`].
    pub limit: usize,
}

impl PageRequest {
    /// Page size used when none (or an out-of-range one) is given.
    pub const DEFAULT_LIMIT: usize = 10;
    /// Largest accepted page size.
    pub const MAX_LIMIT: usize = 100;

    /// Build a request. Page 0 becomes page 1; a limit outside
    /// `1..=MAX_LIMIT` becomes [`PageRequest::DEFAULT_LIMIT`].
    #[must_use]
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: if (1..=Self::MAX_LIMIT).contains(&limit) {
                limit
            } else {
                Self::DEFAULT_LIMIT
            },
        }
    }

    fn offset(self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT)
    }
}

/// One page of results plus the total match count.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

/// CRUD and lookup for document templates.
pub struct TemplateService<S> {
    store: S,
    // Serializes check-then-write sequences
    write_lock: Mutex<()>,
}

impl<S: TemplateStore> TemplateService<S> {
    /// Create a service over a store.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate and save a new template under a fresh id.
    ///
    /// # Errors
    ///
    /// Returns a validation error, [`ServiceError::CompanyDefault`] for a
    /// company template flagged as default, [`ServiceError::NameTaken`] /
    /// [`ServiceError::TypeTaken`] on clashes, or [`ServiceError::Store`].
    pub fn create(&self, mut template: TemplateDefinition) -> Result<TemplateDefinition, ServiceError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        Self::check(&template)?;
        template.id = Uuid::new_v4();
        self.check_unique(&template)?;

        let now = Utc::now();
        template.created_at = now;
        template.updated_at = now;
        template.is_deleted = false;

        self.write(&template)?;
        tracing::info!(
            id = %template.id,
            name = %template.name,
            template_type = %template.template_type,
            "created template"
        );
        Ok(template)
    }

    /// Validate and replace the live template `id`.
    ///
    /// Creation time is preserved; everything else comes from `template`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if `id` is missing or deleted, plus
    /// everything [`create`](Self::create) returns.
    pub fn update(
        &self,
        id: Uuid,
        mut template: TemplateDefinition,
    ) -> Result<TemplateDefinition, ServiceError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let existing = self.get(id)?;
        Self::check(&template)?;
        template.id = id;
        self.check_unique(&template)?;

        template.created_at = existing.created_at;
        template.updated_at = Utc::now();
        template.is_deleted = false;

        self.write(&template)?;
        tracing::info!(%id, name = %template.name, "updated template");
        Ok(template)
    }

    /// Soft-delete the live template `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if `id` is missing or already deleted.
    pub fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut template = self.get(id)?;
        template.is_deleted = true;
        template.updated_at = Utc::now();

        self.write(&template)?;
        tracing::info!(%id, "deleted template");
        Ok(())
    }

    /// Load the live template `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if `id` is missing or deleted.
    pub fn get(&self, id: Uuid) -> Result<TemplateDefinition, ServiceError> {
        match self.store.get(id) {
            Ok(template) if !template.is_deleted => Ok(template),
            Ok(_) => Err(ServiceError::NotFound { id }),
            Err(err) if err.kind == StoreErrorKind::NotFound => Err(ServiceError::NotFound { id }),
            Err(err) => Err(Self::internal(err)),
        }
    }

    /// List live templates, newest first.
    ///
    /// `company` restricts the listing to one tenant; `None` lists all.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the store cannot be read.
    pub fn list(
        &self,
        request: PageRequest,
        company: Option<&str>,
    ) -> Result<Page<TemplateDefinition>, ServiceError> {
        let mut templates: Vec<TemplateDefinition> = self
            .live()?
            .filter(|t| company.is_none_or(|c| t.company.as_deref() == Some(c)))
            .collect();
        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = templates.len();
        let items = templates
            .into_iter()
            .skip(request.offset())
            .take(request.limit)
            .collect();

        Ok(Page {
            items,
            total,
            page: request.page,
            limit: request.limit,
        })
    }

    /// Find the template to render for a document type.
    ///
    /// The company's own enabled template wins; otherwise the enabled shared
    /// template flagged as default for the type is used. Another company's
    /// template is never returned.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::TypeNotFound`] if neither exists.
    pub fn find_by_type(
        &self,
        template_type: &str,
        company: Option<&str>,
    ) -> Result<TemplateDefinition, ServiceError> {
        let candidates: Vec<TemplateDefinition> = self
            .live()?
            .filter(|t| t.is_enabled && t.template_type == template_type)
            .collect();

        if let Some(company) = company
            && let Some(template) = candidates
                .iter()
                .find(|t| t.company.as_deref() == Some(company))
        {
            tracing::debug!(template_type, company, id = %template.id, "using company template");
            return Ok(template.clone());
        }

        // Oldest default wins when several are flagged
        candidates
            .into_iter()
            .filter(|t| t.is_default && t.company.is_none())
            .min_by_key(|t| t.created_at)
            .inspect(|t| tracing::debug!(template_type, id = %t.id, "using default template"))
            .ok_or_else(|| ServiceError::TypeNotFound {
                template_type: template_type.to_owned(),
            })
    }

    fn live(&self) -> Result<impl Iterator<Item = TemplateDefinition>, ServiceError> {
        let templates = self.store.list().map_err(Self::internal)?;
        Ok(templates.into_iter().filter(|t| !t.is_deleted))
    }

    /// Structural validation plus the shared-default rule.
    fn check(template: &TemplateDefinition) -> Result<(), ServiceError> {
        validate_definition(template)?;
        if template.is_default
            && let Some(company) = &template.company
        {
            return Err(ServiceError::CompanyDefault {
                company: company.clone(),
            });
        }
        Ok(())
    }

    /// Reject name or type clashes with other live templates of the same company.
    fn check_unique(&self, template: &TemplateDefinition) -> Result<(), ServiceError> {
        let others: Vec<TemplateDefinition> = self
            .live()?
            .filter(|t| t.id != template.id && t.company == template.company)
            .collect();

        if others.iter().any(|t| t.name == template.name) {
            return Err(ServiceError::NameTaken {
                name: template.name.clone(),
            });
        }
        if others.iter().any(|t| t.template_type == template.template_type) {
            return Err(ServiceError::TypeTaken {
                template_type: template.template_type.clone(),
            });
        }
        Ok(())
    }

    fn write(&self, template: &TemplateDefinition) -> Result<(), ServiceError> {
        self.store.put(template).map_err(Self::internal)
    }

    fn internal(err: StoreError) -> ServiceError {
        tracing::error!(error = %err, "template store failure");
        ServiceError::Store(err)
    }
}
