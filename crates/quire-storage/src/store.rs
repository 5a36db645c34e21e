//! Store trait and error types.
//!
//! A [`TemplateStore`] is a dumb record container: it loads and saves
//! [`TemplateDefinition`]s by id and knows nothing about validation,
//! uniqueness or soft deletion. Those rules live in the template service so
//! every backend enforces them identically.

use std::path::PathBuf;

use quire_template::TemplateDefinition;
use uuid::Uuid;

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorKind {
    /// Record does not exist.
    NotFound,
    /// Permission denied by the backend.
    PermissionDenied,
    /// Stored data could not be decoded.
    InvalidData,
    /// Backend is temporarily unavailable.
    Unavailable,
    /// Other/unknown error category.
    Other,
}

/// Store error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StoreError {
    /// Semantic error category.
    pub kind: StoreErrorKind,
    /// Record id context (if applicable).
    pub id: Option<Uuid>,
    /// File path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Memory").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    /// Create a new store error.
    #[must_use]
    pub fn new(kind: StoreErrorKind) -> Self {
        Self {
            kind,
            id: None,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach record id context.
    #[must_use]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error for a record id.
    #[must_use]
    pub fn not_found(id: Uuid) -> Self {
        Self::new(StoreErrorKind::NotFound).with_id(id)
    }

    /// Create a store error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StoreErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StoreErrorKind::PermissionDenied,
            std::io::ErrorKind::InvalidData => StoreErrorKind::InvalidData,
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
                StoreErrorKind::Unavailable
            }
            _ => StoreErrorKind::Other,
        };
        Self::new(kind).with_path(path).with_source(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: source (id: ...) (path: ...)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StoreErrorKind::NotFound => "Not found",
            StoreErrorKind::PermissionDenied => "Permission denied",
            StoreErrorKind::InvalidData => "Invalid data",
            StoreErrorKind::Unavailable => "Unavailable",
            StoreErrorKind::Other => "Error",
        };
        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        if let Some(id) = &self.id {
            write!(f, " (id: {id})")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Record access for template definitions.
///
/// Implementations return every record they hold, soft-deleted ones
/// included; filtering is the caller's job.
pub trait TemplateStore: Send + Sync {
    /// Load all records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    fn list(&self) -> Result<Vec<TemplateDefinition>, StoreError>;

    /// Load one record by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreErrorKind::NotFound`] if no record has this id.
    fn get(&self, id: Uuid) -> Result<TemplateDefinition, StoreError>;

    /// Insert or replace a record, keyed by its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the record cannot be written.
    fn put(&self, template: &TemplateDefinition) -> Result<(), StoreError>;
}
