//! In-memory template store for testing.
//!
//! Provides [`MemoryTemplateStore`] for unit tests and embedding without
//! filesystem access.

use std::collections::HashMap;
use std::sync::RwLock;

use quire_template::TemplateDefinition;
use uuid::Uuid;

use crate::store::{StoreError, StoreErrorKind, TemplateStore};

const BACKEND: &str = "Memory";

/// Template store backed by a map.
///
/// ```ignore
/// use quire_storage::{MemoryTemplateStore, TemplateService};
/// use quire_template::TemplateDefinition;
///
/// let store = MemoryTemplateStore::new()
///     .with_template(TemplateDefinition::new("Invoice", "invoice", "<p></p>", "inv").as_default());
/// let service = TemplateService::new(store);
/// ```
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    records: RwLock<HashMap<Uuid, TemplateDefinition>>,
}

impl MemoryTemplateStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a record.
    #[must_use]
    pub fn with_template(self, template: TemplateDefinition) -> Self {
        if let Ok(mut records) = self.records.write() {
            records.insert(template.id, template);
        }
        self
    }
}

fn poisoned() -> StoreError {
    StoreError::new(StoreErrorKind::Unavailable).with_backend(BACKEND)
}

impl TemplateStore for MemoryTemplateStore {
    fn list(&self) -> Result<Vec<TemplateDefinition>, StoreError> {
        let records = self.records.read().map_err(|_| poisoned())?;
        let mut templates: Vec<_> = records.values().cloned().collect();
        templates.sort_by_key(|template| template.id);
        Ok(templates)
    }

    fn get(&self, id: Uuid) -> Result<TemplateDefinition, StoreError> {
        let records = self.records.read().map_err(|_| poisoned())?;
        records
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id).with_backend(BACKEND))
    }

    fn put(&self, template: &TemplateDefinition) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records.insert(template.id, template.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_record_is_listed() {
        let template = TemplateDefinition::new("Invoice", "invoice", "<p></p>", "inv");
        let id = template.id;
        let store = MemoryTemplateStore::new().with_template(template);

        assert_eq!(store.list().unwrap().len(), 1);
        assert_eq!(store.get(id).unwrap().name, "Invoice");
    }

    #[test]
    fn test_get_missing() {
        let err = MemoryTemplateStore::new().get(Uuid::nil()).unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::NotFound);
        assert_eq!(err.to_string(), format!("[Memory] Not found (id: {})", Uuid::nil()));
    }
}
