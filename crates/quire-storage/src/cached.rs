//! Read-through cache over template lookups.

use std::sync::atomic::{AtomicU64, Ordering};

use quire_cache::{Cache, CacheBucket, CacheBucketExt};
use quire_template::TemplateDefinition;
use uuid::Uuid;

use crate::service::{ServiceError, TemplateService};
use crate::store::TemplateStore;

const BUCKET: &str = "templates";

/// [`TemplateService`] wrapper that caches `find_by_type` results.
///
/// Entries are keyed by `(type, company)` and stamped with a generation
/// counter as their etag. Every write through this wrapper bumps the
/// generation, so a create, update or delete invalidates all cached lookups
/// at once, including fallbacks that a new company template now overrides.
pub struct CachedTemplates<S> {
    service: TemplateService<S>,
    bucket: Box<dyn CacheBucket>,
    generation: AtomicU64,
}

impl<S: TemplateStore> CachedTemplates<S> {
    /// Wrap a service, storing entries in `cache`.
    #[must_use]
    pub fn new(service: TemplateService<S>, cache: &dyn Cache) -> Self {
        Self {
            service,
            bucket: cache.bucket(BUCKET),
            generation: AtomicU64::new(0),
        }
    }

    /// The wrapped service, for reads that bypass the cache.
    #[must_use]
    pub fn service(&self) -> &TemplateService<S> {
        &self.service
    }

    /// Cached [`TemplateService::find_by_type`].
    ///
    /// # Errors
    ///
    /// Same as [`TemplateService::find_by_type`]. Misses are not cached.
    pub fn find_by_type(
        &self,
        template_type: &str,
        company: Option<&str>,
    ) -> Result<TemplateDefinition, ServiceError> {
        let key = cache_key(template_type, company);
        let etag = self.etag();

        if let Some(template) = self.bucket.get_json::<TemplateDefinition>(&key, &etag) {
            tracing::debug!(%key, "template cache hit");
            return Ok(template);
        }

        let template = self.service.find_by_type(template_type, company)?;
        self.bucket.set_json(&key, &etag, &template);
        Ok(template)
    }

    /// [`TemplateService::create`], invalidating cached lookups.
    ///
    /// # Errors
    ///
    /// Same as [`TemplateService::create`].
    pub fn create(&self, template: TemplateDefinition) -> Result<TemplateDefinition, ServiceError> {
        let created = self.service.create(template)?;
        self.invalidate();
        Ok(created)
    }

    /// [`TemplateService::update`], invalidating cached lookups.
    ///
    /// # Errors
    ///
    /// Same as [`TemplateService::update`].
    pub fn update(
        &self,
        id: Uuid,
        template: TemplateDefinition,
    ) -> Result<TemplateDefinition, ServiceError> {
        let updated = self.service.update(id, template)?;
        self.invalidate();
        Ok(updated)
    }

    /// [`TemplateService::delete`], invalidating cached lookups.
    ///
    /// # Errors
    ///
    /// Same as [`TemplateService::delete`].
    pub fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.service.delete(id)?;
        self.invalidate();
        Ok(())
    }

    fn etag(&self) -> String {
        self.generation.load(Ordering::Acquire).to_string()
    }

    fn invalidate(&self) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(generation, "invalidated template cache");
    }
}

/// `type@company`, with `*` standing for "no company".
fn cache_key(template_type: &str, company: Option<&str>) -> String {
    format!("{template_type}@{}", company.unwrap_or("*"))
}

#[cfg(test)]
mod tests {
    use quire_cache::{MemoryCache, NullCache};

    use super::*;
    use crate::memory::MemoryTemplateStore;

    fn invoice() -> TemplateDefinition {
        TemplateDefinition::new("Invoice", "invoice", "<p>{{number}}</p>", "inv")
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("invoice", Some("acme")), "invoice@acme");
        assert_eq!(cache_key("invoice", None), "invoice@*");
    }

    #[test]
    fn test_hit_served_from_cache() {
        let cache = MemoryCache::new();
        let cached = CachedTemplates::new(TemplateService::new(MemoryTemplateStore::new()), &cache);
        let saved = cached.create(invoice().as_default()).unwrap();

        assert_eq!(cached.find_by_type("invoice", None).unwrap().id, saved.id);

        // Bypass the wrapper: the store changes, the cache does not know
        let mut edited = cached.service().get(saved.id).unwrap();
        edited.main_html = "<p>changed</p>".to_owned();
        cached.service().store().put(&edited).unwrap();

        assert_eq!(
            cached.find_by_type("invoice", None).unwrap().main_html,
            "<p>{{number}}</p>"
        );
    }

    #[test]
    fn test_update_invalidates() {
        let cache = MemoryCache::new();
        let cached = CachedTemplates::new(TemplateService::new(MemoryTemplateStore::new()), &cache);
        let saved = cached.create(invoice().as_default()).unwrap();
        cached.find_by_type("invoice", None).unwrap();

        let mut changed = invoice().as_default();
        changed.main_html = "<h1>{{number}}</h1>".to_owned();
        cached.update(saved.id, changed).unwrap();

        assert_eq!(
            cached.find_by_type("invoice", None).unwrap().main_html,
            "<h1>{{number}}</h1>"
        );
    }

    #[test]
    fn test_new_company_template_overrides_cached_fallback() {
        let cache = MemoryCache::new();
        let cached = CachedTemplates::new(TemplateService::new(MemoryTemplateStore::new()), &cache);
        let default = cached.create(invoice().as_default()).unwrap();
        assert_eq!(cached.find_by_type("invoice", Some("acme")).unwrap().id, default.id);

        let acme = cached.create(invoice().with_company("acme")).unwrap();

        assert_eq!(cached.find_by_type("invoice", Some("acme")).unwrap().id, acme.id);
    }

    #[test]
    fn test_delete_invalidates() {
        let cache = MemoryCache::new();
        let cached = CachedTemplates::new(TemplateService::new(MemoryTemplateStore::new()), &cache);
        let saved = cached.create(invoice().as_default()).unwrap();
        cached.find_by_type("invoice", None).unwrap();

        cached.delete(saved.id).unwrap();

        assert!(matches!(
            cached.find_by_type("invoice", None),
            Err(ServiceError::TypeNotFound { .. })
        ));
    }

    #[test]
    fn test_null_cache_always_reads_through() {
        let cached = CachedTemplates::new(TemplateService::new(MemoryTemplateStore::new()), &NullCache);
        let saved = cached.create(invoice().as_default()).unwrap();

        let mut edited = cached.service().get(saved.id).unwrap();
        edited.name = "Edited".to_owned();
        cached.service().store().put(&edited).unwrap();

        assert_eq!(cached.find_by_type("invoice", None).unwrap().name, "Edited");
    }
}
