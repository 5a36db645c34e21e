//! Template persistence for Quire.
//!
//! Rendering never touches storage directly. This crate sits between the
//! engine and the records it renders:
//!
//! - [`TemplateStore`]: raw record access, implemented by [`FsTemplateStore`]
//!   and [`MemoryTemplateStore`] (behind the `mock` feature flag)
//! - [`TemplateService`]: save-time validation, uniqueness, soft delete,
//!   paginated listing and the tenant-then-default lookup
//! - [`CachedTemplates`]: read-through cache over the lookup
//!
//! # Example
//!
//! ```ignore
//! use quire_storage::{FsTemplateStore, TemplateService};
//!
//! let service = TemplateService::new(FsTemplateStore::new("templates".into()));
//! let template = service.find_by_type("invoice", Some("acme"))?;
//! ```

mod cached;
mod fs;
#[cfg(any(test, feature = "mock"))]
mod memory;
mod service;
mod store;

pub use cached::CachedTemplates;
pub use fs::FsTemplateStore;
#[cfg(any(test, feature = "mock"))]
pub use memory::MemoryTemplateStore;
pub use service::{Page, PageRequest, ServiceError, TemplateService};
pub use store::{StoreError, StoreErrorKind, TemplateStore};
