//! Directory-backed template store.
//!
//! Each record is one pretty-printed JSON file named `<id>.json`. Files with
//! other names (hand-written templates dropped into the directory) are read
//! too; once such a record is saved, its canonical `<id>.json` copy shadows
//! the hand-written file. Listing skips files that do not decode as a
//! template, so one stray file cannot hide the rest.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use quire_template::TemplateDefinition;
use uuid::Uuid;

use crate::store::{StoreError, StoreErrorKind, TemplateStore};

const BACKEND: &str = "Fs";

/// Template store over a directory of JSON files.
pub struct FsTemplateStore {
    root: PathBuf,
}

impl FsTemplateStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    fn read_record(path: &Path) -> Result<TemplateDefinition, StoreError> {
        let content =
            fs::read_to_string(path).map_err(|e| StoreError::io(e, path).with_backend(BACKEND))?;
        serde_json::from_str(&content).map_err(|e| {
            StoreError::new(StoreErrorKind::InvalidData)
                .with_path(path)
                .with_backend(BACKEND)
                .with_source(e)
        })
    }

    /// JSON files in the root, sorted for deterministic loading.
    fn record_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        let entries = fs::read_dir(&self.root)
            .map_err(|e| StoreError::io(e, &self.root).with_backend(BACKEND))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        Ok(paths)
    }
}

impl TemplateStore for FsTemplateStore {
    fn list(&self) -> Result<Vec<TemplateDefinition>, StoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut records: HashMap<Uuid, (bool, TemplateDefinition)> = HashMap::new();
        for path in self.record_files()? {
            let template = match Self::read_record(&path) {
                Ok(template) => template,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable template file");
                    continue;
                }
            };
            let canonical = path == self.record_path(template.id);
            let existing = records.get(&template.id).map(|(was_canonical, _)| *was_canonical);
            match existing {
                Some(true) => {}
                Some(false) if !canonical => {
                    tracing::warn!(
                        id = %template.id,
                        path = %path.display(),
                        "duplicate template id, keeping first file"
                    );
                }
                _ => {
                    records.insert(template.id, (canonical, template));
                }
            }
        }

        let mut templates: Vec<TemplateDefinition> =
            records.into_values().map(|(_, template)| template).collect();
        templates.sort_by_key(|template| template.id);
        Ok(templates)
    }

    fn get(&self, id: Uuid) -> Result<TemplateDefinition, StoreError> {
        let path = self.record_path(id);
        if path.exists() {
            return Self::read_record(&path);
        }
        self.list()?
            .into_iter()
            .find(|template| template.id == id)
            .ok_or_else(|| StoreError::not_found(id).with_backend(BACKEND))
    }

    fn put(&self, template: &TemplateDefinition) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)
            .map_err(|e| StoreError::io(e, &self.root).with_backend(BACKEND))?;

        let path = self.record_path(template.id);
        let json = serde_json::to_string_pretty(template).map_err(|e| {
            StoreError::new(StoreErrorKind::InvalidData)
                .with_id(template.id)
                .with_backend(BACKEND)
                .with_source(e)
        })?;

        // Write then rename so readers never see a partial record
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| StoreError::io(e, &tmp).with_backend(BACKEND))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::io(e, &path).with_backend(BACKEND))?;

        tracing::debug!(id = %template.id, path = %path.display(), "wrote template record");
        Ok(())
    }
}
