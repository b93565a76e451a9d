//! Model loading, validation, introspection and the process-wide cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use br_project::schema::{Model, SystemDef};
use br_sim::System;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};

/// File searched for under the discovery root.
pub const MODEL_FILE_NAME: &str = "system_light_lle_vacuum_distillation.yaml";

/// System chosen when the model defines several.
pub const PREFERRED_SYSTEM_ID: &str = "HP_sys";

/// Summary of a system for listing.
#[derive(Debug, Clone)]
pub struct SystemSummary {
    pub id: String,
    pub name: String,
    pub feed_count: usize,
    pub unit_count: usize,
    pub product_count: usize,
}

/// Load a model file (YAML or JSON by extension); migrated and validated.
pub fn load_model(path: &Path) -> AppResult<Model> {
    Ok(br_project::load_model(path)?)
}

pub fn validate_model(model: &Model) -> AppResult<()> {
    br_project::validate_model(model)?;
    Ok(())
}

pub fn list_systems(model: &Model) -> Vec<SystemSummary> {
    model
        .systems
        .iter()
        .map(|system| SystemSummary {
            id: system.id.clone(),
            name: system.name.clone(),
            feed_count: system.feeds.len(),
            unit_count: system.units.len(),
            product_count: system.product_ids().len(),
        })
        .collect()
}

/// A parsed model plus the system reports run against.
#[derive(Debug)]
pub struct LoadedModel {
    path: PathBuf,
    model: Model,
    system_index: usize,
}

impl LoadedModel {
    /// Pick `HP_sys`, else the first system. `None` when the model is empty.
    pub fn new(path: PathBuf, model: Model) -> Option<Self> {
        let system_index = model.preferred_system_index(PREFERRED_SYSTEM_ID)?;
        Some(Self {
            path,
            model,
            system_index,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn system_def(&self) -> &SystemDef {
        &self.model.systems[self.system_index]
    }

    /// A fresh, unsimulated flowsheet. Every report gets its own.
    pub fn build_system(&self) -> AppResult<System> {
        Ok(System::from_def(self.system_def(), &self.model.chemicals)?)
    }
}

/// Memoizes loaded models by discovery root.
///
/// Successful loads are kept for the life of the cache; a missing model is
/// looked up again on the next call.
#[derive(Debug, Default)]
pub struct ModelCache {
    entries: Mutex<HashMap<PathBuf, Arc<LoadedModel>>>,
    loads: AtomicUsize,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide instance.
    pub fn global() -> &'static ModelCache {
        static CACHE: OnceLock<ModelCache> = OnceLock::new();
        CACHE.get_or_init(ModelCache::new)
    }

    /// Locate, parse and validate the model under `root`, once per root.
    ///
    /// Returns `Ok(None)` when no model file exists or it defines no system.
    pub fn load_system_core(&self, root: &Path) -> AppResult<Option<Arc<LoadedModel>>> {
        let key = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(loaded) = entries.get(&key) {
            debug!(root = %key.display(), "model cache hit");
            return Ok(Some(Arc::clone(loaded)));
        }

        let Some(path) = br_project::find_file(&key, MODEL_FILE_NAME) else {
            info!(root = %key.display(), file = MODEL_FILE_NAME, "model file not found");
            return Ok(None);
        };
        let model = br_project::load_model(&path)?;
        self.loads.fetch_add(1, Ordering::Relaxed);

        let Some(loaded) = LoadedModel::new(path, model) else {
            info!(root = %key.display(), "model defines no system");
            return Ok(None);
        };
        info!(
            path = %loaded.path().display(),
            system = %loaded.system_def().id,
            "model loaded"
        );
        let loaded = Arc::new(loaded);
        entries.insert(key, Arc::clone(&loaded));
        Ok(Some(loaded))
    }

    /// Number of model files parsed so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_models() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../models")
    }

    #[test]
    fn cache_loads_once_per_root() {
        let cache = ModelCache::new();
        let first = cache.load_system_core(&repo_models()).unwrap().unwrap();
        let second = cache.load_system_core(&repo_models()).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.load_count(), 1);
        assert_eq!(first.system_def().id, PREFERRED_SYSTEM_ID);
    }

    #[test]
    fn missing_model_is_not_cached() {
        let root = std::env::temp_dir().join("br_app_cache_missing");
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).unwrap();

        let cache = ModelCache::new();
        assert!(cache.load_system_core(&root).unwrap().is_none());

        let source = repo_models().join("HP").join(MODEL_FILE_NAME);
        std::fs::copy(source, root.join(MODEL_FILE_NAME)).unwrap();
        assert!(cache.load_system_core(&root).unwrap().is_some());
        assert_eq!(cache.load_count(), 1);
    }

    #[test]
    fn each_build_is_independent() {
        let cache = ModelCache::new();
        let loaded = cache.load_system_core(&repo_models()).unwrap().unwrap();
        let mut a = loaded.build_system().unwrap();
        let b = loaded.build_system().unwrap();
        a.set_operating_hours(6000.0);
        assert_eq!(b.operating_hours(), 8000.0);
    }

    #[test]
    fn first_system_is_used_without_preferred_id() {
        let system: SystemDef = serde_yaml::from_str("id: other\nname: Other\n").unwrap();
        let mut model = Model {
            version: br_project::LATEST_VERSION,
            name: "m".to_string(),
            chemicals: vec![],
            systems: vec![],
        };
        assert!(LoadedModel::new(PathBuf::from("m.yaml"), model.clone()).is_none());

        model.systems.push(system);
        let loaded = LoadedModel::new(PathBuf::from("m.yaml"), model).unwrap();
        assert_eq!(loaded.system_def().id, "other");
    }
}
