//! In-memory site definition registry.

use crate::{
    builtin,
    definition::SiteDefinition,
    error::{Result, SiteError},
    loader::SiteLoader,
};
use leadscout_core::SourceId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// In-memory cache of site definitions, indexed by site tag.
#[derive(Debug, Clone, Default)]
pub struct SiteRegistry {
    definitions: Arc<RwLock<HashMap<SourceId, SiteDefinition>>>,
}

impl SiteRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the given definitions; later duplicates replace earlier ones.
    #[must_use]
    pub fn from_definitions(definitions: impl IntoIterator<Item = SiteDefinition>) -> Self {
        let registry = Self::new();
        registry.replace_all(definitions);
        registry
    }

    /// Registry holding the definitions compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Ok(Self::from_definitions(builtin::definitions()?))
    }

    /// Create a registry and load all definitions from the given loader.
    pub fn load_from(loader: &SiteLoader) -> Result<Self> {
        let registry = Self::new();
        registry.reload(loader)?;
        Ok(registry)
    }

    /// Reload all site definitions from the loader.
    pub fn reload(&self, loader: &SiteLoader) -> Result<()> {
        let definitions = loader.load_all()?;
        self.replace_all(definitions);
        Ok(())
    }

    fn replace_all(&self, definitions: impl IntoIterator<Item = SiteDefinition>) {
        let mut cache = self
            .definitions
            .write()
            .expect("acquire write lock on definitions");

        cache.clear();
        for definition in definitions {
            cache.insert(definition.id(), definition);
        }

        info!(count = cache.len(), "reloaded site definitions");
    }

    /// Get a site definition by tag.
    pub fn get(&self, id: SourceId) -> Result<SiteDefinition> {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        cache.get(&id).cloned().ok_or_else(|| SiteError::NotFound {
            site: id.to_string(),
        })
    }

    /// Definitions for `ids`, in the requested order. Unknown and repeated
    /// tags are skipped with a warning.
    #[must_use]
    pub fn ordered(&self, ids: &[SourceId]) -> Vec<SiteDefinition> {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        let mut seen = Vec::with_capacity(ids.len());
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if seen.contains(id) {
                warn!(source = %id, "source listed twice, skipping repeat");
                continue;
            }
            seen.push(*id);

            match cache.get(id) {
                Some(definition) => out.push(definition.clone()),
                None => warn!(source = %id, "no site definition for source, skipping"),
            }
        }
        out
    }

    /// All definitions sorted by priority, then tag.
    #[must_use]
    pub fn by_priority(&self) -> Vec<SiteDefinition> {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        let mut all: Vec<_> = cache.values().cloned().collect();
        all.sort_by_key(|def| (def.priority(), def.id()));
        all
    }

    /// Number of cached definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions
            .read()
            .expect("acquire read lock on definitions")
            .len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
