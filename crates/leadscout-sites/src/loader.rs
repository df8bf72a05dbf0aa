//! Site definition loading from TOML files.
//!
//! This module handles loading site definitions from the `site-definitions/` directory.

use crate::{
    definition::SiteDefinition,
    error::{Result, SiteError},
};
use leadscout_core::SourceId;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Loader for site definitions from TOML files.
pub struct SiteLoader {
    /// Base directory containing site definitions
    definitions_dir: PathBuf,
}

impl SiteLoader {
    /// Create a new loader with the given definitions directory.
    ///
    /// # Errors
    /// Returns error if the directory doesn't exist.
    pub fn new(definitions_dir: impl Into<PathBuf>) -> Result<Self> {
        let definitions_dir = definitions_dir.into();

        if !definitions_dir.is_dir() {
            return Err(SiteError::DirectoryNotFound {
                path: definitions_dir.display().to_string(),
            });
        }

        Ok(Self { definitions_dir })
    }

    /// Directory this loader reads from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.definitions_dir
    }

    /// Load a single site definition by tag.
    ///
    /// # Errors
    /// Returns error if the definition file doesn't exist, can't be read, or is invalid.
    pub fn load(&self, id: SourceId) -> Result<SiteDefinition> {
        let path = self.definitions_dir.join(format!("{}.toml", id.as_str()));
        if !path.is_file() {
            return Err(SiteError::NotFound {
                site: id.to_string(),
            });
        }

        let definition = Self::load_from_path(&path)?;
        definition.validate()?;

        if definition.id() != id {
            return Err(SiteError::ValidationError {
                site: id.to_string(),
                reason: format!("{} declares site id {}", path.display(), definition.id()),
            });
        }

        debug!(site = %id, name = %definition.name(), "loaded site definition");

        Ok(definition)
    }

    /// Load all site definitions from the definitions directory.
    ///
    /// Invalid definitions are logged as warnings and skipped.
    ///
    /// # Errors
    /// Returns error if the directory can't be read.
    pub fn load_all(&self) -> Result<Vec<SiteDefinition>> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.definitions_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("toml"))
            .collect();
        paths.sort();

        let mut definitions = Vec::new();
        for path in paths {
            match Self::load_from_path(&path).and_then(|def| def.validate().map(|()| def)) {
                Ok(definition) => definitions.push(definition),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "skipping invalid site definition"
                    );
                }
            }
        }

        info!(
            count = definitions.len(),
            dir = %self.definitions_dir.display(),
            "loaded site definitions"
        );

        Ok(definitions)
    }

    /// Parse a site definition from a specific file path.
    fn load_from_path(path: &Path) -> Result<SiteDefinition> {
        let contents = std::fs::read_to_string(path).map_err(|e| SiteError::LoadError {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        toml::from_str(&contents).map_err(|e| SiteError::ParseError {
            path: path.display().to_string(),
            source: e,
        })
    }
}
