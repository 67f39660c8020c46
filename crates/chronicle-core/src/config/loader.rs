//! Path detection and configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, Result};

use super::types::ChangelogConfig;

const CHANGELOG_DIR: &str = "changelogs";
const CONFIG_FILE: &str = "config.yaml";

/// Marker file distinguishing a collection checkout from a product-core
/// checkout.
const COLLECTION_MARKER: &str = "collection.yml";

/// Resolved filesystem layout of a checkout.
#[derive(Debug, Clone)]
pub struct PathsConfig {
    /// Base directory of the checkout
    pub base_dir: PathBuf,
    /// `<base_dir>/changelogs`
    pub changelog_dir: PathBuf,
    /// `<base_dir>/changelogs/config.yaml`
    pub config_path: PathBuf,
    /// Whether the checkout is a collection
    pub is_collection: bool,
}

impl PathsConfig {
    fn new(base_dir: PathBuf, is_collection: bool) -> Self {
        let changelog_dir = base_dir.join(CHANGELOG_DIR);
        let config_path = changelog_dir.join(CONFIG_FILE);
        Self {
            base_dir,
            changelog_dir,
            config_path,
            is_collection,
        }
    }

    /// Force a collection layout at the given base directory.
    pub fn force_collection(base_dir: &Path) -> Self {
        Self::new(base_dir.to_path_buf(), true)
    }

    /// Force a product-core layout at the given base directory.
    pub fn force_product(base_dir: &Path) -> Self {
        Self::new(base_dir.to_path_buf(), false)
    }

    /// Detect the checkout layout by walking parent directories until a
    /// `changelogs/config.yaml` is found.
    pub fn detect(start_dir: &Path) -> Result<Self> {
        debug!(start_dir = %start_dir.display(), "searching for changelog directory");
        let mut current = start_dir.to_path_buf();

        loop {
            let changelog_dir = current.join(CHANGELOG_DIR);
            let config_path = changelog_dir.join(CONFIG_FILE);
            if changelog_dir.is_dir() && config_path.is_file() {
                let is_collection = current.join(COLLECTION_MARKER).is_file();
                info!(
                    base_dir = %current.display(),
                    is_collection,
                    "found changelog directory"
                );
                return Ok(Self::new(current, is_collection));
            }

            if !current.pop() {
                return Err(ConfigError::NoChangelogDir(start_dir.to_path_buf()).into());
            }
        }
    }

    /// Directory containing the change fragments for the given configuration.
    pub fn fragments_dir(&self, config: &ChangelogConfig) -> PathBuf {
        self.changelog_dir.join(&config.notes_dir)
    }

    /// Path of the changes store file for the given configuration.
    pub fn changes_path(&self, config: &ChangelogConfig) -> PathBuf {
        self.changelog_dir.join(&config.changes_file)
    }

    /// Path of the plugin metadata cache file.
    pub fn plugin_cache_path(&self) -> PathBuf {
        self.changelog_dir.join(".plugin-cache.yaml")
    }

    /// Load the changelog configuration from this layout.
    pub fn load_config(&self) -> Result<ChangelogConfig> {
        if !self.config_path.is_file() {
            return Err(ConfigError::NotFound(self.config_path.clone()).into());
        }
        ChangelogConfig::load(&self.config_path, self.is_collection)
    }
}
