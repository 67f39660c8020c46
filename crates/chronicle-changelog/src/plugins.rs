//! Plugin descriptions and the version-keyed plugin cache

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use chronicle_core::error::{ChronicleError, Result};

/// Description of one plugin or module, produced by the documentation
/// collaborator and consumed by the changes store and the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescription {
    /// Plugin type, `module` for modules
    #[serde(rename = "type")]
    pub plugin_type: String,
    /// Plugin name, never fully qualified
    pub name: String,
    /// Dotted namespace, modules only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Short description
    pub description: String,
    /// Version the plugin first appeared in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_added: Option<String>,
}

impl PluginDescription {
    /// Composite identity used by the known-plugins set.
    pub fn composite_name(&self) -> String {
        format!("{}/{}", self.plugin_type, self.name)
    }

    /// The record embedded into combined changes files.
    pub fn record(&self) -> PluginRecord {
        PluginRecord {
            description: self.description.clone(),
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            version_added: self.version_added.clone(),
        }
    }
}

/// Full plugin record as embedded in combined changes files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRecord {
    pub description: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_added: Option<String>,
}

/// Opaque collaborator producing the plugin universe for a version.
///
/// The real implementation shells out to the documentation generator; tests
/// and callers that already have the data supply their own.
pub trait PluginSource {
    /// Collect all plugin descriptions for the given version.
    fn collect(&self, version: &str) -> Result<Vec<PluginDescription>>;
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: String,
    plugins: BTreeMap<String, BTreeMap<String, CachedPlugin>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedPlugin {
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version_added: Option<String>,
}

/// Version-keyed on-disk cache in front of a [`PluginSource`].
///
/// The cached universe is reused while its recorded version matches the
/// version being built; any mismatch (or `force_reload`) recomputes and
/// overwrites the cache file.
#[derive(Debug, Clone)]
pub struct PluginCache {
    path: PathBuf,
}

impl PluginCache {
    /// Create a cache backed by the given file.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Load the plugin universe for a version, from cache when possible.
    pub fn load_plugins(
        &self,
        source: &dyn PluginSource,
        version: &str,
        force_reload: bool,
    ) -> Result<Vec<PluginDescription>> {
        if !force_reload {
            if let Some(cached) = self.cached(version)? {
                debug!(version, path = %self.path.display(), "using cached plugin data");
                return Ok(cached);
            }
        }

        info!(version, "collecting plugin data");
        let plugins = source.collect(version)?;
        self.store(version, &plugins)?;
        Ok(plugins)
    }

    /// The cached universe, if the cache file exists and matches the version.
    pub fn cached(&self, version: &str) -> Result<Option<Vec<PluginDescription>>> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path)?;
        let cache: CacheFile = serde_yaml::from_str(&text)?;
        if cache.version != version {
            debug!(
                cached = %cache.version,
                requested = version,
                "plugin cache is for a different version"
            );
            return Ok(None);
        }

        let mut plugins = Vec::new();
        for (plugin_type, entries) in cache.plugins {
            for (name, entry) in entries {
                plugins.push(PluginDescription {
                    plugin_type: plugin_type.clone(),
                    name,
                    namespace: entry.namespace,
                    description: entry.description,
                    version_added: entry.version_added,
                });
            }
        }
        Ok(Some(plugins))
    }

    /// Record the plugin universe for a version, replacing the cache file.
    pub fn store(&self, version: &str, plugins: &[PluginDescription]) -> Result<()> {
        let mut by_type: BTreeMap<String, BTreeMap<String, CachedPlugin>> = BTreeMap::new();
        for plugin in plugins {
            by_type.entry(plugin.plugin_type.clone()).or_default().insert(
                plugin.name.clone(),
                CachedPlugin {
                    description: plugin.description.clone(),
                    namespace: plugin.namespace.clone(),
                    version_added: plugin.version_added.clone(),
                },
            );
        }
        let cache = CacheFile {
            version: version.to_string(),
            plugins: by_type,
        };
        std::fs::write(&self.path, serde_yaml::to_string(&cache)?)?;
        Ok(())
    }
}

/// Load an explicit YAML list of plugin descriptions.
pub fn load_plugin_list(path: &Path) -> Result<Vec<PluginDescription>> {
    let text = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&text).map_err(ChronicleError::Yaml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FixedSource {
        plugins: Vec<PluginDescription>,
        calls: std::cell::Cell<usize>,
    }

    impl PluginSource for FixedSource {
        fn collect(&self, _version: &str) -> Result<Vec<PluginDescription>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.plugins.clone())
        }
    }

    fn sample_plugin() -> PluginDescription {
        PluginDescription {
            plugin_type: "module".to_string(),
            name: "archive".to_string(),
            namespace: Some("files".to_string()),
            description: "Create archives".to_string(),
            version_added: Some("1.0.0".to_string()),
        }
    }

    #[test]
    fn test_composite_name() {
        assert_eq!(sample_plugin().composite_name(), "module/archive");
    }

    #[test]
    fn test_cache_hit_skips_source() {
        let temp = TempDir::new().unwrap();
        let cache = PluginCache::new(&temp.path().join(".plugin-cache.yaml"));
        let source = FixedSource {
            plugins: vec![sample_plugin()],
            calls: std::cell::Cell::new(0),
        };

        let first = cache.load_plugins(&source, "1.0.0", false).unwrap();
        let second = cache.load_plugins(&source, "1.0.0", false).unwrap();

        assert_eq!(first, second);
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn test_cache_invalidated_by_version_change() {
        let temp = TempDir::new().unwrap();
        let cache = PluginCache::new(&temp.path().join(".plugin-cache.yaml"));
        let source = FixedSource {
            plugins: vec![sample_plugin()],
            calls: std::cell::Cell::new(0),
        };

        cache.load_plugins(&source, "1.0.0", false).unwrap();
        cache.load_plugins(&source, "1.1.0", false).unwrap();
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn test_force_reload_recollects() {
        let temp = TempDir::new().unwrap();
        let cache = PluginCache::new(&temp.path().join(".plugin-cache.yaml"));
        let source = FixedSource {
            plugins: vec![sample_plugin()],
            calls: std::cell::Cell::new(0),
        };

        cache.load_plugins(&source, "1.0.0", false).unwrap();
        cache.load_plugins(&source, "1.0.0", true).unwrap();
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn test_cached_requires_matching_version() {
        let temp = TempDir::new().unwrap();
        let cache = PluginCache::new(&temp.path().join(".plugin-cache.yaml"));
        assert!(cache.cached("1.0.0").unwrap().is_none());

        cache.store("1.0.0", &[sample_plugin()]).unwrap();
        assert_eq!(cache.cached("1.0.0").unwrap(), Some(vec![sample_plugin()]));
        assert!(cache.cached("1.1.0").unwrap().is_none());
    }

    #[test]
    fn test_load_plugin_list() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plugins.yaml");
        std::fs::write(
            &path,
            "- type: module\n  name: archive\n  namespace: files\n  description: Create archives\n  version_added: 1.0.0\n- type: lookup\n  name: vault\n  description: Read secrets\n",
        )
        .unwrap();

        let plugins = load_plugin_list(&path).unwrap();
        assert_eq!(plugins.len(), 2);
        assert_eq!(plugins[0], sample_plugin());
        assert_eq!(plugins[1].plugin_type, "lookup");
        assert_eq!(plugins[1].namespace, None);
    }
}
