//! Changelog configuration types

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::version::VersionScheme;

/// Default prose sections, in rendering order.
pub const DEFAULT_SECTIONS: &[(&str, &str)] = &[
    ("major_changes", "Major Changes"),
    ("minor_changes", "Minor Changes"),
    ("breaking_changes", "Breaking Changes / Porting Guide"),
    ("deprecated_features", "Deprecated Features"),
    ("removed_features", "Removed Features (previously deprecated)"),
    ("security_fixes", "Security Fixes"),
    ("bugfixes", "Bugfixes"),
    ("known_issues", "Known Issues"),
];

/// On-disk representation of the changes store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangesFormat {
    /// Releases reference fragment files by name; content lives in the
    /// fragment cache.
    Classic,
    /// Releases inline merged fragment content and full plugin records.
    Combined,
}

/// Configuration for a changelog, loaded from `changelogs/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Project title used in the generated document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Directory holding change fragments, relative to the changelog dir
    #[serde(rename = "notesdir")]
    pub notes_dir: String,

    /// Name of the distinguished prose section
    #[serde(rename = "prelude_section_name")]
    pub prelude_name: String,

    /// Rendered title of the prelude section
    #[serde(rename = "prelude_section_title")]
    pub prelude_title: String,

    /// File name of the changes store, relative to the changelog dir
    pub changes_file: String,

    /// On-disk format of the changes store
    pub changes_format: ChangesFormat,

    /// Whether fragment files survive being merged into a release.
    /// Defaults to true for the classic format, false for combined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_fragments: Option<bool>,

    /// Template for the generated document name; `%s` is replaced by the
    /// truncated version
    pub changelog_filename_template: String,

    /// How many leading version components appear in the document name and
    /// title; 0 omits the version entirely
    pub changelog_filename_version_depth: usize,

    /// Mention the ancestor version in the document preamble
    pub mention_ancestor: bool,

    /// Pattern matching stable release tags (product-core versioning only)
    pub release_tag_re: String,

    /// Pattern matching pre-release tags (product-core versioning only)
    pub pre_release_tag_re: String,

    /// Configured prose sections as `[name, title]` pairs, prelude excluded
    pub sections: Vec<(String, String)>,

    /// Whether versions follow collection (SemVer) semantics.
    /// Derived from the checkout, not stored in the config file.
    #[serde(skip)]
    pub is_collection: bool,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self::default_collection(None)
    }
}

impl ChangelogConfig {
    /// Default configuration for a collection checkout (combined format).
    pub fn default_collection(title: Option<String>) -> Self {
        Self {
            title,
            notes_dir: "fragments".to_string(),
            prelude_name: "release_summary".to_string(),
            prelude_title: "Release Summary".to_string(),
            changes_file: "changelog.yaml".to_string(),
            changes_format: ChangesFormat::Combined,
            keep_fragments: None,
            changelog_filename_template: "CHANGELOG.rst".to_string(),
            changelog_filename_version_depth: 0,
            mention_ancestor: true,
            release_tag_re: r"((?:[\d.ab]|rc)+)".to_string(),
            pre_release_tag_re: r"(?P<pre_release>\.\d+(?:[ab]|rc)+\d*)$".to_string(),
            sections: DEFAULT_SECTIONS
                .iter()
                .map(|(name, section_title)| (name.to_string(), section_title.to_string()))
                .collect(),
            is_collection: true,
        }
    }

    /// Default configuration for a product-core checkout (classic format).
    pub fn default_product() -> Self {
        Self {
            changes_file: ".changes.yaml".to_string(),
            changes_format: ChangesFormat::Classic,
            changelog_filename_template: "CHANGELOG-v%s.rst".to_string(),
            changelog_filename_version_depth: 2,
            is_collection: false,
            ..Self::default_collection(None)
        }
    }

    /// Load a changelog configuration file.
    pub fn load(path: &Path, is_collection: bool) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let mut config: ChangelogConfig =
            serde_yaml::from_str(&content).map_err(ConfigError::YamlError)?;
        config.is_collection = is_collection;
        config.validate()?;
        debug!(path = %path.display(), is_collection, "changelog config loaded");
        Ok(config)
    }

    /// Store the changelog configuration file to disk.
    pub fn store(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).map_err(ConfigError::YamlError)?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.changes_format == ChangesFormat::Classic && self.keep_fragments == Some(false) {
            return Err(ConfigError::InvalidValue {
                field: "keep_fragments".to_string(),
                message: "the classic format requires fragments to be kept".to_string(),
            }
            .into());
        }
        if self
            .sections
            .iter()
            .any(|(name, _)| name == &self.prelude_name)
        {
            return Err(ConfigError::InvalidValue {
                field: "sections".to_string(),
                message: format!(
                    "the prelude section \"{}\" must not appear in the section list",
                    self.prelude_name
                ),
            }
            .into());
        }
        Ok(())
    }

    /// Whether fragment files survive being merged into a release.
    pub fn keep_fragments(&self) -> bool {
        self.keep_fragments
            .unwrap_or(self.changes_format == ChangesFormat::Classic)
    }

    /// All sections in rendering order, prelude first.
    pub fn all_sections(&self) -> Vec<(&str, &str)> {
        let mut result = vec![(self.prelude_name.as_str(), self.prelude_title.as_str())];
        result.extend(
            self.sections
                .iter()
                .map(|(name, title)| (name.as_str(), title.as_str())),
        );
        result
    }

    /// Whether a fragment section key is part of the configured set
    /// (prelude included).
    pub fn is_known_section(&self, name: &str) -> bool {
        name == self.prelude_name || self.sections.iter().any(|(n, _)| n == name)
    }

    /// The version scheme selected by this configuration.
    pub fn version_scheme(&self) -> Result<VersionScheme> {
        if self.is_collection {
            Ok(VersionScheme::collection())
        } else {
            VersionScheme::dotted(&self.release_tag_re, &self.pre_release_tag_re)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ChangelogConfig::default();
        assert_eq!(config.changes_format, ChangesFormat::Combined);
        assert!(!config.keep_fragments());
        assert_eq!(config.prelude_name, "release_summary");
        assert_eq!(config.sections.len(), DEFAULT_SECTIONS.len());
    }

    #[test]
    fn test_classic_keeps_fragments_by_default() {
        let config = ChangelogConfig::default_product();
        assert!(config.keep_fragments());
    }

    #[test]
    fn test_validate_rejects_classic_without_kept_fragments() {
        let config = ChangelogConfig {
            keep_fragments: Some(false),
            ..ChangelogConfig::default_product()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sections_include_prelude_first() {
        let config = ChangelogConfig::default();
        let sections = config.all_sections();
        assert_eq!(sections[0], ("release_summary", "Release Summary"));
        assert!(config.is_known_section("bugfixes"));
        assert!(!config.is_known_section("surprises"));
    }

    #[test]
    fn test_store_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        let config = ChangelogConfig::default_collection(Some("Demo".to_string()));
        config.store(&path).unwrap();

        let loaded = ChangelogConfig::load(&path, true).unwrap();
        assert_eq!(loaded.title.as_deref(), Some("Demo"));
        assert_eq!(loaded.changes_format, ChangesFormat::Combined);
        assert!(loaded.is_collection);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            "notesdir: notes\nsections:\n- [bugfixes, Bugfixes]\n",
        )
        .unwrap();

        let loaded = ChangelogConfig::load(&path, false).unwrap();
        assert_eq!(loaded.notes_dir, "notes");
        assert_eq!(loaded.sections, vec![("bugfixes".into(), "Bugfixes".into())]);
        assert_eq!(loaded.prelude_name, "release_summary");
        assert!(!loaded.is_collection);
    }
}
