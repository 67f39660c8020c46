//! Change fragments: loading, combining, removal

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use chronicle_core::config::{ChangelogConfig, PathsConfig};
use chronicle_core::error::{ChronicleError, FragmentError, Result};

/// Content of one fragment section.
///
/// Only the prelude section carries prose; every other section is a list of
/// one-line entries. The untagged representation accepts both YAML shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionContent {
    /// Free prose, valid for the prelude section only
    Prose(String),
    /// Ordered one-line entries
    Entries(Vec<String>),
}

/// A single author-contributed change note, structured by section.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// File basename, used as the dedup key across releases
    pub name: String,
    /// Backing file, empty for fragments synthesized from embedded content
    pub path: PathBuf,
    /// Section key to content
    pub content: BTreeMap<String, SectionContent>,
}

impl Fragment {
    /// Load a fragment from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(FragmentError::Io)?;
        let content: BTreeMap<String, SectionContent> =
            serde_yaml::from_str(&text).map_err(|e| FragmentError::ParseFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(Self::from_content(path, content))
    }

    /// Create a fragment from already-parsed content.
    pub fn from_content(path: &Path, content: BTreeMap<String, SectionContent>) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            path: path.to_path_buf(),
            content,
        }
    }

    /// Best-effort removal of the backing file.
    ///
    /// The fragment is considered gone whether or not the deletion succeeds.
    pub fn remove(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), error = %e, "could not remove fragment file");
        }
    }

    /// Union section content across fragments.
    ///
    /// List sections concatenate in encounter order; the prose prelude is
    /// overwritten by the last fragment processed.
    pub fn combine(fragments: &[Fragment]) -> BTreeMap<String, SectionContent> {
        let mut result: BTreeMap<String, SectionContent> = BTreeMap::new();

        for fragment in fragments {
            for (section, content) in &fragment.content {
                match content {
                    SectionContent::Entries(lines) => {
                        match result
                            .entry(section.clone())
                            .or_insert_with(|| SectionContent::Entries(Vec::new()))
                        {
                            SectionContent::Entries(existing) => {
                                existing.extend(lines.iter().cloned())
                            }
                            // a list section shadowing earlier prose keeps the list
                            prose => *prose = SectionContent::Entries(lines.clone()),
                        }
                    }
                    SectionContent::Prose(text) => {
                        result.insert(section.clone(), SectionContent::Prose(text.clone()));
                    }
                }
            }
        }

        result
    }
}

/// Load a fragment file as an untyped YAML value, for linting.
pub fn load_raw(path: &Path) -> Result<serde_yaml::Value> {
    let text = std::fs::read_to_string(path).map_err(FragmentError::Io)?;
    serde_yaml::from_str(&text).map_err(|e| {
        FragmentError::ParseFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Load fragments from the configured notes directory, or from an explicit
/// path list.
///
/// When an error sink is supplied, parse failures are collected there and
/// loading continues; otherwise the first failure propagates.
pub fn load_fragments(
    paths: &PathsConfig,
    config: &ChangelogConfig,
    fragment_paths: Option<&[PathBuf]>,
    mut errors: Option<&mut Vec<(PathBuf, ChronicleError)>>,
) -> Result<Vec<Fragment>> {
    let paths_to_load: Vec<PathBuf> = match fragment_paths {
        Some(explicit) => explicit.to_vec(),
        None => {
            let dir = paths.fragments_dir(config);
            if !dir.is_dir() {
                return Err(FragmentError::DirNotFound(dir).into());
            }
            let mut found = Vec::new();
            for entry in std::fs::read_dir(&dir).map_err(FragmentError::Io)? {
                let entry = entry.map_err(FragmentError::Io)?;
                let name = entry.file_name();
                if name.to_string_lossy().starts_with('.') {
                    continue;
                }
                if entry.path().is_file() {
                    found.push(entry.path());
                }
            }
            found.sort();
            found
        }
    };

    let mut fragments = Vec::new();
    for path in paths_to_load {
        match Fragment::load(&path) {
            Ok(fragment) => fragments.push(fragment),
            Err(e) => match errors.as_deref_mut() {
                Some(sink) => sink.push((path, e)),
                None => return Err(e),
            },
        }
    }

    debug!(count = fragments.len(), "fragments loaded");
    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(lines: &[&str]) -> SectionContent {
        SectionContent::Entries(lines.iter().map(|s| s.to_string()).collect())
    }

    fn write_fragment(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_fragment() {
        let temp = TempDir::new().unwrap();
        let path = write_fragment(
            temp.path(),
            "1.0.0.yml",
            "release_summary: First release.\nbugfixes:\n- fixed a thing\n",
        );

        let fragment = Fragment::load(&path).unwrap();
        assert_eq!(fragment.name, "1.0.0.yml");
        assert_eq!(
            fragment.content.get("release_summary"),
            Some(&SectionContent::Prose("First release.".to_string()))
        );
        assert_eq!(
            fragment.content.get("bugfixes"),
            Some(&entries(&["fixed a thing"]))
        );
    }

    #[test]
    fn test_remove_is_best_effort() {
        let temp = TempDir::new().unwrap();
        let path = write_fragment(temp.path(), "gone.yml", "bugfixes:\n- x\n");
        let fragment = Fragment::load(&path).unwrap();

        fragment.remove();
        assert!(!path.exists());
        // removing again must not panic
        fragment.remove();
    }

    #[test]
    fn test_combine_concatenates_lists_and_overwrites_prose() {
        let mut first = BTreeMap::new();
        first.insert("release_summary".to_string(), SectionContent::Prose("old".into()));
        first.insert("bugfixes".to_string(), entries(&["a"]));
        let mut second = BTreeMap::new();
        second.insert("release_summary".to_string(), SectionContent::Prose("new".into()));
        second.insert("bugfixes".to_string(), entries(&["b"]));
        second.insert("minor_changes".to_string(), entries(&["c"]));

        let combined = Fragment::combine(&[
            Fragment::from_content(Path::new("one.yml"), first),
            Fragment::from_content(Path::new("two.yml"), second),
        ]);

        assert_eq!(
            combined.get("release_summary"),
            Some(&SectionContent::Prose("new".to_string()))
        );
        assert_eq!(combined.get("bugfixes"), Some(&entries(&["a", "b"])));
        assert_eq!(combined.get("minor_changes"), Some(&entries(&["c"])));
    }

    #[test]
    fn test_combine_round_trips_list_sections() {
        let mut first = BTreeMap::new();
        first.insert("bugfixes".to_string(), entries(&["b", "a"]));
        first.insert("minor_changes".to_string(), entries(&["m"]));
        let mut second = BTreeMap::new();
        second.insert("bugfixes".to_string(), entries(&["c"]));
        let fragments = vec![
            Fragment::from_content(Path::new("one.yml"), first),
            Fragment::from_content(Path::new("two.yml"), second),
        ];

        let combined = Fragment::combine(&fragments);

        // re-splitting per section reproduces the union of the inputs,
        // modulo list ordering
        assert_eq!(combined.len(), 2);
        for (section, content) in &combined {
            let SectionContent::Entries(merged) = content else {
                panic!("list section {section} must combine into a list");
            };
            let mut merged = merged.clone();
            merged.sort();

            let mut expected: Vec<String> = fragments
                .iter()
                .filter_map(|fragment| match fragment.content.get(section) {
                    Some(SectionContent::Entries(lines)) => Some(lines.clone()),
                    _ => None,
                })
                .flatten()
                .collect();
            expected.sort();

            assert_eq!(merged, expected, "section {section}");
        }
    }

    #[test]
    fn test_load_fragments_skips_hidden_files() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("project");
        let notes = base.join("changelogs").join("fragments");
        std::fs::create_dir_all(&notes).unwrap();
        write_fragment(&notes, "good.yml", "bugfixes:\n- fine\n");
        write_fragment(&notes, ".hidden.yml", "not yaml: [");

        let paths = PathsConfig::force_collection(&base);
        let config = ChangelogConfig::default();
        let fragments = load_fragments(&paths, &config, None, None).unwrap();

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].name, "good.yml");
    }

    #[test]
    fn test_load_fragments_collects_errors_when_sink_given() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("project");
        let notes = base.join("changelogs").join("fragments");
        std::fs::create_dir_all(&notes).unwrap();
        write_fragment(&notes, "bad.yml", "{ not yaml");
        write_fragment(&notes, "good.yml", "bugfixes:\n- fine\n");

        let paths = PathsConfig::force_collection(&base);
        let config = ChangelogConfig::default();

        let mut errors = Vec::new();
        let fragments = load_fragments(&paths, &config, None, Some(&mut errors)).unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].0.ends_with("bad.yml"));

        // without a sink the failure propagates
        assert!(load_fragments(&paths, &config, None, None).is_err());
    }
}
