//! The persistent changes store
//!
//! One `Changes` struct covers both on-disk formats; the classic/combined
//! split is a constructor-selected strategy governing how plugin and fragment
//! identity is represented (name-only vs full-record), not a type hierarchy.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use chronicle_core::config::{ChangelogConfig, ChangesFormat, PathsConfig};
use chronicle_core::error::{ChangesError, Result, VersionError};
use chronicle_core::version::VersionScheme;

use crate::fragment::{Fragment, SectionContent};
use crate::plugins::{PluginDescription, PluginRecord};

/// Plugin or module reference inside a release.
///
/// Classic files store bare names, combined files store full records; the
/// untagged representation reads and writes both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginEntry {
    Name(String),
    Record(PluginRecord),
}

impl PluginEntry {
    /// The plugin name, independent of representation.
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Record(record) => &record.name,
        }
    }
}

/// One release inside the changes file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseEntry {
    /// Merged section content (combined format)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<BTreeMap<String, SectionContent>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codename: Option<String>,

    /// Names of the fragments merged into this release
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragments: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<PluginEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<BTreeMap<String, Vec<PluginEntry>>>,

    pub release_date: NaiveDate,
}

impl ReleaseEntry {
    fn new(release_date: NaiveDate, codename: Option<String>) -> Self {
        Self {
            changes: None,
            codename,
            fragments: None,
            modules: None,
            plugins: None,
            release_date,
        }
    }
}

/// On-disk document: an optional ancestor plus the release map.
///
/// Map order is never semantic; every consumer sorts explicitly through the
/// version scheme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangesFile {
    pub ancestor: Option<String>,
    #[serde(default)]
    pub releases: BTreeMap<String, ReleaseEntry>,
}

/// Read, write and manage change metadata.
#[derive(Debug, Clone)]
pub struct Changes {
    config: ChangelogConfig,
    scheme: VersionScheme,
    path: PathBuf,
    format: ChangesFormat,
    data: ChangesFile,
    known_plugins: BTreeSet<String>,
    known_fragments: BTreeSet<String>,
}

impl Changes {
    /// Open the changes store at the given path, synthesizing an empty store
    /// when the file does not exist.
    pub fn new(config: &ChangelogConfig, path: &Path) -> Result<Self> {
        let mut changes = Self {
            scheme: config.version_scheme()?,
            format: config.changes_format,
            config: config.clone(),
            path: path.to_path_buf(),
            data: ChangesFile::default(),
            known_plugins: BTreeSet::new(),
            known_fragments: BTreeSet::new(),
        };
        changes.load()?;
        Ok(changes)
    }

    /// Create a store from already-loaded data instead of reading from disk.
    pub fn from_data(config: &ChangelogConfig, path: &Path, data: ChangesFile) -> Result<Self> {
        let mut changes = Self {
            scheme: config.version_scheme()?,
            format: config.changes_format,
            config: config.clone(),
            path: path.to_path_buf(),
            data,
            known_plugins: BTreeSet::new(),
            known_fragments: BTreeSet::new(),
        };
        changes.rebuild_known_sets();
        Ok(changes)
    }

    /// Re-read the store from disk.
    pub fn load(&mut self) -> Result<()> {
        self.data = if self.path.is_file() {
            let text = std::fs::read_to_string(&self.path).map_err(ChangesError::Io)?;
            serde_yaml::from_str(&text).map_err(|e| ChangesError::ParseFailed {
                path: self.path.clone(),
                message: e.to_string(),
            })?
        } else {
            debug!(path = %self.path.display(), "no changes file, starting empty");
            ChangesFile::default()
        };
        self.rebuild_known_sets();
        Ok(())
    }

    /// Sort and write the store; saving twice without mutation produces
    /// identical bytes.
    pub fn save(&mut self) -> Result<()> {
        self.sort();
        let text = serde_yaml::to_string(&self.data).map_err(serde_error(&self.path))?;
        std::fs::write(&self.path, text).map_err(ChangesError::Io)?;
        debug!(path = %self.path.display(), releases = self.data.releases.len(), "changes saved");
        Ok(())
    }

    /// The version preceding the earliest tracked release, if any.
    pub fn ancestor(&self) -> Option<&str> {
        self.data.ancestor.as_deref()
    }

    /// All releases, keyed by version string.
    pub fn releases(&self) -> &BTreeMap<String, ReleaseEntry> {
        &self.data.releases
    }

    /// Plugin composite keys (`type/name`) known across all releases.
    pub fn known_plugins(&self) -> &BTreeSet<String> {
        &self.known_plugins
    }

    /// Fragment names known across all releases (classic format).
    pub fn known_fragments(&self) -> &BTreeSet<String> {
        &self.known_fragments
    }

    /// Whether there is at least one release.
    pub fn has_release(&self) -> bool {
        !self.data.releases.is_empty()
    }

    /// Latest version per the configured comparator.
    pub fn latest_version(&self) -> Result<String> {
        self.scheme
            .latest(self.data.releases.keys().map(String::as_str))?
            .ok_or_else(|| VersionError::NoReleases.into())
    }

    /// The version scheme this store orders by.
    pub fn scheme(&self) -> &VersionScheme {
        &self.scheme
    }

    /// Register a new release. An already-known version is a warned no-op.
    pub fn add_release(
        &mut self,
        version: &str,
        codename: Option<&str>,
        date: NaiveDate,
    ) -> Result<()> {
        self.scheme.validate(version)?;
        if self.data.releases.contains_key(version) {
            warn!(version, "release already exists");
            return Ok(());
        }
        self.data.releases.insert(
            version.to_string(),
            ReleaseEntry::new(date, codename.map(str::to_string)),
        );
        Ok(())
    }

    /// Register a plugin under the given release.
    ///
    /// Returns whether the plugin was newly added; a plugin already known for
    /// any release is skipped.
    pub fn add_plugin(&mut self, plugin: &PluginDescription, version: &str) -> Result<bool> {
        let composite = plugin.composite_name();
        if self.known_plugins.contains(&composite) {
            return Ok(false);
        }

        let entry = match self.format {
            ChangesFormat::Classic => PluginEntry::Name(plugin.name.clone()),
            ChangesFormat::Combined => PluginEntry::Record(plugin.record()),
        };
        let release = self.release_mut(version)?;

        if plugin.plugin_type == "module" {
            release.modules.get_or_insert_with(Vec::new).push(entry);
        } else {
            release
                .plugins
                .get_or_insert_with(BTreeMap::new)
                .entry(plugin.plugin_type.clone())
                .or_default()
                .push(entry);
        }

        self.known_plugins.insert(composite);
        Ok(true)
    }

    /// Incorporate a fragment into the given release.
    ///
    /// Returns whether the fragment was newly incorporated. In the combined
    /// format the fragment is validated in full before any mutation: a second
    /// prelude or an unknown section key is a hard failure that leaves the
    /// store untouched.
    pub fn add_fragment(&mut self, fragment: &Fragment, version: &str) -> Result<bool> {
        match self.format {
            ChangesFormat::Classic => {
                if self.known_fragments.contains(&fragment.name) {
                    return Ok(false);
                }
                let release = self.release_mut(version)?;
                release
                    .fragments
                    .get_or_insert_with(Vec::new)
                    .push(fragment.name.clone());
                self.known_fragments.insert(fragment.name.clone());
                Ok(true)
            }
            ChangesFormat::Combined => {
                let prelude_name = self.config.prelude_name.clone();
                let known = |section: &str| self.config.is_known_section(section);

                let release = match self.data.releases.get_mut(version) {
                    Some(release) => release,
                    None => return Err(ChangesError::UnknownRelease(version.to_string()).into()),
                };
                if release
                    .fragments
                    .as_ref()
                    .is_some_and(|names| names.contains(&fragment.name))
                {
                    return Ok(false);
                }

                for section in fragment.content.keys() {
                    if section == &prelude_name {
                        if release
                            .changes
                            .as_ref()
                            .is_some_and(|changes| changes.contains_key(section))
                        {
                            return Err(ChangesError::DuplicatePrelude {
                                fragment: fragment.name.clone(),
                                section: section.clone(),
                                version: version.to_string(),
                            }
                            .into());
                        }
                    } else if !known(section) {
                        return Err(ChangesError::UnknownSection {
                            fragment: fragment.name.clone(),
                            section: section.clone(),
                        }
                        .into());
                    }
                }

                let changes = release.changes.get_or_insert_with(BTreeMap::new);
                for (section, content) in &fragment.content {
                    if section == &prelude_name {
                        changes.insert(section.clone(), content.clone());
                        continue;
                    }
                    let dest = changes
                        .entry(section.clone())
                        .or_insert_with(|| SectionContent::Entries(Vec::new()));
                    if let SectionContent::Entries(dest) = dest {
                        match content {
                            SectionContent::Entries(lines) => dest.extend(lines.iter().cloned()),
                            SectionContent::Prose(text) => dest.push(text.clone()),
                        }
                    }
                }
                release
                    .fragments
                    .get_or_insert_with(Vec::new)
                    .push(fragment.name.clone());
                Ok(true)
            }
        }
    }

    /// Remove release references to plugins absent from the authoritative
    /// list, keeping the known-plugins set exact.
    pub fn prune_plugins(&mut self, plugins: &[PluginDescription]) {
        let mut valid: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for plugin in plugins {
            valid
                .entry(plugin.plugin_type.as_str())
                .or_default()
                .insert(plugin.name.as_str());
        }
        let is_valid = |plugin_type: &str, name: &str| {
            valid
                .get(plugin_type)
                .is_some_and(|names| names.contains(name))
        };

        for release in self.data.releases.values_mut() {
            if let Some(modules) = release.modules.as_mut() {
                modules.retain(|module| {
                    let keep = is_valid("module", module.name());
                    if !keep {
                        self.known_plugins.remove(&format!("module/{}", module.name()));
                    }
                    keep
                });
            }
            if let Some(plugin_map) = release.plugins.as_mut() {
                for (plugin_type, list) in plugin_map.iter_mut() {
                    list.retain(|plugin| {
                        let keep = is_valid(plugin_type, plugin.name());
                        if !keep {
                            self.known_plugins
                                .remove(&format!("{plugin_type}/{}", plugin.name()));
                        }
                        keep
                    });
                }
            }
        }
    }

    /// Remove release references to fragments absent from the authoritative
    /// list (classic format only).
    pub fn prune_fragments(&mut self, fragments: &[Fragment]) {
        if self.format != ChangesFormat::Classic {
            return;
        }
        let valid: BTreeSet<&str> = fragments.iter().map(|f| f.name.as_str()).collect();

        for release in self.data.releases.values_mut() {
            if let Some(names) = release.fragments.as_mut() {
                names.retain(|name| {
                    let keep = valid.contains(name.as_str());
                    if !keep {
                        self.known_fragments.remove(name);
                    }
                    keep
                });
            }
        }
    }

    /// Drop releases outside `(after, until]` (combined format workflows).
    pub fn prune_versions(&mut self, after: Option<&str>, until: Option<&str>) -> Result<()> {
        let mut doomed = Vec::new();
        for version in self.data.releases.keys() {
            if let Some(after) = after {
                if self.scheme.compare(version, after)? != std::cmp::Ordering::Greater {
                    doomed.push(version.clone());
                    continue;
                }
            }
            if let Some(until) = until {
                if self.scheme.compare(version, until)? == std::cmp::Ordering::Greater {
                    doomed.push(version.clone());
                }
            }
        }
        for version in doomed {
            self.data.releases.remove(&version);
        }
        self.rebuild_known_sets();
        Ok(())
    }

    /// Sort release contents for deterministic serialization.
    pub fn sort(&mut self) {
        let prelude_name = self.config.prelude_name.clone();
        for release in self.data.releases.values_mut() {
            if let Some(modules) = release.modules.as_mut() {
                modules.sort_by(|a, b| a.name().cmp(b.name()));
            }
            if let Some(plugins) = release.plugins.as_mut() {
                for list in plugins.values_mut() {
                    list.sort_by(|a, b| a.name().cmp(b.name()));
                }
            }
            if let Some(fragments) = release.fragments.as_mut() {
                fragments.sort();
            }
            if let Some(changes) = release.changes.as_mut() {
                for (section, content) in changes.iter_mut() {
                    if section != &prelude_name {
                        if let SectionContent::Entries(lines) = content {
                            lines.sort();
                        }
                    }
                }
            }
        }
    }

    /// Union several combined stores into one.
    ///
    /// The oldest ancestor wins; a version appearing in more than one store
    /// resolves last-store-wins with a warning. Callers are responsible for
    /// keeping the inputs disjoint.
    pub fn concatenate(stores: &[Changes]) -> Result<Changes> {
        let last = stores.last().ok_or(ChangesError::NothingToConcatenate)?;

        let mut data = ChangesFile::default();
        for store in stores {
            for (version, release) in &store.data.releases {
                if data.releases.contains_key(version) {
                    warn!(version, "version appears in multiple stores, keeping the later one");
                }
                data.releases.insert(version.clone(), release.clone());
            }
            if let Some(store_ancestor) = store.ancestor() {
                data.ancestor = match data.ancestor.take() {
                    None => Some(store_ancestor.to_string()),
                    Some(ancestor) => {
                        if last.scheme.compare(&ancestor, store_ancestor)?
                            == std::cmp::Ordering::Greater
                        {
                            Some(store_ancestor.to_string())
                        } else {
                            Some(ancestor)
                        }
                    }
                };
            }
        }

        Changes::from_data(&last.config, &last.path, data)
    }

    /// Build a plugin resolver for this store.
    ///
    /// The combined format resolves from embedded records; the classic format
    /// resolves names against the supplied universe, silently skipping
    /// anything no longer known.
    pub fn plugin_resolver(&self, plugins: Option<&[PluginDescription]>) -> PluginResolver {
        match self.format {
            ChangesFormat::Combined => PluginResolver::Embedded,
            ChangesFormat::Classic => {
                let mut by_type: BTreeMap<String, BTreeMap<String, PluginRecord>> = BTreeMap::new();
                for plugin in plugins.unwrap_or_default() {
                    by_type
                        .entry(plugin.plugin_type.clone())
                        .or_default()
                        .insert(plugin.name.clone(), plugin.record());
                }
                PluginResolver::ByName(by_type)
            }
        }
    }

    /// Build a fragment resolver for this store.
    pub fn fragment_resolver(&self, fragments: Option<&[Fragment]>) -> FragmentResolver {
        match self.format {
            ChangesFormat::Combined => FragmentResolver::Embedded,
            ChangesFormat::Classic => {
                let by_name = fragments
                    .unwrap_or_default()
                    .iter()
                    .map(|fragment| (fragment.name.clone(), fragment.clone()))
                    .collect();
                FragmentResolver::ByName(by_name)
            }
        }
    }

    fn release_mut(&mut self, version: &str) -> Result<&mut ReleaseEntry> {
        self.data
            .releases
            .get_mut(version)
            .ok_or_else(|| ChangesError::UnknownRelease(version.to_string()).into())
    }

    fn rebuild_known_sets(&mut self) {
        self.known_plugins.clear();
        self.known_fragments.clear();

        for release in self.data.releases.values() {
            if let Some(modules) = &release.modules {
                for module in modules {
                    self.known_plugins.insert(format!("module/{}", module.name()));
                }
            }
            if let Some(plugins) = &release.plugins {
                for (plugin_type, list) in plugins {
                    for plugin in list {
                        self.known_plugins
                            .insert(format!("{plugin_type}/{}", plugin.name()));
                    }
                }
            }
            if self.format == ChangesFormat::Classic {
                if let Some(fragments) = &release.fragments {
                    self.known_fragments.extend(fragments.iter().cloned());
                }
            }
        }
    }
}

fn serde_error(path: &Path) -> impl FnOnce(serde_yaml::Error) -> ChangesError + '_ {
    move |e| ChangesError::ParseFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Resolves a release to the plugin records it introduced.
pub enum PluginResolver {
    /// Resolve bare names against a supplied universe (classic)
    ByName(BTreeMap<String, BTreeMap<String, PluginRecord>>),
    /// Read records embedded in the release (combined)
    Embedded,
}

impl PluginResolver {
    /// Plugin type to the records added in this release. Unresolvable names
    /// mean "no longer known" and are skipped.
    pub fn resolve(&self, release: &ReleaseEntry) -> BTreeMap<String, Vec<PluginRecord>> {
        let mut result: BTreeMap<String, Vec<PluginRecord>> = BTreeMap::new();

        let mut push = |plugin_type: &str, entry: &PluginEntry| {
            let record = match (self, entry) {
                (Self::Embedded, PluginEntry::Record(record)) => Some(record.clone()),
                (Self::ByName(universe), entry) => universe
                    .get(plugin_type)
                    .and_then(|names| names.get(entry.name()))
                    .cloned(),
                (Self::Embedded, PluginEntry::Name(_)) => None,
            };
            if let Some(record) = record {
                result.entry(plugin_type.to_string()).or_default().push(record);
            }
        };

        if let Some(modules) = &release.modules {
            for module in modules {
                push("module", module);
            }
        }
        if let Some(plugins) = &release.plugins {
            for (plugin_type, list) in plugins {
                for plugin in list {
                    push(plugin_type, plugin);
                }
            }
        }

        result
    }
}

/// Resolves a release to the fragments it incorporated.
pub enum FragmentResolver {
    /// Resolve fragment names against a supplied universe (classic)
    ByName(BTreeMap<String, Fragment>),
    /// Synthesize one fragment from the embedded merged content (combined)
    Embedded,
}

impl FragmentResolver {
    /// The fragments contributing to this release. Unresolvable names are
    /// skipped.
    pub fn resolve(&self, release: &ReleaseEntry) -> Vec<Fragment> {
        match self {
            Self::ByName(universe) => release
                .fragments
                .iter()
                .flatten()
                .filter_map(|name| universe.get(name).cloned())
                .collect(),
            Self::Embedded => match &release.changes {
                Some(changes) => vec![Fragment::from_content(Path::new(""), changes.clone())],
                None => Vec::new(),
            },
        }
    }
}

/// Open the changes store described by the configuration.
pub fn load_changes(paths: &PathsConfig, config: &ChangelogConfig) -> Result<Changes> {
    Changes::new(config, &paths.changes_path(config))
}

/// Cut a release: register it with its plugins and fragments, save the store,
/// and delete merged fragment files unless configured to keep them.
pub fn add_release(
    config: &ChangelogConfig,
    changes: &mut Changes,
    plugins: &[PluginDescription],
    fragments: &[Fragment],
    version: &str,
    codename: Option<&str>,
    date: NaiveDate,
) -> Result<()> {
    let scheme = config.version_scheme()?;
    scheme.validate(version)?;
    info!(
        version,
        kind = if scheme.is_stable(version)? { "release" } else { "pre-release" },
        "cutting release"
    );

    // only plugins first added in this release belong to it
    let added_here = |plugin: &&PluginDescription| match &plugin.version_added {
        Some(added) => {
            version == added
                || version.starts_with(&format!("{added}."))
                || version.starts_with(&format!("{added}-"))
                || version.starts_with(&format!("{added}+"))
        }
        None => false,
    };

    changes.add_release(version, codename, date)?;

    for plugin in plugins.iter().filter(added_here) {
        changes.add_plugin(plugin, version)?;
    }

    let mut merged = Vec::new();
    for fragment in fragments {
        if changes.add_fragment(fragment, version)? {
            merged.push(fragment);
        }
    }

    changes.save()?;

    if !config.keep_fragments() {
        for fragment in merged {
            fragment.remove();
        }
    }

    Ok(())
}
