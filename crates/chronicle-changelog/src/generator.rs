//! Release-notes generation
//!
//! Walks the changes store newest to oldest, folds pre-releases into the
//! stable release that follows them, and renders the resulting buckets
//! through the RST builder.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, info, instrument};

use chronicle_core::config::{ChangelogConfig, ChangesFormat, PathsConfig};
use chronicle_core::error::Result;

use crate::changes::{Changes, FragmentResolver, PluginResolver};
use crate::fragment::{Fragment, SectionContent};
use crate::plugins::{PluginCache, PluginDescription, PluginRecord, PluginSource};
use crate::rst::RstBuilder;

/// Working accumulation target for one rendered changelog entry, keyed by the
/// version whose heading it will be rendered under.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseBucket {
    pub version: String,
    /// Winning prelude text and the version that contributed it
    pub prelude: Option<String>,
    pub prelude_version: Option<String>,
    /// Non-prelude section entries in encounter order, duplicates kept
    pub sections: BTreeMap<String, Vec<String>>,
    pub modules: Vec<PluginRecord>,
    pub plugins: BTreeMap<String, Vec<PluginRecord>>,
}

impl ReleaseBucket {
    fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            prelude: None,
            prelude_version: None,
            sections: BTreeMap::new(),
            modules: Vec::new(),
            plugins: BTreeMap::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.prelude.is_none()
            && self.sections.is_empty()
            && self.modules.is_empty()
            && self.plugins.is_empty()
    }
}

/// Generates the release-notes document from a changes store.
pub struct ChangelogGenerator<'a> {
    config: &'a ChangelogConfig,
    changes: &'a Changes,
    plugin_resolver: PluginResolver,
    fragment_resolver: FragmentResolver,
    flatmap: bool,
}

impl<'a> ChangelogGenerator<'a> {
    /// Create a generator.
    ///
    /// Plugins and fragments are only needed for classic stores; a combined
    /// store resolves everything from its embedded records.
    pub fn new(
        config: &'a ChangelogConfig,
        changes: &'a Changes,
        plugins: Option<&[PluginDescription]>,
        fragments: Option<&[Fragment]>,
        flatmap: bool,
    ) -> Self {
        Self {
            config,
            changes,
            plugin_resolver: changes.plugin_resolver(plugins),
            fragment_resolver: changes.fragment_resolver(fragments),
            flatmap,
        }
    }

    /// Versions of interest, newest first, in `(after_version, until_version]`.
    fn collect_versions(
        &self,
        after_version: Option<&str>,
        until_version: Option<&str>,
    ) -> Result<Vec<String>> {
        let scheme = self.changes.scheme();
        let mut result = Vec::new();
        for version in scheme.sort_desc(self.changes.releases().keys().map(String::as_str))? {
            if let Some(after) = after_version {
                if scheme.compare(&version, after)? != std::cmp::Ordering::Greater {
                    continue;
                }
            }
            if let Some(until) = until_version {
                if scheme.compare(&version, until)? == std::cmp::Ordering::Greater {
                    continue;
                }
            }
            result.push(version);
        }
        Ok(result)
    }

    /// Fold the selected versions into ordered release buckets, newest first.
    #[instrument(skip(self))]
    pub fn collect(
        &self,
        squash: bool,
        after_version: Option<&str>,
        until_version: Option<&str>,
    ) -> Result<Vec<ReleaseBucket>> {
        let versions = self.collect_versions(after_version, until_version)?;
        if versions.is_empty() {
            return Ok(Vec::new());
        }

        let scheme = self.changes.scheme();
        let mut bucket_key = match until_version {
            Some(until) => until.to_string(),
            None => self.changes.latest_version()?,
        };
        let mut buckets: Vec<ReleaseBucket> = Vec::new();

        for version in &versions {
            let release = &self.changes.releases()[version];

            if !squash {
                if scheme.is_stable(version)? {
                    // a stable release owns its own bucket
                    bucket_key = version.clone();
                } else if !scheme.is_stable(&bucket_key)? {
                    // pre-releases with no stable release above them each get
                    // their own bucket; below a stable release they fold in
                    bucket_key = version.clone();
                }
            }

            if buckets.last().map(|b| b.version.as_str()) != Some(bucket_key.as_str()) {
                buckets.push(ReleaseBucket::new(&bucket_key));
            }
            let Some(bucket) = buckets.last_mut() else {
                continue;
            };

            for fragment in self.fragment_resolver.resolve(release) {
                for (section, content) in &fragment.content {
                    if section == &self.config.prelude_name {
                        if let Some(winner) = &bucket.prelude_version {
                            info!(
                                version = %version,
                                winner = %winner,
                                "skipping prelude due to newer prelude"
                            );
                            continue;
                        }
                        bucket.prelude = Some(match content {
                            SectionContent::Prose(text) => text.clone(),
                            SectionContent::Entries(lines) => lines.join("\n"),
                        });
                        bucket.prelude_version = Some(version.clone());
                    } else {
                        let dest = bucket.sections.entry(section.clone()).or_default();
                        match content {
                            SectionContent::Entries(lines) => dest.extend(lines.iter().cloned()),
                            SectionContent::Prose(text) => dest.push(text.clone()),
                        }
                    }
                }
            }

            let mut resolved = self.plugin_resolver.resolve(release);
            if let Some(modules) = resolved.remove("module") {
                bucket.modules.extend(modules);
            }
            for (plugin_type, list) in resolved {
                bucket.plugins.entry(plugin_type).or_default().extend(list);
            }
        }

        debug!(bucket_count = buckets.len(), "release buckets collected");
        Ok(buckets)
    }

    /// Append the selected releases to an RST builder.
    pub fn generate_to(
        &self,
        builder: &mut RstBuilder,
        start_level: usize,
        squash: bool,
        after_version: Option<&str>,
        until_version: Option<&str>,
    ) -> Result<()> {
        for bucket in self.collect(squash, after_version, until_version)? {
            if !squash {
                builder.add_section(&format!("v{}", bucket.version), start_level);
            }
            if bucket.is_empty() {
                continue;
            }

            for (section_name, section_title) in self.config.all_sections() {
                if section_name == self.config.prelude_name {
                    if let Some(prelude) = &bucket.prelude {
                        builder.add_section(section_title, start_level + 1);
                        builder.add_raw_rst(prelude);
                        builder.add_raw_rst("");
                    }
                    continue;
                }
                if let Some(entries) = bucket.sections.get(section_name) {
                    builder.add_section(section_title, start_level + 1);
                    let mut sorted = entries.clone();
                    sorted.sort();
                    for entry in sorted {
                        builder.add_list_item(&entry);
                    }
                    builder.add_raw_rst("");
                }
            }

            add_plugins(builder, &bucket.plugins, start_level);
            add_modules(builder, &bucket.modules, self.flatmap, start_level);
        }
        Ok(())
    }

    /// Generate the complete release-notes document.
    #[instrument(skip(self))]
    pub fn generate(&self) -> Result<String> {
        let latest_version = self.changes.latest_version()?;
        let codename = self.changes.releases()[&latest_version].codename.clone();
        let major_minor = truncate_version(
            &latest_version,
            self.config.changelog_filename_version_depth,
        );

        let mut builder = RstBuilder::new();
        let mut title_parts: Vec<&str> = Vec::new();
        if let Some(title) = &self.config.title {
            title_parts.push(title);
        }
        if !major_minor.is_empty() {
            title_parts.push(&major_minor);
        }
        let quoted;
        if let Some(codename) = &codename {
            quoted = format!("\"{codename}\"");
            title_parts.push(&quoted);
        }
        title_parts.push("Release Notes");
        builder.set_title(&title_parts.join(" "));

        builder.add_raw_rst(".. contents:: Topics\n");

        if self.config.mention_ancestor {
            if let Some(ancestor) = self.changes.ancestor() {
                builder.add_raw_rst(&format!(
                    "This changelog describes changes after version {ancestor}.\n"
                ));
            } else {
                builder.add_raw_rst("");
            }
        } else {
            builder.add_raw_rst("");
        }

        self.generate_to(&mut builder, 0, false, None, None)?;

        Ok(builder.generate())
    }
}

fn add_plugins(
    builder: &mut RstBuilder,
    plugins: &BTreeMap<String, Vec<PluginRecord>>,
    start_level: usize,
) {
    let mut have_section = false;

    for (plugin_type, list) in plugins {
        if list.is_empty() {
            continue;
        }
        if !have_section {
            have_section = true;
            builder.add_section("New Plugins", start_level + 1);
        }
        builder.add_section(&title_case(plugin_type), start_level + 2);

        let mut sorted: Vec<&PluginRecord> = list.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        for plugin in sorted {
            builder.add_list_item(&format!("{} - {}", plugin.name, plugin.description));
        }
        builder.add_raw_rst("");
    }
}

fn add_modules(
    builder: &mut RstBuilder,
    modules: &[PluginRecord],
    flatmap: bool,
    start_level: usize,
) {
    if modules.is_empty() {
        return;
    }

    let mut by_namespace: BTreeMap<String, Vec<&PluginRecord>> = BTreeMap::new();
    let mut sorted: Vec<&PluginRecord> = modules.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    for module in sorted {
        by_namespace
            .entry(module.namespace.clone().unwrap_or_default())
            .or_default()
            .push(module);
    }

    let mut previous_section: Option<String> = None;
    for (namespace, modules) in &by_namespace {
        let mut parts = namespace.split('.');
        let section = title_case(&parts.next().unwrap_or_default().replace('_', " "));
        let subsection = parts.collect::<Vec<_>>().join(".");

        if previous_section.is_none() {
            builder.add_section("New Modules", start_level + 1);
        }
        if previous_section.as_deref() != Some(section.as_str()) && !section.is_empty() {
            builder.add_section(&section, start_level + 2);
        }
        previous_section = Some(section);

        if !subsection.is_empty() {
            builder.add_section(&subsection, start_level + 3);
        }

        for module in modules {
            let name = if !flatmap && !namespace.is_empty() {
                format!("{namespace}.{}", module.name)
            } else {
                module.name.clone()
            };
            builder.add_list_item(&format!("{} - {}", name, module.description));
        }
        builder.add_raw_rst("");
    }
}

/// Title-case each space-separated word.
fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep the first `depth` dotted components of a version; depth 0 keeps none.
fn truncate_version(version: &str, depth: usize) -> String {
    version
        .split('.')
        .take(depth)
        .collect::<Vec<_>>()
        .join(".")
}

/// Generate the release-notes document and write it next to the store.
///
/// When a fresh plugin or fragment universe is supplied, stale references are
/// pruned from the store first and the store is saved. A classic store with
/// no explicit plugin list reloads the universe through the metadata
/// collaborator, keyed by the latest version with on-disk caching; with no
/// collaborator either, a still-valid cache is used as-is.
pub fn generate_changelog(
    paths: &PathsConfig,
    config: &ChangelogConfig,
    changes: &mut Changes,
    plugins: Option<&[PluginDescription]>,
    plugin_source: Option<&dyn PluginSource>,
    fragments: Option<&[Fragment]>,
    flatmap: bool,
) -> Result<PathBuf> {
    let plugins = match plugins {
        Some(list) => Some(list.to_vec()),
        None if config.changes_format == ChangesFormat::Classic => {
            let cache = PluginCache::new(&paths.plugin_cache_path());
            let version = changes.latest_version()?;
            match plugin_source {
                Some(source) => Some(cache.load_plugins(source, &version, false)?),
                None => cache.cached(&version)?,
            }
        }
        None => None,
    };

    if plugins.is_some() || fragments.is_some() {
        if let Some(plugins) = &plugins {
            changes.prune_plugins(plugins);
        }
        if let Some(fragments) = fragments {
            changes.prune_fragments(fragments);
        }
        changes.save()?;
    }

    let major_minor = truncate_version(
        &changes.latest_version()?,
        config.changelog_filename_version_depth,
    );
    let filename = if config.changelog_filename_template.contains("%s") {
        config
            .changelog_filename_template
            .replace("%s", &major_minor)
    } else {
        config.changelog_filename_template.clone()
    };
    let path = paths.changelog_dir.join(filename);

    let generator = ChangelogGenerator::new(config, changes, plugins.as_deref(), fragments, flatmap);
    let document = generator.generate()?;
    std::fs::write(&path, document)?;
    info!(path = %path.display(), "changelog written");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::Path;
    use tempfile::TempDir;

    use chronicle_core::config::ChangesFormat;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 2).unwrap()
    }

    fn fragment(name: &str, yaml: &str) -> Fragment {
        Fragment::from_content(Path::new(name), serde_yaml::from_str(yaml).unwrap())
    }

    fn store_with(
        temp: &TempDir,
        config: &ChangelogConfig,
        releases: &[(&str, &str)],
    ) -> Changes {
        let mut changes = Changes::new(config, &temp.path().join("changelog.yaml")).unwrap();
        for (version, yaml) in releases {
            changes.add_release(version, None, date()).unwrap();
            changes
                .add_fragment(&fragment(&format!("{version}.yml"), yaml), version)
                .unwrap();
        }
        changes
    }

    #[test]
    fn test_bucketing_folds_pre_releases_into_stable() {
        let temp = TempDir::new().unwrap();
        let config = ChangelogConfig::default();
        let changes = store_with(
            &temp,
            &config,
            &[
                ("1.0.0", "bugfixes:\n- base fix\n"),
                ("1.1.0-rc1", "bugfixes:\n- rc fix\n"),
                ("1.1.0", "bugfixes:\n- final fix\n"),
                ("1.2.0-rc1", "bugfixes:\n- next rc fix\n"),
            ],
        );

        let generator = ChangelogGenerator::new(&config, &changes, None, None, true);
        let buckets = generator.collect(false, None, None).unwrap();

        let keys: Vec<&str> = buckets.iter().map(|b| b.version.as_str()).collect();
        assert_eq!(keys, vec!["1.2.0-rc1", "1.1.0", "1.0.0"]);

        let stable = &buckets[1];
        assert_eq!(
            stable.sections["bugfixes"],
            vec!["final fix".to_string(), "rc fix".to_string()]
        );
        assert_eq!(buckets[0].sections["bugfixes"], vec!["next rc fix".to_string()]);
        assert_eq!(buckets[2].sections["bugfixes"], vec!["base fix".to_string()]);
    }

    #[test]
    fn test_leading_pre_releases_get_own_buckets() {
        let temp = TempDir::new().unwrap();
        let config = ChangelogConfig::default();
        let changes = store_with(
            &temp,
            &config,
            &[
                ("1.1.0-b1", "bugfixes:\n- beta fix\n"),
                ("1.1.0-rc1", "bugfixes:\n- rc fix\n"),
            ],
        );

        let generator = ChangelogGenerator::new(&config, &changes, None, None, true);
        let buckets = generator.collect(false, None, None).unwrap();

        let keys: Vec<&str> = buckets.iter().map(|b| b.version.as_str()).collect();
        assert_eq!(keys, vec!["1.1.0-rc1", "1.1.0-b1"]);
    }

    #[test]
    fn test_prelude_dedup_newest_wins() {
        let temp = TempDir::new().unwrap();
        let config = ChangelogConfig::default();
        let changes = store_with(
            &temp,
            &config,
            &[
                ("1.1.0-rc1", "release_summary: Candidate summary.\n"),
                ("1.1.0", "release_summary: Final summary.\n"),
            ],
        );

        let generator = ChangelogGenerator::new(&config, &changes, None, None, true);
        let buckets = generator.collect(false, None, None).unwrap();

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].prelude.as_deref(), Some("Final summary."));
        assert_eq!(buckets[0].prelude_version.as_deref(), Some("1.1.0"));
    }

    #[test]
    fn test_squash_merges_everything_into_one_bucket() {
        let temp = TempDir::new().unwrap();
        let config = ChangelogConfig::default();
        let changes = store_with(
            &temp,
            &config,
            &[
                ("1.0.0", "bugfixes:\n- old fix\n"),
                ("1.1.0", "bugfixes:\n- new fix\n"),
            ],
        );

        let generator = ChangelogGenerator::new(&config, &changes, None, None, true);
        let buckets = generator.collect(true, None, None).unwrap();

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].version, "1.1.0");
        assert_eq!(buckets[0].sections["bugfixes"].len(), 2);
    }

    #[test]
    fn test_version_bounds() {
        let temp = TempDir::new().unwrap();
        let config = ChangelogConfig::default();
        let changes = store_with(
            &temp,
            &config,
            &[
                ("1.0.0", "bugfixes:\n- a\n"),
                ("1.1.0", "bugfixes:\n- b\n"),
                ("1.2.0", "bugfixes:\n- c\n"),
            ],
        );

        let generator = ChangelogGenerator::new(&config, &changes, None, None, true);
        let buckets = generator.collect(false, Some("1.0.0"), Some("1.1.0")).unwrap();

        let keys: Vec<&str> = buckets.iter().map(|b| b.version.as_str()).collect();
        assert_eq!(keys, vec!["1.1.0"]);
    }

    #[test]
    fn test_end_to_end_document() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("project");
        let notes = base.join("changelogs").join("fragments");
        std::fs::create_dir_all(&notes).unwrap();
        let fragment_path = notes.join("1.0.0.yml");
        std::fs::write(&fragment_path, "release_summary: First release.\n").unwrap();

        let paths = PathsConfig::force_collection(&base);
        let config = ChangelogConfig::default_collection(Some("Demo".to_string()));
        let mut changes = crate::changes::load_changes(&paths, &config).unwrap();
        let fragments = vec![Fragment::load(&fragment_path).unwrap()];
        crate::changes::add_release(
            &config,
            &mut changes,
            &[],
            &fragments,
            "1.0.0",
            None,
            date(),
        )
        .unwrap();

        let path =
            generate_changelog(&paths, &config, &mut changes, None, None, None, true).unwrap();
        let document = std::fs::read_to_string(&path).unwrap();

        assert!(document.contains("Demo Release Notes"));
        assert!(document.contains("Release Summary\n---------------"));
        assert!(document.contains("First release."));
        assert!(!document.contains("New Plugins"));
        assert!(!document.contains("New Modules"));
        assert!(!fragment_path.exists());
    }

    #[test]
    fn test_plugin_and_module_rendering() {
        let temp = TempDir::new().unwrap();
        let config = ChangelogConfig::default();
        let mut changes =
            Changes::new(&config, &temp.path().join("changelog.yaml")).unwrap();
        changes.add_release("1.0.0", None, date()).unwrap();
        for (plugin_type, name, namespace) in [
            ("module", "archive", Some("files.compression")),
            ("module", "ping", Some("system")),
            ("lookup", "vault", None),
        ] {
            changes
                .add_plugin(
                    &PluginDescription {
                        plugin_type: plugin_type.to_string(),
                        name: name.to_string(),
                        namespace: namespace.map(str::to_string),
                        description: format!("The {name} plugin"),
                        version_added: Some("1.0.0".to_string()),
                    },
                    "1.0.0",
                )
                .unwrap();
        }

        let generator = ChangelogGenerator::new(&config, &changes, None, None, true);
        let mut builder = RstBuilder::new();
        generator.generate_to(&mut builder, 0, false, None, None).unwrap();
        let text = builder.generate();

        assert!(text.contains("New Plugins"));
        assert!(text.contains("Lookup\n~~~~~~"));
        assert!(text.contains("- vault - The vault plugin"));
        assert!(text.contains("New Modules"));
        assert!(text.contains("Files\n~~~~~"));
        assert!(text.contains("compression\n^^^^^^^^^^^"));
        assert!(text.contains("- archive - The archive plugin"));
        assert!(text.contains("System\n~~~~~~"));
    }

    #[test]
    fn test_flatmap_off_prefixes_namespace() {
        let temp = TempDir::new().unwrap();
        let config = ChangelogConfig::default();
        let mut changes =
            Changes::new(&config, &temp.path().join("changelog.yaml")).unwrap();
        changes.add_release("1.0.0", None, date()).unwrap();
        changes
            .add_plugin(
                &PluginDescription {
                    plugin_type: "module".to_string(),
                    name: "archive".to_string(),
                    namespace: Some("files".to_string()),
                    description: "Create archives".to_string(),
                    version_added: Some("1.0.0".to_string()),
                },
                "1.0.0",
            )
            .unwrap();

        let generator = ChangelogGenerator::new(&config, &changes, None, None, false);
        let mut builder = RstBuilder::new();
        generator.generate_to(&mut builder, 0, false, None, None).unwrap();
        assert!(builder.generate().contains("- files.archive - Create archives"));
    }

    #[test]
    fn test_classic_missing_fragment_silently_skipped() {
        let temp = TempDir::new().unwrap();
        let config = ChangelogConfig {
            is_collection: true,
            ..ChangelogConfig::default_product()
        };
        assert_eq!(config.changes_format, ChangesFormat::Classic);

        let mut changes =
            Changes::new(&config, &temp.path().join(".changes.yaml")).unwrap();
        changes.add_release("1.0.0", None, date()).unwrap();
        changes
            .add_fragment(&fragment("present.yml", "bugfixes:\n- kept\n"), "1.0.0")
            .unwrap();
        changes
            .add_fragment(&fragment("vanished.yml", "bugfixes:\n- gone\n"), "1.0.0")
            .unwrap();

        let universe = vec![fragment("present.yml", "bugfixes:\n- kept\n")];
        let generator =
            ChangelogGenerator::new(&config, &changes, None, Some(&universe), true);
        let buckets = generator.collect(false, None, None).unwrap();

        assert_eq!(buckets[0].sections["bugfixes"], vec!["kept".to_string()]);
    }

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

    fn classic_store_with_module(temp: &TempDir) -> (PathsConfig, ChangelogConfig, Changes, PluginDescription) {
        let base = temp.path().join("project");
        std::fs::create_dir_all(base.join("changelogs")).unwrap();
        let paths = PathsConfig::force_product(&base);
        let config = ChangelogConfig::default_product();

        let archive = PluginDescription {
            plugin_type: "module".to_string(),
            name: "archive".to_string(),
            namespace: Some("files".to_string()),
            description: "Create archives".to_string(),
            version_added: Some("1.0.0".to_string()),
        };
        let mut changes = crate::changes::load_changes(&paths, &config).unwrap();
        changes.add_release("1.0.0", None, date()).unwrap();
        changes.add_plugin(&archive, "1.0.0").unwrap();

        (paths, config, changes, archive)
    }

    #[test]
    fn test_classic_generate_without_list_reloads_plugins_from_cache() {
        let temp = TempDir::new().unwrap();
        let (paths, config, mut changes, archive) = classic_store_with_module(&temp);
        PluginCache::new(&paths.plugin_cache_path())
            .store("1.0.0", &[archive])
            .unwrap();

        let path =
            generate_changelog(&paths, &config, &mut changes, None, None, None, false).unwrap();
        let document = std::fs::read_to_string(&path).unwrap();

        assert!(document.contains("New Modules"));
        assert!(document.contains("- files.archive - Create archives"));
    }

    #[test]
    fn test_classic_generate_without_list_collects_plugins_from_source() {
        let temp = TempDir::new().unwrap();
        let (paths, config, mut changes, archive) = classic_store_with_module(&temp);
        let source = FixedSource {
            plugins: vec![archive],
            calls: std::cell::Cell::new(0),
        };

        let path = generate_changelog(
            &paths,
            &config,
            &mut changes,
            None,
            Some(&source),
            None,
            false,
        )
        .unwrap();
        let document = std::fs::read_to_string(&path).unwrap();

        assert!(document.contains("- files.archive - Create archives"));
        assert_eq!(source.calls.get(), 1);
        assert!(paths.plugin_cache_path().is_file());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("become"), "Become");
        assert_eq!(title_case("net tools"), "Net Tools");
    }

    #[test]
    fn test_truncate_version() {
        assert_eq!(truncate_version("2.10.3", 2), "2.10");
        assert_eq!(truncate_version("2.10.3", 0), "");
    }
}
