//! Chronicle Changelog - the changelog store and generation engine
//!
//! This crate owns the persistent changes store (classic and combined
//! formats), change fragments and their linting, the release-bucketing
//! generator, and the RST document builder.

pub mod changes;
pub mod fragment;
pub mod generator;
pub mod linter;
pub mod plugins;
pub mod rst;

pub use changes::{add_release, load_changes, Changes, ChangesFile, PluginEntry, ReleaseEntry};
pub use fragment::{load_fragments, Fragment, SectionContent};
pub use generator::{generate_changelog, ChangelogGenerator, ReleaseBucket};
pub use linter::{lint_changelog_file, FragmentLinter, LintFinding};
pub use plugins::{load_plugin_list, PluginCache, PluginDescription, PluginRecord, PluginSource};
pub use rst::RstBuilder;
