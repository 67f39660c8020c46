//! Release command

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use tracing::info;

use chronicle_core::config::{ChangesFormat, PathsConfig};
use chronicle_changelog::{
    add_release, generate_changelog, load_changes, load_fragments, load_plugin_list, PluginCache,
};

use crate::cli::output;
use crate::cli::Cli;
use crate::exit_codes;

/// Cut a release from the pending change fragments
#[derive(Debug, Args)]
pub struct ReleaseCommand {
    /// Version to release
    #[arg(long)]
    pub version: String,

    /// Release codename
    #[arg(long)]
    pub codename: Option<String>,

    /// Release date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub date: Option<String>,

    /// YAML file listing the plugin universe for this release
    #[arg(long, value_name = "FILE")]
    pub plugins: Option<PathBuf>,
}

impl ReleaseCommand {
    /// Execute the release command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<i32> {
        info!(version = %self.version, "executing release command");
        let cwd = std::env::current_dir()?;
        let paths = PathsConfig::detect(&cwd)?;
        let config = paths.load_config()?;

        let date = match &self.date {
            Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")?,
            None => chrono::Local::now().date_naive(),
        };

        // a fragment that does not parse fails the release outright
        let fragments = load_fragments(&paths, &config, None, None)?;

        let plugins = match &self.plugins {
            Some(path) => Some(load_plugin_list(path)?),
            None => None,
        };
        // classic stores resolve plugin names on later regenerations through
        // the version-keyed cache
        if config.changes_format == ChangesFormat::Classic {
            if let Some(plugins) = &plugins {
                PluginCache::new(&paths.plugin_cache_path()).store(&self.version, plugins)?;
            }
        }

        let mut changes = load_changes(&paths, &config)?;
        add_release(
            &config,
            &mut changes,
            plugins.as_deref().unwrap_or_default(),
            &fragments,
            &self.version,
            self.codename.as_deref(),
            date,
        )?;

        let fragment_universe = if config.changes_format == ChangesFormat::Classic {
            Some(fragments.as_slice())
        } else {
            None
        };
        let path = generate_changelog(
            &paths,
            &config,
            &mut changes,
            plugins.as_deref(),
            None,
            fragment_universe,
            paths.is_collection,
        )?;

        if !cli.quiet {
            output::success(&format!(
                "Released {} and wrote {}",
                output::version_style().apply_to(&self.version),
                output::path_style().apply_to(path.display())
            ));
        }

        Ok(exit_codes::SUCCESS)
    }
}
