//! Generate command

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use chronicle_core::config::{ChangesFormat, PathsConfig};
use chronicle_changelog::{generate_changelog, load_changes, load_fragments, load_plugin_list};

use crate::cli::output;
use crate::cli::Cli;
use crate::exit_codes;

/// Regenerate the release-notes document
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// YAML file listing the plugin universe
    #[arg(long, value_name = "FILE")]
    pub plugins: Option<PathBuf>,

    /// Render full module names instead of nesting by namespace
    #[arg(long)]
    pub flatmap: Option<bool>,
}

impl GenerateCommand {
    /// Execute the generate command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<i32> {
        info!("executing generate command");
        let cwd = std::env::current_dir()?;
        let paths = PathsConfig::detect(&cwd)?;
        let config = paths.load_config()?;

        let mut changes = load_changes(&paths, &config)?;
        if !changes.has_release() {
            if !cli.quiet {
                output::warning("No releases found, nothing to generate.");
            }
            return Ok(exit_codes::SUCCESS);
        }

        let plugins = match &self.plugins {
            Some(path) => Some(load_plugin_list(path)?),
            None => None,
        };

        // classic stores resolve fragments by name; unreadable ones are
        // reported and skipped
        let fragments = if config.changes_format == ChangesFormat::Classic {
            let mut errors = Vec::new();
            let fragments = load_fragments(&paths, &config, None, Some(&mut errors))?;
            for (path, error) in &errors {
                if !cli.quiet {
                    output::warning(&format!("Skipping {}: {}", path.display(), error));
                }
            }
            Some(fragments)
        } else {
            None
        };

        let flatmap = self.flatmap.unwrap_or(paths.is_collection);
        let path = generate_changelog(
            &paths,
            &config,
            &mut changes,
            plugins.as_deref(),
            None,
            fragments.as_deref(),
            flatmap,
        )?;

        if !cli.quiet {
            output::success(&format!(
                "Changelog written to {}",
                output::path_style().apply_to(path.display())
            ));
        }

        Ok(exit_codes::SUCCESS)
    }
}
