//! Init command

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use chronicle_core::config::{ChangelogConfig, PathsConfig};

use crate::cli::output;
use crate::cli::Cli;
use crate::exit_codes;

/// Set up the changelog directory and configuration
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Base directory of the checkout (defaults to the current directory)
    pub path: Option<PathBuf>,

    /// Set up a product-core layout instead of a collection layout
    #[arg(long)]
    pub product: bool,

    /// Title used in generated release notes
    #[arg(short, long)]
    pub title: Option<String>,

    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<i32> {
        info!(product = self.product, force = self.force, "executing init command");
        let base_dir = match &self.path {
            Some(path) => path.clone(),
            None => std::env::current_dir()?,
        };

        let paths = if self.product {
            PathsConfig::force_product(&base_dir)
        } else {
            PathsConfig::force_collection(&base_dir)
        };

        if paths.config_path.exists() && !self.force {
            anyhow::bail!(
                "Configuration file already exists at {}. Use --force to overwrite.",
                paths.config_path.display()
            );
        }

        let config = if self.product {
            ChangelogConfig::default_product()
        } else {
            ChangelogConfig::default_collection(self.title.clone())
        };

        std::fs::create_dir_all(paths.fragments_dir(&config))?;
        config.store(&paths.config_path)?;

        if !cli.quiet {
            output::success(&format!(
                "Created configuration at {}",
                output::path_style().apply_to(paths.config_path.display())
            ));
            println!();
            println!("Next steps:");
            println!(
                "  1. Add change fragments under {}",
                paths.fragments_dir(&config).display()
            );
            println!(
                "  2. Run {} to check them",
                style("chronicle lint").cyan()
            );
            println!(
                "  3. Run {} to cut your first release",
                style("chronicle release --version 1.0.0").cyan()
            );
        }

        Ok(exit_codes::SUCCESS)
    }
}
