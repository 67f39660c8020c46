//! Lint-changelog command

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use chronicle_core::config::PathsConfig;
use chronicle_changelog::lint_changelog_file;

use crate::cli::Cli;

use super::lint::report_findings;

/// Lint a combined changelog file
#[derive(Debug, Args)]
pub struct LintChangelogCommand {
    /// Changelog file to lint (defaults to the configured changes file)
    pub path: Option<PathBuf>,
}

impl LintChangelogCommand {
    /// Execute the lint-changelog command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<i32> {
        info!("executing lint-changelog command");
        let cwd = std::env::current_dir()?;
        let paths = PathsConfig::detect(&cwd)?;
        let config = paths.load_config()?;

        let path = match &self.path {
            Some(path) => path.clone(),
            None => paths.changes_path(&config),
        };

        let findings = lint_changelog_file(&path, &config);
        report_findings(cli, findings)
    }
}
