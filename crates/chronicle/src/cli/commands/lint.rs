//! Lint command

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use chronicle_core::config::PathsConfig;
use chronicle_changelog::fragment::load_raw;
use chronicle_changelog::{FragmentLinter, LintFinding};

use crate::cli::{Cli, OutputFormat};
use crate::exit_codes;

/// Lint change fragments
#[derive(Debug, Args)]
pub struct LintCommand {
    /// Specific fragment files to lint (defaults to the whole notes directory)
    pub paths: Vec<PathBuf>,
}

impl LintCommand {
    /// Execute the lint command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<i32> {
        info!(explicit_paths = self.paths.len(), "executing lint command");
        let cwd = std::env::current_dir()?;
        let paths = PathsConfig::detect(&cwd)?;
        let config = paths.load_config()?;
        let linter = FragmentLinter::new(&config);

        let files = if self.paths.is_empty() {
            fragment_files(&paths.fragments_dir(&config))?
        } else {
            self.paths.clone()
        };

        if cli.verbose && !cli.quiet {
            println!("Linting {} fragment file(s)", files.len());
        }

        let mut findings = Vec::new();
        for path in &files {
            match load_raw(path) {
                Ok(value) => findings.extend(linter.lint(path, &value)),
                // files that do not parse are lint findings, not failures
                Err(e) => findings.push(LintFinding {
                    path: path.clone(),
                    line: 0,
                    column: 0,
                    message: e.to_string(),
                }),
            }
        }

        report_findings(cli, findings)
    }
}

/// All non-hidden files in the notes directory, sorted.
fn fragment_files(dir: &std::path::Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Ok(files);
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if entry.path().is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Print lint findings and translate them into an exit code.
pub(crate) fn report_findings(cli: &Cli, mut findings: Vec<LintFinding>) -> anyhow::Result<i32> {
    findings.sort_by(|a, b| (&a.path, &a.message).cmp(&(&b.path, &b.message)));

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&findings)?);
        }
        OutputFormat::Text => {
            for finding in &findings {
                println!("{finding}");
            }
        }
    }

    if findings.is_empty() {
        Ok(exit_codes::SUCCESS)
    } else {
        Ok(exit_codes::LINT_FINDINGS)
    }
}
