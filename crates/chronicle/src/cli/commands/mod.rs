//! CLI commands

mod generate;
mod init;
mod lint;
mod lint_changelog;
mod release;

pub use generate::GenerateCommand;
pub use init::InitCommand;
pub use lint::LintCommand;
pub use lint_changelog::LintChangelogCommand;
pub use release::ReleaseCommand;
