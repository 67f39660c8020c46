//! Output formatting utilities

use console::{style, Style};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

/// Style for paths
pub fn path_style() -> Style {
    Style::new().cyan()
}

/// Style for version numbers
pub fn version_style() -> Style {
    Style::new().green().bold()
}
