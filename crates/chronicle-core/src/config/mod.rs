//! Configuration for paths and changelogs

mod loader;
mod types;

pub use loader::PathsConfig;
pub use types::{ChangelogConfig, ChangesFormat, DEFAULT_SECTIONS};
