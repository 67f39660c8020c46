//! Chronicle Core - Foundation for the Chronicle changelog engine
//!
//! This crate provides error handling, path/changelog configuration, and the
//! version-comparator strategies shared by the changelog store and generator.

pub mod config;
pub mod error;
pub mod version;

pub use config::{ChangelogConfig, ChangesFormat, PathsConfig};
pub use error::{ChangesError, ChronicleError, ConfigError, FragmentError, Result, VersionError};
pub use version::VersionScheme;
