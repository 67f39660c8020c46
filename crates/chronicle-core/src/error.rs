//! Error types for Chronicle

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ChronicleError
pub type Result<T> = std::result::Result<T, ChronicleError>;

/// Main error type for Chronicle operations
#[derive(Debug, Error)]
pub enum ChronicleError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Version-related errors
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Fragment-related errors
    #[error(transparent)]
    Fragment(#[from] FragmentError),

    /// Changes-store-related errors
    #[error(transparent)]
    Changes(#[from] ChangesError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// No changelog directory found from the starting directory upwards
    #[error("No changelog directory found starting from {0}")]
    NoChangelogDir(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Version-related errors
#[derive(Debug, Error)]
pub enum VersionError {
    /// Failed to parse version
    #[error("Failed to parse version '{0}': {1}")]
    ParseFailed(String, String),

    /// Version format matched neither the release nor the pre-release pattern
    #[error("Unsupported version format: {0}")]
    InvalidFormat(String),

    /// No releases in the store
    #[error("The changes store contains no releases")]
    NoReleases,

    /// Semver error
    #[error("Semver error: {0}")]
    Semver(#[from] semver::Error),
}

/// Fragment-related errors
#[derive(Debug, Error)]
pub enum FragmentError {
    /// Failed to parse a fragment file
    #[error("Failed to parse fragment {path}: {message}")]
    ParseFailed { path: PathBuf, message: String },

    /// Fragment directory not found
    #[error("Fragment directory not found at {0}")]
    DirNotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Changes-store-related errors
#[derive(Debug, Error)]
pub enum ChangesError {
    /// Failed to parse the changes file
    #[error("Failed to parse changes file {path}: {message}")]
    ParseFailed { path: PathBuf, message: String },

    /// A second prelude was merged into the same release
    #[error("Fragment {fragment} adds a second prelude section \"{section}\" to release {version}")]
    DuplicatePrelude {
        fragment: String,
        section: String,
        version: String,
    },

    /// A fragment section key is not part of the configured section set
    #[error("Fragment {fragment} contains unknown section \"{section}\"")]
    UnknownSection { fragment: String, section: String },

    /// A release referenced by an operation does not exist
    #[error("Release {0} does not exist in the changes store")]
    UnknownRelease(String),

    /// Concatenation requires at least one store
    #[error("Cannot concatenate an empty list of changes stores")]
    NothingToConcatenate,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChronicleError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }
}
