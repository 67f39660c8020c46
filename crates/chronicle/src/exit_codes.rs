//! Exit codes for the CLI

#![allow(dead_code)]

/// Success
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Version error
pub const VERSION_ERROR: i32 = 3;

/// Lint findings were reported
pub const LINT_FINDINGS: i32 = 5;
