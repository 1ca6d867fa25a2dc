//! Standard exit codes for CLI operations

#![allow(dead_code)]

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Configuration error - blank required field, bad endpoint, bad identity
pub const CONFIG_ERROR: i32 = 2;

/// Manifest error - malformed or incompatible descriptor
pub const MANIFEST_ERROR: i32 = 3;

/// Execution error - deployment script failed or timed out
pub const EXECUTION_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid arguments or options (sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
