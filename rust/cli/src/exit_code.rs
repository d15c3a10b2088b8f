//! Process exit codes returned by [`crate::run`].

/// Command completed.
pub const SUCCESS: i32 = 0;

/// Any failure: bad arguments, invalid configuration, unreadable input.
pub const ERROR: i32 = 2;

/// Stopped early, same as a shell reports for Ctrl+C.
pub const INTERRUPTED: i32 = 130;
