//! Stable exit codes for session CLI commands.

/// Command succeeded; for `session gate`, the setup is active.
pub const OK: i32 = 0;
/// Command failed due to invalid config, input files or other errors.
pub const INVALID: i32 = 1;
/// `session gate` is outside the setup's active window.
pub const SLEEP: i32 = 2;
/// `session gate` found the reward cap reached.
pub const HYDRATED: i32 = 3;
