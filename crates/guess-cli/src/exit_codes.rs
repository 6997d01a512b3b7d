//! Exit codes for the guess binaries.
//! Every gameplay outcome (AC, WA, RE, a player giving up) exits with
//! SUCCESS; the verdict channel carries the result, not the status code.

pub const SUCCESS: i32 = 0;
pub const INTERNAL_ERROR: i32 = 2; // I/O failure, bad arguments, spawn failure
pub const TIMEOUT: i32 = 3; // Arena: match exceeded its deadline
pub const NO_VERDICT: i32 = 4; // Arena: judge exited without reporting
