//! Shared plumbing for the `judger`, `player` and `arena` binaries.

#[cfg(target_os = "linux")]
pub mod arena;
#[cfg(target_os = "linux")]
pub mod cgroup;
pub mod cli;
pub mod exit_codes;
pub mod logging;
