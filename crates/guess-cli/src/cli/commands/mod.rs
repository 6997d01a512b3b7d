#[cfg(target_os = "linux")]
pub mod arena;
pub mod judge;
pub mod play;
