use crate::cli::args::LogArgs;
use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. Stdout is reserved for the game protocol.
///
/// `RUST_LOG` wins when set; otherwise the level comes from `-v`/`-q`.
pub fn init(log: &LogArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log.default_directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
