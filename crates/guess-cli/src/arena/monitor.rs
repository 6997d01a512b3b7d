use crate::cgroup::read_u64;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::trace;

pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(10);

/// Polls each `memory.current` file until `stop` flips (or its sender is
/// dropped) and returns the highest value seen per file.
///
/// Short-lived children can exit before `memory.peak` is worth reading on
/// older kernels; the sampled peak covers that gap.
pub fn spawn_sampler(paths: Vec<PathBuf>, mut stop: watch::Receiver<bool>) -> JoinHandle<Vec<u64>> {
    tokio::spawn(async move {
        let mut peaks = vec![0u64; paths.len()];
        let mut ticker = tokio::time::interval(SAMPLE_INTERVAL);
        loop {
            tokio::select! {
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    for (peak, path) in peaks.iter_mut().zip(&paths) {
                        if let Some(v) = read_u64(path) {
                            if v > *peak {
                                *peak = v;
                                trace!(path = %path.display(), bytes = v, "new memory peak");
                            }
                        }
                    }
                }
            }
        }
        peaks
    })
}
