use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

const CGROUP_MOUNT: &str = "/sys/fs/cgroup";

/// Limits written into each contestant's session before it joins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLimits {
    pub memory_max_mb: Option<u64>,
    /// Raw `cpu.max` value, e.g. `"100000 1000000"`.
    pub cpu_max: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CgroupStats {
    pub memory_peak_bytes: u64,
    pub cpu_user_usec: u64,
    pub cpu_system_usec: u64,
}

/// Cgroup v2 access rooted at the arena's own cgroup.
pub struct CgroupManager {
    root_path: PathBuf,
}

/// One ephemeral cgroup per contestant. Removed on drop.
pub struct SessionCgroup {
    path: PathBuf,
}

impl CgroupManager {
    /// Checks that cgroup v2 is mounted and resolves the cgroup this process
    /// lives in, so sessions nest under it (systemd slices, containers).
    pub fn new() -> Result<Self> {
        let mount_point = PathBuf::from(CGROUP_MOUNT);
        if !mount_point.is_dir() {
            return Err(anyhow!("cgroup v2 mount not found at {CGROUP_MOUNT}"));
        }

        let content = fs::read_to_string("/proc/self/cgroup")
            .context("failed to read /proc/self/cgroup")?;
        let relative = parse_self_cgroup(&content)
            .ok_or_else(|| anyhow!("no unified hierarchy (0::) entry in /proc/self/cgroup"))?;

        let root_path = mount_point.join(relative);
        if !root_path.exists() {
            return Err(anyhow!("own cgroup path does not exist: {}", root_path.display()));
        }
        Ok(Self { root_path })
    }

    /// Creates `guess-<label>-<pid>-<millis>` and enables the controllers
    /// needed for limits and accounting.
    pub fn create_session(&self, label: &str) -> Result<SessionCgroup> {
        let millis = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis();
        let name = format!("guess-{}-{}-{}", label, std::process::id(), millis);
        let path = self.root_path.join(&name);

        if path.exists() {
            let _ = fs::remove_dir(&path);
        }

        // Without delegation this fails; limits then simply do not apply.
        let subtree = self.root_path.join("cgroup.subtree_control");
        if subtree.exists() {
            if let Err(e) = fs::write(&subtree, "+memory +cpu +pids") {
                debug!(error = %e, path = %subtree.display(), "could not enable controllers");
            }
        }

        fs::create_dir(&path)
            .with_context(|| format!("failed to create cgroup {}", path.display()))?;
        debug!(path = %path.display(), "cgroup session created");
        Ok(SessionCgroup { path })
    }
}

impl SessionCgroup {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn memory_current_path(&self) -> PathBuf {
        self.path.join("memory.current")
    }

    pub fn apply_limits(&self, limits: &ResourceLimits) -> Result<()> {
        if let Some(mb) = limits.memory_max_mb {
            fs::write(self.path.join("memory.max"), format!("{mb}M"))
                .context("failed to set memory.max")?;
        }
        if let Some(cpu) = &limits.cpu_max {
            fs::write(self.path.join("cpu.max"), cpu).context("failed to set cpu.max")?;
        }
        Ok(())
    }

    pub fn add_process(&self, pid: u32) -> Result<()> {
        let procs_path = self.path.join("cgroup.procs");
        fs::write(&procs_path, pid.to_string())
            .with_context(|| format!("failed to add pid {pid} to {}", self.path.display()))?;
        Ok(())
    }

    /// Resource usage so far. Missing files leave their fields at zero.
    pub fn stats(&self) -> CgroupStats {
        let mut stats = CgroupStats::default();

        if let Some(peak) = read_u64(&self.path.join("memory.peak")) {
            stats.memory_peak_bytes = peak;
        }
        // Kernels without memory.peak: fall back to the largest resident
        // counter in memory.stat.
        if let Ok(content) = fs::read_to_string(self.path.join("memory.stat")) {
            stats.memory_peak_bytes = stats.memory_peak_bytes.max(peak_from_memory_stat(&content));
        }
        if let Ok(content) = fs::read_to_string(self.path.join("cpu.stat")) {
            let (user, system) = parse_cpu_stat(&content);
            stats.cpu_user_usec = user;
            stats.cpu_system_usec = system;
        }
        stats
    }

    pub fn kill(&self) -> Result<()> {
        let p = self.path.join("cgroup.kill");
        if p.exists() {
            fs::write(p, "1")?;
        } else {
            return Err(anyhow!("cgroup.kill missing"));
        }
        Ok(())
    }

    pub fn remove(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        // rmdir fails while processes remain; kill stragglers and retry.
        for _ in 0..3 {
            match fs::remove_dir(&self.path) {
                Ok(_) => return Ok(()),
                Err(_) => {
                    let _ = self.kill();
                    std::thread::sleep(std::time::Duration::from_millis(50));
                }
            }
        }
        fs::remove_dir(&self.path).context("failed to remove cgroup after retries")
    }
}

impl Drop for SessionCgroup {
    fn drop(&mut self) {
        if let Err(e) = self.remove() {
            warn!(path = %self.path.display(), error = %e, "failed to clean up cgroup session");
        }
    }
}

/// Relative cgroup path from `/proc/self/cgroup` (`0::/a/b` -> `a/b`,
/// `0::/` -> ``).
pub fn parse_self_cgroup(content: &str) -> Option<&str> {
    let line = content.lines().find(|l| l.starts_with("0::"))?;
    let path = line.split("::").nth(1)?;
    Some(path.strip_prefix('/').unwrap_or(path))
}

pub fn parse_cpu_stat(content: &str) -> (u64, u64) {
    let mut user = 0;
    let mut system = 0;
    for line in content.lines() {
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next().and_then(|v| v.parse().ok())) {
            (Some("user_usec"), Some(v)) => user = v,
            (Some("system_usec"), Some(v)) => system = v,
            _ => {}
        }
    }
    (user, system)
}

pub fn peak_from_memory_stat(content: &str) -> u64 {
    content
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let key = fields.next()?;
            let value: u64 = fields.next()?.parse().ok()?;
            if fields.next().is_some() {
                return None;
            }
            matches!(key, "anon" | "file" | "rss" | "shmem").then_some(value)
        })
        .max()
        .unwrap_or(0)
}

pub(crate) fn read_u64(path: &Path) -> Option<u64> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}
