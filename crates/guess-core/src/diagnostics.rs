use std::fmt;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Judge,
    Player,
    Arena,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Judge => "Judge",
            Role::Player => "Player",
            Role::Arena => "Arena",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Process identity logged once at startup. Informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupTrace {
    pub role: Role,
    pub pid: u32,
    pub uid: Option<u32>,
    pub cwd: Option<PathBuf>,
}

impl StartupTrace {
    pub fn collect(role: Role) -> Self {
        Self {
            role,
            pid: std::process::id(),
            uid: current_uid(),
            cwd: std::env::current_dir().ok(),
        }
    }

    pub fn cwd_display(&self) -> String {
        self.cwd
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(unknown)".to_string())
    }

    pub fn emit(&self) {
        info!(
            uid = ?self.uid,
            pid = self.pid,
            cwd = %self.cwd_display(),
            "{} debug",
            self.role
        );
    }
}

#[cfg(unix)]
fn current_uid() -> Option<u32> {
    Some(nix::unistd::getuid().as_raw())
}

#[cfg(not(unix))]
fn current_uid() -> Option<u32> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_reports_this_process() {
        let trace = StartupTrace::collect(Role::Player);
        assert_eq!(trace.pid, std::process::id());
        assert_eq!(trace.role.label(), "Player");
        #[cfg(unix)]
        assert!(trace.uid.is_some());
        assert_ne!(trace.cwd_display(), "");
    }

    #[test]
    fn test_unknown_cwd_placeholder() {
        let trace = StartupTrace {
            role: Role::Judge,
            pid: 1,
            uid: None,
            cwd: None,
        };
        assert_eq!(trace.cwd_display(), "(unknown)");
    }
}
