//! One judge against one player.
//!
//! The arena owns every pipe between the two contestants, waits for the
//! judge's verdict line under a wall-clock deadline, then reaps both
//! processes and collects their cgroup accounting.

pub mod monitor;
pub mod report;
pub mod sandbox;
pub mod spawn;

use crate::cgroup::{CgroupManager, CgroupStats, ResourceLimits, SessionCgroup};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{Child, ExitStatus};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

const REAP_POLL: Duration = Duration::from_millis(5);

#[derive(Debug, Clone)]
pub struct MatchSpec {
    pub judge: PathBuf,
    pub judge_args: Vec<String>,
    pub player: PathBuf,
    pub player_args: Vec<String>,
    pub timeout: Duration,
    /// `None` runs the match without cgroup sessions.
    pub limits: Option<ResourceLimits>,
    /// Root directories for namespace confinement; `None` runs on the host
    /// filesystem.
    pub judge_rootfs: Option<PathBuf>,
    pub player_rootfs: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The judge reported; the line is kept verbatim (terminator stripped).
    Verdict(String),
    /// The verdict channel closed without a line.
    NoVerdict,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExitSummary {
    pub code: Option<i32>,
    pub signal: Option<i32>,
    /// The arena sent SIGKILL at the deadline.
    pub killed: bool,
}

impl ExitSummary {
    fn from_status(status: ExitStatus, killed: bool) -> Self {
        Self {
            code: status.code(),
            signal: status.signal(),
            killed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContestantResult {
    pub pid: u32,
    pub exit: ExitSummary,
    pub stats: Option<CgroupStats>,
}

#[derive(Debug, Clone)]
pub struct MatchResult {
    pub outcome: MatchOutcome,
    pub judge: ContestantResult,
    pub player: ContestantResult,
    pub elapsed: Duration,
}

struct Sessions {
    judge: SessionCgroup,
    player: SessionCgroup,
}

impl Sessions {
    fn create(limits: &ResourceLimits) -> anyhow::Result<Self> {
        let manager = CgroupManager::new()?;
        let judge = manager.create_session("judge")?;
        judge.apply_limits(limits)?;
        let player = manager.create_session("player")?;
        player.apply_limits(limits)?;
        Ok(Self { judge, player })
    }
}

pub async fn run_match(spec: MatchSpec) -> anyhow::Result<MatchResult> {
    let started = Instant::now();
    let deadline = started + spec.timeout;

    let sessions = match &spec.limits {
        Some(limits) => match Sessions::create(limits) {
            Ok(s) => Some(s),
            Err(e) => {
                warn!(error = %e, "cgroup confinement unavailable, running unconfined");
                None
            }
        },
        None => None,
    };

    let spawn::Contestants {
        mut judge,
        mut player,
        verdict,
    } = spawn::spawn_pair(&spec)?;
    let (judge_pid, player_pid) = (judge.id(), player.id());
    info!(judge_pid, player_pid, "contestants started");

    // Children start running before they join; a few microseconds of
    // unaccounted usage is accepted.
    if let Some(s) = &sessions {
        let joins = [
            (&s.judge, judge_pid, "judge"),
            (&s.player, player_pid, "player"),
        ];
        for (session, pid, role) in joins {
            match session.add_process(pid) {
                Ok(()) => debug!(role, pid, cgroup = %session.path().display(), "joined cgroup"),
                Err(e) => warn!(role, pid, error = %e, "failed to join cgroup"),
            }
        }
    }

    let (stop_tx, stop_rx) = watch::channel(false);
    let sampler = sessions.as_ref().map(|s| {
        monitor::spawn_sampler(
            vec![s.judge.memory_current_path(), s.player.memory_current_path()],
            stop_rx,
        )
    });

    let reader = tokio::task::spawn_blocking(move || read_verdict_line(verdict));
    let outcome = match tokio::time::timeout_at(deadline, reader).await {
        Ok(Ok(Ok(line))) if line.is_empty() => MatchOutcome::NoVerdict,
        Ok(Ok(Ok(line))) => MatchOutcome::Verdict(line),
        Ok(Ok(Err(e))) => {
            warn!(error = %e, "failed to read verdict channel");
            MatchOutcome::NoVerdict
        }
        Ok(Err(e)) => {
            warn!(error = %e, "verdict reader task failed");
            MatchOutcome::NoVerdict
        }
        Err(_) => MatchOutcome::Timeout,
    };

    let (mut judge_killed, mut player_killed) = (false, false);
    match &outcome {
        MatchOutcome::Verdict(line) => info!(verdict = %line, "verdict received"),
        MatchOutcome::NoVerdict => warn!("judge closed the verdict channel without reporting"),
        MatchOutcome::Timeout => {
            warn!(timeout_ms = spec.timeout.as_millis() as u64, "match timed out");
            // Also takes down anything the contestants forked.
            if let Some(s) = &sessions {
                judge_killed = stop_if_running(&mut judge, || s.judge.kill());
                player_killed = stop_if_running(&mut player, || s.player.kill());
            }
        }
    }

    let judge_exit = reap(&mut judge, deadline, judge_killed).await?;
    let player_exit = reap(&mut player, deadline, player_killed).await?;

    let _ = stop_tx.send(true);
    let peaks = match sampler {
        Some(handle) => handle.await.unwrap_or_default(),
        None => Vec::new(),
    };
    let stats_for = |session: &SessionCgroup, sampled: Option<u64>| {
        let mut stats = session.stats();
        stats.memory_peak_bytes = stats.memory_peak_bytes.max(sampled.unwrap_or(0));
        stats
    };
    let (judge_stats, player_stats) = match &sessions {
        Some(s) => (
            Some(stats_for(&s.judge, peaks.first().copied())),
            Some(stats_for(&s.player, peaks.get(1).copied())),
        ),
        None => (None, None),
    };
    drop(sessions);

    Ok(MatchResult {
        outcome,
        judge: ContestantResult {
            pid: judge_pid,
            exit: judge_exit,
            stats: judge_stats,
        },
        player: ContestantResult {
            pid: player_pid,
            exit: player_exit,
            stats: player_stats,
        },
        elapsed: started.elapsed(),
    })
}

/// First line from the verdict pipe, without its terminator. Empty when the
/// judge closed the channel without writing.
fn read_verdict_line(file: File) -> io::Result<String> {
    let mut line = String::new();
    BufReader::new(file).read_line(&mut line)?;
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(line)
}

/// Runs `kill` if `child` has not exited yet. Returns whether it was
/// killed.
fn stop_if_running(child: &mut Child, kill: impl FnOnce() -> anyhow::Result<()>) -> bool {
    if !matches!(child.try_wait(), Ok(None)) {
        return false;
    }
    match kill() {
        Ok(()) => true,
        Err(e) => {
            warn!(pid = child.id(), error = %e, "failed to kill contestant cgroup");
            false
        }
    }
}

/// Waits for `child`, killing it once `deadline` has passed. `killed` marks
/// a child the caller has already taken down.
async fn reap(child: &mut Child, deadline: Instant, mut killed: bool) -> io::Result<ExitSummary> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(ExitSummary::from_status(status, killed));
        }
        if !killed && Instant::now() >= deadline {
            debug!(pid = child.id(), "killing contestant at deadline");
            let _ = child.kill();
            killed = true;
        }
        tokio::time::sleep(REAP_POLL).await;
    }
}
