use super::{ContestantResult, ExitSummary, MatchOutcome, MatchResult};
use crate::cgroup::CgroupStats;
use crate::exit_codes;
use guess_core::VerdictRecord;
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Verdict,
    NoVerdict,
    Timeout,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContestantReport {
    pub pid: u32,
    pub exit: ExitSummary,
    pub stats: Option<CgroupStats>,
}

impl From<&ContestantResult> for ContestantReport {
    fn from(r: &ContestantResult) -> Self {
        Self {
            pid: r.pid,
            exit: r.exit,
            stats: r.stats,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArenaReport {
    pub outcome: OutcomeKind,
    /// Parsed verdict, absent when the line was not a verdict object.
    pub verdict: Option<VerdictRecord>,
    /// Verdict line exactly as the judge wrote it.
    pub raw_verdict: Option<String>,
    pub elapsed_ms: u64,
    pub judge: ContestantReport,
    pub player: ContestantReport,
}

impl MatchOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            MatchOutcome::Verdict(_) => exit_codes::SUCCESS,
            MatchOutcome::NoVerdict => exit_codes::NO_VERDICT,
            MatchOutcome::Timeout => exit_codes::TIMEOUT,
        }
    }
}

impl ArenaReport {
    pub fn from_result(result: &MatchResult) -> Self {
        let (outcome, raw) = match &result.outcome {
            MatchOutcome::Verdict(line) => (OutcomeKind::Verdict, Some(line.clone())),
            MatchOutcome::NoVerdict => (OutcomeKind::NoVerdict, None),
            MatchOutcome::Timeout => (OutcomeKind::Timeout, None),
        };
        Self {
            outcome,
            verdict: raw.as_deref().and_then(|l| VerdictRecord::from_line(l).ok()),
            raw_verdict: raw,
            elapsed_ms: result.elapsed.as_millis() as u64,
            judge: (&result.judge).into(),
            player: (&result.player).into(),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        match (&self.outcome, &self.raw_verdict) {
            (OutcomeKind::Verdict, Some(line)) => {
                let _ = writeln!(out, "[arena] result: {line}");
            }
            (OutcomeKind::Timeout, _) => out.push_str("[arena] timeout\n"),
            _ => out.push_str("[arena] no verdict\n"),
        }
        render_contestant(&mut out, "judge", &self.judge);
        render_contestant(&mut out, "player", &self.player);
        out
    }
}

fn render_contestant(out: &mut String, role: &str, c: &ContestantReport) {
    let _ = writeln!(out, "\n[stats] {role} (pid {}):", c.pid);
    let _ = writeln!(out, "  exit: {}", describe_exit(&c.exit));
    match &c.stats {
        Some(s) => {
            let _ = writeln!(
                out,
                "  memory peak: {:.2} MB",
                s.memory_peak_bytes as f64 / 1024.0 / 1024.0
            );
            let _ = writeln!(
                out,
                "  cpu usage: user={:.2} ms, system={:.2} ms",
                s.cpu_user_usec as f64 / 1000.0,
                s.cpu_system_usec as f64 / 1000.0
            );
        }
        None => out.push_str("  resources: not measured\n"),
    }
}

fn describe_exit(exit: &ExitSummary) -> String {
    let base = match (exit.code, exit.signal) {
        (Some(code), _) => format!("code {code}"),
        (None, Some(sig)) => format!("signal {sig}"),
        (None, None) => "unknown".to_string(),
    };
    if exit.killed {
        format!("{base} (killed at deadline)")
    } else {
        base
    }
}
