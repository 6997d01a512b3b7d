//! Process wiring for one match.
//!
//! ```text
//!   player.stdout ──► judge.stdin
//!   judge.stdout  ──► player.stdin
//!   judge fd 3    ──► arena (verdict pipe)
//! ```

use super::sandbox::Sandbox;
use super::MatchSpec;
use anyhow::Context;
use std::fs::File;
use std::io;
use std::os::unix::io::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use tracing::debug;

/// Descriptor number the judge reports on.
pub const VERDICT_FD: RawFd = 3;

pub struct Contestants {
    pub judge: Child,
    pub player: Child,
    /// Read end of the judge's verdict pipe.
    pub verdict: File,
}

pub fn spawn_pair(spec: &MatchSpec) -> anyhow::Result<Contestants> {
    let player_sandbox = prepare_sandbox(spec.player_rootfs.as_deref(), "player")?;
    let judge_sandbox = prepare_sandbox(spec.judge_rootfs.as_deref(), "judge")?;

    let mut cmd = Command::new(&spec.player);
    cmd.args(&spec.player_args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());
    if let Some(sandbox) = &player_sandbox {
        sandbox.apply(&mut cmd);
    }
    let mut player = cmd
        .spawn()
        .with_context(|| format!("failed to spawn player {}", spec.player.display()))?;

    match spawn_judge(spec, judge_sandbox.as_ref(), &mut player) {
        Ok((judge, verdict)) => Ok(Contestants {
            judge,
            player,
            verdict,
        }),
        Err(e) => {
            let _ = player.kill();
            let _ = player.wait();
            Err(e)
        }
    }
}

fn prepare_sandbox(rootfs: Option<&Path>, role: &str) -> anyhow::Result<Option<Sandbox>> {
    let Some(rootfs) = rootfs else {
        return Ok(None);
    };
    let sandbox = Sandbox::prepare(rootfs)
        .with_context(|| format!("failed to prepare {role} sandbox"))?;
    debug!(role, rootfs = %sandbox.rootfs().display(), "sandbox prepared");
    Ok(Some(sandbox))
}

fn spawn_judge(
    spec: &MatchSpec,
    sandbox: Option<&Sandbox>,
    player: &mut Child,
) -> anyhow::Result<(Child, File)> {
    let player_stdin = player.stdin.take().context("player stdin not piped")?;
    let player_stdout = player.stdout.take().context("player stdout not piped")?;
    let (verdict_read, verdict_write) = verdict_pipe().context("failed to create verdict pipe")?;

    let mut cmd = Command::new(&spec.judge);
    cmd.args(&spec.judge_args)
        .stdin(Stdio::from(player_stdout))
        .stdout(Stdio::from(player_stdin))
        .stderr(Stdio::inherit());
    attach_verdict_fd(&mut cmd, verdict_write.as_raw_fd());
    if let Some(sandbox) = sandbox {
        sandbox.apply(&mut cmd);
    }

    let judge = cmd
        .spawn()
        .with_context(|| format!("failed to spawn judge {}", spec.judge.display()))?;

    // Drop the arena's copies of the child-facing ends; otherwise neither
    // side would ever see EOF when its peer exits.
    drop(cmd);
    drop(verdict_write);

    Ok((judge, File::from(verdict_read)))
}

/// Pipe with both ends close-on-exec; the judge gets its end via dup2.
#[allow(unsafe_code)]
fn verdict_pipe() -> io::Result<(OwnedFd, OwnedFd)> {
    let mut fds: [libc::c_int; 2] = [-1; 2];
    // SAFETY: `fds` is a valid two-element buffer for pipe2 to fill.
    if unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) } != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: pipe2 succeeded; both descriptors are fresh and owned here.
    Ok(unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) })
}

#[allow(unsafe_code)]
fn attach_verdict_fd(cmd: &mut Command, fd: RawFd) {
    // SAFETY: pre_exec runs after fork, before exec, after stdio has been
    // set up. The closure only calls dup2/fcntl (async-signal-safe) and
    // does not allocate.
    unsafe {
        cmd.pre_exec(move || {
            if fd == VERDICT_FD {
                // dup2 onto itself would keep O_CLOEXEC; clear it instead.
                let flags = libc::fcntl(fd, libc::F_GETFD);
                if flags < 0 || libc::fcntl(fd, libc::F_SETFD, flags & !libc::FD_CLOEXEC) < 0 {
                    return Err(io::Error::last_os_error());
                }
            } else if libc::dup2(fd, VERDICT_FD) < 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }
}
