//! Verdict side channel.
//!
//! The judge reports through any `Write` handed to it. Binaries default to
//! an inherited file descriptor (3) set up by whoever launched them.

use crate::errors::{GuessError, Result};
use crate::protocol::Verdict;
use std::io::Write;

pub const DEFAULT_VERDICT_FD: i32 = 3;

/// Writes the verdict as one JSON line and flushes.
pub fn write_verdict<W: Write>(mut sink: W, verdict: Verdict) -> Result<()> {
    let mut line = verdict.record().to_line()?;
    line.push('\n');
    sink.write_all(line.as_bytes())?;
    sink.flush()?;
    Ok(())
}

/// Takes ownership of an inherited descriptor after checking that it is open.
#[cfg(unix)]
#[allow(unsafe_code)]
pub fn open_verdict_fd(fd: i32) -> Result<std::fs::File> {
    use nix::fcntl::{fcntl, FcntlArg};
    use std::os::unix::io::FromRawFd;

    if fd < 0 {
        return Err(GuessError::VerdictChannel {
            fd,
            detail: "negative descriptor".into(),
        });
    }
    if fd <= 2 {
        return Err(GuessError::VerdictChannel {
            fd,
            detail: "descriptor collides with stdio".into(),
        });
    }
    fcntl(fd, FcntlArg::F_GETFD).map_err(|e| GuessError::VerdictChannel {
        fd,
        detail: format!("not open ({e})"),
    })?;

    // SAFETY: F_GETFD succeeded, so `fd` is an open descriptor inherited from
    // the parent. Nothing else in this process owns it.
    Ok(unsafe { std::fs::File::from_raw_fd(fd) })
}

#[cfg(not(unix))]
pub fn open_verdict_fd(fd: i32) -> Result<std::fs::File> {
    Err(GuessError::VerdictChannel {
        fd,
        detail: "descriptor channels are only supported on unix".into(),
    })
}
