//! Binary-search player.
//!
//! [`BinarySearch`] is the pure bound arithmetic; [`Player`] wraps it in the
//! line protocol and decides what to do with replies it cannot classify.

use crate::errors::{GuessError, Result};
use crate::protocol::Reply;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

pub const DEFAULT_LOW: i32 = 1;
pub const DEFAULT_HIGH: i32 = 1000;

/// Closed search interval `[low, high]`, empty once `low > high`.
///
/// Bounds are kept in 64 bits so `mid + 1` and `mid - 1` cannot overflow at
/// the edges of the `i32` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinarySearch {
    low: i64,
    high: i64,
}

impl BinarySearch {
    pub fn new(low: i32, high: i32) -> Result<Self> {
        if low > high {
            return Err(GuessError::InvalidRange { low, high });
        }
        Ok(Self {
            low: i64::from(low),
            high: i64::from(high),
        })
    }

    pub fn is_exhausted(&self) -> bool {
        self.low > self.high
    }

    /// Midpoint with truncating division, `None` once the interval is empty.
    pub fn next_guess(&self) -> Option<i32> {
        if self.is_exhausted() {
            return None;
        }
        // Both bounds lie inside i32 while the interval is non-empty.
        i32::try_from((self.low + self.high) / 2).ok()
    }

    /// Narrows the interval around `mid`. Returns `true` on `Correct`.
    pub fn apply(&mut self, mid: i32, reply: Reply) -> bool {
        match reply {
            Reply::Correct => true,
            Reply::TooSmall => {
                self.low = i64::from(mid) + 1;
                false
            }
            Reply::TooLarge => {
                self.high = i64::from(mid) - 1;
                false
            }
        }
    }
}

impl Default for BinarySearch {
    fn default() -> Self {
        Self {
            low: i64::from(DEFAULT_LOW),
            high: i64::from(DEFAULT_HIGH),
        }
    }
}

/// What to do when a reply line is not one of the three protocol replies,
/// or the input stream has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidReplyPolicy {
    /// Keep the bounds and guess the same midpoint again, indefinitely.
    #[default]
    Repeat,
    /// Like `Repeat`, but give up after `limit` consecutive invalid replies.
    Retry { limit: u32 },
    /// Give up on the first invalid reply.
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerOutcome {
    Found { guess: i32, attempts: u32 },
    /// The interval emptied without a `correct` reply; the peer's answers
    /// were inconsistent with any value in range.
    Exhausted { attempts: u32 },
    GaveUp { attempts: u32, last_guess: i32 },
}

#[derive(Debug, Clone)]
pub struct Player {
    search: BinarySearch,
    policy: InvalidReplyPolicy,
}

impl Player {
    pub fn new(search: BinarySearch, policy: InvalidReplyPolicy) -> Self {
        Self { search, policy }
    }

    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut output: W,
    ) -> Result<PlayerOutcome> {
        let mut attempts = 0u32;
        let mut invalid_streak = 0u32;
        let mut line = Vec::new();

        while let Some(mid) = self.search.next_guess() {
            writeln!(output, "{mid}")?;
            output.flush()?;
            attempts += 1;

            line.clear();
            let n = input.read_until(b'\n', &mut line)?;
            if line.last() == Some(&b'\n') {
                line.pop();
            }
            let reply = if n == 0 {
                None
            } else {
                std::str::from_utf8(&line).ok().and_then(Reply::parse)
            };

            let Some(reply) = reply else {
                invalid_streak += 1;
                if invalid_streak == 1 {
                    warn!(
                        guess = mid,
                        eof = n == 0,
                        line = %String::from_utf8_lossy(&line),
                        "unrecognized reply"
                    );
                }
                let give_up = match self.policy {
                    InvalidReplyPolicy::Repeat => false,
                    InvalidReplyPolicy::Retry { limit } => invalid_streak > limit,
                    InvalidReplyPolicy::Abort => true,
                };
                if give_up {
                    return Ok(PlayerOutcome::GaveUp {
                        attempts,
                        last_guess: mid,
                    });
                }
                continue;
            };

            invalid_streak = 0;
            debug!(guess = mid, reply = %reply, "reply");
            if self.search.apply(mid, reply) {
                return Ok(PlayerOutcome::Found {
                    guess: mid,
                    attempts,
                });
            }
        }

        Ok(PlayerOutcome::Exhausted { attempts })
    }
}
