//! Wire vocabulary shared by the judge, the player and the arena.
//!
//! Replies travel as bare text lines on the gameplay streams. The verdict is
//! a single JSON line on the judge's side channel; its shape is part of the
//! public contract and must stay byte-stable.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Judge's answer to a single guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reply {
    Correct,
    TooSmall,
    TooLarge,
}

impl Reply {
    pub const fn as_str(self) -> &'static str {
        match self {
            Reply::Correct => "correct",
            Reply::TooSmall => "too small",
            Reply::TooLarge => "too large",
        }
    }

    /// Exact match on a line with its terminator already stripped.
    /// Whitespace and case variants are not replies.
    pub fn parse(line: &str) -> Option<Self> {
        match line {
            "correct" => Some(Reply::Correct),
            "too small" => Some(Reply::TooSmall),
            "too large" => Some(Reply::TooLarge),
            _ => None,
        }
    }

    pub fn classify(guess: i32, secret: i32) -> Self {
        match guess.cmp(&secret) {
            Ordering::Less => Reply::TooSmall,
            Ordering::Greater => Reply::TooLarge,
            Ordering::Equal => Reply::Correct,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final outcome of a judged game. Exactly one is produced per judge run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The secret was guessed within the attempt limit.
    Accepted,
    /// The attempt limit ran out.
    WrongAnswer,
    /// Input could not be read as an integer.
    RuntimeError,
}

impl Verdict {
    pub const fn status(self) -> &'static str {
        match self {
            Verdict::Accepted => "AC",
            Verdict::WrongAnswer => "WA",
            Verdict::RuntimeError => "RE",
        }
    }

    pub const fn reason(self) -> Option<&'static str> {
        match self {
            Verdict::Accepted => None,
            Verdict::WrongAnswer => Some("limit"),
            Verdict::RuntimeError => Some("bad input"),
        }
    }

    pub fn record(self) -> VerdictRecord {
        VerdictRecord {
            status: self.status().to_string(),
            reason: self.reason().map(str::to_string),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status())
    }
}

/// Serialized form of a verdict as it appears on the side channel.
///
/// `status` stays a string so the arena can report verdicts from judges
/// that emit statuses this crate does not know about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictRecord {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VerdictRecord {
    /// One JSON object, no trailing newline.
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line.trim())
    }

    pub fn verdict(&self) -> Option<Verdict> {
        match self.status.as_str() {
            "AC" => Some(Verdict::Accepted),
            "WA" => Some(Verdict::WrongAnswer),
            "RE" => Some(Verdict::RuntimeError),
            _ => None,
        }
    }
}

impl From<Verdict> for VerdictRecord {
    fn from(v: Verdict) -> Self {
        v.record()
    }
}
