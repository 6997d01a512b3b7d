use crate::protocol::{Reply, Verdict};
use crate::scanner::{IntScanner, ScanError};
use std::io::{BufRead, Write};
use tracing::{debug, warn};

pub const DEFAULT_SECRET: i32 = 731;
pub const DEFAULT_MAX_GUESSES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JudgeConfig {
    pub secret: i32,
    pub max_guesses: u32,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET,
            max_guesses: DEFAULT_MAX_GUESSES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JudgeReport {
    pub verdict: Verdict,
    /// Guesses that were read and answered. A malformed read is not counted.
    pub guesses: u32,
}

/// Holds the secret and answers guesses until a verdict is reached.
#[derive(Debug, Clone)]
pub struct Judge {
    config: JudgeConfig,
}

impl Judge {
    pub fn new(config: JudgeConfig) -> Self {
        Self { config }
    }

    /// Plays one game over `input`/`output`.
    ///
    /// Every answered guess is written as a line and flushed before the next
    /// read, so an interactive peer never waits on buffered output. A stream
    /// that fails in either direction ends the game as `RuntimeError`; the
    /// run always produces a report. The returned verdict is not written
    /// anywhere; see [`crate::write_verdict`].
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> JudgeReport {
        let mut scanner = IntScanner::new(input);
        let mut guesses = 0;

        while guesses < self.config.max_guesses {
            let guess = match scanner.next_i32() {
                Ok(n) => n,
                Err(e) => {
                    match &e {
                        ScanError::Io(err) => debug!(error = %err, "guess read failed"),
                        other => debug!(reason = %other, "guess rejected"),
                    }
                    return JudgeReport {
                        verdict: Verdict::RuntimeError,
                        guesses,
                    };
                }
            };
            guesses += 1;

            let reply = Reply::classify(guess, self.config.secret);
            debug!(guess, attempt = guesses, reply = %reply, "judged");
            if let Err(e) = writeln!(output, "{}", reply.as_str()).and_then(|()| output.flush()) {
                warn!(error = %e, attempt = guesses, "reply stream closed by peer");
                return JudgeReport {
                    verdict: Verdict::RuntimeError,
                    guesses,
                };
            }

            if reply == Reply::Correct {
                return JudgeReport {
                    verdict: Verdict::Accepted,
                    guesses,
                };
            }
        }

        JudgeReport {
            verdict: Verdict::WrongAnswer,
            guesses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    fn play(input: &str) -> (JudgeReport, String) {
        let judge = Judge::new(JudgeConfig::default());
        let mut out = Vec::new();
        let report = judge.run(Cursor::new(input.as_bytes()), &mut out);
        (report, String::from_utf8(out).unwrap())
    }

    /// Accepts `lines` reply lines, then reports a closed pipe.
    struct ClosingWriter {
        out: Vec<u8>,
        lines: usize,
    }

    impl Write for ClosingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.out.iter().filter(|b| **b == b'\n').count() >= self.lines {
                return Err(io::ErrorKind::BrokenPipe.into());
            }
            self.out.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_every_single_guess_in_range() {
        for g in 1..=1000 {
            let (report, out) = play(&format!("{g}\n"));
            let expected = match g {
                g if g < 731 => "too small\n",
                g if g > 731 => "too large\n",
                _ => "correct\n",
            };
            assert_eq!(out, expected, "guess {g}");
            if g == 731 {
                assert_eq!(report.verdict, Verdict::Accepted);
            } else {
                // A single miss followed by end of input.
                assert_eq!(report.verdict, Verdict::RuntimeError);
            }
        }
    }

    #[test]
    fn test_non_integer_first_input_is_runtime_error_without_output() {
        let (report, out) = play("abc\n");
        assert_eq!(report.verdict, Verdict::RuntimeError);
        assert_eq!(report.guesses, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_empty_input_is_runtime_error() {
        let (report, out) = play("");
        assert_eq!(report.verdict, Verdict::RuntimeError);
        assert!(out.is_empty());
    }

    #[test]
    fn test_ten_misses_hit_the_limit() {
        let (report, out) = play(&"1\n".repeat(10));
        assert_eq!(report.verdict, Verdict::WrongAnswer);
        assert_eq!(report.guesses, 10);
        assert_eq!(out, "too small\n".repeat(10));
    }

    #[test]
    fn test_input_after_limit_is_not_read() {
        let (report, out) = play(&format!("{}731\n", "1000\n".repeat(10)));
        assert_eq!(report.verdict, Verdict::WrongAnswer);
        assert_eq!(out.lines().count(), 10);
        assert!(out.lines().all(|l| l == "too large"));
    }

    #[test]
    fn test_correct_on_kth_try() {
        for k in 1..=10usize {
            let mut input = String::new();
            for i in 0..k - 1 {
                input.push_str(if i % 2 == 0 { "1\n" } else { "1000\n" });
            }
            input.push_str("731\n");

            let (report, out) = play(&input);
            let lines: Vec<&str> = out.lines().collect();
            assert_eq!(report.verdict, Verdict::Accepted, "k={k}");
            assert_eq!(report.guesses as usize, k);
            assert_eq!(lines.len(), k);
            assert!(lines[..k - 1]
                .iter()
                .all(|l| *l == "too small" || *l == "too large"));
            assert_eq!(lines[k - 1], "correct");
        }
    }

    #[test]
    fn test_malformed_mid_game_stops_immediately() {
        let (report, out) = play("1\n2\nxyz\n731\n");
        assert_eq!(report.verdict, Verdict::RuntimeError);
        assert_eq!(report.guesses, 2);
        assert_eq!(out, "too small\ntoo small\n");
    }

    #[test]
    fn test_custom_secret_and_limit() {
        let judge = Judge::new(JudgeConfig {
            secret: -5,
            max_guesses: 2,
        });
        let mut out = Vec::new();
        let report = judge.run(Cursor::new("0 -10 -5"), &mut out);
        assert_eq!(report.verdict, Verdict::WrongAnswer);
        assert_eq!(String::from_utf8(out).unwrap(), "too large\ntoo small\n");
    }

    #[test]
    fn test_closed_reply_stream_is_runtime_error() {
        let judge = Judge::new(JudgeConfig::default());
        let mut out = ClosingWriter {
            out: Vec::new(),
            lines: 0,
        };
        let report = judge.run(Cursor::new("5\n731\n"), &mut out);
        assert_eq!(report.verdict, Verdict::RuntimeError);
        assert_eq!(report.guesses, 1);
        assert!(out.out.is_empty());
    }

    #[test]
    fn test_peer_leaving_mid_game_keeps_answered_replies() {
        let judge = Judge::new(JudgeConfig::default());
        let mut out = ClosingWriter {
            out: Vec::new(),
            lines: 2,
        };
        let report = judge.run(Cursor::new("1\n1000\n731\n"), &mut out);
        assert_eq!(report.verdict, Verdict::RuntimeError);
        assert_eq!(report.guesses, 3);
        assert_eq!(out.out, b"too small\ntoo large\n");
    }
}
