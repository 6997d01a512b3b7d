//! guess-core: engines for the binary-search guessing game.
//!
//! A judge holds a secret and classifies guesses; a player narrows a range
//! until the judge answers `correct`. Both talk plain text lines over any
//! `BufRead`/`Write` pair, so the same engines drive stdio pipes in the
//! binaries and in-memory buffers in tests.
//!
//! ```rust
//! use guess_core::{Judge, JudgeConfig, Verdict};
//! use std::io::Cursor;
//!
//! let judge = Judge::new(JudgeConfig { secret: 731, max_guesses: 10 });
//! let mut replies = Vec::new();
//! let report = judge.run(Cursor::new("500\n731\n"), &mut replies);
//!
//! assert_eq!(report.verdict, Verdict::Accepted);
//! assert_eq!(String::from_utf8(replies).unwrap(), "too small\ncorrect\n");
//! ```

pub mod diagnostics;
pub mod errors;
pub mod judge;
pub mod player;
pub mod protocol;
pub mod scanner;
pub mod verdict;

pub use diagnostics::{Role, StartupTrace};
pub use errors::{GuessError, Result};
pub use judge::{Judge, JudgeConfig, JudgeReport};
pub use player::{BinarySearch, InvalidReplyPolicy, Player, PlayerOutcome};
pub use protocol::{Reply, Verdict, VerdictRecord};
pub use scanner::{IntScanner, ScanError};
pub use verdict::write_verdict;
