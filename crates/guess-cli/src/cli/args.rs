use clap::{Parser, ValueEnum};
use guess_core::judge::{DEFAULT_MAX_GUESSES, DEFAULT_SECRET};
use guess_core::player::{DEFAULT_HIGH, DEFAULT_LOW};
use guess_core::verdict::DEFAULT_VERDICT_FD;
use guess_core::InvalidReplyPolicy;
use std::path::PathBuf;

#[derive(clap::Args, Debug, Clone, Default)]
pub struct LogArgs {
    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only warnings and errors on stderr; hides the startup trace
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl LogArgs {
    pub fn default_directive(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "judger",
    version,
    about = "Holds a secret number, answers guesses read from stdin and reports a verdict"
)]
pub struct JudgerArgs {
    /// Number the player has to find
    #[arg(long, env = "GUESS_SECRET", default_value_t = DEFAULT_SECRET, allow_hyphen_values = true)]
    pub secret: i32,

    /// Guesses allowed before the verdict is WA
    #[arg(
        long,
        env = "GUESS_MAX_GUESSES",
        default_value_t = DEFAULT_MAX_GUESSES,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_guesses: u32,

    /// Inherited descriptor that receives the verdict line
    #[arg(long, env = "GUESS_VERDICT_FD", default_value_t = DEFAULT_VERDICT_FD)]
    pub verdict_fd: i32,

    /// Write the verdict to this file; takes precedence over --verdict-fd
    #[arg(long)]
    pub verdict_file: Option<PathBuf>,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OnInvalid {
    /// Guess the same number again (no limit)
    #[default]
    Repeat,
    /// Guess the same number again, up to --max-retries times in a row
    Retry,
    /// Stop at the first unrecognized reply
    Abort,
}

#[derive(Parser, Debug)]
#[command(
    name = "player",
    version,
    about = "Binary-searches for the judge's secret over stdin/stdout"
)]
pub struct PlayerArgs {
    /// Lower bound of the search range (inclusive)
    #[arg(long, default_value_t = DEFAULT_LOW, allow_hyphen_values = true)]
    pub low: i32,

    /// Upper bound of the search range (inclusive)
    #[arg(long, default_value_t = DEFAULT_HIGH, allow_hyphen_values = true)]
    pub high: i32,

    /// What to do with a reply that is not "correct", "too small" or "too large"
    #[arg(long, value_enum, default_value_t = OnInvalid::Repeat)]
    pub on_invalid: OnInvalid,

    /// Consecutive unrecognized replies tolerated with --on-invalid retry
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,

    #[command(flatten)]
    pub log: LogArgs,
}

impl PlayerArgs {
    pub fn policy(&self) -> InvalidReplyPolicy {
        match self.on_invalid {
            OnInvalid::Repeat => InvalidReplyPolicy::Repeat,
            OnInvalid::Retry => InvalidReplyPolicy::Retry {
                limit: self.max_retries,
            },
            OnInvalid::Abort => InvalidReplyPolicy::Abort,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "arena",
    version,
    about = "Runs one judge against one player with cross-wired pipes, a timeout and cgroup limits"
)]
pub struct ArenaArgs {
    /// Judge executable
    #[arg(long, default_value = "/bin/judge")]
    pub judge: PathBuf,

    /// Extra argument for the judge (repeatable)
    #[arg(long = "judge-arg", allow_hyphen_values = true)]
    pub judge_args: Vec<String>,

    /// Player executable
    #[arg(long, default_value = "/bin/player")]
    pub player: PathBuf,

    /// Extra argument for the player (repeatable)
    #[arg(long = "player-arg", allow_hyphen_values = true)]
    pub player_args: Vec<String>,

    /// Wall-clock limit for the whole match, in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub timeout: u64,

    /// memory.max for each contestant, in MiB
    #[arg(long, default_value_t = 100)]
    pub memory_limit_mb: u64,

    /// cpu.max for each contestant ("<quota> <period>" in microseconds)
    #[arg(long, default_value = "100000 1000000")]
    pub cpu_max: String,

    /// Run without cgroup confinement or resource statistics
    #[arg(long)]
    pub no_cgroup: bool,

    /// Confine the judge to this root directory (user, mount, UTS and IPC
    /// namespaces; runs as nobody). --judge is resolved inside it
    #[arg(long)]
    pub judge_rootfs: Option<PathBuf>,

    /// Confine the player to this root directory; --player is resolved inside it
    #[arg(long)]
    pub player_rootfs: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub log: LogArgs,
}
