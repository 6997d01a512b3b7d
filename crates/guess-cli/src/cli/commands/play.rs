use crate::cli::args::PlayerArgs;
use crate::exit_codes;
use anyhow::Context;
use guess_core::{BinarySearch, Player, PlayerOutcome, Role, StartupTrace};
use std::io;
use tracing::{info, warn};

pub fn run(args: PlayerArgs) -> anyhow::Result<i32> {
    StartupTrace::collect(Role::Player).emit();

    let search = BinarySearch::new(args.low, args.high)?;
    let mut player = Player::new(search, args.policy());

    let stdin = io::stdin();
    let stdout = io::stdout();
    let outcome = player
        .run(stdin.lock(), stdout.lock())
        .context("gameplay stream failed")?;

    match outcome {
        PlayerOutcome::Found { guess, attempts } => {
            info!(guess, attempts, "found the secret");
        }
        PlayerOutcome::Exhausted { attempts } => {
            warn!(
                attempts,
                low = args.low,
                high = args.high,
                "search range exhausted without a correct reply"
            );
        }
        PlayerOutcome::GaveUp {
            attempts,
            last_guess,
        } => {
            warn!(attempts, last_guess, "gave up after unrecognized replies");
        }
    }
    Ok(exit_codes::SUCCESS)
}
