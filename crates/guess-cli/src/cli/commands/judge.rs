use crate::cli::args::JudgerArgs;
use crate::exit_codes;
use anyhow::Context;
use guess_core::verdict::open_verdict_fd;
use guess_core::{write_verdict, Judge, JudgeConfig, Role, StartupTrace};
use std::io::{self, Write};
use tracing::{debug, info};

pub fn run(args: JudgerArgs) -> anyhow::Result<i32> {
    StartupTrace::collect(Role::Judge).emit();

    // Resolve the verdict channel before consuming any input, so a harness
    // that forgot to wire it fails loudly instead of losing the result.
    let sink: Box<dyn Write> = match &args.verdict_file {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("failed to create verdict file {}", path.display()))?,
        ),
        None => Box::new(open_verdict_fd(args.verdict_fd)?),
    };

    let config = JudgeConfig {
        secret: args.secret,
        max_guesses: args.max_guesses,
    };
    debug!(max_guesses = config.max_guesses, "judge configured");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let report = Judge::new(config).run(stdin.lock(), stdout.lock());

    write_verdict(sink, report.verdict).context("failed to write verdict")?;
    info!(
        verdict = %report.verdict,
        guesses = report.guesses,
        "judging finished"
    );
    Ok(exit_codes::SUCCESS)
}
