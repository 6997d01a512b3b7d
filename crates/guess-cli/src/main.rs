use clap::Parser;
use guess_cli::cli::args::ArenaArgs;
use guess_cli::{exit_codes, logging};

#[cfg(target_os = "linux")]
#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let args = ArenaArgs::parse();
    logging::init(&args.log);
    let code = match guess_cli::cli::commands::arena::run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            exit_codes::INTERNAL_ERROR
        }
    };
    std::process::exit(code);
}

#[cfg(not(target_os = "linux"))]
fn main() {
    let args = ArenaArgs::parse();
    logging::init(&args.log);
    eprintln!("fatal: arena is only supported on Linux");
    std::process::exit(exit_codes::INTERNAL_ERROR);
}
