use clap::Parser;
use guess_cli::cli::args::PlayerArgs;
use guess_cli::cli::commands::play;
use guess_cli::{exit_codes, logging};

fn main() {
    let args = PlayerArgs::parse();
    logging::init(&args.log);
    let code = match play::run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            exit_codes::INTERNAL_ERROR
        }
    };
    std::process::exit(code);
}
