use clap::Parser;
use guess_cli::cli::args::JudgerArgs;
use guess_cli::cli::commands::judge;
use guess_cli::{exit_codes, logging};

fn main() {
    let args = JudgerArgs::parse();
    logging::init(&args.log);
    let code = match judge::run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            exit_codes::INTERNAL_ERROR
        }
    };
    std::process::exit(code);
}
