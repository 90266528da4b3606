use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use std::process::ExitCode;
use subnet_finder::cli::Cli;

fn main() -> ExitCode {
    let args = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_filter())).init();
    log::debug!("{:?}", args.command);

    // errors go to stdout, the shell scripts calling us read only that
    match subnet_finder::run(args.command) {
        Ok(line) => {
            println!("{}", line);
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{} {}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}
