use clap::Parser;
use stockpilot::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
