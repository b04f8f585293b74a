use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use habit_tracker_lib::cli::Cli;
use habit_tracker_lib::Error;

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => print!("{}", output),
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(exit_code(&err));
        }
    }
}

fn run(cli: Cli) -> Result<String> {
    habit_tracker_lib::run(cli).context("habit tracker command failed")
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<Error>() {
        Some(Error::StoreInit(_)) => 3,
        Some(Error::Cli(_)) | Some(Error::NotFound(_)) => 2,
        _ => 1,
    }
}
