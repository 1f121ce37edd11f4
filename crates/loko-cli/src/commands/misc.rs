//! `loko completion <shell>` / `loko version`.

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;

pub fn run_completion(shell: Shell) -> i32 {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
    super::EXIT_OK
}

pub fn run_version() -> i32 {
    println!("loko {}", env!("CARGO_PKG_VERSION"));
    super::EXIT_OK
}
