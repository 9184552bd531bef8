use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::sync::Arc;

use ratchet_cli::args::CliArgs;
use ratchet_cli::driver;
use ratchet_engine::TscChecker;

fn main() -> Result<()> {
    // Initialize tracing if RATCHET_LOG or RUST_LOG is set.
    // Supports RATCHET_LOG_FORMAT=tree|json|text (see src/tracing_config.rs).
    ratchet_cli::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let color = !args.no_color && std::io::stdout().is_terminal();
    let checker = Arc::new(TscChecker::new(&args.tsc));

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout().lock();
    driver::run(&args, &cwd, checker, color, &mut input, &mut output)?;
    Ok(())
}
