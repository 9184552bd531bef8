use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the ts-ratchet binary.
#[derive(Parser, Debug)]
#[command(
    name = "ts-ratchet",
    version,
    about = "Insert // @ts-expect-error above every issue the TypeScript checker reports"
)]
pub struct CliArgs {
    /// Path to tsconfig.json or a directory containing it.
    /// Defaults to the nearest tsconfig.json above the working directory.
    #[arg(short = 'p', long = "project")]
    pub project: Option<PathBuf>,

    /// Do not ask for confirmation before modifying files.
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Type checker command; may include leading arguments (e.g. "npx tsc").
    #[arg(long, default_value = "tsc")]
    pub tsc: String,

    /// Skip the syntax-tree pass.
    #[arg(long = "no-structural")]
    pub no_structural: bool,

    /// Skip the text-offset pass.
    #[arg(long = "no-offset")]
    pub no_offset: bool,

    /// Only type check and report the issues; never modify files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// With --dry-run, print the collected issues as JSON.
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// Disable colored output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}
