use std::path::PathBuf;

use clap::Parser;

/// Largest `--capacity` accepted.
pub const MAX_CAPACITY: i64 = 1 << 24;

/// Interactive service queue: hand out buzzers, serve, kick out, and take bribes.
///
/// Set RUST_LOG=debug to log rejected lines and directory growth to stderr.
#[derive(Debug, Parser)]
#[command(name = "sq", version)]
pub struct Cli {
    /// Skip the banner and the `cmd >` prompt
    #[arg(long, short)]
    pub quiet: bool,

    /// Pre-size the buzzer directory
    #[arg(long, short, value_parser = clap::value_parser!(u32).range(0..=MAX_CAPACITY))]
    pub capacity: Option<u32>,

    /// Read commands from a file instead of stdin
    #[arg(long, short)]
    pub script: Option<PathBuf>,
}
