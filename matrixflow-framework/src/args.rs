//! CLI argument parsing for matrixflow services.

use std::path::PathBuf;

use clap::Parser;

/// Common CLI arguments for the producer and relay binaries.
#[derive(Parser, Debug, Clone, Default)]
#[command(about = "matrixflow pipeline service", version)]
pub struct ServiceArgs {
    /// Path to configuration file (JSON5). Built-in defaults are used when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl ServiceArgs {
    /// Parse CLI arguments, reporting usage under the given binary name.
    ///
    /// Exits the process with clap's usage message on invalid arguments.
    pub fn parse_for(name: &'static str) -> Self {
        let matches = <Self as clap::CommandFactory>::command()
            .name(name)
            .get_matches();

        <Self as clap::FromArgMatches>::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    /// Parse CLI arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
