//! Command-line interface of the analyzer

use clap::Parser;

use std::path::PathBuf;

/// Default configuration file
const DEFAULT_CONFIG: &str = "heep.cfg";

/// HEEP example analyzer
#[derive(Debug, Parser)]
#[command(name = "heep_vid", version)]
#[command(about = "Count electron candidates passing a cut-based identification")]
pub struct Cli {
    /// Analysis configuration file
    #[arg(default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}
