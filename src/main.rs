//! HEEP example analyzer
//!
//! Reads the cut outcomes that the reconstruction framework computed for a
//! set of electron candidates, and reports how many of them pass the whole
//! cut flow, a required subset of cuts, and an N-1 selection. Along the way,
//! the published bitmaps are cross-checked against the detailed results.
//!
//! Usage: `heep_vid [CONFIG]` (default configuration file: `heep.cfg`)

#![warn(missing_docs)]

mod analysis;
mod cli;
mod config;
mod output;
mod scheduling;

use crate::{analysis::Analyzer, cli::Cli, config::Configuration};

use heep_vid::{codec::CutCodes, input, tally::PassFailTally};

use clap::Parser;
use eyre::{ensure, WrapErr};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::{fs, time::Instant};

/// This will act as our main function, with suitable error handling
fn main() -> eyre::Result<()> {
    // ### COMMAND LINE ###

    let cli = Cli::parse();

    // ### LOGGING SETUP ###

    // Log to stderr, keeping stdout for the results. Verbosity is controlled
    // through RUST_LOG and defaults to info.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // ### CONFIGURATION READOUT ###

    let cfg = Configuration::load(&cli.config).wrap_err("Failed to load the configuration")?;

    // ### INPUT READOUT ###

    let input_str = fs::read_to_string(&cfg.input)
        .wrap_err_with(|| format!("Failed to read candidates from {}", cfg.input))?;
    let candidates = input::parse_candidates(cfg.registry, &input_str)
        .wrap_err_with(|| format!("Failed to parse candidates from {}", cfg.input))?;
    ensure!(!candidates.is_empty(), "No candidate found in {}", cfg.input);
    tracing::info!(
        cut_flow = cfg.registry.name(),
        nr_candidates = candidates.len(),
        "loaded candidates"
    );

    // ### ANALYSIS INITIALIZATION ###

    // NOTE: The clock starts after input I/O, to avoid IO-induced timing
    //       fluctuations
    let saved_time = Instant::now();

    let codes = CutCodes::<u32>::new(cfg.registry)?;
    let analyzer = Analyzer::new(
        codes,
        cfg.required_set(&codes)?,
        cfg.n_minus_one_set(&codes)?,
    );
    let tally = PassFailTally::new();

    // ### ANALYSIS EXECUTION ###

    // This kernel analyzes a batch of candidates and returns the accumulated
    // intermediary results
    let analyze_batch = |batch: &[input::Candidate]| analyzer.analyze_batch(batch, &tally);

    // Run the analysis
    let result = scheduling::run_analysis(cfg.registry, &candidates, &tally, analyze_batch)
        .wrap_err("Failed to analyze the candidates")?;

    // ### RESULTS DISPLAY AND STORAGE ###

    // Measure how much time has elapsed
    let elapsed_time = saved_time.elapsed();

    // Send the results to the standard output and to disk and we're done
    output::dump_results(&cfg, &result, elapsed_time).wrap_err("Failed to output the results")?;

    // ...and we're done
    Ok(())
}
