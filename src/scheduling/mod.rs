//! This module takes care of scheduling the analysis work, encapsulating use
//! of multiple threads

#[cfg(feature = "multi-threading")]
mod multi_threading;
#[cfg(not(feature = "multi-threading"))]
mod sequential;

use crate::analysis::{AnalysisAccumulator, FinalResults};

use heep_vid::{input::Candidate, registry::CutRegistry, tally::PassFailTally, Result};

/// Size of the candidate batches
///
/// Candidates are grouped in batches of a certain size, which are analyzed
/// independently and merged in order. This keeps the scheduling overhead of
/// the multi-threaded back-end low, and makes sequential and parallel runs
/// produce identical results.
///
const CANDIDATE_BATCH_SIZE: usize = 1_000;

/// Run the analysis in the manner that was configured at build time.
///
/// Takes as parameters the candidates to be analyzed, and an analysis kernel
/// that processes a batch of candidates, records their overall pass/fail
/// decision in the shared tally, and returns the accumulated results.
///
/// Returns the finalized analysis results
///
pub fn run_analysis<'tally>(
    registry: &'static CutRegistry,
    candidates: &[Candidate],
    tally: &'tally PassFailTally,
    analyze_batch: impl Send + Sync + Fn(&[Candidate]) -> Result<AnalysisAccumulator>,
) -> Result<FinalResults<'tally>> {
    // Check that the caller is being reasonable (should have already been
    // checked after reading the input, but bugs can happen...)
    assert!(!candidates.is_empty(), "Must analyze at least one candidate");

    // Integrate analysis results...
    let accumulator = {
        // ...in sequential mode
        #[cfg(not(feature = "multi-threading"))]
        {
            sequential::run_analysis_impl(registry, candidates, analyze_batch)?
        }

        // ...in multi-threaded mode
        #[cfg(feature = "multi-threading")]
        {
            multi_threading::run_analysis_impl(registry, candidates, analyze_batch)?
        }
    };

    // Every candidate must have been counted exactly once
    assert_eq!(
        tally.total(),
        candidates.len(),
        "Tally should count each candidate once"
    );

    // Finalize the results
    Ok(accumulator.finalize(tally))
}
