//! Multi-threaded back-end of the analysis

use crate::{analysis::AnalysisAccumulator, scheduling::CANDIDATE_BATCH_SIZE};

use heep_vid::{input::Candidate, registry::CutRegistry, Result};

use rayon::prelude::*;

/// Analyze candidates in multi-threaded mode
///
/// Batches are analyzed in parallel, but their results are merged in batch
/// order so that the outcome does not depend on the thread scheduling.
///
pub fn run_analysis_impl(
    registry: &'static CutRegistry,
    candidates: &[Candidate],
    analyze_batch: impl Send + Sync + Fn(&[Candidate]) -> Result<AnalysisAccumulator>,
) -> Result<AnalysisAccumulator> {
    // Some double-checking cannot hurt...
    assert!(!candidates.is_empty(), "Must analyze at least one candidate");

    // Analyze every batch, keeping the per-batch results in order
    let batch_results = candidates
        .par_chunks(CANDIDATE_BATCH_SIZE)
        .map(&analyze_batch)
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(
        nr_batches = batch_results.len(),
        threads = rayon::current_num_threads(),
        "analyzed candidate batches"
    );

    // Aggregate the results in a reproducible fashion
    Ok(batch_results
        .into_iter()
        .fold(AnalysisAccumulator::new(registry), |mut r1, r2| {
            r1.merge(r2);
            r1
        }))
}
