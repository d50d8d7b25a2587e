//! Sequential back-end of the analysis

use crate::{analysis::AnalysisAccumulator, scheduling::CANDIDATE_BATCH_SIZE};

use heep_vid::{input::Candidate, registry::CutRegistry, Result};

/// Analyze candidates in sequential mode
///
/// We use batched logic even in sequential mode, in order to achieve
/// reproducibility with respect to multi-threaded runs.
///
pub fn run_analysis_impl(
    registry: &'static CutRegistry,
    candidates: &[Candidate],
    analyze_batch: impl Fn(&[Candidate]) -> Result<AnalysisAccumulator>,
) -> Result<AnalysisAccumulator> {
    // Some double-checking cannot hurt...
    assert!(!candidates.is_empty(), "Must analyze at least one candidate");

    // Analyze and integrate the batches in order
    candidates
        .chunks(CANDIDATE_BATCH_SIZE)
        .try_fold(AnalysisAccumulator::new(registry), |mut accumulator, batch| {
            accumulator.merge(analyze_batch(batch)?);
            Ok(accumulator)
        })
}
