//! Per-candidate analysis and accumulation of its results across candidates

use heep_vid::{
    codec::{CutBits, CutCodes, CutSet},
    input::Candidate,
    registry::CutRegistry,
    tally::PassFailTally,
    validate::Consistency,
    CutFlowError, Result,
};

/// What the analysis finds out about one candidate
#[derive(Clone, Copy, Debug)]
pub struct CandidateOutcome {
    /// Per-cut outcomes, as a bitmask
    pub bits: CutBits<u32>,

    /// Truth that the whole cut flow passed
    pub passed: bool,

    /// Truth that the required subset of cuts passed
    pub subset_passed: bool,

    /// Truth that every cut but the N-1 ones passed
    pub n_minus_one_passed: bool,

    /// First cut which failed, if any
    pub first_failed: Option<usize>,

    /// Truth that the bitmap and the cut-flow result agreed
    pub consistent: bool,
}

/// Analysis kernel, applied to each candidate
pub struct Analyzer {
    codes: CutCodes<u32>,
    subset: CutSet<u32>,
    n_minus_one: CutSet<u32>,
}
//
impl Analyzer {
    /// Set up the analysis of candidates evaluated under some cut flow
    pub fn new(codes: CutCodes<u32>, subset: CutSet<u32>, n_minus_one: CutSet<u32>) -> Self {
        Self {
            codes,
            subset,
            n_minus_one,
        }
    }

    /// Analyze one candidate
    pub fn analyze(&self, candidate: &Candidate) -> Result<CandidateOutcome> {
        let result = &candidate.result;

        // Use the published bitmap when there is one, otherwise derive it
        let bits = match candidate.bitmap {
            Some(raw) => self.codes.decode(raw),
            None => result.to_bits(&self.codes),
        }
        .map_err(|error| with_line(error, candidate.line))?;

        // Disagreements are reported by the check, under this candidate's span
        let consistency = tracing::info_span!("candidate", line = candidate.line).in_scope(|| {
            Consistency::check(&self.codes, bits, result, &self.subset, &self.n_minus_one)
        })?;

        // The detailed result is the reference for the selection itself
        Ok(CandidateOutcome {
            bits,
            passed: consistency.full.from_result,
            subset_passed: consistency.subset.from_result,
            n_minus_one_passed: consistency.n_minus_one.from_result,
            first_failed: result.records().iter().position(|record| !record.passed),
            consistent: consistency.is_consistent(),
        })
    }

    /// Analyze a batch of candidates, counting them in the shared tally
    pub fn analyze_batch(
        &self,
        candidates: &[Candidate],
        tally: &PassFailTally,
    ) -> Result<AnalysisAccumulator> {
        let mut accumulator = AnalysisAccumulator::new(self.codes.registry());
        for candidate in candidates {
            let outcome = self.analyze(candidate)?;
            tally.record(outcome.passed);
            accumulator.integrate(&outcome);
        }
        Ok(accumulator)
    }
}

/// Attach the input line to a bitmap decoding error
fn with_line(error: CutFlowError, line: usize) -> CutFlowError {
    CutFlowError::Parse {
        line,
        message: error.to_string(),
    }
}

/// This struct will accumulate intermediary results during the analysis, and
/// ultimately compute the final results (see FinalResults below).
#[derive(Debug)]
pub struct AnalysisAccumulator {
    /// Cut flow of the candidates
    registry: &'static CutRegistry,

    /// Number of analyzed candidates
    nr_candidates: usize,

    /// Number of candidates passing the required subset of cuts
    nr_subset_pass: usize,

    /// Number of candidates passing the N-1 selection
    nr_n_minus_one_pass: usize,

    /// Number of candidates whose bitmap and cut-flow result disagreed
    nr_inconsistent: usize,

    /// Number of candidates passing each cut
    nr_pass_per_cut: Vec<usize>,

    /// Number of candidates whose first failed cut is each cut
    nr_first_failed: Vec<usize>,
}
//
impl AnalysisAccumulator {
    /// Prepare for results integration
    pub fn new(registry: &'static CutRegistry) -> Self {
        Self {
            registry,
            nr_candidates: 0,
            nr_subset_pass: 0,
            nr_n_minus_one_pass: 0,
            nr_inconsistent: 0,
            nr_pass_per_cut: vec![0; registry.size()],
            nr_first_failed: vec![0; registry.size()],
        }
    }

    /// Integrate the outcome of one candidate
    pub fn integrate(&mut self, outcome: &CandidateOutcome) {
        self.nr_candidates += 1;
        self.nr_subset_pass += usize::from(outcome.subset_passed);
        self.nr_n_minus_one_pass += usize::from(outcome.n_minus_one_passed);
        self.nr_inconsistent += usize::from(!outcome.consistent);
        let raw = outcome.bits.raw();
        for (index, count) in self.nr_pass_per_cut.iter_mut().enumerate() {
            *count += ((raw >> index) & 1) as usize;
        }
        if let Some(index) = outcome.first_failed {
            self.nr_first_failed[index] += 1;
        }
    }

    /// Integrate analysis results from another AnalysisAccumulator
    #[allow(clippy::needless_pass_by_value)]
    pub fn merge(&mut self, other: Self) {
        assert_eq!(self.registry, other.registry, "Cannot merge different cut flows");
        self.nr_candidates += other.nr_candidates;
        self.nr_subset_pass += other.nr_subset_pass;
        self.nr_n_minus_one_pass += other.nr_n_minus_one_pass;
        self.nr_inconsistent += other.nr_inconsistent;
        for (mine, theirs) in self.nr_pass_per_cut.iter_mut().zip(other.nr_pass_per_cut) {
            *mine += theirs;
        }
        for (mine, theirs) in self.nr_first_failed.iter_mut().zip(other.nr_first_failed) {
            *mine += theirs;
        }
    }

    /// Turn accumulated counts into finalized results
    pub fn finalize(self, tally: &PassFailTally) -> FinalResults<'_> {
        assert_eq!(
            tally.total(),
            self.nr_candidates,
            "Tally and accumulator should have seen the same candidates"
        );
        let fraction = |count: usize| count as f64 / self.nr_candidates as f64;
        let cuts = self
            .registry
            .names()
            .zip(self.nr_pass_per_cut.iter().zip(&self.nr_first_failed))
            .map(|(name, (&nr_pass, &nr_first_failed))| CutSummary {
                name,
                nr_pass,
                efficiency: fraction(nr_pass),
                nr_first_failed,
            })
            .collect();
        FinalResults {
            registry: self.registry,
            tally,
            efficiency: fraction(tally.nr_pass()),
            subset_efficiency: fraction(self.nr_subset_pass),
            n_minus_one_efficiency: fraction(self.nr_n_minus_one_pass),
            nr_subset_pass: self.nr_subset_pass,
            nr_n_minus_one_pass: self.nr_n_minus_one_pass,
            nr_inconsistent: self.nr_inconsistent,
            cuts,
        }
    }
}

/// Final statistics of one cut
#[derive(Clone, Debug, PartialEq)]
pub struct CutSummary {
    /// Name of the cut
    pub name: &'static str,

    /// Number of candidates passing the cut
    pub nr_pass: usize,

    /// Fraction of candidates passing the cut
    pub efficiency: f64,

    /// Number of candidates for which this is the first failed cut
    pub nr_first_failed: usize,
}

/// Final results of the analysis
#[derive(Debug)]
pub struct FinalResults<'tally> {
    /// Cut flow of the candidates
    pub registry: &'static CutRegistry,

    /// Overall pass/fail counts
    pub tally: &'tally PassFailTally,

    /// Fraction of candidates passing the whole cut flow
    pub efficiency: f64,

    /// Number of candidates passing the required subset of cuts
    pub nr_subset_pass: usize,

    /// Fraction of candidates passing the required subset of cuts
    pub subset_efficiency: f64,

    /// Number of candidates passing the N-1 selection
    pub nr_n_minus_one_pass: usize,

    /// Fraction of candidates passing the N-1 selection
    pub n_minus_one_efficiency: f64,

    /// Number of candidates whose bitmap and cut-flow result disagreed
    pub nr_inconsistent: usize,

    /// Per-cut statistics, in cut flow order
    pub cuts: Vec<CutSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use heep_vid::{input::parse_candidates, registry::heep_v70};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tracing_subscriber::{
        layer::{Context, SubscriberExt},
        Layer,
    };

    const INPUT: &str = "\
bits=0xf7f 1:1 1:1 1:1 1:1 1:1 1:1 1:1 0:12.3 1:1 1:1 1:1 1:1
1:1 1:1 1:1 1:1 1:1 1:1 1:1 1:1 1:1 1:1 1:1 1:1
1:1 0:2 1:1 1:1 1:1 1:1 1:1 0:9 1:1 1:1 1:1 1:1
bits=0xfff 1:1 1:1 1:1 1:1 1:1 1:1 0:0.5 1:1 1:1 1:1 1:1 1:1
";

    fn analyzer() -> Analyzer {
        let codes = CutCodes::<u32>::new(&heep_v70::REGISTRY).unwrap();
        let subset = codes
            .cut_set([
                heep_v70::ET,
                heep_v70::SIGMAIETAIETA,
                heep_v70::E2X5OVER5X5,
                heep_v70::HADEM,
            ])
            .unwrap();
        let n_minus_one = codes.cut_set([heep_v70::TRKISO]).unwrap();
        Analyzer::new(codes, subset, n_minus_one)
    }

    #[test]
    fn batch_analysis() {
        let candidates = parse_candidates(&heep_v70::REGISTRY, INPUT).unwrap();
        let tally = PassFailTally::new();
        let analyzer = analyzer();

        // Split in two batches to exercise merging
        let mut accumulator = analyzer.analyze_batch(&candidates[..1], &tally).unwrap();
        accumulator.merge(analyzer.analyze_batch(&candidates[1..], &tally).unwrap());
        let results = accumulator.finalize(&tally);

        assert_eq!(results.tally.nr_pass(), 1);
        assert_eq!(results.tally.nr_fail(), 3);
        assert_eq!(results.nr_n_minus_one_pass, 2);
        assert_eq!(results.nr_subset_pass, 3);
        assert_eq!(results.nr_inconsistent, 1);
        assert_eq!(results.efficiency, 0.25);

        let trkiso = &results.cuts[heep_v70::TRKISO];
        assert_eq!(trkiso.name, "TRKISO");
        assert_eq!(trkiso.nr_pass, 2);
        assert_eq!(trkiso.nr_first_failed, 1);
        assert_eq!(results.cuts[heep_v70::ETA].nr_first_failed, 1);
        assert_eq!(results.cuts[heep_v70::HADEM].nr_first_failed, 1);
    }

    #[test]
    fn foreign_bitmap_is_reported_with_its_line() {
        let line = format!("bits=0x1fff{}", " 1:1".repeat(12));
        let candidates = parse_candidates(&heep_v70::REGISTRY, &line).unwrap();
        let error = analyzer().analyze(&candidates[0]).unwrap_err();
        assert!(matches!(error, CutFlowError::Parse { line: 1, .. }));
    }

    /// Counts the warnings emitted while it is the active subscriber
    struct WarningCounter(Arc<AtomicUsize>);
    //
    impl<S: tracing::Subscriber> Layer<S> for WarningCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    #[test]
    fn one_warning_per_disagreement() {
        let candidates = parse_candidates(&heep_v70::REGISTRY, INPUT).unwrap();
        let analyzer = analyzer();
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarningCounter(warnings.clone()));
        tracing::subscriber::with_default(subscriber, || {
            // Consistent candidate
            assert!(analyzer.analyze(&candidates[0]).unwrap().consistent);
            assert_eq!(warnings.load(Ordering::Relaxed), 0);

            // Bitmap misses the HADEM failure, which all three checks notice
            assert!(!analyzer.analyze(&candidates[3]).unwrap().consistent);
            assert_eq!(warnings.load(Ordering::Relaxed), 3);
        });
    }
}
