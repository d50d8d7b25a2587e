//! Cross-checks between the bitmask and the detailed cut-flow result
//!
//! The two representations of a candidate's cut flow are produced separately
//! and can drift apart, for example when a bitmap is read back under the
//! wrong registry. These checks ask the same questions of both and report
//! where the answers differ.

use crate::{
    codec::{CutBits, CutCodes, CutSet},
    cutflow::CutFlowResult,
    error::Result,
    numeric::CutWord,
};

/// Answers to one selection question, from both representations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Agreement {
    /// Answer derived from the bitmask
    pub from_bits: bool,

    /// Answer derived from the cut-flow result
    pub from_result: bool,
}
//
impl Agreement {
    /// Truth that both representations gave the same answer
    pub fn agrees(&self) -> bool {
        self.from_bits == self.from_result
    }
}

/// Outcome of the cross-checks for one candidate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Consistency {
    /// Whole cut flow
    pub full: Agreement,

    /// A required subset of the cuts
    pub subset: Agreement,

    /// Every cut except some ignored ones (usually a single "N-1" cut)
    pub n_minus_one: Agreement,
}
//
impl Consistency {
    /// Run the cross-checks
    pub fn check<W: CutWord>(
        codes: &CutCodes<W>,
        bits: CutBits<W>,
        result: &CutFlowResult,
        subset: &CutSet<W>,
        n_minus_one: &CutSet<W>,
    ) -> Result<Self> {
        codes.registry().ensure_same(result.registry())?;

        let full = Agreement {
            from_bits: codes.pass_all(bits, &codes.all_cuts())?,
            from_result: result.cut_flow_passed(),
        };

        let subset_from_result = if subset.is_empty() {
            result.cut_flow_passed()
        } else {
            subset
                .iter()
                .map(|index| result.cut_result_by_index(index))
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .all(|passed| passed)
        };
        let subset = Agreement {
            from_bits: codes.pass_all(bits, subset)?,
            from_result: subset_from_result,
        };

        let n_minus_one = Agreement {
            from_bits: codes.pass_subset_ignoring(bits, n_minus_one)?,
            from_result: result.masking(n_minus_one)?.cut_flow_passed(),
        };

        let consistency = Self {
            full,
            subset,
            n_minus_one,
        };
        consistency.log_mismatches(result.cut_flow_name());
        Ok(consistency)
    }

    /// Truth that all cross-checks agreed
    pub fn is_consistent(&self) -> bool {
        self.full.agrees() && self.subset.agrees() && self.n_minus_one.agrees()
    }

    /// Report disagreements
    fn log_mismatches(&self, cut_flow: &str) {
        for (question, agreement) in [
            ("full cut flow", &self.full),
            ("cut subset", &self.subset),
            ("N-1 cut flow", &self.n_minus_one),
        ] {
            if !agreement.agrees() {
                tracing::warn!(
                    cut_flow,
                    question,
                    from_bits = agreement.from_bits,
                    from_result = agreement.from_result,
                    "bitmap and cut flow result disagree"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::heep_v70;

    fn failing_trkiso() -> CutFlowResult {
        let mut outcomes = vec![(true, 1.0); 12];
        outcomes[heep_v70::TRKISO] = (false, 12.3);
        CutFlowResult::new(&heep_v70::REGISTRY, &outcomes).unwrap()
    }

    #[test]
    fn matching_representations() {
        let codes = CutCodes::<u32>::new(&heep_v70::REGISTRY).unwrap();
        let result = failing_trkiso();
        let bits = result.to_bits(&codes).unwrap();
        let subset = codes
            .cut_set([
                heep_v70::ET,
                heep_v70::SIGMAIETAIETA,
                heep_v70::E2X5OVER5X5,
                heep_v70::HADEM,
            ])
            .unwrap();
        let trkiso = codes.cut_set([heep_v70::TRKISO]).unwrap();

        let consistency = Consistency::check(&codes, bits, &result, &subset, &trkiso).unwrap();
        assert!(consistency.is_consistent());
        assert!(!consistency.full.from_bits);
        assert!(consistency.subset.from_result);
        assert!(consistency.n_minus_one.from_bits);
    }

    #[test]
    fn drifting_bitmap() {
        let codes = CutCodes::<u32>::new(&heep_v70::REGISTRY).unwrap();
        let result = failing_trkiso();
        // Bitmap claiming that HADEM failed instead of TRKISO
        let bits = codes.decode(0xfff & !(1 << heep_v70::HADEM)).unwrap();
        let subset = codes.cut_set([heep_v70::ET, heep_v70::HADEM]).unwrap();
        let trkiso = codes.cut_set([heep_v70::TRKISO]).unwrap();

        let consistency = Consistency::check(&codes, bits, &result, &subset, &trkiso).unwrap();
        assert!(consistency.full.agrees());
        assert!(!consistency.subset.agrees());
        assert!(!consistency.n_minus_one.agrees());
        assert!(!consistency.is_consistent());
    }
}
