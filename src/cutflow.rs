//! Detailed cut-flow results
//!
//! Where a bitmask only tells which cuts passed, a `CutFlowResult` also keeps
//! the value that each cut was applied to, and which cuts have been masked
//! out. Masking never modifies a result: it derives a new one in which the
//! masked cuts count as passed, so that many consumers can each ask their own
//! "all cuts but these" question of the same base result.
//!
//! # Values of compound cuts
//!
//! Each cut stores a single value. Some cuts compare several quantities to
//! several thresholds: the HEEP E2x5/E5x5 shower shape cut passes if either
//! E1x5/E5x5 or E2x5/E5x5 is above its threshold, and is skipped altogether
//! for electrons with saturated crystals. The value stored for such a cut
//! cannot reproduce its decision on its own, and should only be used for
//! monitoring. This is inherited from the cut applicators themselves (see
//! `cuts::E2x5OverE5x5WithSatCut::value`).

use crate::{
    codec::{CutBits, CutCodes, CutSet},
    error::{CutFlowError, Result},
    numeric::{CutWord, Float},
    registry::CutRegistry,
};

/// Outcome of a single cut
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CutRecord {
    /// Index of the cut in its registry
    pub index: usize,

    /// Truth that the cut passed, or that it was masked out
    pub passed: bool,

    /// Truth that the cut was masked out
    pub masked: bool,

    /// Value which the cut was applied to
    pub value_cut_upon: Float,
}

/// Outcome of every cut of a cut flow, for one candidate
#[derive(Clone, Debug, PartialEq)]
pub struct CutFlowResult {
    /// Registry of the cut flow
    registry: &'static CutRegistry,

    /// One record per cut, in registry order
    records: Box<[CutRecord]>,
}
//
impl CutFlowResult {
    /// Build a result from ordered (passed, value) pairs, one per cut
    pub fn new(registry: &'static CutRegistry, outcomes: &[(bool, Float)]) -> Result<Self> {
        if outcomes.len() != registry.size() {
            return Err(CutFlowError::LengthMismatch {
                registry: registry.name(),
                expected: registry.size(),
                actual: outcomes.len(),
            });
        }
        let records = outcomes
            .iter()
            .enumerate()
            .map(|(index, &(passed, value_cut_upon))| CutRecord {
                index,
                passed,
                masked: false,
                value_cut_upon,
            })
            .collect();
        Ok(Self { registry, records })
    }

    /// Build a result from (index, passed, value) triplets given in any order
    ///
    /// Each cut of the registry must appear exactly once.
    ///
    pub fn from_indexed(
        registry: &'static CutRegistry,
        outcomes: impl IntoIterator<Item = (usize, bool, Float)>,
    ) -> Result<Self> {
        let mut slots: Vec<Option<(bool, Float)>> = vec![None; registry.size()];
        for (index, passed, value) in outcomes {
            registry.check_index(index)?;
            let slot = &mut slots[index];
            if slot.is_some() {
                return Err(CutFlowError::DuplicateCut {
                    registry: registry.name(),
                    index,
                });
            }
            *slot = Some((passed, value));
        }
        let ordered = slots.iter().flatten().copied().collect::<Vec<_>>();
        if ordered.len() != registry.size() {
            return Err(CutFlowError::LengthMismatch {
                registry: registry.name(),
                expected: registry.size(),
                actual: ordered.len(),
            });
        }
        Self::new(registry, &ordered)
    }

    /// Registry of the cut flow
    pub fn registry(&self) -> &'static CutRegistry {
        self.registry
    }

    /// Name of the cut flow
    pub fn cut_flow_name(&self) -> &'static str {
        self.registry.name()
    }

    /// Number of cuts
    pub fn cut_flow_size(&self) -> usize {
        self.records.len()
    }

    /// Per-cut records, in registry order
    pub fn records(&self) -> &[CutRecord] {
        &self.records
    }

    /// Truth that every cut passed (masked cuts count as passed)
    pub fn cut_flow_passed(&self) -> bool {
        self.records.iter().all(|record| record.passed)
    }

    /// Truth that cut `index` passed
    pub fn cut_result_by_index(&self, index: usize) -> Result<bool> {
        Ok(self.record(index)?.passed)
    }

    /// Truth that the cut called `name` passed
    pub fn cut_result_by_name(&self, name: &str) -> Result<bool> {
        self.cut_result_by_index(self.registry.index_of(name)?)
    }

    /// Value which cut `index` was applied to
    ///
    /// For compound cuts this value alone may not reproduce the decision,
    /// see the module documentation.
    ///
    pub fn value_cut_upon(&self, index: usize) -> Result<Float> {
        Ok(self.record(index)?.value_cut_upon)
    }

    /// Truth that cut `index` has been masked out
    pub fn is_cut_masked(&self, index: usize) -> Result<bool> {
        Ok(self.record(index)?.masked)
    }

    /// Number of cuts which passed, in sequence, before the first failure
    pub fn cuts_passed_in_order(&self) -> usize {
        self.records
            .iter()
            .take_while(|record| record.passed)
            .count()
    }

    /// Derive a result where the cuts of `masked` count as passed
    ///
    /// Values are kept as they are, and the receiver is left untouched.
    ///
    pub fn masking<W: CutWord>(&self, masked: &CutSet<W>) -> Result<Self> {
        self.registry.ensure_same(masked.registry())?;
        Ok(self.masked_where(|index| masked.contains(index)))
    }

    /// Like `masking`, but taking raw cut indices
    pub fn masking_indices(&self, masked: &[usize]) -> Result<Self> {
        for &index in masked {
            self.registry.check_index(index)?;
        }
        Ok(self.masked_where(|index| masked.contains(&index)))
    }

    /// Copy of this result where the cuts selected by `is_masked` pass
    fn masked_where(&self, is_masked: impl Fn(usize) -> bool) -> Self {
        let mut result = self.clone();
        for record in result.records.iter_mut() {
            if is_masked(record.index) {
                record.passed = true;
                record.masked = true;
            }
        }
        tracing::trace!(
            cut_flow = self.cut_flow_name(),
            masked = ?result
                .records
                .iter()
                .filter(|record| record.masked)
                .map(|record| record.index)
                .collect::<Vec<_>>(),
            passed = result.cut_flow_passed(),
            "masked cut flow"
        );
        result
    }

    /// Bitmask view of this result
    pub fn to_bits<W: CutWord>(&self, codes: &CutCodes<W>) -> Result<CutBits<W>> {
        codes.registry().ensure_same(self.registry)?;
        codes.encode_indexed(
            self.records
                .iter()
                .map(|record| (record.index, record.passed)),
        )
    }

    /// Record of cut `index`
    fn record(&self, index: usize) -> Result<&CutRecord> {
        self.records
            .get(index)
            .ok_or(CutFlowError::IndexOutOfRange {
                registry: self.registry.name(),
                index,
                size: self.records.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{cut_fall17_v1, cut_sum16_v1, heep_v70};
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256Plus;

    fn failing_trkiso() -> CutFlowResult {
        let outcomes = (0..12)
            .map(|index| {
                if index == heep_v70::TRKISO {
                    (false, 12.3)
                } else {
                    (true, index as Float)
                }
            })
            .collect::<Vec<_>>();
        CutFlowResult::new(&heep_v70::REGISTRY, &outcomes).unwrap()
    }

    #[test]
    fn n_minus_one_trkiso() {
        let result = failing_trkiso();
        assert!(!result.cut_flow_passed());
        assert_eq!(result.cut_result_by_index(heep_v70::TRKISO), Ok(false));
        assert_eq!(result.cut_result_by_name("HADEM"), Ok(true));
        assert_eq!(result.cuts_passed_in_order(), heep_v70::TRKISO);

        let masked = result.masking_indices(&[heep_v70::TRKISO]).unwrap();
        assert!(masked.cut_flow_passed());
        assert_eq!(masked.value_cut_upon(heep_v70::TRKISO), Ok(12.3));
        assert_eq!(masked.is_cut_masked(heep_v70::TRKISO), Ok(true));
        assert_eq!(masked.is_cut_masked(heep_v70::ET), Ok(false));
        assert_eq!(masked.cuts_passed_in_order(), 12);

        // The base result is unchanged
        assert!(!result.cut_flow_passed());
        assert_eq!(result.value_cut_upon(heep_v70::TRKISO), Ok(12.3));
        assert_eq!(result.is_cut_masked(heep_v70::TRKISO), Ok(false));
    }

    #[test]
    fn masking_through_cut_sets() {
        let result = failing_trkiso();
        let codes = CutCodes::<u32>::new(&heep_v70::REGISTRY).unwrap();
        let isolation = codes.cut_set_by_name(["TRKISO", "EMHADD1ISO"]).unwrap();
        let masked = result.masking(&isolation).unwrap();
        assert!(masked.cut_flow_passed());
        assert_eq!(masked, result.masking(&isolation).unwrap().masking(&isolation).unwrap());

        let foreign = CutCodes::<u32>::new(&cut_sum16_v1::REGISTRY)
            .unwrap()
            .all_cuts();
        assert!(matches!(
            result.masking(&foreign),
            Err(CutFlowError::RegistryMismatch { .. })
        ));
    }

    #[test]
    fn out_of_range_indices() {
        let outcomes = [(true, 1.0); 10];
        let result = CutFlowResult::new(&cut_fall17_v1::REGISTRY, &outcomes).unwrap();
        assert_eq!(
            result.cut_result_by_index(99),
            Err(CutFlowError::IndexOutOfRange {
                registry: "CutFall17V1",
                index: 99,
                size: 10,
            })
        );
        assert!(result.value_cut_upon(10).is_err());
        assert!(result.masking_indices(&[2, 10]).is_err());
        assert!(result.cut_result_by_name("TRKISO").is_err());
        assert_eq!(
            CutFlowResult::new(&cut_fall17_v1::REGISTRY, &outcomes[..9]),
            Err(CutFlowError::LengthMismatch {
                registry: "CutFall17V1",
                expected: 10,
                actual: 9,
            })
        );
    }

    #[test]
    fn indexed_construction() {
        let result = failing_trkiso();
        let shuffled = result
            .records()
            .iter()
            .rev()
            .map(|record| (record.index, record.passed, record.value_cut_upon));
        assert_eq!(
            CutFlowResult::from_indexed(&heep_v70::REGISTRY, shuffled).unwrap(),
            result
        );
        assert!(matches!(
            CutFlowResult::from_indexed(&heep_v70::REGISTRY, [(0, true, 1.0), (0, true, 1.0)]),
            Err(CutFlowError::DuplicateCut { index: 0, .. })
        ));
        assert!(matches!(
            CutFlowResult::from_indexed(&heep_v70::REGISTRY, [(0, true, 1.0)]),
            Err(CutFlowError::LengthMismatch { actual: 1, .. })
        ));
    }

    #[test]
    fn bitmask_view() {
        let result = failing_trkiso();
        let codes = CutCodes::<u32>::new(&heep_v70::REGISTRY).unwrap();
        let bits = result.to_bits(&codes).unwrap();
        assert_eq!(bits.raw(), 0xf7f);
        let masked = result.masking_indices(&[heep_v70::TRKISO]).unwrap();
        assert_eq!(masked.to_bits(&codes).unwrap().raw(), 0xfff);

        let sum16 = CutCodes::<u32>::new(&cut_sum16_v1::REGISTRY).unwrap();
        assert!(result.to_bits(&sum16).is_err());
    }

    #[test]
    fn random_masking() {
        let mut rng = Xoshiro256Plus::seed_from_u64(54321);
        let codes = CutCodes::<u32>::new(&cut_sum16_v1::REGISTRY).unwrap();
        for _ in 0..1000 {
            let outcomes = (0..10)
                .map(|_| (rng.gen_bool(0.7), rng.gen::<Float>()))
                .collect::<Vec<_>>();
            let result = CutFlowResult::new(&cut_sum16_v1::REGISTRY, &outcomes).unwrap();
            let masked_cuts = (0..10).filter(|_| rng.gen()).collect::<Vec<_>>();

            let masked = result.masking_indices(&masked_cuts).unwrap();
            let cut_set = codes.cut_set(masked_cuts.iter().copied()).unwrap();
            assert_eq!(result.masking(&cut_set).unwrap(), masked);
            let expected = (0..10)
                .filter(|index| !masked_cuts.contains(index))
                .all(|index| outcomes[index].0);
            assert_eq!(masked.cut_flow_passed(), expected);

            // Masking twice is the same as masking once
            let twice = masked.masking_indices(&masked_cuts).unwrap();
            assert_eq!(twice, masked);

            // Values are never touched
            for (record, &(_, value)) in masked.records().iter().zip(outcomes.iter()) {
                assert_eq!(record.value_cut_upon, value);
            }
        }
    }

    #[test]
    fn results_are_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CutFlowResult>();
        assert_send_sync::<CutBits<u32>>();
        assert_send_sync::<CutSet<u64>>();

        let result = failing_trkiso();
        let codes = CutCodes::<u32>::new(&heep_v70::REGISTRY).unwrap();
        let isolation = codes.cut_set([heep_v70::TRKISO]).unwrap();
        std::thread::scope(|scope| {
            let workers = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        let masked = result.masking(&isolation).unwrap();
                        (result.cut_flow_passed(), masked.cut_flow_passed())
                    })
                })
                .collect::<Vec<_>>();
            for worker in workers {
                assert_eq!(worker.join().unwrap(), (false, true));
            }
        });
        assert!(!result.is_cut_masked(heep_v70::TRKISO).unwrap());
    }
}
