//! End-to-end scenarios through the public API: bitmasks and detailed results
//! of the same candidates must answer every selection question identically.

use heep_vid::{
    registry::{self, cut_fall17_v1, heep_v70},
    CutCodes, CutFlowError, CutFlowResult,
};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

#[test]
fn heep_n_minus_one_trkiso() {
    let codes = CutCodes::<u32>::new(&heep_v70::REGISTRY).unwrap();

    let mut outcomes = [true; 12];
    outcomes[heep_v70::TRKISO] = false;
    let bits = codes.encode(&outcomes).unwrap();
    assert_eq!(bits.raw(), 0b1111_0111_1111);

    assert!(!codes.pass_all_indices(bits, &[]).unwrap());
    assert!(codes.pass_ignoring_indices(bits, &[7]).unwrap());
    assert!(codes.pass_all_indices(bits, &[0, 4, 5, 6]).unwrap());

    let records = outcomes
        .iter()
        .enumerate()
        .map(|(index, &passed)| (passed, if index == 7 { 12.3 } else { 1.0 }))
        .collect::<Vec<_>>();
    let result = CutFlowResult::new(&heep_v70::REGISTRY, &records).unwrap();
    assert!(!result.cut_flow_passed());
    let masked = result.masking_indices(&[heep_v70::TRKISO]).unwrap();
    assert!(masked.cut_flow_passed());
    assert_eq!(masked.value_cut_upon(heep_v70::TRKISO), Ok(12.3));
    assert_eq!(result.value_cut_upon(heep_v70::TRKISO), Ok(12.3));
    assert_eq!(result.to_bits(&codes), Ok(bits));
}

#[test]
fn error_cases() {
    let records = vec![(true, 0.0); 10];
    let result = CutFlowResult::new(&cut_fall17_v1::REGISTRY, &records).unwrap();
    assert!(matches!(
        result.cut_result_by_index(99),
        Err(CutFlowError::IndexOutOfRange { index: 99, .. })
    ));

    let codes = CutCodes::<u32>::new(&cut_fall17_v1::REGISTRY).unwrap();
    assert!(matches!(
        codes.encode(&[true; 9]),
        Err(CutFlowError::LengthMismatch {
            expected: 10,
            actual: 9,
            ..
        })
    ));
    assert!(matches!(
        cut_fall17_v1::REGISTRY.index_of("TRKISO"),
        Err(CutFlowError::UnknownCutName { .. })
    ));
}

#[test]
fn both_representations_agree_on_random_cut_flows() {
    let mut rng = Xoshiro256Plus::seed_from_u64(2017);
    for registry in registry::all() {
        let codes = CutCodes::<u64>::new(registry).unwrap();
        let size = registry.size();
        for _ in 0..200 {
            let records = (0..size)
                .map(|_| (rng.gen_bool(0.85), rng.gen_range(0.0..100.0)))
                .collect::<Vec<_>>();
            let result = CutFlowResult::new(registry, &records).unwrap();
            let bits = result.to_bits(&codes).unwrap();

            let ignored = codes
                .cut_set((0..size).filter(|_| rng.gen_bool(0.3)))
                .unwrap();
            let masked = result.masking(&ignored).unwrap();
            assert_eq!(
                codes.pass_subset_ignoring(bits, &ignored).unwrap(),
                masked.cut_flow_passed()
            );
            assert_eq!(masked.masking(&ignored).unwrap(), masked);
            assert_eq!(
                codes.pass_all(bits, &codes.all_cuts()).unwrap(),
                result.cut_flow_passed()
            );
            assert_eq!(
                codes.first_failed(bits).unwrap(),
                result.records().iter().position(|record| !record.passed)
            );
        }
    }
}
