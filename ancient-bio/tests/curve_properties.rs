/// Property tests for the curve mapping and resampling
use ancient_bio::curve::resample::chunk_bounds;
use ancient_bio::curve::{construct, index_to_point, point_to_index, resample, side, HilbertTable};
use ancient_core::types::{GenotypeCode, ResampleStrategy};
use ancient_test::assertions::assert_permutation;
use proptest::prelude::*;

fn code_strategy() -> impl Strategy<Value = GenotypeCode> {
    (0i64..3).prop_map(|c| GenotypeCode::from_code(c).unwrap_or_default())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_point_round_trip(order in 0u32..=15, a in any::<u32>(), b in any::<u32>()) {
        let n = side(order);
        let (x, y) = (a % n, b % n);
        let index = point_to_index(x, y, order);
        prop_assert!(index < 1u64 << (2 * order));
        prop_assert_eq!(index_to_point(index, order), (x, y));
    }

    #[test]
    fn prop_index_round_trip(order in 0u32..=15, raw in any::<u64>()) {
        let index = raw % (1u64 << (2 * order));
        let (x, y) = index_to_point(index, order);
        prop_assert_eq!(point_to_index(x, y, order), index);
    }

    #[test]
    fn prop_construct_is_permutation(order in 0u32..=5) {
        let cells = 1usize << (2 * order);
        let ranks: Vec<usize> = (0..cells).collect();
        let permuted = construct(&ranks, order).unwrap();
        assert_permutation(&permuted);
        let table = HilbertTable::new(order).unwrap();
        prop_assert_eq!(table.construct(&ranks).unwrap(), permuted);
    }

    #[test]
    fn prop_resample_identity(codes in prop::collection::vec(code_strategy(), 0..200)) {
        for strategy in [ResampleStrategy::Max, ResampleStrategy::Min, ResampleStrategy::Mode] {
            prop_assert_eq!(resample(&codes, codes.len(), strategy), codes.clone());
        }
    }

    #[test]
    fn prop_resample_exact_length(
        codes in prop::collection::vec(code_strategy(), 0..300),
        target in 0usize..100,
    ) {
        prop_assert_eq!(resample(&codes, target, ResampleStrategy::Max).len(), target);
    }

    #[test]
    fn prop_max_keeps_hom_alt(len in 1usize..64, factor in 1usize..8, at in any::<usize>()) {
        // Chunks tile the input exactly when the length is a multiple of the target
        let mut codes = vec![GenotypeCode::HomRef; len * factor];
        let hit = at % codes.len();
        codes[hit] = GenotypeCode::HomAlt;
        let out = resample(&codes, len, ResampleStrategy::Max);
        prop_assert_eq!(out[hit / factor], GenotypeCode::HomAlt);
        prop_assert_eq!(out.iter().filter(|c| **c == GenotypeCode::HomAlt).count(), 1);
    }

    #[test]
    fn prop_max_saturates_when_every_chunk_has_hom_alt(
        len in 1usize..400,
        target in 1usize..64,
        fill in prop::collection::vec(code_strategy(), 400),
        pick in any::<usize>(),
    ) {
        let mut codes = fill[..len].to_vec();
        for i in 0..target {
            let (start, end) = chunk_bounds(i, len, target);
            if start < end {
                codes[start + pick % (end - start)] = GenotypeCode::HomAlt;
            }
        }

        let out = resample(&codes, target, ResampleStrategy::Max);
        prop_assert_eq!(out.len(), target);
        for (i, cell) in out.iter().enumerate() {
            let (start, end) = chunk_bounds(i, len, target);
            let expected = if start < end { GenotypeCode::HomAlt } else { GenotypeCode::HomRef };
            prop_assert_eq!(*cell, expected, "cell {} covers {}..{}", i, start, end);
        }
    }
}
