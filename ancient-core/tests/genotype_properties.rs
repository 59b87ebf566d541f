/// Property tests for genotype call normalization
use ancient_core::GenotypeCode;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_integer_calls_clamp_outside_domain(raw in any::<i64>(), flip in any::<bool>()) {
        let (code, clamped) = GenotypeCode::normalize_call(&raw.to_string(), flip);
        prop_assert_eq!(clamped, !(0..=2).contains(&raw));
        if clamped {
            prop_assert_eq!(code, GenotypeCode::HomRef);
        } else {
            prop_assert_eq!(i64::from(code.as_u8()), if flip { 2 - raw } else { raw });
        }
    }

    #[test]
    fn prop_arbitrary_text_never_escapes_domain(text in "\\PC{0,8}", flip in any::<bool>()) {
        let (code, _) = GenotypeCode::normalize_call(&text, flip);
        prop_assert!(code.as_u8() <= 2);
    }
}
