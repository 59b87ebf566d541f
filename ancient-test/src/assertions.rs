//! Custom assertions for testing
//!
//! Assertions for curve permutations and encoded intensities.

use std::collections::HashSet;

/// Assert that `values` is a permutation of `0..values.len()`
pub fn assert_permutation(values: &[usize]) {
    let unique: HashSet<_> = values.iter().copied().collect();
    assert_eq!(unique.len(), values.len(), "duplicate entries in permutation");
    assert!(
        values.iter().all(|&v| v < values.len()),
        "entry out of range in permutation of length {}",
        values.len()
    );
}

/// Assert two intensity sequences agree within a tolerance
pub fn assert_intensities_eq(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() < 1e-6,
            "intensity {} differs at position {}: expected {}",
            a,
            i,
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permutation_accepts_shuffled_range() {
        assert_permutation(&[2, 0, 3, 1]);
    }

    #[test]
    #[should_panic(expected = "duplicate")]
    fn test_permutation_rejects_duplicates() {
        assert_permutation(&[0, 0, 1]);
    }
}
