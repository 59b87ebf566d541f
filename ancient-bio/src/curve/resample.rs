//! Lossy binning of a genotype sequence down (or up) to a fixed cell count

use ancient_core::types::{GenotypeCode, ResampleStrategy};

/// Half-open input range covered by output cell `i`.
///
/// With `chunk = len / target`, cell `i` spans `ceil(i * chunk) .. floor((i + 1) * chunk)`,
/// clipped to the input. The range may be empty when `target > len`.
pub fn chunk_bounds(i: usize, len: usize, target: usize) -> (usize, usize) {
    let chunk = len as f64 / target as f64;
    let start = ((i as f64) * chunk).ceil() as usize;
    let end = (((i + 1) as f64) * chunk).floor() as usize;
    (start.min(len), end.min(len))
}

/// Reduce one chunk to a single code. Empty chunks yield `HomRef`.
pub fn reduce(chunk: &[GenotypeCode], strategy: ResampleStrategy) -> GenotypeCode {
    match strategy {
        ResampleStrategy::Max => chunk.iter().copied().max().unwrap_or_default(),
        ResampleStrategy::Min => chunk.iter().copied().min().unwrap_or_default(),
        ResampleStrategy::Mode => {
            if chunk.is_empty() {
                return GenotypeCode::HomRef;
            }
            let mut counts = [0usize; 3];
            for code in chunk {
                counts[code.as_u8() as usize] += 1;
            }
            // Ties resolve to the higher code
            GenotypeCode::ALL
                .iter()
                .copied()
                .max_by_key(|code| (counts[code.as_u8() as usize], code.as_u8()))
                .unwrap_or_default()
        }
    }
}

/// Resample `codes` to exactly `target` cells
pub fn resample(
    codes: &[GenotypeCode],
    target: usize,
    strategy: ResampleStrategy,
) -> Vec<GenotypeCode> {
    let out: Vec<GenotypeCode> = (0..target)
        .map(|i| {
            let (start, end) = chunk_bounds(i, codes.len(), target);
            if start < end {
                reduce(&codes[start..end], strategy)
            } else {
                GenotypeCode::HomRef
            }
        })
        .collect();

    tracing::debug!(
        "Resampled {} calls to {} cells ({})",
        codes.len(),
        target,
        strategy
    );
    out
}
