use std::ops::Range;

/// Split `total` items into exactly `workers` contiguous half-open ranges.
///
/// Range size is ceil(total / workers); the i-th range covers
/// [i*size, (i+1)*size) clamped to `total`, so trailing ranges may be empty
/// when the count does not divide evenly. The concatenation of all ranges in
/// order reconstructs 0..total with no gaps or overlaps.
pub fn segment_ranges(total: usize, workers: usize) -> Vec<Range<usize>> {
    debug_assert!(workers > 0);
    let size = (total + workers - 1) / workers;
    (0..workers)
        .map(|i| {
            let start = (i * size).min(total);
            let end = ((i + 1) * size).min(total);
            start..end
        })
        .collect()
}
