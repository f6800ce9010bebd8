//! Largest-Triangle-Three-Buckets reduction
//!
//! Shrinks a long buffer to a fixed number of points while keeping the ones that carry the most
//! visual weight. The first and last samples always survive. Each interior bucket contributes the
//! point forming the largest triangle with the previously chosen point and the centroid of the
//! next bucket.
//!
//! Sums and comparisons run in a fixed order in `f64`, so the output for a given
//! `(samples, threshold)` is always the same.

use wavestack_core::{Error, Result};

/// One surviving sample, addressed by its index in the original buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct LttbPoint {
    pub index: usize,
    pub value: f32,
}

/// Reduce `samples` to at most `threshold` points.
///
/// Returns every sample unchanged when `threshold >= samples.len()`.
///
/// # Errors
///
/// `InvalidThreshold` when `threshold < 3`.
pub fn downsample(samples: &[f32], threshold: usize) -> Result<Vec<LttbPoint>> {
    if threshold < 3 {
        return Err(Error::InvalidThreshold(threshold));
    }

    let len = samples.len();
    if threshold >= len {
        return Ok(samples
            .iter()
            .enumerate()
            .map(|(index, &value)| LttbPoint { index, value })
            .collect());
    }

    let bucket_width = (len - 2) as f64 / (threshold - 2) as f64;
    let bucket_bound = |i: usize| ((i as f64 * bucket_width) as usize + 1).min(len - 1);

    let mut out = Vec::with_capacity(threshold);
    out.push(LttbPoint {
        index: 0,
        value: samples[0],
    });

    let mut anchor = 0usize;
    for bucket in 0..threshold - 2 {
        // Centroid of the next bucket; the last interior bucket looks at the final sample
        let next_start = bucket_bound(bucket + 1);
        let next_end = if bucket + 2 >= threshold - 1 {
            len
        } else {
            bucket_bound(bucket + 2)
        };
        let (mut sum_x, mut sum_y) = (0.0f64, 0.0f64);
        for (i, &value) in samples[next_start..next_end].iter().enumerate() {
            sum_x += (next_start + i) as f64;
            sum_y += value as f64;
        }
        let count = (next_end - next_start).max(1) as f64;
        let (avg_x, avg_y) = (sum_x / count, sum_y / count);

        let ax = anchor as f64;
        let ay = samples[anchor] as f64;

        let range_start = bucket_bound(bucket);
        let range_end = next_start.max(range_start + 1);
        let mut best = range_start;
        let mut best_area = -1.0f64;
        for (i, &value) in samples[range_start..range_end].iter().enumerate() {
            let x = (range_start + i) as f64;
            let area = ((ax - avg_x) * (value as f64 - ay) - (ax - x) * (avg_y - ay)).abs();
            if area > best_area {
                best_area = area;
                best = range_start + i;
            }
        }

        out.push(LttbPoint {
            index: best,
            value: samples[best],
        });
        anchor = best;
    }

    out.push(LttbPoint {
        index: len - 1,
        value: samples[len - 1],
    });
    Ok(out)
}

/// Reduced stand-in for a long buffer, in true-sample coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedBuffer {
    source_id: u64,
    source_len: usize,
    points: Vec<LttbPoint>,
}

impl ReducedBuffer {
    /// `points` must be sorted by original index, as [`downsample`] returns them.
    pub fn new(source_id: u64, source_len: usize, points: Vec<LttbPoint>) -> Self {
        Self {
            source_id,
            source_len,
            points,
        }
    }

    pub fn source_id(&self) -> u64 {
        self.source_id
    }

    /// Length of the buffer the points were taken from.
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    pub fn points(&self) -> &[LttbPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Original samples per reduced point.
    pub fn ratio(&self) -> f64 {
        if self.points.is_empty() {
            return 1.0;
        }
        self.source_len as f64 / self.points.len() as f64
    }

    /// Position of the first reduced point at or after original sample `sample`.
    pub fn reduced_index(&self, sample: usize) -> usize {
        self.points.partition_point(|p| p.index < sample)
    }
}
