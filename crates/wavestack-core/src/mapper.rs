//! Sample index <-> pixel column conversion.
//!
//! Every view and every stacked row addresses the same buffer through its own scale and left
//! offset. Both directions are pure integer arithmetic, so a round trip
//! `pixel_to_sample(sample_to_pixel(s))` lands on the first sample of the column that contains
//! `s`, never more than `samples_per_pixel - 1` samples away.

use crate::{Error, Result};

/// Scale and offset of one view, validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateMapper {
    samples_per_pixel: u32,
    left_offset: usize,
}

impl CoordinateMapper {
    /// Fails with `InvalidScale` when `samples_per_pixel < 1`.
    pub fn new(samples_per_pixel: u32, left_offset: usize) -> Result<Self> {
        if samples_per_pixel < 1 {
            return Err(Error::InvalidScale(samples_per_pixel));
        }
        Ok(Self {
            samples_per_pixel,
            left_offset,
        })
    }

    /// Caller guarantees `samples_per_pixel >= 1`.
    pub(crate) const fn from_validated(samples_per_pixel: u32, left_offset: usize) -> Self {
        Self {
            samples_per_pixel,
            left_offset,
        }
    }

    #[inline]
    pub fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    #[inline]
    pub fn left_offset(&self) -> usize {
        self.left_offset
    }

    /// Column containing `sample`. Negative for samples left of the view's offset.
    #[inline]
    pub fn sample_to_pixel(&self, sample: usize) -> i64 {
        let delta = sample as i64 - self.left_offset as i64;
        delta.div_euclid(self.samples_per_pixel as i64)
    }

    /// First sample of column `pixel_x`. Columns left of the buffer start clamp to sample 0.
    #[inline]
    pub fn pixel_to_sample(&self, pixel_x: i64) -> usize {
        let sample = self.left_offset as i64 + pixel_x * self.samples_per_pixel as i64;
        sample.max(0) as usize
    }

    /// Half-open sample range covered by column `pixel_x`.
    pub fn column_range(&self, pixel_x: i64) -> core::ops::Range<usize> {
        let start = self.pixel_to_sample(pixel_x);
        start..start + self.samples_per_pixel as usize
    }

    /// Number of columns needed to show `[left_offset, buffer_len)`.
    pub fn columns_for(&self, buffer_len: usize) -> usize {
        buffer_len
            .saturating_sub(self.left_offset)
            .div_ceil(self.samples_per_pixel as usize)
    }
}
