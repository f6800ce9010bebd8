//! Playback position and sample-range selection.

/// Single process-wide cursor position, in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PlaybackPosition(usize);

impl PlaybackPosition {
    #[inline]
    pub const fn new(sample: usize) -> Self {
        Self(sample)
    }

    /// Clamp an arbitrary (possibly negative) index into `[0, buffer_len)`.
    pub fn clamped(sample: i64, buffer_len: usize) -> Self {
        let position = if sample <= 0 || buffer_len == 0 {
            Self(0)
        } else {
            Self((sample as usize).min(buffer_len - 1))
        };
        if position.0 as i64 != sample {
            tracing::trace!(index = sample, len = buffer_len, "index clamped into buffer");
        }
        position
    }

    #[inline]
    pub const fn sample(self) -> usize {
        self.0
    }

    pub fn to_secs(self, sample_rate: u32) -> f64 {
        self.0 as f64 / sample_rate as f64
    }
}

impl From<PlaybackPosition> for usize {
    fn from(position: PlaybackPosition) -> usize {
        position.0
    }
}

/// Normalised, inclusive sample range: `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct SelectionRange {
    pub start: usize,
    pub end: usize,
}

impl SelectionRange {
    /// Build from two ends in any order.
    #[inline]
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Number of samples between the ends (0 for a zero-width selection).
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn contains(&self, sample: usize) -> bool {
        (self.start..=self.end).contains(&sample)
    }

    /// Overlap with the half-open range `[lo, hi)`, if any.
    ///
    /// A zero-width selection still intersects the range it sits in.
    pub fn intersect(&self, lo: usize, hi: usize) -> Option<(usize, usize)> {
        let start = self.start.max(lo);
        let end = self.end.min(hi);
        if start < end || (start == end && start >= lo && start < hi) {
            Some((start, end))
        } else {
            None
        }
    }

    /// `(start, end)` in seconds.
    pub fn to_secs(&self, sample_rate: u32) -> (f64, f64) {
        let rate = sample_rate as f64;
        (self.start as f64 / rate, self.end as f64 / rate)
    }
}
