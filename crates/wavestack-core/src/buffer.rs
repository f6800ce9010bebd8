//! Decoded PCM shared read-only by every view.

use crate::{Error, PlaybackPosition, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// Immutable mono sample buffer.
///
/// Cloning is cheap: the samples are shared. Each buffer gets a process-unique id on creation
/// which caches use as part of their key.
#[derive(Clone)]
pub struct SampleBuffer {
    id: u64,
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Wrap decoded samples (expected in `[-1, 1]`).
    pub fn new(samples: impl Into<Arc<[f32]>>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::InvalidConfig(
                "sample_rate must be positive".to_string(),
            ));
        }
        Ok(Self {
            id: NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed),
            samples: samples.into(),
            sample_rate,
        })
    }

    /// Build from interleaved frames, keeping only the first channel.
    pub fn from_interleaved(
        interleaved: &[f32],
        channels: usize,
        sample_rate: u32,
    ) -> Result<Self> {
        if channels == 0 {
            return Err(Error::InvalidConfig("channels must be positive".to_string()));
        }
        let first: Vec<f32> = interleaved.iter().step_by(channels).copied().collect();
        Self::new(first, sample_rate)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn sample_to_secs(&self, sample: usize) -> f64 {
        sample as f64 / self.sample_rate as f64
    }

    /// Nearest sample index for a time, clamped to the buffer.
    pub fn secs_to_sample(&self, secs: f64) -> usize {
        if !secs.is_finite() || secs <= 0.0 {
            return 0;
        }
        let sample = (secs * self.sample_rate as f64).round() as usize;
        self.clamp_index(sample as i64)
    }

    /// Clamp a possibly negative index into `[0, len)`. Empty buffers clamp to 0.
    pub fn clamp_index(&self, index: i64) -> usize {
        PlaybackPosition::clamped(index, self.samples.len()).sample()
    }
}

impl std::fmt::Debug for SampleBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleBuffer")
            .field("id", &self.id)
            .field("samples", &format!("<{} samples>", self.samples.len()))
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}
