//! Envelope extraction with raw/reduced source selection

use crate::cache::ReductionCache;
use crate::envelope::{extract_raw, extract_reduced, Envelope};
use crate::lttb::{downsample, ReducedBuffer};
use parking_lot::Mutex;
use std::sync::Arc;
use wavestack_core::{Result, SampleBuffer, ViewState, WaveformConfig};

/// Which buffer envelopes are computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum SourcePolicy {
    /// Always scan the full-resolution samples.
    Raw,
    /// Always use the LTTB-reduced buffer.
    Reduced,
    /// Reduced buffer for long buffers when every column still gets at least one reduced point.
    #[default]
    Auto,
}

/// Produces envelopes for views of a buffer.
///
/// Clones share the reduction cache, so a buffer is reduced at most once per threshold no matter
/// how many views render it.
#[derive(Clone)]
pub struct EnvelopeExtractor {
    policy: SourcePolicy,
    threshold: usize,
    reduce_above_samples: usize,
    cache: Arc<Mutex<ReductionCache>>,
}

impl EnvelopeExtractor {
    pub fn new(config: &WaveformConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            policy: SourcePolicy::default(),
            threshold: config.lttb_threshold,
            reduce_above_samples: config.reduce_above_samples,
            cache: Arc::new(Mutex::new(ReductionCache::new(
                config.reduction_cache_entries,
            ))),
        })
    }

    pub fn with_policy(mut self, policy: SourcePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> SourcePolicy {
        self.policy
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Whether a view at `samples_per_pixel` over `buffer_len` samples renders from the reduced
    /// buffer.
    pub fn uses_reduced(&self, buffer_len: usize, samples_per_pixel: u32) -> bool {
        if buffer_len <= self.threshold {
            return false;
        }
        match self.policy {
            SourcePolicy::Raw => false,
            SourcePolicy::Reduced => true,
            SourcePolicy::Auto => {
                let ratio = buffer_len as f64 / self.threshold as f64;
                buffer_len > self.reduce_above_samples && samples_per_pixel as f64 >= ratio
            }
        }
    }

    /// Reduced buffer for `buffer`, computed once and cached.
    pub fn reduced(&self, buffer: &SampleBuffer) -> Result<Arc<ReducedBuffer>> {
        let threshold = self.threshold;
        self.cache
            .lock()
            .get_or_compute((buffer.id(), threshold), || {
                let points = downsample(buffer.samples(), threshold)?;
                Ok(ReducedBuffer::new(buffer.id(), buffer.len(), points))
            })
    }

    /// Compute the reduced buffer ahead of the first render.
    pub fn precompute(&self, buffer: &SampleBuffer) -> Result<()> {
        self.reduced(buffer).map(|_| ())
    }

    /// Drop cached reductions of `buffer_id`.
    pub fn forget(&self, buffer_id: u64) {
        self.cache.lock().remove(buffer_id);
    }

    pub fn cached_reductions(&self) -> usize {
        self.cache.lock().len()
    }

    /// Envelope of `view` over `buffer`.
    ///
    /// Falls back to the raw samples if the reduction cannot be computed.
    pub fn extract(&self, buffer: &SampleBuffer, view: &ViewState) -> Envelope {
        if self.uses_reduced(buffer.len(), view.samples_per_pixel()) {
            match self.reduced(buffer) {
                Ok(reduced) => return extract_reduced(&reduced, view),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        view = %view.id(),
                        "reduction failed, rendering raw samples"
                    );
                }
            }
        }
        extract_raw(buffer.samples(), view)
    }
}

impl std::fmt::Debug for EnvelopeExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeExtractor")
            .field("policy", &self.policy)
            .field("threshold", &self.threshold)
            .field("reduce_above_samples", &self.reduce_above_samples)
            .finish()
    }
}
