//! Builder for configuring and constructing a `WaveformSession`.

use crate::collaborators::{LogProgress, NullPainter, NullTransport, Painter, Transport};
use crate::{Result, WaveformSession};
use wavestack_analysis::{EnvelopeExtractor, SourcePolicy};
use wavestack_core::{SampleBuffer, WaveformConfig};
use wavestack_view::ProgressSink;

/// Collaborators left unset fall back to no-op ones: nothing is drawn, nothing is played and
/// layout progress goes to the log.
///
/// # Example
///
/// ```
/// use wavestack::prelude::*;
///
/// let buffer = SampleBuffer::new(vec![0.0f32; 48_000], 48_000)?;
/// let mut session = WaveformSession::builder(buffer)
///     .samples_per_pixel(64)
///     .row_height(80)
///     .build()?;
///
/// let zoom = session.add_zoom(800, 320)?;
/// let envelope = session.rescale(zoom, 100)?;
/// assert_eq!(envelope.len(), 480);
/// # Ok::<(), wavestack::Error>(())
/// ```
pub struct WaveformSessionBuilder {
    buffer: SampleBuffer,
    config: WaveformConfig,
    policy: SourcePolicy,
    precompute: bool,
    painter: Option<Box<dyn Painter>>,
    transport: Option<Box<dyn Transport>>,
    progress: Option<Box<dyn ProgressSink>>,
}

impl WaveformSessionBuilder {
    pub fn new(buffer: SampleBuffer) -> Self {
        Self {
            buffer,
            config: WaveformConfig::default(),
            policy: SourcePolicy::default(),
            precompute: false,
            painter: None,
            transport: None,
            progress: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: WaveformConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 128
    pub fn samples_per_pixel(mut self, samples_per_pixel: u32) -> Self {
        self.config.samples_per_pixel = samples_per_pixel;
        self
    }

    /// Default: 70
    pub fn row_height(mut self, row_height: u32) -> Self {
        self.config.row_height = row_height;
        self
    }

    /// Default: 120
    pub fn row_margin(mut self, row_margin: u32) -> Self {
        self.config.row_margin = row_margin;
        self
    }

    /// Default: 65536
    pub fn lttb_threshold(mut self, threshold: usize) -> Self {
        self.config.lttb_threshold = threshold;
        self
    }

    /// Default: [`SourcePolicy::Auto`]
    pub fn source_policy(mut self, policy: SourcePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reduce the buffer during `build` instead of on the first render that needs it.
    pub fn precompute_reduction(mut self, precompute: bool) -> Self {
        self.precompute = precompute;
        self
    }

    pub fn painter(mut self, painter: impl Painter + 'static) -> Self {
        self.painter = Some(Box::new(painter));
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn progress(mut self, progress: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn build(self) -> Result<WaveformSession> {
        let extractor = EnvelopeExtractor::new(&self.config)?.with_policy(self.policy);

        let reducible = self.buffer.len() > self.config.lttb_threshold;
        if self.precompute && self.policy != SourcePolicy::Raw && reducible {
            extractor.precompute(&self.buffer)?;
        }

        Ok(WaveformSession::from_parts(
            self.config,
            self.buffer,
            extractor,
            self.painter.unwrap_or_else(|| Box::new(NullPainter)),
            self.transport.unwrap_or_else(|| Box::new(NullTransport::default())),
            self.progress.unwrap_or_else(|| Box::new(LogProgress)),
        ))
    }
}
