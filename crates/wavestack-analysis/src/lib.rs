//! # Wavestack Analysis
//!
//! Renderable geometry for waveform views.
//!
//! - **Envelopes**: one min/max pair per pixel column, with a visibility floor for silence
//! - **LTTB reduction**: bounded-cost rendering of buffers with tens of millions of samples
//! - **Reduction cache**: LRU cache of reduced buffers keyed by buffer and threshold
//! - **Colouring**: amplitude-to-hue mapping for coloured strokes
//!
//! Everything works on [`wavestack_core`] buffers and views; nothing here draws.
//!
//! ## Example
//!
//! ```rust
//! use wavestack_analysis::{downsample, EnvelopeExtractor};
//! use wavestack_core::{SampleBuffer, ViewId, ViewState, WaveformConfig};
//!
//! let buffer = SampleBuffer::new(vec![0.0f32; 10_000], 44_100)?;
//! let view = ViewState::zoom(ViewId::new(1), buffer.len(), 100, 70, 800)?;
//!
//! let extractor = EnvelopeExtractor::new(&WaveformConfig::default())?;
//! let envelope = extractor.extract(&buffer, &view);
//! assert_eq!(envelope.len(), 100);
//!
//! let ramp: Vec<f32> = (0..1000).map(|i| i as f32).collect();
//! let points = downsample(&ramp, 100)?;
//! assert_eq!((points[0].index, points[99].index), (0, 999));
//! # Ok::<(), wavestack_core::Error>(())
//! ```

pub mod cache;
pub mod color;
pub mod envelope;
pub mod lttb;

mod extractor;

pub use cache::ReductionCache;
pub use color::{amplitude_hue, hsv_to_rgb, Rgb};
pub use envelope::{
    extract_raw, extract_reduced, Envelope, EnvelopeColumn, EnvelopeSource, Stroke,
    FLOOR_HALF_SPAN,
};
pub use extractor::{EnvelopeExtractor, SourcePolicy};
pub use lttb::{downsample, LttbPoint, ReducedBuffer};
