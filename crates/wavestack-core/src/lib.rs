//! Coordinate model for multi-view waveform displays.
//!
//! # Primary API
//!
//! - [`SampleBuffer`]: decoded mono PCM, shared read-only by every view
//! - [`CoordinateMapper`]: sample index <-> pixel column under a scale and left offset
//! - [`ViewState`] / [`ViewMode`]: scale, offset and size of one overview, zoom or stacked row
//! - [`PlaybackPosition`] / [`SelectionRange`]: the cursor and the selected span, in samples
//! - [`WaveformConfig`]: defaults shared by every view of a session
//!
//! # Example
//!
//! ```
//! use wavestack_core::{SampleBuffer, ViewId, ViewState};
//!
//! let buffer = SampleBuffer::new(vec![0.0f32; 10_000], 44_100)?;
//! let zoom = ViewState::zoom(ViewId::new(1), buffer.len(), 100, 320, 800)?;
//!
//! assert_eq!(zoom.pixel_width(), 100);
//! assert_eq!(zoom.mapper().pixel_to_sample(10), 1000);
//! # Ok::<(), wavestack_core::Error>(())
//! ```

pub mod error;
pub use error::{Error, Result};

mod buffer;
pub use buffer::SampleBuffer;

pub mod config;
pub use config::WaveformConfig;

pub mod mapper;
pub use mapper::CoordinateMapper;

mod position;
pub use position::{PlaybackPosition, SelectionRange};

mod view;
pub use view::{overview_samples_per_pixel, ViewId, ViewMode, ViewState};
