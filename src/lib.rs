//! # Wavestack - Multi-view Waveform Display Engine
//!
//! Coordinate mapping, envelope extraction and view synchronisation for waveform displays with
//! an overview strip, a zoom strip and a paginated stack of fixed-width rows.
//!
//! ## Architecture
//!
//! Wavestack is an umbrella crate that coordinates:
//! - **wavestack-core** - Sample buffer, coordinate mapper, view state, configuration, errors
//! - **wavestack-analysis** - Per-pixel min/max envelopes, LTTB reduction, reduction cache
//! - **wavestack-view** - Cursor fan-out, range selection, incremental stacked layout
//!
//! The host supplies the decoded samples and three collaborators: a [`Painter`] that draws
//! geometry, a [`Transport`] that plays audio, and a
//! [`ProgressSink`](wavestack_view::ProgressSink) for layout progress.
//!
//! ## Quick Start
//!
//! ```
//! use wavestack::prelude::*;
//!
//! let buffer = SampleBuffer::new(vec![0.0f32; 441_000], 44_100)?;
//! let mut session = WaveformSession::builder(buffer).build()?;
//!
//! let overview = session.add_overview(1200, 60)?;
//! session.add_zoom(1200, 320)?;
//!
//! // Click on the overview: seek and move every other cursor
//! session.pointer_down(PointerEvent::new(PointerTarget::View(overview), 600, 30))?;
//! session.pointer_up(PointerEvent::new(PointerTarget::View(overview), 600, 30))?;
//! assert_eq!(session.position().sample(), 600 * 368);
//! # Ok::<(), wavestack::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serialization` - serde support for configuration and geometry types

/// Re-export of wavestack-core for direct access
pub use wavestack_core as core;

/// Envelopes, LTTB reduction and colouring
pub use wavestack_analysis as analysis;

/// Cursor sync, selection and stacked layout
pub use wavestack_view as view;

pub use wavestack_core::{
    CoordinateMapper, PlaybackPosition, SampleBuffer, SelectionRange, ViewId, ViewMode,
    ViewState, WaveformConfig,
};

pub use wavestack_analysis::{Envelope, EnvelopeColumn, Rgb, SourcePolicy, Stroke};

pub use wavestack_view::{
    CursorUpdate, LayoutCanceller, LayoutProgress, LayoutToken, ProgressSink, RowHighlight,
    RowRegistry, SyncReport,
};

mod error;
pub use error::{Error, Result};

mod collaborators;
pub use collaborators::{LogProgress, NullPainter, NullTransport, Painter, Transport};

mod builder;
mod session;

pub use builder::WaveformSessionBuilder;
pub use session::{PointerEvent, PointerTarget, WaveformSession};

/// Convenience prelude for common imports
pub mod prelude {
    // Session
    pub use crate::{WaveformSession, WaveformSessionBuilder};

    // Input
    pub use crate::{PointerEvent, PointerTarget};

    // Collaborators
    pub use crate::{Painter, ProgressSink, Transport};

    // Essential types
    pub use crate::core::{SampleBuffer, SelectionRange, ViewId, WaveformConfig};
    pub use crate::analysis::{Envelope, SourcePolicy};
    pub use crate::view::{LayoutProgress, RowHighlight};
}
