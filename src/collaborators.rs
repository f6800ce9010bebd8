//! Interfaces to the host: drawing surface and playback transport.
//!
//! The session never touches pixels or audio devices. It hands geometry to a [`Painter`] and
//! seek/play requests to a [`Transport`]; progress of the stacked layout goes to a
//! [`ProgressSink`](wavestack_view::ProgressSink).

use wavestack_analysis::Envelope;
use wavestack_core::ViewId;
use wavestack_view::{LayoutProgress, ProgressSink, RowHighlight};

/// Receives renderable geometry.
pub trait Painter {
    /// Replace the whole waveform of `view`.
    fn paint_envelope(&mut self, view: ViewId, envelope: &Envelope);

    /// Move the cursor overlay of `view`; `None` hides it.
    fn paint_cursor(&mut self, view: ViewId, cursor_x: Option<i64>);

    /// Scroll `view` so that `scroll_x` is its left visible column.
    fn scroll(&mut self, view: ViewId, scroll_x: u32);

    /// Draw selection highlights on stacked rows and clear them from `cleared` rows.
    fn paint_highlights(&mut self, highlights: &[RowHighlight], cleared: &[usize]);

    /// Drop everything drawn for a removed view.
    fn clear_view(&mut self, _view: ViewId) {}
}

/// Playback device control.
pub trait Transport {
    /// Move the play head without starting playback.
    fn seek(&mut self, secs: f64);

    /// Start playing at `start_secs`, stopping at `end_secs` if given.
    fn play_range(&mut self, start_secs: f64, end_secs: Option<f64>);

    fn pause(&mut self);

    fn is_playing(&self) -> bool;
}

/// Painter that draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPainter;

impl Painter for NullPainter {
    fn paint_envelope(&mut self, _view: ViewId, _envelope: &Envelope) {}
    fn paint_cursor(&mut self, _view: ViewId, _cursor_x: Option<i64>) {}
    fn scroll(&mut self, _view: ViewId, _scroll_x: u32) {}
    fn paint_highlights(&mut self, _highlights: &[RowHighlight], _cleared: &[usize]) {}
}

/// Transport with no device behind it. Remembers only whether it was asked to play.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTransport {
    playing: bool,
}

impl Transport for NullTransport {
    fn seek(&mut self, _secs: f64) {}

    fn play_range(&mut self, _start_secs: f64, _end_secs: Option<f64>) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

/// Progress sink that logs at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn progress(&mut self, progress: LayoutProgress) {
        tracing::debug!(
            completed = progress.completed,
            total = progress.total,
            percent = progress.percent(),
            "layout progress"
        );
    }

    fn complete(&mut self, total: usize) {
        tracing::debug!(rows = total, "layout done");
    }
}
