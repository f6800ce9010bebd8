//! Test helpers and fixtures for wavestack integration tests
//!
//! Sessions are built with recording collaborators so tests can check exactly what would have
//! been drawn, played and reported.
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): envelope values, stroke coordinates
//! - `SECS_EPSILON` (1e-9): times derived from sample indices
//! - `MIN_COLUMN_SPAN` (0.5): visibility floor of a column

#![allow(dead_code)]


use std::cell::RefCell;
use std::rc::Rc;
use wavestack::prelude::*;
use wavestack::RowHighlight;

/// Default test sample rate
pub const TEST_SAMPLE_RATE: u32 = 48_000;

pub type Shared<T> = Rc<RefCell<T>>;

/// Install a `RUST_LOG`-driven subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// =============================================================================
// Signal Generators
// =============================================================================

/// Sine wave at `frequency` with peak `amplitude`.
pub fn generate_sine(frequency: f64, amplitude: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / TEST_SAMPLE_RATE as f64;
            (2.0 * std::f64::consts::PI * frequency * t).sin() as f32 * amplitude
        })
        .collect()
}

/// Generate silence (zero samples).
pub fn generate_silence(num_samples: usize) -> Vec<f32> {
    vec![0.0; num_samples]
}

/// Single sample at `value`, rest zeros.
pub fn generate_impulse(num_samples: usize, position: usize, value: f32) -> Vec<f32> {
    let mut samples = vec![0.0; num_samples];
    if position < num_samples {
        samples[position] = value;
    }
    samples
}

/// Linear ramp from start to end value.
pub fn generate_ramp(start: f32, end: f32, num_samples: usize) -> Vec<f32> {
    if num_samples <= 1 {
        return vec![start; num_samples];
    }
    let step = (end - start) / (num_samples - 1) as f32;
    (0..num_samples).map(|i| start + step * i as f32).collect()
}

/// Reproducible noise in -1..1 (simple LCG).
pub fn generate_noise(num_samples: usize, seed: u64) -> Vec<f32> {
    let mut rng = seed;
    (0..num_samples)
        .map(|_| {
            rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((rng >> 33) as f32 / (1u64 << 31) as f32) * 2.0 - 1.0
        })
        .collect()
}

// =============================================================================
// Recording Collaborators
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCall {
    Envelope { view: ViewId, columns: usize },
    Cursor { view: ViewId, x: Option<i64> },
    Scroll { view: ViewId, x: u32 },
    Highlights { highlights: Vec<RowHighlight>, cleared: Vec<usize> },
    Clear { view: ViewId },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingPainter {
    pub calls: Shared<Vec<PaintCall>>,
}

impl Painter for RecordingPainter {
    fn paint_envelope(&mut self, view: ViewId, envelope: &Envelope) {
        self.calls.borrow_mut().push(PaintCall::Envelope {
            view,
            columns: envelope.len(),
        });
    }

    fn paint_cursor(&mut self, view: ViewId, cursor_x: Option<i64>) {
        self.calls
            .borrow_mut()
            .push(PaintCall::Cursor { view, x: cursor_x });
    }

    fn scroll(&mut self, view: ViewId, scroll_x: u32) {
        self.calls
            .borrow_mut()
            .push(PaintCall::Scroll { view, x: scroll_x });
    }

    fn paint_highlights(&mut self, highlights: &[RowHighlight], cleared: &[usize]) {
        self.calls.borrow_mut().push(PaintCall::Highlights {
            highlights: highlights.to_vec(),
            cleared: cleared.to_vec(),
        });
    }

    fn clear_view(&mut self, view: ViewId) {
        self.calls.borrow_mut().push(PaintCall::Clear { view });
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportLog {
    pub playing: bool,
    pub seeks: Vec<f64>,
    pub plays: Vec<(f64, Option<f64>)>,
    pub pauses: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    pub log: Shared<TransportLog>,
}

impl Transport for RecordingTransport {
    fn seek(&mut self, secs: f64) {
        self.log.borrow_mut().seeks.push(secs);
    }

    fn play_range(&mut self, start_secs: f64, end_secs: Option<f64>) {
        let mut log = self.log.borrow_mut();
        log.playing = true;
        log.plays.push((start_secs, end_secs));
    }

    fn pause(&mut self) {
        let mut log = self.log.borrow_mut();
        log.playing = false;
        log.pauses += 1;
    }

    fn is_playing(&self) -> bool {
        self.log.borrow().playing
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressLog {
    pub reports: Vec<LayoutProgress>,
    pub completed: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingProgress {
    pub log: Shared<ProgressLog>,
}

impl ProgressSink for RecordingProgress {
    fn progress(&mut self, progress: LayoutProgress) {
        self.log.borrow_mut().reports.push(progress);
    }

    fn complete(&mut self, total: usize) {
        self.log.borrow_mut().completed.push(total);
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Session plus handles to everything its collaborators recorded.
pub struct Fixture {
    pub session: WaveformSession,
    pub paints: Shared<Vec<PaintCall>>,
    pub transport: Shared<TransportLog>,
    pub progress: Shared<ProgressLog>,
}

impl Fixture {
    /// Paint calls recorded since the last call.
    pub fn take_paints(&self) -> Vec<PaintCall> {
        std::mem::take(&mut *self.paints.borrow_mut())
    }

    pub fn cursor_calls(&self) -> Vec<(ViewId, Option<i64>)> {
        self.paints
            .borrow()
            .iter()
            .filter_map(|call| match call {
                PaintCall::Cursor { view, x } => Some((*view, *x)),
                _ => None,
            })
            .collect()
    }

    pub fn scroll_calls(&self) -> Vec<(ViewId, u32)> {
        self.paints
            .borrow()
            .iter()
            .filter_map(|call| match call {
                PaintCall::Scroll { view, x } => Some((*view, *x)),
                _ => None,
            })
            .collect()
    }

    pub fn last_highlights(&self) -> Option<(Vec<RowHighlight>, Vec<usize>)> {
        self.paints.borrow().iter().rev().find_map(|call| match call {
            PaintCall::Highlights {
                highlights,
                cleared,
            } => Some((highlights.clone(), cleared.clone())),
            _ => None,
        })
    }
}

/// Session over `samples` with default configuration.
pub fn fixture(samples: Vec<f32>) -> Fixture {
    fixture_with(samples, |builder| builder)
}

/// Session over `samples`, with extra builder configuration.
pub fn fixture_with(
    samples: Vec<f32>,
    configure: impl FnOnce(WaveformSessionBuilder) -> WaveformSessionBuilder,
) -> Fixture {
    init_tracing();

    let painter = RecordingPainter::default();
    let transport = RecordingTransport::default();
    let progress = RecordingProgress::default();
    let (paints, transport_log, progress_log) = (
        Rc::clone(&painter.calls),
        Rc::clone(&transport.log),
        Rc::clone(&progress.log),
    );

    let buffer =
        SampleBuffer::new(samples, TEST_SAMPLE_RATE).expect("Failed to create test buffer");
    let builder = WaveformSession::builder(buffer)
        .painter(painter)
        .transport(transport)
        .progress(progress);
    let session = configure(builder)
        .build()
        .expect("Failed to create test session");

    Fixture {
        session,
        paints,
        transport: transport_log,
        progress: progress_log,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ramp() {
        let ramp = generate_ramp(-1.0, 1.0, 5);
        assert_eq!(ramp, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_generate_noise_in_range() {
        let noise = generate_noise(1000, 7);
        assert!(noise.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert_eq!(noise, generate_noise(1000, 7));
    }
}
