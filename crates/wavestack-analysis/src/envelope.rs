//! Per-pixel min/max envelopes
//!
//! One [`EnvelopeColumn`] per pixel column of a view, computed in a single pass over the samples
//! the view covers. The envelope is the only geometry a painter needs: each column becomes one
//! vertical stroke.
//!
//! Columns whose span would render thinner than one device pixel are expanded to a fixed
//! `+-FLOOR_HALF_SPAN` so silence still draws as a visible flat line.

use crate::color::{amplitude_hue, hsv_to_rgb, Rgb};
use crate::lttb::ReducedBuffer;
use wavestack_core::{ViewId, ViewState};

/// Half of the minimum normalised span of a column.
pub const FLOOR_HALF_SPAN: f32 = 0.25;

/// Which buffer an envelope was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum EnvelopeSource {
    #[default]
    Raw,
    Reduced,
}

/// Min/max summary of one pixel column
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct EnvelopeColumn {
    /// Column index relative to the view's left edge
    pub pixel_x: u32,
    /// Rendered maximum (after the visibility floor)
    pub max: f32,
    /// Rendered minimum (after the visibility floor)
    pub min: f32,
    /// Maximum of the samples in the column
    pub raw_max: f32,
    /// Minimum of the samples in the column
    pub raw_min: f32,
    /// First sample of the column
    pub sample_start: usize,
    /// One past the last sample of the column (clamped to the buffer)
    pub sample_end: usize,
    /// Whether the visibility floor replaced `max`/`min`
    pub floored: bool,
}

/// Vertical line segment in view pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub x: f32,
    pub y_top: f32,
    pub y_bottom: f32,
}

impl EnvelopeColumn {
    fn from_extrema(
        pixel_x: u32,
        raw_max: f32,
        raw_min: f32,
        sample_start: usize,
        sample_end: usize,
        pixel_height: u32,
    ) -> Self {
        let span_px = (raw_max - raw_min) * pixel_height as f32 / 2.0;
        let floored = span_px < 1.0;
        let (max, min) = if floored {
            (FLOOR_HALF_SPAN, -FLOOR_HALF_SPAN)
        } else {
            (raw_max, raw_min)
        };
        Self {
            pixel_x,
            max,
            min,
            raw_max,
            raw_min,
            sample_start,
            sample_end,
            floored,
        }
    }

    /// Stroke for a view `pixel_height` pixels tall. Values map as `y = h/2 - v*h/2`.
    pub fn stroke(&self, pixel_height: u32) -> Stroke {
        let half = pixel_height as f32 / 2.0;
        Stroke {
            x: self.pixel_x as f32 + 0.5,
            y_top: half - self.max * half,
            y_bottom: half - self.min * half,
        }
    }

    /// Loudness in `[0, 1]` used for colouring.
    pub fn intensity(&self) -> f32 {
        ((self.raw_max.abs() + self.raw_min.abs()) * 2.0).min(1.0)
    }

    /// Amplitude colour: blue for quiet columns through to red for loud ones.
    pub fn color(&self) -> Rgb {
        hsv_to_rgb(amplitude_hue(self.raw_max, self.raw_min), 0.7, 1.0)
    }
}

/// Renderable geometry of one view, replaced wholesale on every render.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Envelope {
    pub view: Option<ViewId>,
    pub columns: Vec<EnvelopeColumn>,
    pub samples_per_pixel: u32,
    pub left_offset: usize,
    pub pixel_height: u32,
    pub source: EnvelopeSource,
}

impl Envelope {
    fn for_view(view: &ViewState, capacity: usize, source: EnvelopeSource) -> Self {
        Self {
            view: Some(view.id()),
            columns: Vec::with_capacity(capacity),
            samples_per_pixel: view.samples_per_pixel(),
            left_offset: view.left_offset(),
            pixel_height: view.pixel_height(),
            source,
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnvelopeColumn> {
        self.columns.iter()
    }

    /// Strokes at the envelope's own pixel height.
    pub fn strokes(&self) -> impl Iterator<Item = Stroke> + '_ {
        self.columns.iter().map(|c| c.stroke(self.pixel_height))
    }

    /// Largest absolute raw sample value across all columns.
    pub fn peak(&self) -> f32 {
        self.columns
            .iter()
            .map(|c| c.raw_min.abs().max(c.raw_max.abs()))
            .fold(0.0f32, f32::max)
    }
}

/// Number of columns to emit: up to the end of the buffer, and for fixed-width rows no further
/// than the row's width.
fn column_limit(view: &ViewState, buffer_len: usize) -> usize {
    let columns = view.mapper().columns_for(buffer_len);
    if view.mode().auto_width() {
        columns
    } else {
        columns.min(view.pixel_width() as usize)
    }
}

/// Envelope straight from the samples.
pub fn extract_raw(samples: &[f32], view: &ViewState) -> Envelope {
    let spp = view.samples_per_pixel() as usize;
    let start = view.left_offset().min(samples.len());
    let limit = column_limit(view, samples.len());
    let height = view.pixel_height();

    let mut envelope = Envelope::for_view(view, limit, EnvelopeSource::Raw);
    for (x, chunk) in samples[start..].chunks(spp).take(limit).enumerate() {
        let mut max = f32::MIN;
        let mut min = f32::MAX;
        for &sample in chunk {
            max = max.max(sample);
            min = min.min(sample);
        }
        let sample_start = start + x * spp;
        envelope.columns.push(EnvelopeColumn::from_extrema(
            x as u32,
            max,
            min,
            sample_start,
            sample_start + chunk.len(),
            height,
        ));
    }
    envelope
}

/// Envelope from an LTTB-reduced buffer.
///
/// Column ranges are still computed in true-sample units; the reduced points falling inside each
/// range are found by their original index. A column with no reduced point takes the extrema of
/// the points on either side of it, which is the segment a line plot would draw through it.
pub fn extract_reduced(reduced: &ReducedBuffer, view: &ViewState) -> Envelope {
    let points = reduced.points();
    let len = reduced.source_len();
    let spp = view.samples_per_pixel() as usize;
    let start = view.left_offset().min(len);
    let limit = column_limit(view, len);
    let height = view.pixel_height();

    let mut envelope = Envelope::for_view(view, limit, EnvelopeSource::Reduced);
    if points.is_empty() {
        return envelope;
    }

    // Points are sorted by original index, so one cursor walks them once
    let mut cursor = reduced.reduced_index(start);
    for x in 0..limit {
        let lo = start + x * spp;
        let hi = (lo + spp).min(len);
        let first = cursor;
        while cursor < points.len() && points[cursor].index < hi {
            cursor += 1;
        }

        let bucket = if first < cursor {
            &points[first..cursor]
        } else {
            let before = first.saturating_sub(1);
            let after = first.min(points.len() - 1);
            &points[before..=after.max(before)]
        };
        let (max, min) = bucket
            .iter()
            .fold((f32::MIN, f32::MAX), |(max, min), p| {
                (max.max(p.value), min.min(p.value))
            });

        envelope.columns.push(EnvelopeColumn::from_extrema(
            x as u32, max, min, lo, hi, height,
        ));
    }
    envelope
}
