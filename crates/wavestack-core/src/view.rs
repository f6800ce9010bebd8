//! Per-view scale, offset and size.
//!
//! A `ViewState` is the only thing that differs between the overview strip, the zoom strip and
//! each stacked row. Changing any parameter goes through an explicit setter that validates and
//! re-derives width; rendering is left to the caller.

use crate::{CoordinateMapper, Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier assigned by the view registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ViewId(u64);

impl ViewId {
    /// Fresh process-unique id.
    pub fn allocate() -> Self {
        Self(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for ViewId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewMode {
    /// Detail strip; width derived from buffer length and scale.
    Zoom,
    /// Whole-buffer strip; scale derived from the viewport width.
    Overview,
    /// One fixed-width row of the paginated stack.
    StackedRow { index: usize },
}

impl ViewMode {
    /// Whether `pixel_width` follows from buffer length and scale.
    pub fn auto_width(self) -> bool {
        !matches!(self, ViewMode::StackedRow { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    id: ViewId,
    mode: ViewMode,
    samples_per_pixel: u32,
    left_offset: usize,
    pixel_height: u32,
    pixel_width: u32,
    viewport_width: u32,
}

fn check_height(pixel_height: u32) -> Result<()> {
    if pixel_height == 0 {
        return Err(Error::InvalidConfig(
            "pixel height must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Overview scale: fit the buffer into the viewport, capped at `max_samples_per_pixel`.
pub fn overview_samples_per_pixel(
    buffer_len: usize,
    viewport_width: u32,
    max_samples_per_pixel: u32,
) -> u32 {
    let fit = buffer_len.div_ceil(viewport_width.max(1) as usize);
    fit.min(max_samples_per_pixel as usize).max(1) as u32
}

impl ViewState {
    /// Zoom strip starting at sample 0.
    pub fn zoom(
        id: ViewId,
        buffer_len: usize,
        samples_per_pixel: u32,
        pixel_height: u32,
        viewport_width: u32,
    ) -> Result<Self> {
        CoordinateMapper::new(samples_per_pixel, 0)?;
        check_height(pixel_height)?;
        let mut view = Self {
            id,
            mode: ViewMode::Zoom,
            samples_per_pixel,
            left_offset: 0,
            pixel_height,
            pixel_width: 0,
            viewport_width,
        };
        view.derive_width(buffer_len);
        Ok(view)
    }

    /// Overview strip whose scale fits the buffer into `viewport_width`.
    pub fn overview(
        id: ViewId,
        buffer_len: usize,
        viewport_width: u32,
        pixel_height: u32,
        max_samples_per_pixel: u32,
    ) -> Result<Self> {
        check_height(pixel_height)?;
        let samples_per_pixel =
            overview_samples_per_pixel(buffer_len, viewport_width, max_samples_per_pixel);
        let mut view = Self {
            id,
            mode: ViewMode::Overview,
            samples_per_pixel,
            left_offset: 0,
            pixel_height,
            pixel_width: 0,
            viewport_width,
        };
        view.derive_width(buffer_len);
        Ok(view)
    }

    /// Row `index` of a stack whose rows are `row_pixel_width` wide.
    ///
    /// The offset follows from the index by construction:
    /// `index * row_pixel_width * samples_per_pixel`.
    pub fn stacked_row(
        id: ViewId,
        index: usize,
        row_pixel_width: u32,
        samples_per_pixel: u32,
        pixel_height: u32,
    ) -> Result<Self> {
        CoordinateMapper::new(samples_per_pixel, 0)?;
        check_height(pixel_height)?;
        Ok(Self {
            id,
            mode: ViewMode::StackedRow { index },
            samples_per_pixel,
            left_offset: index * row_pixel_width as usize * samples_per_pixel as usize,
            pixel_height,
            pixel_width: row_pixel_width,
            viewport_width: row_pixel_width,
        })
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    pub fn left_offset(&self) -> usize {
        self.left_offset
    }

    pub fn pixel_height(&self) -> u32 {
        self.pixel_height
    }

    pub fn pixel_width(&self) -> u32 {
        self.pixel_width
    }

    /// Visible width of the view's container (may be narrower than the content).
    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    pub fn row_index(&self) -> Option<usize> {
        match self.mode {
            ViewMode::StackedRow { index } => Some(index),
            _ => None,
        }
    }

    pub fn mapper(&self) -> CoordinateMapper {
        // Scale was validated when it was set
        CoordinateMapper::from_validated(self.samples_per_pixel, self.left_offset)
    }

    /// Half-open sample range covered by the view's columns (not clamped to the buffer).
    pub fn sample_range(&self) -> core::ops::Range<usize> {
        let span = self.pixel_width as usize * self.samples_per_pixel as usize;
        self.left_offset..self.left_offset + span
    }

    /// Change scale. A scale below 1 is refused and the view is left untouched.
    pub fn set_samples_per_pixel(
        &mut self,
        samples_per_pixel: u32,
        buffer_len: usize,
    ) -> Result<()> {
        CoordinateMapper::new(samples_per_pixel, self.left_offset)?;
        self.samples_per_pixel = samples_per_pixel;
        if let ViewMode::StackedRow { index } = self.mode {
            self.left_offset = index * self.pixel_width as usize * samples_per_pixel as usize;
        } else {
            self.derive_width(buffer_len);
        }
        Ok(())
    }

    pub fn set_pixel_height(&mut self, pixel_height: u32) -> Result<()> {
        check_height(pixel_height)?;
        self.pixel_height = pixel_height;
        Ok(())
    }

    /// Move the left edge. Stacked rows derive their offset and ignore this.
    pub fn set_left_offset(&mut self, left_offset: usize, buffer_len: usize) {
        if !self.mode.auto_width() {
            return;
        }
        self.left_offset = left_offset.min(buffer_len);
        self.derive_width(buffer_len);
    }

    pub fn set_viewport_width(&mut self, viewport_width: u32) {
        self.viewport_width = viewport_width;
    }

    /// Column of the cursor, or `None` when it falls outside `[0, pixel_width)`.
    pub fn cursor_x(&self, sample: usize) -> Option<i64> {
        let x = self.mapper().sample_to_pixel(sample);
        (0..self.pixel_width as i64).contains(&x).then_some(x)
    }

    /// Scroll offset that centres `cursor_x` in the viewport, clamped to the content.
    pub fn centred_scroll(&self, cursor_x: i64) -> u32 {
        let max_scroll = self.pixel_width.saturating_sub(self.viewport_width) as i64;
        let target = cursor_x - self.viewport_width as i64 / 2;
        target.clamp(0, max_scroll) as u32
    }

    fn derive_width(&mut self, buffer_len: usize) {
        let columns = self.mapper().columns_for(buffer_len);
        self.pixel_width = columns.min(u32::MAX as usize) as u32;
    }
}
