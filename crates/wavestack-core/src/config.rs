//! Display configuration shared by every view of a session.

use crate::{Error, Result};

/// Configuration for views, stacked rows and long-range reduction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct WaveformConfig {
    /// Default scale for zoom views and stacked rows.
    pub samples_per_pixel: u32,
    /// Upper bound for the auto-derived overview scale.
    pub overview_max_samples_per_pixel: u32,
    /// Pixel height of one stacked row.
    pub row_height: u32,
    /// Horizontal margin on each side of the stack container, in pixels.
    pub row_margin: u32,
    /// Number of points kept by the LTTB reduction.
    pub lttb_threshold: usize,
    /// Buffers longer than this render from the reduced buffer under `SourcePolicy::Auto`.
    pub reduce_above_samples: usize,
    /// Capacity of the reduction cache.
    pub reduction_cache_entries: usize,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 128,
            overview_max_samples_per_pixel: 2048,
            row_height: 70,
            row_margin: 120,
            lttb_threshold: 65_536,
            reduce_above_samples: 2_000_000,
            reduction_cache_entries: 8,
        }
    }
}

impl WaveformConfig {
    pub fn validate(&self) -> Result<()> {
        if self.samples_per_pixel == 0 {
            return Err(Error::InvalidScale(self.samples_per_pixel));
        }
        if self.overview_max_samples_per_pixel == 0 {
            return Err(Error::InvalidConfig(
                "overview_max_samples_per_pixel must be at least 1".to_string(),
            ));
        }
        if self.row_height == 0 {
            return Err(Error::InvalidConfig(
                "row_height must be at least 1 pixel".to_string(),
            ));
        }
        if self.lttb_threshold < 3 {
            return Err(Error::InvalidThreshold(self.lttb_threshold));
        }
        if self.reduction_cache_entries == 0 {
            return Err(Error::InvalidConfig(
                "reduction_cache_entries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Width available to a stacked row inside a container of `container_width` pixels.
    pub fn row_pixel_width(&self, container_width: u32) -> u32 {
        container_width.saturating_sub(self.row_margin * 2).max(1)
    }
}
