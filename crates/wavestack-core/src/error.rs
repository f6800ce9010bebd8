//! Error types for wavestack-core.

use crate::ViewId;
use thiserror::Error;

/// Error type for coordinate, view and layout operations.
///
/// None of these are fatal. Range errors are normally recovered by clamping at the call site,
/// and `StaleLayout` is swallowed by whoever drives the layout pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid scale: {0} samples per pixel. Must be at least 1")]
    InvalidScale(u32),

    #[error("Invalid downsample threshold: {0}. Must be at least 3")]
    InvalidThreshold(usize),

    #[error("Index {index} out of range (len {len})")]
    OutOfRange { index: i64, len: usize },

    #[error("Stale layout: pass {generation} was superseded by pass {current}")]
    StaleLayout { generation: u64, current: u64 },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown view: {0}")]
    UnknownView(ViewId),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    /// Errors that callers are expected to drop silently instead of reporting.
    pub fn is_silent(&self) -> bool {
        matches!(self, Error::StaleLayout { .. })
    }
}
