//! Centralized error type for the wavestack umbrella crate.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] wavestack_core::Error),
}

impl Error {
    /// The wrapped core error.
    pub fn core(&self) -> &wavestack_core::Error {
        match self {
            Error::Core(e) => e,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
