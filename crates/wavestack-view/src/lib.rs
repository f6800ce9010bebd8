//! # Wavestack View
//!
//! Coordination between the views of one waveform session.
//!
//! - [`PlaybackSyncHub`]: one playback position fanned out to every view as cursor and scroll
//!   requests
//! - [`SelectionController`]: drag-to-select across one or many stacked rows
//! - [`StackLayoutScheduler`]: builds the stacked rows one per turn, cancellable on resize
//!
//! All of it runs on the caller's thread. The only suspension point is the yield between rows in
//! [`StackLayoutScheduler::drive`].

pub mod hub;
pub mod layout;
pub mod registry;
pub mod selection;

pub use hub::{CursorUpdate, PlaybackSyncHub, SyncReport};
pub use layout::{
    BuiltRow, LayoutCanceller, LayoutParams, LayoutProgress, LayoutStep, LayoutToken,
    ProgressSink, StackLayoutScheduler,
};
pub use registry::RowRegistry;
pub use selection::{
    RowHighlight, SelectionController, SelectionEvent, SelectionState, SelectionUpdate,
};
