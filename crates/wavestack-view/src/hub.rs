//! Playback cursor fan-out across every view.
//!
//! The hub owns the single playback position and every overview/zoom view of a session. Stacked
//! rows are owned by the layout pass that built them and become visible here only once that pass
//! publishes a [`RowRegistry`] snapshot.
//!
//! `set_position` completes its whole fan-out before returning. Callers must not interleave
//! updates; a second update issued from inside a painter callback would race the first.

use crate::registry::RowRegistry;
use arc_swap::ArcSwap;
use std::collections::BTreeMap;
use std::sync::Arc;
use wavestack_core::{Error, PlaybackPosition, Result, ViewId, ViewState};

/// Cursor repaint and scroll request for one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorUpdate {
    pub view: ViewId,
    /// Row index for stacked rows.
    pub row: Option<usize>,
    /// Cursor column, or `None` when the cursor is outside the view.
    pub cursor_x: Option<i64>,
    /// Scroll offset that centres the cursor. `None` when the cursor is outside the view.
    pub scroll: Option<u32>,
}

/// Result of one `set_position` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub position: PlaybackPosition,
    /// True when the requested sample was outside the buffer and got clamped.
    pub clamped: bool,
    pub updates: Vec<CursorUpdate>,
}

pub struct PlaybackSyncHub {
    buffer_len: usize,
    position: PlaybackPosition,
    views: BTreeMap<ViewId, ViewState>,
    rows: ArcSwap<RowRegistry>,
}

impl PlaybackSyncHub {
    pub fn new(buffer_len: usize) -> Self {
        Self {
            buffer_len,
            position: PlaybackPosition::default(),
            views: BTreeMap::new(),
            rows: ArcSwap::from_pointee(RowRegistry::default()),
        }
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    pub fn position(&self) -> PlaybackPosition {
        self.position
    }

    /// Register an overview or zoom view.
    pub fn register(&mut self, view: ViewState) -> ViewId {
        let id = view.id();
        tracing::debug!(view = %id, mode = ?view.mode(), "registered view");
        self.views.insert(id, view);
        id
    }

    pub fn unregister(&mut self, id: ViewId) -> Option<ViewState> {
        let removed = self.views.remove(&id);
        if removed.is_some() {
            tracing::debug!(view = %id, "unregistered view");
        }
        removed
    }

    pub fn view(&self, id: ViewId) -> Option<&ViewState> {
        self.views.get(&id)
    }

    pub fn view_mut(&mut self, id: ViewId) -> Result<&mut ViewState> {
        self.views.get_mut(&id).ok_or(Error::UnknownView(id))
    }

    pub fn views(&self) -> impl Iterator<Item = &ViewState> {
        self.views.values()
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Make a layout pass (complete or partial) visible to cursor updates.
    pub fn publish_rows(&self, rows: RowRegistry) {
        tracing::debug!(
            generation = rows.generation(),
            rows = rows.len(),
            complete = rows.is_complete(),
            "published rows"
        );
        self.rows.store(Arc::new(rows));
    }

    /// Currently published rows.
    pub fn rows(&self) -> Arc<RowRegistry> {
        self.rows.load_full()
    }

    pub fn clear_rows(&self) {
        self.rows.store(Arc::new(RowRegistry::default()));
    }

    /// Look up a view or a published row by id.
    pub fn lookup(&self, id: ViewId) -> Option<ViewState> {
        self.views
            .get(&id)
            .cloned()
            .or_else(|| self.rows.load().find(id).cloned())
    }

    /// Move the cursor to `sample` (clamped to the buffer) and compute the cursor and scroll of
    /// every view except `origin`.
    pub fn set_position(&mut self, sample: i64, origin: Option<ViewId>) -> SyncReport {
        let position = PlaybackPosition::clamped(sample, self.buffer_len);
        let clamped = position.sample() as i64 != sample;
        if clamped {
            let error = Error::OutOfRange {
                index: sample,
                len: self.buffer_len,
            };
            tracing::trace!(%error, "clamped playback position");
        }
        self.position = position;

        let rows = self.rows.load();
        let updates = self
            .views
            .values()
            .chain(rows.rows().iter())
            .filter(|view| Some(view.id()) != origin)
            .map(|view| cursor_update(view, position))
            .collect();

        SyncReport {
            position,
            clamped,
            updates,
        }
    }
}

fn cursor_update(view: &ViewState, position: PlaybackPosition) -> CursorUpdate {
    let cursor_x = view.cursor_x(position.sample());
    CursorUpdate {
        view: view.id(),
        row: view.row_index(),
        cursor_x,
        scroll: cursor_x.map(|x| view.centred_scroll(x)),
    }
}

impl std::fmt::Debug for PlaybackSyncHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSyncHub")
            .field("buffer_len", &self.buffer_len)
            .field("position", &self.position)
            .field("views", &self.views.len())
            .field("rows", &self.rows.load().len())
            .finish()
    }
}
