//! Drag-to-select state machine.
//!
//! Idle -> Selecting on drag start, Selecting -> Selecting on every move, Selecting -> Idle on drag
//! end. While selecting, each move recomputes the highlight of every row between the anchor row
//! and the row under the pointer, so a selection may span several stacked rows.
//!
//! The selected samples are what the controller remembers. Row indices are tied to the layout
//! generation that produced them; when a new generation is published the endpoints are found
//! again from their samples and the highlight is repainted on the new rows.

use crate::registry::RowRegistry;
use std::collections::BTreeSet;
use wavestack_core::{Error, PlaybackPosition, Result, SelectionRange, ViewState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Selecting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    DragStart { row: usize, x: i64 },
    DragMove { row: usize, x: i64 },
    DragEnd,
    /// Drop the selection and clear every highlight.
    Dismiss,
}

/// Highlight segment in one row's local pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHighlight {
    pub row: usize,
    pub start_x: i64,
    /// At least 1 so zero-width selections stay visible.
    pub width: i64,
}

impl RowHighlight {
    pub fn end_x(&self) -> i64 {
        self.start_x + self.width
    }
}

/// Highlights to paint and rows whose highlight must be cleared.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionUpdate {
    pub range: Option<SelectionRange>,
    pub highlights: Vec<RowHighlight>,
    pub cleared: Vec<usize>,
}

impl SelectionUpdate {
    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty() && self.cleared.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Endpoint {
    row: usize,
    sample: usize,
}

#[derive(Debug, Default)]
pub struct SelectionController {
    state: SelectionState,
    anchor: Option<Endpoint>,
    live: Option<Endpoint>,
    painted: BTreeSet<usize>,
    /// Generation of the rows `anchor`, `live` and `painted` refer to
    generation: Option<u64>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_selecting(&self) -> bool {
        self.state == SelectionState::Selecting
    }

    /// Current (or frozen) selection.
    pub fn range(&self) -> Option<SelectionRange> {
        match (self.anchor, self.live) {
            (Some(anchor), Some(live)) => Some(SelectionRange::new(anchor.sample, live.sample)),
            _ => None,
        }
    }

    /// Apply an event. `rows` are the views addressed by row index; `buffer_len` bounds samples.
    ///
    /// Moves and ends outside a drag are ignored.
    ///
    /// # Errors
    ///
    /// `OutOfRange` when the event names a row that does not exist.
    pub fn handle(
        &mut self,
        event: SelectionEvent,
        rows: &RowRegistry,
        buffer_len: usize,
    ) -> Result<SelectionUpdate> {
        match event {
            SelectionEvent::DragStart { row, x } => self.drag_start(rows, row, x, buffer_len),
            SelectionEvent::DragMove { row, x } => self.drag_move(rows, row, x, buffer_len),
            SelectionEvent::DragEnd => {
                self.drag_end();
                Ok(SelectionUpdate {
                    range: self.range(),
                    ..SelectionUpdate::default()
                })
            }
            SelectionEvent::Dismiss => Ok(self.dismiss()),
        }
    }

    pub fn drag_start(
        &mut self,
        rows: &RowRegistry,
        row: usize,
        x: i64,
        buffer_len: usize,
    ) -> Result<SelectionUpdate> {
        let sample = sample_at(rows, row, x, buffer_len)?;
        let endpoint = Endpoint { row, sample };
        self.state = SelectionState::Selecting;
        self.anchor = Some(endpoint);
        self.live = Some(endpoint);
        self.generation = Some(rows.generation());
        Ok(self.highlight(rows))
    }

    pub fn drag_move(
        &mut self,
        rows: &RowRegistry,
        row: usize,
        x: i64,
        buffer_len: usize,
    ) -> Result<SelectionUpdate> {
        if self.state != SelectionState::Selecting {
            return Ok(SelectionUpdate::default());
        }
        let sample = sample_at(rows, row, x, buffer_len)?;
        if self.generation != Some(rows.generation()) {
            self.rebase(rows);
        }
        self.live = Some(Endpoint { row, sample });
        Ok(self.highlight(rows))
    }

    /// Re-address the selection to newly published rows.
    ///
    /// The selected samples stay put. Rows that lost their highlight are reported as cleared.
    pub fn relayout(&mut self, rows: &RowRegistry) -> SelectionUpdate {
        if self.anchor.is_none() {
            self.generation = Some(rows.generation());
            return SelectionUpdate::default();
        }
        self.rebase(rows);
        tracing::trace!(generation = rows.generation(), "selection re-addressed to new rows");
        self.highlight(rows)
    }

    fn rebase(&mut self, rows: &RowRegistry) {
        let last = rows.len().saturating_sub(1);
        for endpoint in [&mut self.anchor, &mut self.live].into_iter().flatten() {
            endpoint.row = rows.row_for_sample(endpoint.sample).unwrap_or(last);
        }
        self.generation = Some(rows.generation());
    }

    /// Freeze the selection. Returns it, if a drag was in progress.
    pub fn drag_end(&mut self) -> Option<SelectionRange> {
        if self.state != SelectionState::Selecting {
            return None;
        }
        self.state = SelectionState::Idle;
        let range = self.range();
        tracing::debug!(?range, "selection frozen");
        range
    }

    pub fn dismiss(&mut self) -> SelectionUpdate {
        self.state = SelectionState::Idle;
        self.anchor = None;
        self.live = None;
        SelectionUpdate {
            range: None,
            highlights: Vec::new(),
            cleared: std::mem::take(&mut self.painted).into_iter().collect(),
        }
    }

    fn highlight(&mut self, rows: &RowRegistry) -> SelectionUpdate {
        let (Some(anchor), Some(live)) = (self.anchor, self.live) else {
            return SelectionUpdate::default();
        };
        let range = SelectionRange::new(anchor.sample, live.sample);
        let first = anchor.row.min(live.row);
        let last = anchor.row.max(live.row);

        let highlights: Vec<RowHighlight> = (first..=last)
            .filter_map(|index| rows.row(index).and_then(|view| row_highlight(view, index, range)))
            .collect();

        let now: BTreeSet<usize> = highlights.iter().map(|h| h.row).collect();
        let cleared = self.painted.difference(&now).copied().collect();
        self.painted = now;

        SelectionUpdate {
            range: Some(range),
            highlights,
            cleared,
        }
    }
}

fn sample_at(rows: &RowRegistry, row: usize, x: i64, buffer_len: usize) -> Result<usize> {
    let view = rows.row(row).ok_or(Error::OutOfRange {
        index: row as i64,
        len: rows.len(),
    })?;
    let sample = view.mapper().pixel_to_sample(x);
    Ok(PlaybackPosition::clamped(sample as i64, buffer_len).sample())
}

fn row_highlight(view: &ViewState, index: usize, range: SelectionRange) -> Option<RowHighlight> {
    let span = view.sample_range();
    let (start, end) = range.intersect(span.start, span.end)?;
    let mapper = view.mapper();
    let start_x = mapper.sample_to_pixel(start);
    let end_x = if end == span.end {
        view.pixel_width() as i64
    } else {
        mapper.sample_to_pixel(end)
    };
    Some(RowHighlight {
        row: index,
        start_x,
        width: (end_x - start_x).max(1),
    })
}
