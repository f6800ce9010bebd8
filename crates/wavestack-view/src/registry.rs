//! Rows of one stacked layout pass.

use wavestack_core::{ViewId, ViewState};

/// Rows produced by one layout pass, in index order.
///
/// Row `i` always sits at index `i`; rows are only ever appended.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowRegistry {
    generation: u64,
    row_height: u32,
    rows: Vec<ViewState>,
    complete: bool,
}

impl RowRegistry {
    pub fn new(generation: u64, row_height: u32) -> Self {
        Self {
            generation,
            row_height,
            rows: Vec::new(),
            complete: false,
        }
    }

    pub(crate) fn push(&mut self, row: ViewState) {
        debug_assert_eq!(row.row_index(), Some(self.rows.len()));
        self.rows.push(row);
    }

    pub(crate) fn mark_complete(&mut self) {
        self.complete = true;
    }

    /// Layout pass that produced these rows.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the pass finished (as opposed to a partial publish).
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn row_height(&self) -> u32 {
        self.row_height
    }

    pub fn rows(&self) -> &[ViewState] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&ViewState> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn find(&self, id: ViewId) -> Option<&ViewState> {
        self.rows.iter().find(|row| row.id() == id)
    }

    /// Row whose sample range contains `sample`.
    pub fn row_for_sample(&self, sample: usize) -> Option<usize> {
        let index = self
            .rows
            .partition_point(|row| row.left_offset() <= sample)
            .checked_sub(1)?;
        self.rows[index].sample_range().contains(&sample).then_some(index)
    }

    /// Row under a stack-container y coordinate.
    pub fn row_at_y(&self, y: i64) -> Option<usize> {
        if y < 0 || self.row_height == 0 {
            return None;
        }
        let index = (y / self.row_height as i64) as usize;
        (index < self.rows.len()).then_some(index)
    }
}
