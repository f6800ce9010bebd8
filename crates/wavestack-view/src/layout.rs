//! Incremental stacked-row layout.
//!
//! A pass builds one row per step: its view, its envelope and a progress report. The host calls
//! [`StackLayoutScheduler::step`] once per turn of its own loop, or awaits
//! [`StackLayoutScheduler::drive`], which yields to the runtime between rows.
//!
//! The step that builds the last row also completes the pass: it returns
//! [`LayoutStep::Complete`] carrying that row together with the finished registry.
//!
//! Every pass carries a generation number. Starting a new pass or calling
//! [`LayoutCanceller::cancel`] bumps the shared generation; any step still holding the old number
//! sees `StaleLayout` and does nothing. Rows of an abandoned pass are never reused because their
//! offsets depend on the old row width.

use crate::registry::RowRegistry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use wavestack_analysis::{Envelope, EnvelopeExtractor};
use wavestack_core::{CoordinateMapper, Error, Result, SampleBuffer, ViewId, ViewState};

/// Row geometry of one layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    pub row_pixel_width: u32,
    pub samples_per_pixel: u32,
    pub row_height: u32,
}

impl LayoutParams {
    /// `ceil(ceil(len / samples_per_pixel) / row_pixel_width)`
    pub fn row_count(&self, buffer_len: usize) -> usize {
        let columns = buffer_len.div_ceil(self.samples_per_pixel.max(1) as usize);
        columns.div_ceil(self.row_pixel_width.max(1) as usize)
    }

    fn validate(&self) -> Result<()> {
        CoordinateMapper::new(self.samples_per_pixel, 0)?;
        if self.row_pixel_width == 0 || self.row_height == 0 {
            return Err(Error::InvalidConfig(format!(
                "row size must be at least 1x1 pixel, got {}x{}",
                self.row_pixel_width, self.row_height
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutProgress {
    pub completed: usize,
    pub total: usize,
}

impl LayoutProgress {
    /// Whole percent, 100 when there is nothing to lay out.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.completed.min(self.total) * 100 / self.total) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

/// Receives layout progress for display.
pub trait ProgressSink {
    fn progress(&mut self, progress: LayoutProgress);

    /// Called once after the last row of a pass.
    fn complete(&mut self, _total: usize) {}
}

/// One row built by a step.
#[derive(Debug, Clone)]
pub struct BuiltRow {
    pub generation: u64,
    pub view: ViewState,
    pub envelope: Envelope,
    pub progress: LayoutProgress,
}

impl BuiltRow {
    pub fn index(&self) -> usize {
        self.view.row_index().unwrap_or_default()
    }
}

#[derive(Debug)]
pub enum LayoutStep {
    Row(BuiltRow),
    /// The pass finished. `last` is the row built by this step, `None` when the pass had no rows.
    Complete {
        last: Option<BuiltRow>,
        rows: RowRegistry,
    },
    /// No pass in flight.
    Idle,
}

/// Generation number of one pass, checked against the shared current generation.
#[derive(Debug, Clone)]
pub struct LayoutToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl LayoutToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.generation
    }

    /// `StaleLayout` once the pass has been superseded.
    pub fn check(&self) -> Result<()> {
        let current = self.current.load(Ordering::Acquire);
        if current == self.generation {
            Ok(())
        } else {
            Err(Error::StaleLayout {
                generation: self.generation,
                current,
            })
        }
    }
}

/// Cancels the in-flight pass from outside the scheduler (e.g. a resize handler).
#[derive(Debug, Clone)]
pub struct LayoutCanceller {
    current: Arc<AtomicU64>,
}

impl LayoutCanceller {
    pub fn cancel(&self) {
        let previous = self.current.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(generation = previous, "layout pass cancelled");
    }
}

struct LayoutPass {
    token: LayoutToken,
    params: LayoutParams,
    buffer: SampleBuffer,
    next_row: usize,
    total: usize,
    registry: RowRegistry,
}

pub struct StackLayoutScheduler {
    extractor: EnvelopeExtractor,
    current: Arc<AtomicU64>,
    pass: Option<LayoutPass>,
}

impl StackLayoutScheduler {
    pub fn new(extractor: EnvelopeExtractor) -> Self {
        Self {
            extractor,
            current: Arc::new(AtomicU64::new(0)),
            pass: None,
        }
    }

    pub fn canceller(&self) -> LayoutCanceller {
        LayoutCanceller {
            current: Arc::clone(&self.current),
        }
    }

    /// Start a pass over `buffer`, abandoning any pass in flight.
    pub fn begin(&mut self, buffer: &SampleBuffer, params: LayoutParams) -> Result<LayoutToken> {
        params.validate()?;

        if self.pass.as_ref().is_some_and(|p| p.token.is_current()) {
            tracing::debug!(
                generation = self.current.load(Ordering::Acquire),
                "layout pass superseded"
            );
        }
        let generation = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        let token = LayoutToken {
            generation,
            current: Arc::clone(&self.current),
        };
        let total = params.row_count(buffer.len());
        tracing::debug!(
            generation,
            rows = total,
            row_pixel_width = params.row_pixel_width,
            samples_per_pixel = params.samples_per_pixel,
            "layout pass started"
        );

        self.pass = Some(LayoutPass {
            token: token.clone(),
            params,
            buffer: buffer.clone(),
            next_row: 0,
            total,
            registry: RowRegistry::new(generation, params.row_height),
        });
        Ok(token)
    }

    /// Abandon the pass in flight, if any.
    pub fn cancel(&mut self) {
        if self.pass.take().is_some() {
            self.canceller().cancel();
        }
    }

    /// Whether a current pass still has rows to build.
    pub fn is_running(&self) -> bool {
        self.pass.as_ref().is_some_and(|p| p.token.is_current())
    }

    pub fn progress(&self) -> Option<LayoutProgress> {
        self.pass.as_ref().map(|p| LayoutProgress {
            completed: p.next_row,
            total: p.total,
        })
    }

    /// `StaleLayout` when a newer pass than the one that built `rows` is in flight.
    pub fn check_rows(&self, rows: &RowRegistry) -> Result<()> {
        match &self.pass {
            Some(pass) if pass.token.is_current() && pass.token.generation != rows.generation() => {
                Err(Error::StaleLayout {
                    generation: rows.generation(),
                    current: pass.token.generation,
                })
            }
            _ => Ok(()),
        }
    }

    /// Rows built so far by the current pass.
    pub fn publish_partial(&self) -> Option<RowRegistry> {
        self.pass
            .as_ref()
            .filter(|p| p.token.is_current())
            .map(|p| p.registry.clone())
    }

    /// Build the next row of the current pass.
    pub fn step(&mut self) -> LayoutStep {
        match self.try_step() {
            Ok(step) => step,
            Err(e) if e.is_silent() => {
                tracing::trace!(error = %e, "stale layout step ignored");
                LayoutStep::Idle
            }
            Err(e) => {
                tracing::warn!(error = %e, "layout step failed");
                self.pass = None;
                LayoutStep::Idle
            }
        }
    }

    /// Build the next row only if `token` still names the current pass.
    pub fn step_with(&mut self, token: &LayoutToken) -> Result<LayoutStep> {
        token.check()?;
        match &self.pass {
            Some(pass) if pass.token.generation == token.generation => self.try_step(),
            _ => Err(Error::StaleLayout {
                generation: token.generation,
                current: self.current.load(Ordering::Acquire),
            }),
        }
    }

    fn try_step(&mut self) -> Result<LayoutStep> {
        let Some(pass) = self.pass.as_mut() else {
            return Ok(LayoutStep::Idle);
        };
        if let Err(e) = pass.token.check() {
            self.pass = None;
            return Err(e);
        }

        if pass.next_row >= pass.total {
            return Ok(self.finish(None));
        }

        let index = pass.next_row;
        let view = ViewState::stacked_row(
            ViewId::allocate(),
            index,
            pass.params.row_pixel_width,
            pass.params.samples_per_pixel,
            pass.params.row_height,
        )?;
        let envelope = self.extractor.extract(&pass.buffer, &view);
        pass.registry.push(view.clone());
        pass.next_row += 1;

        let row = BuiltRow {
            generation: pass.token.generation,
            view,
            envelope,
            progress: LayoutProgress {
                completed: pass.next_row,
                total: pass.total,
            },
        };
        if pass.next_row < pass.total {
            Ok(LayoutStep::Row(row))
        } else {
            Ok(self.finish(Some(row)))
        }
    }

    fn finish(&mut self, last: Option<BuiltRow>) -> LayoutStep {
        let Some(pass) = self.pass.take() else {
            return LayoutStep::Idle;
        };
        let mut rows = pass.registry;
        rows.mark_complete();
        tracing::debug!(
            generation = pass.token.generation,
            rows = rows.len(),
            "layout pass complete"
        );
        LayoutStep::Complete { last, rows }
    }

    /// Run the current pass to the end, yielding to the runtime after every row.
    ///
    /// Returns the finished rows, or `None` if the pass was cancelled or none was running.
    pub async fn drive<S, F>(&mut self, sink: &mut S, mut on_row: F) -> Option<RowRegistry>
    where
        S: ProgressSink + ?Sized,
        F: FnMut(&BuiltRow),
    {
        loop {
            match self.step() {
                LayoutStep::Row(row) => {
                    on_row(&row);
                    sink.progress(row.progress);
                    tokio::task::yield_now().await;
                }
                LayoutStep::Complete { last, rows } => {
                    if let Some(row) = last {
                        on_row(&row);
                        sink.progress(row.progress);
                    }
                    sink.complete(rows.len());
                    return Some(rows);
                }
                LayoutStep::Idle => return None,
            }
        }
    }

    /// Run the current pass to the end without yielding.
    pub fn run_to_completion<S, F>(&mut self, sink: &mut S, mut on_row: F) -> Option<RowRegistry>
    where
        S: ProgressSink + ?Sized,
        F: FnMut(&BuiltRow),
    {
        loop {
            match self.step() {
                LayoutStep::Row(row) => {
                    on_row(&row);
                    sink.progress(row.progress);
                }
                LayoutStep::Complete { last, rows } => {
                    if let Some(row) = last {
                        on_row(&row);
                        sink.progress(row.progress);
                    }
                    sink.complete(rows.len());
                    return Some(rows);
                }
                LayoutStep::Idle => return None,
            }
        }
    }
}

impl std::fmt::Debug for StackLayoutScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackLayoutScheduler")
            .field("generation", &self.current.load(Ordering::Acquire))
            .field("progress", &self.progress())
            .finish()
    }
}
