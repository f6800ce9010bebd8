//! WaveformSession that coordinates views, playback, selection and the stacked layout

use crate::collaborators::{Painter, Transport};
use crate::Result;
use std::sync::Arc;
use wavestack_analysis::{Envelope, EnvelopeExtractor};
use wavestack_core::{
    overview_samples_per_pixel, CoordinateMapper, Error as CoreError, PlaybackPosition,
    SampleBuffer, SelectionRange, ViewId, ViewMode, ViewState, WaveformConfig,
};
use wavestack_view::{
    BuiltRow, LayoutCanceller, LayoutParams, LayoutProgress, LayoutStep, LayoutToken,
    PlaybackSyncHub, ProgressSink, RowRegistry, SelectionController, SelectionUpdate,
    StackLayoutScheduler, SyncReport,
};

/// What a pointer event landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// An overview or zoom view: clicking seeks, dragging scrubs.
    View(ViewId),
    /// A stacked row by index: dragging selects.
    Row(usize),
    /// The stack container; the row is found from `y`.
    Stack,
}

/// Pointer event in the target's local pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub target: PointerTarget,
    pub x: i64,
    pub y: i64,
}

impl PointerEvent {
    pub fn new(target: PointerTarget, x: i64, y: i64) -> Self {
        Self { target, x, y }
    }
}

/// One waveform session: a decoded buffer and every view of it.
///
/// Overview and zoom views are added explicitly and live until removed. Stacked rows come from
/// layout passes started by [`resize_stack`](Self::resize_stack) and driven by
/// [`step_layout`](Self::step_layout) or [`drive_layout`](Self::drive_layout). Rows replaced by
/// a newer pass, or painted by an abandoned one, are handed back to [`Painter::clear_view`].
///
/// All state changes go through command methods that re-render and return the new geometry;
/// nothing is hidden behind setters.
///
/// # Example
///
/// ```
/// use wavestack::prelude::*;
///
/// let buffer = SampleBuffer::new(vec![0.0f32; 1_000_000], 44_100)?;
/// let mut session = WaveformSession::builder(buffer).build()?;
///
/// let overview = session.add_overview(1000, 60)?;
/// let zoom = session.add_zoom(1000, 320)?;
///
/// // Transport report at ~60 Hz
/// let report = session.transport_report(500_000);
/// assert_eq!(report.updates.len(), 2);
///
/// // Stacked rows, one per step
/// session.resize_stack(1040)?;
/// while session.step_layout() {}
/// assert_eq!(session.rows().len(), 10);
/// # let _ = (overview, zoom);
/// # Ok::<(), wavestack::Error>(())
/// ```
pub struct WaveformSession {
    config: WaveformConfig,
    buffer: SampleBuffer,
    extractor: EnvelopeExtractor,
    hub: PlaybackSyncHub,
    selection: SelectionController,
    scheduler: StackLayoutScheduler,

    /// Container width of the last stack layout request
    stack_width: Option<u32>,
    stack_scale: u32,
    /// Every row painted and not yet cleared, with the generation of the pass that built it
    row_views: Vec<(u64, ViewId)>,

    /// View being scrubbed by a held pointer
    scrubbing: Option<ViewId>,
    /// Where the last playback or seek started; [`stop`](Self::stop) returns here
    play_start: usize,

    painter: Box<dyn Painter>,
    transport: Box<dyn Transport>,
    progress: Box<dyn ProgressSink>,
}

impl WaveformSession {
    pub fn builder(buffer: SampleBuffer) -> crate::WaveformSessionBuilder {
        crate::WaveformSessionBuilder::new(buffer)
    }

    pub(crate) fn from_parts(
        config: WaveformConfig,
        buffer: SampleBuffer,
        extractor: EnvelopeExtractor,
        painter: Box<dyn Painter>,
        transport: Box<dyn Transport>,
        progress: Box<dyn ProgressSink>,
    ) -> Self {
        tracing::debug!(buffer = ?buffer, policy = ?extractor.policy(), "session created");
        Self {
            stack_scale: config.samples_per_pixel,
            hub: PlaybackSyncHub::new(buffer.len()),
            scheduler: StackLayoutScheduler::new(extractor.clone()),
            selection: SelectionController::new(),
            stack_width: None,
            row_views: Vec::new(),
            scrubbing: None,
            play_start: 0,
            config,
            buffer,
            extractor,
            painter,
            transport,
            progress,
        }
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn config(&self) -> &WaveformConfig {
        &self.config
    }

    pub fn extractor(&self) -> &EnvelopeExtractor {
        &self.extractor
    }

    pub fn position(&self) -> PlaybackPosition {
        self.hub.position()
    }

    /// Current or frozen selection.
    pub fn selection(&self) -> Option<SelectionRange> {
        self.selection.range()
    }

    pub fn is_selecting(&self) -> bool {
        self.selection.is_selecting()
    }

    /// Rows visible to cursor updates and selection.
    pub fn rows(&self) -> Arc<RowRegistry> {
        self.hub.rows()
    }

    /// A view or published row by id.
    pub fn view(&self, id: ViewId) -> Option<ViewState> {
        self.hub.lookup(id)
    }

    pub fn view_count(&self) -> usize {
        self.hub.view_count()
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Whole-buffer strip fitted into `viewport_width`, then rendered.
    pub fn add_overview(&mut self, viewport_width: u32, pixel_height: u32) -> Result<ViewId> {
        let view = ViewState::overview(
            ViewId::allocate(),
            self.buffer.len(),
            viewport_width,
            pixel_height,
            self.config.overview_max_samples_per_pixel,
        )?;
        self.add_view(view)
    }

    /// Detail strip at the configured scale, then rendered.
    pub fn add_zoom(&mut self, viewport_width: u32, pixel_height: u32) -> Result<ViewId> {
        let view = ViewState::zoom(
            ViewId::allocate(),
            self.buffer.len(),
            self.config.samples_per_pixel,
            pixel_height,
            viewport_width,
        )?;
        self.add_view(view)
    }

    fn add_view(&mut self, view: ViewState) -> Result<ViewId> {
        let id = self.hub.register(view);
        self.render(id)?;
        Ok(id)
    }

    pub fn remove_view(&mut self, id: ViewId) -> Result<()> {
        self.hub.unregister(id).ok_or(CoreError::UnknownView(id))?;
        if self.scrubbing == Some(id) {
            self.scrubbing = None;
        }
        self.painter.clear_view(id);
        Ok(())
    }

    /// Re-extract and repaint a view or published row.
    pub fn render(&mut self, id: ViewId) -> Result<Envelope> {
        let view = self.hub.lookup(id).ok_or(CoreError::UnknownView(id))?;
        let envelope = self.extractor.extract(&self.buffer, &view);
        self.painter.paint_envelope(id, &envelope);
        self.painter
            .paint_cursor(id, view.cursor_x(self.hub.position().sample()));
        Ok(envelope)
    }

    /// Change the scale of an overview or zoom view and re-render it.
    ///
    /// A scale below 1 is refused and the view keeps its previous state.
    pub fn rescale(&mut self, id: ViewId, samples_per_pixel: u32) -> Result<Envelope> {
        let len = self.buffer.len();
        let view = self.hub.view_mut(id)?;
        if let Err(e) = view.set_samples_per_pixel(samples_per_pixel, len) {
            tracing::warn!(view = %id, samples_per_pixel, error = %e, "rescale refused");
            return Err(e.into());
        }
        self.render(id)
    }

    pub fn set_height(&mut self, id: ViewId, pixel_height: u32) -> Result<Envelope> {
        let view = self.hub.view_mut(id)?;
        if let Err(e) = view.set_pixel_height(pixel_height) {
            tracing::warn!(view = %id, pixel_height, error = %e, "height change refused");
            return Err(e.into());
        }
        self.render(id)
    }

    /// New visible width for a view. Overviews re-fit their scale to it.
    pub fn set_viewport_width(&mut self, id: ViewId, viewport_width: u32) -> Result<Envelope> {
        let len = self.buffer.len();
        let max = self.config.overview_max_samples_per_pixel;
        let view = self.hub.view_mut(id)?;
        view.set_viewport_width(viewport_width);
        if view.mode() == ViewMode::Overview {
            view.set_samples_per_pixel(overview_samples_per_pixel(len, viewport_width, max), len)?;
        }
        self.render(id)
    }

    // =========================================================================
    // Playback
    // =========================================================================

    /// Periodic position report from the transport. Every view follows.
    pub fn transport_report(&mut self, sample: i64) -> SyncReport {
        let report = self.hub.set_position(sample, None);
        self.apply_sync(&report);
        report
    }

    /// Move the playback position from user input on `origin`.
    ///
    /// Pauses playback, seeks the transport, and moves every cursor. The origin view's cursor is
    /// repainted but it is not scrolled.
    pub fn seek(&mut self, sample: i64, origin: Option<ViewId>) -> SyncReport {
        if self.transport.is_playing() {
            self.transport.pause();
        }
        let report = self.hub.set_position(sample, origin);
        self.play_start = report.position.sample();
        self.transport
            .seek(report.position.to_secs(self.buffer.sample_rate()));

        if let Some(view) = origin.and_then(|id| self.hub.lookup(id)) {
            self.painter
                .paint_cursor(view.id(), view.cursor_x(report.position.sample()));
        }
        self.apply_sync(&report);
        report
    }

    /// Play from the cursor to the end.
    pub fn play_from_cursor(&mut self) {
        let position = self.hub.position();
        self.play_start = position.sample();
        self.transport
            .play_range(position.to_secs(self.buffer.sample_rate()), None);
    }

    /// Play the selection. A zero-width selection plays from its start to the end of the buffer.
    ///
    /// Returns `false` when nothing is selected.
    pub fn play_selection(&mut self) -> bool {
        let Some(range) = self.selection.range() else {
            return false;
        };
        let (start, end) = range.to_secs(self.buffer.sample_rate());
        let end = (!range.is_empty()).then_some(end);
        self.play_start = range.start;
        self.transport.play_range(start, end);
        true
    }

    /// Stop the audio and leave the cursor where it is.
    pub fn pause(&mut self) {
        self.transport.pause();
    }

    /// Stop the audio and return the cursor and the transport to where playback started.
    pub fn stop(&mut self) -> SyncReport {
        self.transport.pause();
        let report = self.hub.set_position(self.play_start as i64, None);
        self.transport
            .seek(report.position.to_secs(self.buffer.sample_rate()));
        self.apply_sync(&report);
        tracing::debug!(sample = report.position.sample(), "playback stopped");
        report
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    fn apply_sync(&mut self, report: &SyncReport) {
        for update in &report.updates {
            self.painter.paint_cursor(update.view, update.cursor_x);
            if let Some(scroll) = update.scroll {
                self.painter.scroll(update.view, scroll);
            }
        }
    }

    // =========================================================================
    // Stacked rows
    // =========================================================================

    /// Start a layout pass for a stack container `container_width` pixels wide.
    ///
    /// Any pass in flight is abandoned. Rows already published stay visible until the new pass
    /// completes.
    pub fn resize_stack(&mut self, container_width: u32) -> Result<LayoutToken> {
        let params = LayoutParams {
            row_pixel_width: self.config.row_pixel_width(container_width),
            samples_per_pixel: self.stack_scale,
            row_height: self.config.row_height,
        };
        let token = self.scheduler.begin(&self.buffer, params)?;
        self.stack_width = Some(container_width);
        self.clear_stale_rows(None);
        Ok(token)
    }

    /// Change the stack scale. Restarts the layout if one was requested before.
    pub fn set_stack_scale(&mut self, samples_per_pixel: u32) -> Result<Option<LayoutToken>> {
        if let Err(e) = CoordinateMapper::new(samples_per_pixel, 0) {
            tracing::warn!(samples_per_pixel, error = %e, "stack rescale refused");
            return Err(e.into());
        }
        self.stack_scale = samples_per_pixel;
        match self.stack_width {
            Some(width) => self.resize_stack(width).map(Some),
            None => Ok(None),
        }
    }

    pub fn stack_scale(&self) -> u32 {
        self.stack_scale
    }

    /// Build one row of the current pass. Returns `true` while the pass has more to do.
    ///
    /// The step that builds the last row also publishes the pass, so it returns `false`.
    /// Call once per turn of the host loop.
    pub fn step_layout(&mut self) -> bool {
        match self.scheduler.step() {
            LayoutStep::Row(row) => {
                self.paint_row(&row);
                true
            }
            LayoutStep::Complete { last, rows } => {
                if let Some(row) = &last {
                    self.paint_row(row);
                }
                self.progress.complete(rows.len());
                self.publish(rows);
                false
            }
            LayoutStep::Idle => {
                self.clear_stale_rows(None);
                false
            }
        }
    }

    /// Run the current pass to the end, yielding to the runtime between rows.
    ///
    /// Returns the published rows, or `None` if the pass was cancelled.
    pub async fn drive_layout(&mut self) -> Option<Arc<RowRegistry>> {
        let position = self.hub.position().sample();
        let painter = &mut self.painter;
        let row_views = &mut self.row_views;
        let finished = self
            .scheduler
            .drive(&mut *self.progress, |row| {
                paint_built_row(&mut **painter, row, position);
                row_views.push((row.generation, row.view.id()));
            })
            .await;

        match finished {
            Some(rows) => {
                self.publish(rows);
                Some(self.hub.rows())
            }
            None => {
                self.clear_stale_rows(None);
                None
            }
        }
    }

    /// Make the rows built so far visible. Returns how many were published.
    pub fn publish_partial_rows(&mut self) -> usize {
        match self.scheduler.publish_partial() {
            Some(registry) => {
                let rows = registry.len();
                self.publish(registry);
                rows
            }
            None => 0,
        }
    }

    pub fn layout_progress(&self) -> Option<LayoutProgress> {
        self.scheduler.progress()
    }

    pub fn is_laying_out(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Handle for cancelling the layout from elsewhere, e.g. a resize observer.
    pub fn layout_canceller(&self) -> LayoutCanceller {
        self.scheduler.canceller()
    }

    pub fn cancel_layout(&mut self) {
        self.scheduler.cancel();
        self.clear_stale_rows(None);
    }

    fn paint_row(&mut self, row: &BuiltRow) {
        paint_built_row(&mut *self.painter, row, self.hub.position().sample());
        self.row_views.push((row.generation, row.view.id()));
        self.progress.progress(row.progress);
    }

    /// Swap in `rows`, clear the rows they replace and re-address the selection to them.
    fn publish(&mut self, rows: RowRegistry) {
        let generation = rows.generation();
        self.hub.publish_rows(rows);
        self.clear_stale_rows(Some(generation));

        let published = self.hub.rows();
        let update = self.selection.relayout(&published);
        self.paint_selection(&update);
    }

    /// Clear every painted row that is neither published nor built by pass `keep`.
    fn clear_stale_rows(&mut self, keep: Option<u64>) {
        let published = self.hub.rows();
        let painter = &mut self.painter;
        self.row_views.retain(|&(generation, id)| {
            let live = Some(generation) == keep || generation == published.generation();
            if !live {
                painter.clear_view(id);
            }
            live
        });
    }

    /// Published rows, or `None` while a newer pass is replacing them.
    fn current_rows(&self) -> Result<Option<Arc<RowRegistry>>> {
        let rows = self.hub.rows();
        match self.scheduler.check_rows(&rows) {
            Ok(()) => Ok(Some(rows)),
            Err(e) if e.is_silent() => {
                tracing::trace!(error = %e, "pointer on superseded rows ignored");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    pub fn pointer_down(&mut self, event: PointerEvent) -> Result<()> {
        match event.target {
            PointerTarget::View(id) => {
                let view = self.hub.view(id).ok_or(CoreError::UnknownView(id))?;
                let sample = view.mapper().pixel_to_sample(event.x);
                self.scrubbing = Some(id);
                self.seek(sample as i64, Some(id));
            }
            PointerTarget::Row(_) | PointerTarget::Stack => {
                let Some(rows) = self.current_rows()? else {
                    return Ok(());
                };
                let Some(row) = resolve_row(&rows, event) else {
                    return Ok(());
                };
                let update = self
                    .selection
                    .drag_start(&rows, row, event.x, self.buffer.len())?;
                self.paint_selection(&update);
            }
        }
        Ok(())
    }

    pub fn pointer_move(&mut self, event: PointerEvent) -> Result<()> {
        match event.target {
            PointerTarget::View(id) => {
                if self.scrubbing != Some(id) {
                    return Ok(());
                }
                let view = self.hub.view(id).ok_or(CoreError::UnknownView(id))?;
                let sample = view.mapper().pixel_to_sample(event.x);
                self.seek(sample as i64, Some(id));
            }
            PointerTarget::Row(_) | PointerTarget::Stack => {
                if !self.selection.is_selecting() {
                    return Ok(());
                }
                let Some(rows) = self.current_rows()? else {
                    return Ok(());
                };
                let Some(row) = resolve_row(&rows, event) else {
                    return Ok(());
                };
                let update = self
                    .selection
                    .drag_move(&rows, row, event.x, self.buffer.len())?;
                self.paint_selection(&update);
            }
        }
        Ok(())
    }

    /// Ends scrubbing or freezes the selection.
    pub fn pointer_up(&mut self, _event: PointerEvent) -> Result<()> {
        self.scrubbing = None;
        self.selection.drag_end();
        Ok(())
    }

    /// Drop the selection and clear its highlights.
    pub fn clear_selection(&mut self) {
        let update = self.selection.dismiss();
        self.paint_selection(&update);
    }

    fn paint_selection(&mut self, update: &SelectionUpdate) {
        if !update.is_empty() {
            self.painter
                .paint_highlights(&update.highlights, &update.cleared);
        }
    }
}

fn paint_built_row(painter: &mut dyn Painter, row: &BuiltRow, position: usize) {
    let id = row.view.id();
    painter.paint_envelope(id, &row.envelope);
    painter.paint_cursor(id, row.view.cursor_x(position));
}

fn resolve_row(rows: &RowRegistry, event: PointerEvent) -> Option<usize> {
    match event.target {
        PointerTarget::Row(index) => Some(index),
        PointerTarget::Stack => rows.row_at_y(event.y),
        PointerTarget::View(_) => None,
    }
}

impl std::fmt::Debug for WaveformSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveformSession")
            .field("buffer", &self.buffer)
            .field("hub", &self.hub)
            .field("scheduler", &self.scheduler)
            .field("stack_scale", &self.stack_scale)
            .finish()
    }
}
