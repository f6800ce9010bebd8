//! Incremental stacked layout: stepping, cancellation, partial publication and rescaling.

use crate::helpers::*;
use wavestack::prelude::*;

/// 48k samples at 10 spp: six 800 px rows in a 1040 px container.
fn stack_fixture() -> Fixture {
    fixture_with(generate_noise(48_000, 42), |b| b.samples_per_pixel(10))
}

fn row_envelopes(fx: &Fixture) -> Vec<usize> {
    fx.paints
        .borrow()
        .iter()
        .filter_map(|call| match call {
            PaintCall::Envelope { columns, .. } => Some(*columns),
            _ => None,
        })
        .collect()
}

fn envelope_views(paints: &[PaintCall]) -> Vec<ViewId> {
    paints
        .iter()
        .filter_map(|call| match call {
            PaintCall::Envelope { view, .. } => Some(*view),
            _ => None,
        })
        .collect()
}

fn cleared_views(paints: &[PaintCall]) -> Vec<ViewId> {
    paints
        .iter()
        .filter_map(|call| match call {
            PaintCall::Clear { view } => Some(*view),
            _ => None,
        })
        .collect()
}

/// Test that each step builds one row and the last one publishes the pass
#[test]
fn test_step_layout_builds_rows_in_order() {
    let mut fx = stack_fixture();
    fx.session.resize_stack(1040).unwrap();
    assert!(fx.session.is_laying_out());

    let mut steps = 0;
    while fx.session.step_layout() {
        steps += 1;
    }
    // The sixth row completes the pass in the same step
    assert_eq!(steps, 5);
    assert!(!fx.session.is_laying_out());

    let rows = fx.session.rows();
    assert!(rows.is_complete());
    assert_eq!(rows.len(), 6);
    let offsets: Vec<usize> = rows.rows().iter().map(|r| r.left_offset()).collect();
    assert_eq!(offsets, vec![0, 8000, 16_000, 24_000, 32_000, 40_000]);
    assert_eq!(row_envelopes(&fx), vec![800; 6]);

    let progress = fx.progress.borrow();
    let percents: Vec<u8> = progress.reports.iter().map(|p| p.percent()).collect();
    assert_eq!(percents, vec![16, 33, 50, 66, 83, 100]);
    assert_eq!(progress.completed, vec![6]);
}

/// Test that the last row is cut short at the end of the buffer
#[test]
fn test_last_row_truncated() {
    let mut fx = fixture_with(generate_noise(44_000, 1), |b| b.samples_per_pixel(10));
    fx.session.resize_stack(1040).unwrap();
    while fx.session.step_layout() {}

    assert_eq!(fx.session.rows().len(), 6);
    assert_eq!(row_envelopes(&fx).last(), Some(&400));
}

/// Test that rows built so far can be published while the pass continues
#[test]
fn test_partial_publish_then_restart() {
    let mut fx = stack_fixture();
    fx.session.resize_stack(1040).unwrap();
    for _ in 0..4 {
        assert!(fx.session.step_layout());
    }

    // Nothing is visible until published
    assert!(fx.session.rows().is_empty());
    assert!(fx.session.transport_report(0).updates.is_empty());

    assert_eq!(fx.session.publish_partial_rows(), 4);
    assert!(!fx.session.rows().is_complete());

    let report = fx.session.transport_report(30_000);
    assert_eq!(report.updates.len(), 4);
    let visible: Vec<_> = report
        .updates
        .iter()
        .filter_map(|u| u.cursor_x.map(|x| (u.row, x)))
        .collect();
    assert_eq!(visible, vec![(Some(3), 600)]);

    // A resize abandons the pass; the partial rows stay until the new one completes
    fx.session.resize_stack(1040).unwrap();
    assert_eq!(fx.session.rows().len(), 4);
    assert!(fx.session.step_layout());
    assert_eq!(fx.session.rows().len(), 4);
    fx.take_paints();

    while fx.session.step_layout() {}
    assert_eq!(cleared_views(&fx.take_paints()).len(), 4);
    assert_eq!(fx.session.rows().len(), 6);
    assert_eq!(fx.session.transport_report(30_000).updates.len(), 6);
    assert_eq!(fx.progress.borrow().completed, vec![6]);
}

/// Test that an external cancel stops the pass at the next step
#[test]
fn test_cancel_from_canceller() {
    let mut fx = stack_fixture();
    let token = fx.session.resize_stack(1040).unwrap();
    let canceller = fx.session.layout_canceller();

    assert!(fx.session.step_layout());
    assert!(fx.session.step_layout());
    canceller.cancel();
    let painted = envelope_views(&fx.take_paints());

    assert!(!token.is_current());
    assert!(!fx.session.step_layout());
    assert!(!fx.session.is_laying_out());
    assert!(fx.session.rows().is_empty());
    assert_eq!(fx.progress.borrow().reports.len(), 2);
    assert!(fx.progress.borrow().completed.is_empty());

    // The abandoned rows are torn down on the step that notices the cancel
    assert_eq!(cleared_views(&fx.take_paints()), painted);
}

/// Test that cancelling from the session discards the pass
#[test]
fn test_cancel_layout() {
    let mut fx = stack_fixture();
    fx.session.resize_stack(1040).unwrap();
    assert!(fx.session.step_layout());
    let painted = envelope_views(&fx.take_paints());

    fx.session.cancel_layout();
    assert_eq!(fx.session.layout_progress(), None);
    assert_eq!(cleared_views(&fx.take_paints()), painted);
    assert!(!fx.session.step_layout());
    assert!(fx.take_paints().is_empty());
}

/// Test that rows replaced by a new layout, or painted by an abandoned one, are cleared
#[test]
fn test_replaced_rows_are_cleared() {
    let mut fx = stack_fixture();
    fx.session.resize_stack(1040).unwrap();
    while fx.session.step_layout() {}
    let first: Vec<ViewId> = fx.session.rows().rows().iter().map(|r| r.id()).collect();
    fx.take_paints();

    // Abandon a 300 px pass after three rows
    fx.session.resize_stack(540).unwrap();
    for _ in 0..3 {
        assert!(fx.session.step_layout());
    }
    let abandoned = envelope_views(&fx.take_paints());
    assert_eq!(abandoned.len(), 3);

    fx.session.resize_stack(540).unwrap();
    assert_eq!(cleared_views(&fx.take_paints()), abandoned);

    // The published rows stay up until the new pass replaces them
    while fx.session.step_layout() {}
    let paints = fx.take_paints();
    assert_eq!(envelope_views(&paints).len(), 16);
    assert_eq!(cleared_views(&paints), first);
    assert_eq!(fx.session.rows().len(), 16);
}

/// Test that changing the stack scale restarts the layout
#[test]
fn test_set_stack_scale_restarts_layout() {
    let mut fx = stack_fixture();

    // No layout requested yet
    assert!(fx.session.set_stack_scale(20).unwrap().is_none());
    assert_eq!(fx.session.stack_scale(), 20);

    fx.session.resize_stack(1040).unwrap();
    while fx.session.step_layout() {}
    assert_eq!(fx.session.rows().len(), 3);

    let token = fx.session.set_stack_scale(10).unwrap();
    assert!(token.is_some_and(|t| t.is_current()));
    while fx.session.step_layout() {}
    assert_eq!(fx.session.rows().len(), 6);

    assert!(fx.session.set_stack_scale(0).is_err());
    assert_eq!(fx.session.stack_scale(), 10);
}

/// Test that the stack applies its margin on both sides
#[test]
fn test_narrow_container() {
    let mut fx = stack_fixture();
    fx.session.resize_stack(200).unwrap();
    let progress = fx.session.layout_progress().unwrap();
    // 200 - 2*120 saturates to a 1 px row
    assert_eq!(progress.total, 4800);
    fx.session.cancel_layout();
}

/// Test that the async driver builds every row and reports progress
#[tokio::test]
async fn test_drive_layout() {
    let mut fx = stack_fixture();
    fx.session.resize_stack(1040).unwrap();

    let rows = fx.session.drive_layout().await.unwrap();
    assert_eq!(rows.len(), 6);
    assert!(rows.is_complete());
    assert_eq!(row_envelopes(&fx).len(), 6);
    assert_eq!(fx.progress.borrow().completed, vec![6]);

    let progress = fx.progress.borrow();
    assert_eq!(progress.reports.len(), 6);
    assert_eq!(progress.reports.last().map(|p| p.percent()), Some(100));
}

/// Test that driving without a pass returns nothing
#[tokio::test]
async fn test_drive_layout_without_pass() {
    let mut fx = stack_fixture();
    assert!(fx.session.drive_layout().await.is_none());
    assert!(fx.session.rows().is_empty());
}
