//! Range selection across stacked rows and playback of the selected span.

use crate::helpers::tolerances::SECS_EPSILON;
use crate::helpers::*;
use wavestack::prelude::*;

/// 48k samples at 10 spp in a 1040 px container: six 800 px rows of 8000 samples each.
fn stacked_fixture() -> Fixture {
    let mut fx = fixture_with(generate_sine(220.0, 0.5, 48_000), |b| {
        b.samples_per_pixel(10)
    });
    fx.session.resize_stack(1040).unwrap();
    while fx.session.step_layout() {}
    assert_eq!(fx.session.rows().len(), 6);
    fx.take_paints();
    fx
}

fn spans(highlights: &[RowHighlight]) -> Vec<(usize, i64, i64)> {
    highlights
        .iter()
        .map(|h| (h.row, h.start_x, h.width))
        .collect()
}

/// Test that a drag from row 2 to row 5 highlights every row in between
#[test]
fn test_drag_across_rows() {
    let mut fx = stacked_fixture();

    fx.session
        .pointer_down(PointerEvent::new(PointerTarget::Row(2), 50, 10))
        .unwrap();
    fx.session
        .pointer_move(PointerEvent::new(PointerTarget::Row(5), 10, 10))
        .unwrap();

    let (highlights, cleared) = fx.last_highlights().unwrap();
    assert_eq!(
        spans(&highlights),
        vec![(2, 50, 750), (3, 0, 800), (4, 0, 800), (5, 0, 10)]
    );
    assert!(cleared.is_empty());
    assert!(fx.session.is_selecting());

    let range = fx.session.selection().unwrap();
    assert_eq!((range.start, range.end), (16_500, 40_100));
}

/// Test that the stack container resolves rows from the pointer's y coordinate
#[test]
fn test_drag_on_stack_container() {
    let mut fx = stacked_fixture();

    // Rows are 70 px high
    fx.session
        .pointer_down(PointerEvent::new(PointerTarget::Stack, 400, 75))
        .unwrap();
    fx.session
        .pointer_move(PointerEvent::new(PointerTarget::Stack, 100, 215))
        .unwrap();

    let range = fx.session.selection().unwrap();
    assert_eq!((range.start, range.end), (12_000, 25_000));

    let (highlights, _) = fx.last_highlights().unwrap();
    assert_eq!(spans(&highlights), vec![(1, 400, 400), (2, 0, 800), (3, 0, 100)]);
}

/// Test that a drag backwards produces the same range as the forward drag
#[test]
fn test_backwards_drag() {
    let mut fx = stacked_fixture();

    fx.session
        .pointer_down(PointerEvent::new(PointerTarget::Row(5), 10, 10))
        .unwrap();
    fx.session
        .pointer_move(PointerEvent::new(PointerTarget::Row(2), 50, 10))
        .unwrap();

    let range = fx.session.selection().unwrap();
    assert_eq!((range.start, range.end), (16_500, 40_100));
}

/// Test that shrinking a drag clears the rows it no longer covers
#[test]
fn test_shrinking_drag_clears_rows() {
    let mut fx = stacked_fixture();

    fx.session
        .pointer_down(PointerEvent::new(PointerTarget::Row(1), 0, 10))
        .unwrap();
    fx.session
        .pointer_move(PointerEvent::new(PointerTarget::Row(4), 100, 10))
        .unwrap();
    fx.session
        .pointer_move(PointerEvent::new(PointerTarget::Row(2), 100, 10))
        .unwrap();

    let (highlights, cleared) = fx.last_highlights().unwrap();
    assert_eq!(spans(&highlights), vec![(1, 0, 800), (2, 0, 100)]);
    assert_eq!(cleared, vec![3, 4]);
}

/// Test that pointer moves after release leave the selection alone
#[test]
fn test_selection_frozen_after_release() {
    let mut fx = stacked_fixture();

    fx.session
        .pointer_down(PointerEvent::new(PointerTarget::Row(0), 100, 10))
        .unwrap();
    fx.session
        .pointer_move(PointerEvent::new(PointerTarget::Row(0), 300, 10))
        .unwrap();
    fx.session
        .pointer_up(PointerEvent::new(PointerTarget::Row(0), 300, 10))
        .unwrap();
    assert!(!fx.session.is_selecting());

    fx.session
        .pointer_move(PointerEvent::new(PointerTarget::Row(3), 300, 10))
        .unwrap();
    let range = fx.session.selection().unwrap();
    assert_eq!((range.start, range.end), (1_000, 3_000));
}

/// Test that playing a selection plays exactly its span
#[test]
fn test_play_selection() {
    let mut fx = stacked_fixture();

    fx.session
        .pointer_down(PointerEvent::new(PointerTarget::Row(2), 50, 10))
        .unwrap();
    fx.session
        .pointer_move(PointerEvent::new(PointerTarget::Row(5), 10, 10))
        .unwrap();
    fx.session
        .pointer_up(PointerEvent::new(PointerTarget::Row(5), 10, 10))
        .unwrap();

    assert!(fx.session.play_selection());

    let transport = fx.transport.borrow();
    assert_eq!(transport.plays.len(), 1);
    let (start, end) = transport.plays[0];
    let rate = TEST_SAMPLE_RATE as f64;
    assert!((start - 16_500.0 / rate).abs() < SECS_EPSILON);
    assert!((end.unwrap() - 40_100.0 / rate).abs() < SECS_EPSILON);
}

/// Test that a zero-width selection plays through to the end
#[test]
fn test_play_zero_width_selection() {
    let mut fx = stacked_fixture();

    fx.session
        .pointer_down(PointerEvent::new(PointerTarget::Row(1), 200, 10))
        .unwrap();
    fx.session
        .pointer_up(PointerEvent::new(PointerTarget::Row(1), 200, 10))
        .unwrap();

    let (highlights, _) = fx.last_highlights().unwrap();
    assert_eq!(spans(&highlights), vec![(1, 200, 1)]);

    assert!(fx.session.play_selection());
    let (start, end) = fx.transport.borrow().plays[0];
    assert!((start - 10_000.0 / TEST_SAMPLE_RATE as f64).abs() < SECS_EPSILON);
    assert_eq!(end, None);
}

/// Test that nothing plays without a selection
#[test]
fn test_play_without_selection() {
    let mut fx = stacked_fixture();
    assert!(!fx.session.play_selection());
    assert!(fx.transport.borrow().plays.is_empty());
}

/// Test that dismissing clears every painted row
#[test]
fn test_clear_selection() {
    let mut fx = stacked_fixture();

    fx.session
        .pointer_down(PointerEvent::new(PointerTarget::Row(0), 0, 10))
        .unwrap();
    fx.session
        .pointer_move(PointerEvent::new(PointerTarget::Row(2), 0, 10))
        .unwrap();
    fx.session.clear_selection();

    assert_eq!(fx.session.selection(), None);
    let (highlights, cleared) = fx.last_highlights().unwrap();
    assert!(highlights.is_empty());
    assert_eq!(cleared, vec![0, 1, 2]);
}

/// Test that a selection can't start before rows are laid out
#[test]
fn test_drag_without_rows() {
    let mut fx = fixture(generate_silence(48_000));

    fx.session
        .pointer_down(PointerEvent::new(PointerTarget::Stack, 10, 10))
        .unwrap();
    assert!(!fx.session.is_selecting());

    assert!(fx
        .session
        .pointer_down(PointerEvent::new(PointerTarget::Row(0), 10, 10))
        .is_err());
    assert_eq!(fx.session.selection(), None);
}

/// Test that a drag on rows a running layout is replacing is ignored
#[test]
fn test_drag_ignored_while_relayout_runs() {
    let mut fx = stacked_fixture();
    fx.session.resize_stack(540).unwrap();
    assert!(fx.session.step_layout());

    fx.session
        .pointer_down(PointerEvent::new(PointerTarget::Row(2), 50, 10))
        .unwrap();
    assert!(!fx.session.is_selecting());
    assert_eq!(fx.session.selection(), None);
    assert!(fx.last_highlights().is_none());

    while fx.session.step_layout() {}
    assert_eq!(fx.session.rows().len(), 16);

    // Row 2 of the 300 px layout starts at sample 6000
    fx.session
        .pointer_down(PointerEvent::new(PointerTarget::Row(2), 50, 10))
        .unwrap();
    let range = fx.session.selection().unwrap();
    assert_eq!((range.start, range.end), (6_500, 6_500));
}

/// Test that a frozen selection keeps its samples and moves onto the rows of a new layout
#[test]
fn test_selection_follows_relayout() {
    let mut fx = stacked_fixture();

    fx.session
        .pointer_down(PointerEvent::new(PointerTarget::Row(2), 50, 10))
        .unwrap();
    fx.session
        .pointer_move(PointerEvent::new(PointerTarget::Row(3), 10, 10))
        .unwrap();
    fx.session
        .pointer_up(PointerEvent::new(PointerTarget::Row(3), 10, 10))
        .unwrap();
    fx.take_paints();

    fx.session.resize_stack(540).unwrap();
    while fx.session.step_layout() {}

    // 16_500 is now row 5 at x=150, 24_100 row 8 at x=10
    let (highlights, cleared) = fx.last_highlights().unwrap();
    assert_eq!(
        spans(&highlights),
        vec![(5, 150, 150), (6, 0, 300), (7, 0, 300), (8, 0, 10)]
    );
    assert_eq!(cleared, vec![2, 3]);

    let range = fx.session.selection().unwrap();
    assert_eq!((range.start, range.end), (16_500, 24_100));
}

/// Test that a drag held across a re-layout continues on the new rows
#[test]
fn test_drag_spanning_relayout() {
    let mut fx = stacked_fixture();

    fx.session
        .pointer_down(PointerEvent::new(PointerTarget::Row(2), 50, 10))
        .unwrap();
    fx.session.resize_stack(540).unwrap();

    // Moves over the old rows are dropped while the new ones are built
    fx.session
        .pointer_move(PointerEvent::new(PointerTarget::Row(4), 0, 10))
        .unwrap();
    assert_eq!(fx.session.selection().map(|r| r.end), Some(16_500));

    while fx.session.step_layout() {}
    fx.session
        .pointer_move(PointerEvent::new(PointerTarget::Row(6), 100, 10))
        .unwrap();

    let (highlights, _) = fx.last_highlights().unwrap();
    assert_eq!(spans(&highlights), vec![(5, 150, 150), (6, 0, 100)]);
    let range = fx.session.selection().unwrap();
    assert_eq!((range.start, range.end), (16_500, 19_000));
}

/// Test that stopping a selection's playback puts the cursor back at its start
#[test]
fn test_stop_after_play_selection() {
    let mut fx = stacked_fixture();

    fx.session
        .pointer_down(PointerEvent::new(PointerTarget::Row(2), 50, 10))
        .unwrap();
    fx.session
        .pointer_up(PointerEvent::new(PointerTarget::Row(2), 50, 10))
        .unwrap();
    assert!(fx.session.play_selection());
    fx.session.transport_report(30_000);

    assert_eq!(fx.session.stop().position.sample(), 16_500);
    assert!(!fx.session.is_playing());
}
