use super::*;

fn seg(start: f64, end: f64) -> TranscriptSegment {
    TranscriptSegment { start, end }
}

fn w(start: u64, end: u64) -> FrameWindow {
    FrameWindow::new(FrameIndex(start), FrameIndex(end)).unwrap()
}

#[test]
fn segments_scale_proportionally() {
    // 90 and 30 source frames squeezed into 40.
    let out = retime(
        &[("s1", seg(0.0, 3.0)), ("s2", seg(3.0, 4.0))],
        Fps::default(),
        40,
        DriftPolicy::Preserve,
    )
    .unwrap();

    assert_eq!(out.segments.len(), 2);
    assert_eq!(out.segments[0].placement, w(0, 30));
    assert_eq!(out.segments[1].placement, w(30, 40));
    assert_eq!(out.segments[0].source, w(0, 90));
    assert_eq!(out.segments[1].source, w(90, 120));
    for s in &out.segments {
        assert!((s.speed_factor - 3.0).abs() < 1e-9);
    }
    assert_eq!(out.total_frames(), 40);
}

#[test]
fn drift_is_preserved_by_default() {
    let segs = [
        ("a", seg(0.0, 1.0)),
        ("b", seg(1.0, 2.0)),
        ("c", seg(2.0, 3.0)),
    ];
    let out = retime(&segs, Fps::default(), 20, DriftPolicy::Preserve).unwrap();
    // ceil(30 * 20 / 90) = 7 each.
    assert_eq!(out.total_frames(), 21);
    assert!(out.total_frames() - 20 < segs.len() as u64);
}

#[test]
fn absorb_in_last_hits_the_target() {
    let segs = [
        ("a", seg(0.0, 1.0)),
        ("b", seg(1.0, 2.0)),
        ("c", seg(2.0, 3.0)),
    ];
    let out = retime(&segs, Fps::default(), 20, DriftPolicy::AbsorbInLast).unwrap();
    assert_eq!(out.total_frames(), 20);
    assert_eq!(out.segments[2].placement, w(14, 20));
    assert!((out.segments[2].speed_factor - 30.0 / 6.0).abs() < 1e-9);
}

#[test]
fn placements_are_contiguous_from_zero() {
    let segs = [
        ("a", seg(0.0, 1.3)),
        ("b", seg(4.0, 4.7)),
        ("c", seg(9.1, 12.0)),
    ];
    let out = retime(&segs, Fps::default(), 97, DriftPolicy::Preserve).unwrap();
    let mut prev = 0;
    for s in &out.segments {
        assert_eq!(s.placement.start.0, prev);
        assert!(s.placement.len_frames() > 0);
        prev = s.placement.end.0;
    }
}

#[test]
fn zero_length_segments_are_skipped() {
    let out = retime(
        &[("empty", seg(2.0, 2.0)), ("full", seg(0.0, 1.0))],
        Fps::default(),
        60,
        DriftPolicy::Preserve,
    )
    .unwrap();
    assert_eq!(out.skipped, vec!["empty".to_owned()]);
    assert_eq!(out.segments.len(), 1);
    assert_eq!(out.segments[0].placement, w(0, 60));
    assert!((out.segments[0].speed_factor - 0.5).abs() < 1e-9);
}

#[test]
fn zero_total_is_an_error() {
    let err = retime(
        &[("a", seg(1.0, 1.0))],
        Fps::default(),
        60,
        DriftPolicy::Preserve,
    )
    .unwrap_err();
    assert_eq!(err, RetimeError::ZeroSourceDuration);
    assert_eq!(
        retime(&[], Fps::default(), 60, DriftPolicy::Preserve).unwrap_err(),
        RetimeError::ZeroSourceDuration
    );
}

#[test]
fn overflowing_source_total_is_an_error() {
    let err = retime(
        &[("a", seg(0.0, 1e300)), ("b", seg(0.0, 1e300))],
        Fps::default(),
        40,
        DriftPolicy::Preserve,
    )
    .unwrap_err();
    assert_eq!(err, RetimeError::SourceOverflow);
}
