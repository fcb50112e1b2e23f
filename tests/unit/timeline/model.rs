use super::*;

fn w(start: u64, end: u64) -> FrameWindow {
    FrameWindow::new(FrameIndex(start), FrameIndex(end)).unwrap()
}

fn cue(window: FrameWindow) -> PlacedEvent {
    PlacedEvent::new(Track::Effects, Some("b0"), EventKind::TransitionCue, window)
}

fn empty() -> Timeline {
    Timeline::new(Fps::default(), Canvas::default(), Palette::default())
}

#[test]
fn overlapping_events_get_separate_channels() {
    let mut tl = empty();
    assert_eq!(tl.push(cue(w(1, 11))), 0);
    assert_eq!(tl.push(cue(w(5, 15))), 1);
    assert_eq!(tl.push(cue(w(8, 20))), 2);
    // Touching windows do not overlap.
    assert_eq!(tl.push(cue(w(11, 13))), 0);
    assert_eq!(tl.push(cue(w(15, 18))), 0);
}

#[test]
fn channels_are_per_track() {
    let mut tl = empty();
    tl.push(cue(w(1, 11)));
    let speech = PlacedEvent::new(
        Track::Speech,
        Some("b0"),
        EventKind::Speech {
            asset: "a.mp3".to_owned(),
        },
        w(1, 11),
    );
    assert_eq!(tl.push(speech), 0);
}

#[test]
fn lanes_never_hold_overlapping_events() {
    let mut tl = empty();
    for (s, e) in [(1, 40), (10, 20), (15, 50), (20, 30), (39, 41), (45, 60)] {
        tl.push(cue(w(s, e)));
    }
    for (lane, events) in tl.lanes() {
        for (i, a) in events.iter().enumerate() {
            for b in &events[i + 1..] {
                assert!(!a.window.overlaps(b.window), "{lane:?}: {a:?} vs {b:?}");
            }
        }
    }
}

#[test]
fn late_events_reuse_gaps_on_lower_channels() {
    let mut tl = empty();
    assert_eq!(tl.push(cue(w(1, 10))), 0);
    assert_eq!(tl.push(cue(w(30, 40))), 0);
    assert_eq!(tl.push(cue(w(5, 35))), 1);
    // Fits the hole between the two channel-0 events.
    assert_eq!(tl.push(cue(w(12, 28))), 0);
    assert_eq!(tl.push(cue(w(12, 31))), 2);
}

#[test]
fn allocation_resumes_after_reload() {
    let mut tl = empty();
    tl.push(cue(w(1, 11)));
    tl.push(cue(w(5, 15)));
    let json = tl.to_json_pretty().unwrap();

    let mut back = Timeline::from_reader(json.as_bytes()).unwrap();
    assert_eq!(back, tl);
    assert_eq!(back.push(cue(w(8, 12))), 2);
    assert_eq!(back.push(cue(w(15, 20))), 0);
}

#[test]
fn events_can_be_listed_per_block() {
    let mut tl = empty();
    tl.push(cue(w(1, 11)));
    tl.push(PlacedEvent::new(
        Track::Effects,
        Some("b1"),
        EventKind::TransitionCue,
        w(20, 30),
    ));
    let b1: Vec<FrameWindow> = tl.for_block("b1").map(|e| e.window).collect();
    assert_eq!(b1, vec![w(20, 30)]);
    assert_eq!(tl.for_block("b9").count(), 0);
}

#[test]
fn primary_tracks() {
    assert!(Track::Speech.is_primary());
    assert!(Track::VideoAudio.is_primary());
    assert!(Track::Video.is_primary());
    assert!(Track::Stage.is_primary());
    assert!(!Track::Overlay.is_primary());
    assert!(!Track::Effects.is_primary());
    assert!(!Track::Music.is_primary());
}

#[test]
fn json_uses_snake_case_tags() {
    let mut tl = empty();
    tl.push(
        PlacedEvent::new(
            Track::VideoAudio,
            Some("b1"),
            EventKind::StageHold {
                camera_hold_end: FrameIndex(20),
            },
            w(1, 50),
        )
        .with_gain(1.0),
    );
    let json = tl.to_json_pretty().unwrap();
    assert!(json.contains("\"video_audio\""), "{json}");
    assert!(json.contains("\"stage_hold\""), "{json}");
    assert!(!json.contains("speed_factor"), "{json}");

    let back = Timeline::from_reader(json.as_bytes()).unwrap();
    assert_eq!(back, tl);
}

#[test]
fn bad_timeline_json_is_a_serde_error() {
    let err = Timeline::from_reader("{".as_bytes()).unwrap_err();
    assert!(matches!(err, WeaverError::Serde(_)), "{err}");
}
