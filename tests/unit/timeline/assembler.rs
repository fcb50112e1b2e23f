use serde_json::json;

use super::*;
use crate::config::MusicConfig;

fn w(start: u64, end: u64) -> FrameWindow {
    FrameWindow::new(FrameIndex(start), FrameIndex(end)).unwrap()
}

fn story(value: serde_json::Value) -> StoryDescriptor {
    serde_json::from_value(value).unwrap()
}

fn speech_block(id: &str, key: &str) -> serde_json::Value {
    json!({
        "id": id,
        "speech": { "asset": { "key": key }, "tags": {} },
        "stage": { "directions": [] }
    })
}

fn windows_on(s: &Synthesis, track: Track) -> Vec<FrameWindow> {
    s.timeline.on_track(track).map(|e| e.window).collect()
}

fn video_metadata() -> serde_json::Value {
    json!({
        "title": "Launch",
        "v1": {
            "key": "videos/v1.mp4",
            "transcription": {
                "s1": { "start": 0.0, "end": 3.0 },
                "s2": { "start": 3.0, "end": 4.0 },
                "empty": { "start": 1.0, "end": 1.0 }
            }
        }
    })
}

#[test]
fn consecutive_speech_blocks() {
    let st = story(json!({
        "metadata": { "title": "" },
        "blocks": [speech_block("b0", "a0.mp3"), speech_block("b1", "a1.mp3")]
    }));
    let cat = AssetCatalog::from_durations([("a0.mp3", 3.0), ("a1.mp3", 2.0)]);
    let s = synthesize(&st, &cat, &SynthesisConfig::default()).unwrap();

    assert_eq!(windows_on(&s, Track::Speech), vec![w(1, 91), w(92, 152)]);
    let transitions: Vec<FrameWindow> = s
        .timeline
        .events
        .iter()
        .filter(|e| e.kind == EventKind::TransitionCue)
        .map(|e| e.window)
        .collect();
    assert_eq!(transitions, vec![w(62, 92)]);
    assert_eq!(s.timeline.total_frames, 152);
    assert_eq!(windows_on(&s, Track::Music), vec![w(1, 152)]);
    let music = s.timeline.on_track(Track::Music).next().unwrap();
    assert_eq!(music.gain, Some(0.2));
    assert!(music.block.is_none());

    let holds: Vec<(FrameWindow, EventKind)> = s
        .timeline
        .on_track(Track::Stage)
        .map(|e| (e.window, e.kind.clone()))
        .collect();
    assert_eq!(
        holds,
        vec![
            (
                w(1, 91),
                EventKind::StageHold {
                    camera_hold_end: FrameIndex(61)
                }
            ),
            (
                w(92, 152),
                EventKind::StageHold {
                    camera_hold_end: FrameIndex(122)
                }
            ),
        ]
    );
    assert_eq!(s.timeline.span("b1").unwrap().window, w(92, 152));
    assert!(s.warnings.is_empty());
}

#[test]
fn short_block_holds_the_camera_from_its_start() {
    let st = story(json!({
        "metadata": {},
        "blocks": [speech_block("b0", "a0.mp3")]
    }));
    let cat = AssetCatalog::from_durations([("a0.mp3", 0.5)]);
    let s = synthesize(&st, &cat, &SynthesisConfig::default()).unwrap();
    let hold = s.timeline.on_track(Track::Stage).next().unwrap();
    assert_eq!(
        hold.kind,
        EventKind::StageHold {
            camera_hold_end: FrameIndex(1)
        }
    );
}

#[test]
fn directions_get_windows_envelopes_and_cues() {
    let st = story(json!({
        "metadata": {},
        "blocks": [{
            "id": "b0",
            "speech": {
                "asset": { "key": "a0.mp3" },
                "tags": {
                    "0": { "timeOffset": 0.0 },
                    "1": { "timeOffset": 0.5 },
                    "2": { "timeOffset": 5.0 }
                }
            },
            "stage": { "directions": [
                { "type": "image", "location": "left", "asset": { "key": "i0.png" } },
                { "type": "screenshot", "location": "right", "asset": { "key": "i1.png" } },
                { "type": "text", "data": "hello" }
            ] }
        }]
    }));
    let cat = AssetCatalog::from_durations([("a0.mp3", 6.0)]);
    let s = synthesize(&st, &cat, &SynthesisConfig::default()).unwrap();

    assert_eq!(
        windows_on(&s, Track::Overlay),
        vec![w(1, 61), w(16, 151), w(151, 181)]
    );
    let styles: Vec<EnvelopeStyle> = s
        .timeline
        .on_track(Track::Overlay)
        .map(|e| e.envelope.as_ref().unwrap().style)
        .collect();
    assert_eq!(
        styles,
        vec![
            EnvelopeStyle::Translate,
            EnvelopeStyle::Translate,
            EnvelopeStyle::Scale
        ]
    );
    let text = s.timeline.on_track(Track::Overlay).last().unwrap();
    assert_eq!(
        text.kind,
        EventKind::Visual {
            direction: Some(2),
            kind: DirectionKind::Text,
            location: Location::Center,
            payload: VisualPayload::Text {
                text: "hello".to_owned()
            },
        }
    );

    let entry = s
        .timeline
        .events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::EntryCue { .. }))
        .count();
    let exit: Vec<FrameWindow> = s
        .timeline
        .events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::ExitCue { .. }))
        .map(|e| e.window)
        .collect();
    assert_eq!(entry, 3);
    assert_eq!(exit, vec![w(61, 71)]);
    assert!(
        s.timeline
            .on_track(Track::Effects)
            .all(|e| e.gain == Some(0.5))
    );
}

#[test]
fn tag_past_audio_end_warns_and_is_dropped() {
    let st = story(json!({
        "metadata": {},
        "blocks": [{
            "id": "b0",
            "speech": { "asset": { "key": "a0.mp3" }, "tags": { "0": { "timeOffset": 9.0 } } },
            "stage": { "directions": [
                { "type": "image", "location": "top", "asset": { "key": "i0.png" } }
            ] }
        }]
    }));
    let cat = AssetCatalog::from_durations([("a0.mp3", 2.0)]);
    let s = synthesize(&st, &cat, &SynthesisConfig::default()).unwrap();
    assert_eq!(s.timeline.on_track(Track::Overlay).count(), 0);
    assert_eq!(s.warnings.len(), 1);
    assert_eq!(s.warnings[0].block, "b0");
    assert!(matches!(
        s.warnings[0].kind,
        WarningKind::WindowCollapsed { .. }
    ));
}

#[test]
fn background_spans_the_block_without_animation() {
    let st = story(json!({
        "metadata": {},
        "blocks": [{
            "id": "b0",
            "speech": { "asset": { "key": "a0.mp3" }, "tags": {} },
            "stage": { "directions": [
                { "type": "image", "location": "background", "asset": { "key": "bg.png" } }
            ] }
        }]
    }));
    let cat = AssetCatalog::from_durations([("a0.mp3", 2.0)]);
    let s = synthesize(&st, &cat, &SynthesisConfig::default()).unwrap();
    let bg: Vec<&PlacedEvent> = s.timeline.on_track(Track::Background).collect();
    assert_eq!(bg.len(), 1);
    assert_eq!(bg[0].window, w(1, 61));
    let env = bg[0].envelope.as_ref().unwrap();
    assert_eq!(env.style, EnvelopeStyle::Persistent);
    assert!(env.keys.is_empty());
}

#[test]
fn text_cycle_continues_across_blocks() {
    let text_block = |id: &str, key: &str| {
        json!({
            "id": id,
            "speech": { "asset": { "key": key }, "tags": { "0": { "timeOffset": 0.0 } } },
            "stage": { "directions": [ { "type": "text", "data": id } ] }
        })
    };
    let st = story(json!({
        "metadata": {},
        "blocks": [text_block("b0", "a0.mp3"), text_block("b1", "a1.mp3"), text_block("b2", "a2.mp3")]
    }));
    let cat = AssetCatalog::from_durations([("a0.mp3", 1.0), ("a1.mp3", 1.0), ("a2.mp3", 1.0)]);
    let s = synthesize(&st, &cat, &SynthesisConfig::default()).unwrap();
    let locations: Vec<Location> = s
        .timeline
        .on_track(Track::Overlay)
        .filter_map(|e| match &e.kind {
            EventKind::Visual { location, .. } => Some(*location),
            _ => None,
        })
        .collect();
    assert_eq!(
        locations,
        vec![Location::Center, Location::Bottom, Location::Top]
    );
}

#[test]
fn speech_video_is_stretched_to_the_speech() {
    let st = story(json!({
        "metadata": video_metadata(),
        "blocks": [{
            "id": "b0",
            "speech": { "asset": { "key": "a0.mp3" }, "tags": {} },
            "video": { "id": "v1", "segments": ["s1", "s2"] }
        }]
    }));
    let cat = AssetCatalog::from_durations([("a0.mp3", 2.0)]);
    let s = synthesize(&st, &cat, &SynthesisConfig::default()).unwrap();

    assert_eq!(windows_on(&s, Track::Video), vec![w(1, 46), w(46, 61)]);
    for e in s.timeline.on_track(Track::Video) {
        assert_eq!(e.speed_factor, Some(2.0));
    }
    assert_eq!(s.timeline.on_track(Track::VideoAudio).count(), 0);
    assert_eq!(s.timeline.span("b0").unwrap().window, w(1, 61));
}

#[test]
fn video_only_block_plays_native_audio() {
    let st = story(json!({
        "metadata": video_metadata(),
        "blocks": [
            speech_block("b0", "a0.mp3"),
            { "id": "b1", "video": { "id": "v1", "segments": ["s1", "empty", "s2"] } }
        ]
    }));
    let cat = AssetCatalog::from_durations([("a0.mp3", 1.0)]);
    let s = synthesize(&st, &cat, &SynthesisConfig::default()).unwrap();

    assert_eq!(windows_on(&s, Track::VideoAudio), vec![w(32, 122), w(122, 152)]);
    assert_eq!(windows_on(&s, Track::Video), vec![w(32, 122), w(122, 152)]);
    for e in s.timeline.on_track(Track::Video) {
        assert_eq!(e.speed_factor, Some(1.0));
    }
    assert_eq!(s.timeline.span("b1").unwrap().window, w(32, 152));
    assert_eq!(s.timeline.total_frames, 152);
    // Transition into the video block.
    assert!(
        s.timeline
            .events
            .iter()
            .any(|e| e.kind == EventKind::TransitionCue && e.window == w(2, 32))
    );
    assert_eq!(
        s.warnings,
        vec![SchedulingWarning {
            block: "b1".to_owned(),
            direction: None,
            kind: WarningKind::EmptySegment {
                segment: "empty".to_owned()
            },
        }]
    );
}

#[test]
fn zero_length_video_aborts_by_default() {
    let st = story(json!({
        "metadata": video_metadata(),
        "blocks": [{
            "id": "b0",
            "speech": { "asset": { "key": "a0.mp3" }, "tags": {} },
            "video": { "id": "v1", "segments": ["empty"] }
        }]
    }));
    let cat = AssetCatalog::from_durations([("a0.mp3", 2.0)]);
    let err = synthesize(&st, &cat, &SynthesisConfig::default()).unwrap_err();
    assert!(matches!(err, WeaverError::Retime { .. }), "{err}");
    assert_eq!(err.block(), Some("b0"));
}

#[test]
fn raw_fallback_places_video_unretimed() {
    let st = story(json!({
        "metadata": video_metadata(),
        "blocks": [{
            "id": "b0",
            "speech": { "asset": { "key": "a0.mp3" }, "tags": {} },
            "video": { "id": "v1", "segments": ["empty"] }
        }]
    }));
    let cat = AssetCatalog::from_durations([("a0.mp3", 2.0)]);
    let cfg = SynthesisConfig {
        retime_fallback: RetimeFallback::Raw,
        ..SynthesisConfig::default()
    };
    let s = synthesize(&st, &cat, &cfg).unwrap();
    assert_eq!(windows_on(&s, Track::Video), vec![w(1, 61)]);
    assert_eq!(s.warnings.len(), 1);
    assert!(matches!(
        s.warnings[0].kind,
        WarningKind::RetimeFallback { .. }
    ));
}

#[test]
fn video_only_zero_length_is_always_fatal() {
    let st = story(json!({
        "metadata": video_metadata(),
        "blocks": [{ "id": "b0", "video": { "id": "v1", "segments": ["empty"] } }]
    }));
    let cfg = SynthesisConfig {
        retime_fallback: RetimeFallback::Raw,
        ..SynthesisConfig::default()
    };
    let err = synthesize(&st, &AssetCatalog::new(), &cfg).unwrap_err();
    assert_eq!(err.block(), Some("b0"));
}

#[test]
fn missing_duration_names_the_block() {
    let st = story(json!({
        "metadata": {},
        "blocks": [speech_block("b0", "a0.mp3"), speech_block("b1", "missing.mp3")]
    }));
    let cat = AssetCatalog::from_durations([("a0.mp3", 1.0)]);
    let err = synthesize(&st, &cat, &SynthesisConfig::default()).unwrap_err();
    assert!(matches!(err, WeaverError::AssetUnavailable { .. }), "{err}");
    assert_eq!(err.block(), Some("b1"));
}

#[test]
fn invalid_story_is_rejected_before_scheduling() {
    let st = story(json!({
        "metadata": {},
        "blocks": [{ "id": "b0", "stage": { "directions": [] } }]
    }));
    let err = synthesize(&st, &AssetCatalog::new(), &SynthesisConfig::default()).unwrap_err();
    assert!(matches!(err, WeaverError::Schema(_)), "{err}");
}

#[test]
fn title_overlay_and_music_follow_config() {
    let st = story(json!({
        "metadata": { "title": "Launch day" },
        "blocks": [speech_block("b0", "a0.mp3"), speech_block("b1", "a1.mp3")]
    }));
    let cat = AssetCatalog::from_durations([("a0.mp3", 1.0), ("a1.mp3", 1.0)]);
    let cfg = SynthesisConfig {
        title_overlay: true,
        music: Some(MusicConfig {
            key: "bed.mp3".to_owned(),
            gain: 0.1,
        }),
        ..SynthesisConfig::default()
    };
    let s = synthesize(&st, &cat, &cfg).unwrap();
    let titles: Vec<FrameWindow> = s
        .timeline
        .on_track(Track::Overlay)
        .filter(|e| matches!(e.kind, EventKind::Visual { direction: None, .. }))
        .map(|e| e.window)
        .collect();
    assert_eq!(titles, vec![w(1, 31), w(32, 62)]);
    let music = s.timeline.on_track(Track::Music).next().unwrap();
    assert_eq!(
        music.kind,
        EventKind::Music {
            asset: "bed.mp3".to_owned()
        }
    );

    let silent = SynthesisConfig {
        music: None,
        ..SynthesisConfig::default()
    };
    let s = synthesize(&st, &cat, &silent).unwrap();
    assert_eq!(s.timeline.on_track(Track::Music).count(), 0);
}

#[test]
fn synthesis_is_repeatable() {
    let st = story(json!({
        "metadata": video_metadata(),
        "blocks": [
            speech_block("b0", "a0.mp3"),
            { "id": "b1", "video": { "id": "v1", "segments": ["s1", "s2"] } }
        ]
    }));
    let cat = AssetCatalog::from_durations([("a0.mp3", 2.5)]);
    let cfg = SynthesisConfig::default();
    let before = st.clone();
    let a = synthesize(&st, &cat, &cfg).unwrap();
    let b = synthesize(&st, &cat, &cfg).unwrap();
    assert_eq!(a, b);
    assert_eq!(st, before);
}
