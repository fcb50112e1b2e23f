use super::*;

fn window() -> FrameWindow {
    FrameWindow::new(FrameIndex(100), FrameIndex(160)).unwrap()
}

fn offsets(env: &Envelope, property: Property) -> Vec<(Edge, i64, f64)> {
    env.keys
        .iter()
        .filter(|k| k.property == property)
        .map(|k| (k.edge, k.offset, k.value))
        .collect()
}

#[test]
fn translate_keys_bracket_the_window() {
    let env = Envelope::new(window(), EnvelopeStyle::Translate, 20.0);
    assert_eq!(
        offsets(&env, Property::Visibility),
        vec![
            (Edge::Start, -11, 0.0),
            (Edge::Start, -10, 1.0),
            (Edge::End, 11, 0.0)
        ]
    );
    assert_eq!(
        offsets(&env, Property::Displacement),
        vec![
            (Edge::Start, -10, 20.0),
            (Edge::Start, 0, 0.0),
            (Edge::End, 0, 0.0),
            (Edge::End, 10, 20.0)
        ]
    );
    assert!(offsets(&env, Property::Scale).is_empty());
}

#[test]
fn scale_keys_start_with_a_bounce() {
    let env = Envelope::new(window(), EnvelopeStyle::Scale, 20.0);
    let first_scale = env
        .keys
        .iter()
        .find(|k| k.property == Property::Scale)
        .unwrap();
    assert_eq!(first_scale.offset, -20);
    assert_eq!(first_scale.value, COLLAPSED_SCALE);
    assert_eq!(first_scale.interpolation, Interpolation::OutBounce);
    assert_eq!(
        offsets(&env, Property::Visibility),
        vec![
            (Edge::Start, -21, 0.0),
            (Edge::Start, -20, 1.0),
            (Edge::End, 11, 0.0)
        ]
    );
}

#[test]
fn persistent_has_no_keys_and_samples_at_rest() {
    let env = Envelope::new(window(), EnvelopeStyle::Persistent, 20.0);
    assert!(env.keys.is_empty());
    let s = env.sample(FrameIndex(0));
    assert!(s.visible);
    assert_eq!(s.displacement, 0.0);
    assert_eq!(s.scale, 1.0);
}

#[test]
fn translate_sampling_slides_in_and_out() {
    let env = Envelope::new(window(), EnvelopeStyle::Translate, 20.0);

    assert!(!env.sample(FrameIndex(89)).visible);
    let entering = env.sample(FrameIndex(90));
    assert!(entering.visible);
    assert_eq!(entering.displacement, 20.0);
    assert!((env.sample(FrameIndex(95)).displacement - 10.0).abs() < 1e-9);

    for f in [100, 130, 160] {
        let s = env.sample(FrameIndex(f));
        assert!(s.visible);
        assert_eq!(s.displacement, 0.0, "frame {f}");
        assert_eq!(s.scale, 1.0);
    }

    assert!((env.sample(FrameIndex(165)).displacement - 10.0).abs() < 1e-9);
    assert!(env.sample(FrameIndex(170)).visible);
    assert!(!env.sample(FrameIndex(171)).visible);
}

#[test]
fn scale_sampling_collapses_on_exit() {
    let env = Envelope::new(window(), EnvelopeStyle::Scale, 20.0);
    let s = env.sample(FrameIndex(80));
    assert!(s.visible);
    assert_eq!(s.scale, COLLAPSED_SCALE);
    assert_eq!(env.sample(FrameIndex(100)).scale, 1.0);
    assert!((env.sample(FrameIndex(165)).scale - 0.505).abs() < 1e-9);
    assert!(!env.sample(FrameIndex(171)).visible);
    assert_eq!(env.sample(FrameIndex(120)).displacement, 0.0);
}

#[test]
fn keys_near_frame_zero_go_negative() {
    let env = Envelope::new(
        FrameWindow::new(FrameIndex(1), FrameIndex(61)).unwrap(),
        EnvelopeStyle::Translate,
        20.0,
    );
    assert_eq!(env.absolute_frame(&env.keys[0]), -10);
    // Frame 0 is already past the entry keys' hidden phase.
    assert!(env.sample(FrameIndex(0)).visible);
}
