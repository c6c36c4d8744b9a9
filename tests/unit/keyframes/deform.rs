use super::*;
use crate::foundation::rng::Rng64;

fn deform(k: &Keyframe) -> DeformState {
    match k.state {
        VisualState::Deform(d) => d,
        other => panic!("expected deform state, got {other:?}"),
    }
}

#[test]
fn open_pose_is_exaggerated_and_lifted() {
    let d = open_pose(Viseme::D);
    assert_eq!((d.top_y, d.top_x, d.bottom_y), (-210, 37, -3));
    assert_eq!(d.tilt_deg, -8.0);

    let b = open_pose(Viseme::B);
    assert_eq!((b.top_y, b.top_x, b.bottom_y), (-97, 12, -28));

    let x = open_pose(Viseme::X);
    assert_eq!((x.top_y, x.bottom_y), (-60, -40));
}

fn speech() -> Vec<AudioEvent> {
    vec![
        AudioEvent::viseme(0.0, 0.2, Viseme::B),
        AudioEvent::viseme(0.2, 0.3, Viseme::D),
        AudioEvent::viseme(0.5, 0.2, Viseme::A),
    ]
}

#[test]
fn viseme_keyframes_lead_events_and_snap_close_after_wide_shapes() {
    let track = synthesize_visemes(&speech(), &mut Rng64::new(11));
    let times: Vec<f64> = track.keyframes().iter().map(|k| k.time).collect();
    assert_eq!(times.len(), 4);
    assert!((times[0] - 0.1).abs() < 1e-9);
    assert!((times[1] - 0.3).abs() < 1e-9);
    assert!((times[2] - 0.46).abs() < 1e-9);
    assert!((times[3] - 0.6).abs() < 1e-9);

    let close = deform(&track.keyframes()[2]);
    assert!((-5..=5).contains(&close.top_y));
    assert!((0..=2).contains(&close.top_x));
    assert!((0..=2).contains(&close.bottom_y));
    assert!((-10.0..=10.0).contains(&close.tilt_deg));
}

#[test]
fn snap_close_is_measured_to_the_next_event_start() {
    let events = vec![
        AudioEvent::viseme(0.0, 0.3, Viseme::H),
        AudioEvent::viseme(0.3, 0.2, Viseme::A),
    ];
    let track = synthesize_visemes(&events, &mut Rng64::new(2));
    let times: Vec<f64> = track.keyframes().iter().map(|k| k.time).collect();
    // Open at 0.1, next event starts at 0.3: close at 0.1 + 0.8 * 0.2.
    assert_eq!(times.len(), 3);
    assert!((times[1] - 0.26).abs() < 1e-9);
    assert!((times[2] - 0.4).abs() < 1e-9);
}

#[test]
fn lateral_bias_cycles_left_center_right() {
    let events: Vec<_> = (0..3)
        .map(|i| AudioEvent::viseme(f64::from(i) * 0.2, 0.2, Viseme::A))
        .collect();
    let track = synthesize_visemes(&events, &mut Rng64::new(3));
    let xs: Vec<i32> = track.keyframes().iter().map(|k| deform(k).bottom_x).collect();
    assert_eq!(xs, vec![-25, 0, 25]);
    for (k, bias) in track.keyframes().iter().zip([-25, 0, 25]) {
        let d = deform(k);
        assert!((d.top_x - bias).abs() <= 2);
        assert!((-63..=-57).contains(&d.top_y));
        assert!((-5.0..=5.0).contains(&d.tilt_deg));
    }
}

#[test]
fn last_wide_event_closes_within_default_span() {
    let track = synthesize_visemes(&[AudioEvent::viseme(1.0, 0.5, Viseme::C)], &mut Rng64::new(0));
    assert_eq!(track.len(), 2);
    assert!((track.keyframes()[1].time - 1.26).abs() < 1e-9);
}

#[test]
fn same_seed_same_track() {
    let a = synthesize_visemes(&speech(), &mut Rng64::new(5));
    let b = synthesize_visemes(&speech(), &mut Rng64::new(5));
    assert_eq!(a, b);
}

#[test]
fn silence_is_never_rate_limited() {
    let events: Vec<_> = [0.0, 0.02, 0.04, 0.06, 0.08]
        .iter()
        .map(|&t| AudioEvent::energy(t, 0.02, 0.05))
        .collect();
    let track = synthesize_amplitude(&events);
    assert_eq!(track.len(), events.len());
    assert!(track.keyframes().iter().all(|k| deform(k) == DeformState::REST));
}

#[test]
fn loud_detections_are_thinned() {
    let events: Vec<_> = [0.0, 0.05, 0.1, 0.15, 0.2, 0.25]
        .iter()
        .map(|&t| AudioEvent::energy(t, 0.05, 0.9))
        .collect();
    let track = synthesize_amplitude(&events);
    let times: Vec<f64> = track.keyframes().iter().map(|k| k.time).collect();
    assert_eq!(times, vec![0.0, 0.1, 0.2]);
    assert_eq!(deform(&track.keyframes()[0]), open_pose(Viseme::D));
}

#[test]
fn long_gap_closes_an_open_mouth() {
    let events = vec![
        AudioEvent::energy(0.0, 0.1, 0.5),
        AudioEvent::energy(0.6, 0.1, 0.5),
    ];
    let track = synthesize_amplitude(&events);
    assert_eq!(track.len(), 2);
    assert_eq!(deform(&track.keyframes()[0]), open_pose(Viseme::C));
    assert!((track.keyframes()[1].time - 0.1).abs() < 1e-9);
    assert_eq!(deform(&track.keyframes()[1]), DeformState::REST);
}
