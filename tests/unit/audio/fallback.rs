use super::*;
use crate::audio::event::is_well_formed;
use crate::foundation::rng::Rng64;

fn square(amplitude: f32, secs: f64) -> MonoPcm {
    let rate = 8000u32;
    let n = (secs * f64::from(rate)) as usize;
    MonoPcm {
        sample_rate: rate,
        samples: (0..n)
            .map(|i| if i % 2 == 0 { amplitude } else { -amplitude })
            .collect(),
    }
}

#[test]
fn loudness_categories_follow_dbfs_thresholds() {
    assert_eq!(Loudness::from_dbfs(f64::NEG_INFINITY), Loudness::Silence);
    assert_eq!(Loudness::from_dbfs(-35.1), Loudness::Silence);
    assert_eq!(Loudness::from_dbfs(-35.0), Loudness::Soft);
    assert_eq!(Loudness::from_dbfs(-20.0), Loudness::Medium);
    assert_eq!(Loudness::from_dbfs(-15.0), Loudness::Loud);
    assert_eq!(Loudness::from_dbfs(0.0), Loudness::Loud);
}

#[test]
fn silence_yields_idle_shapes_only() {
    let mut rng = Rng64::new(1);
    let events = generate(&square(0.0, 1.0), &mut rng);
    assert_eq!(events.len(), 13);
    assert!(events.iter().all(|e| e.value.viseme() == Viseme::X));
    assert!(is_well_formed(&events));
}

#[test]
fn loud_audio_draws_from_loud_shapes() {
    let mut rng = Rng64::new(99);
    let events = generate(&square(0.5, 2.0), &mut rng);
    assert!(!events.is_empty());
    assert!(is_well_formed(&events));
    for e in &events {
        assert!(Loudness::Loud.candidates().contains(&e.value.viseme()));
        assert!(e.duration >= WINDOW_SECS - JITTER_SECS);
        assert!(e.duration <= WINDOW_SECS + JITTER_SECS);
    }
}

#[test]
fn soft_audio_uses_both_soft_shapes() {
    let mut rng = Rng64::new(5);
    let events = generate(&square(0.04, 1.0), &mut rng);
    let shapes: Vec<_> = events.iter().map(|e| e.value.viseme()).collect();
    assert!(shapes.iter().all(|v| matches!(v, Viseme::A | Viseme::B)));
    assert!(shapes.contains(&Viseme::A));
    assert!(shapes.contains(&Viseme::B));
}

#[test]
fn same_seed_reproduces_the_stream() {
    let pcm = square(0.3, 1.5);
    let a = generate(&pcm, &mut Rng64::new(7));
    let b = generate(&pcm, &mut Rng64::new(7));
    assert_eq!(a, b);
}

#[test]
fn empty_audio_yields_nothing() {
    let pcm = MonoPcm {
        sample_rate: 8000,
        samples: Vec::new(),
    };
    assert!(generate(&pcm, &mut Rng64::new(0)).is_empty());
}
