use image::{Rgba, RgbaImage};

use super::*;
use crate::audio::event::Viseme;
use crate::foundation::rng::Rng64;
use crate::geometry::split_geometry;

#[test]
fn style_names_and_aliases_parse() {
    assert_eq!("two-part".parse::<StyleKind>().unwrap(), StyleKind::TwoPart);
    assert_eq!("Canadian".parse::<StyleKind>().unwrap(), StyleKind::TwoPart);
    assert_eq!(
        "two_part_amplitude".parse::<StyleKind>().unwrap(),
        StyleKind::TwoPartAmplitude
    );
    assert_eq!("standard".parse::<StyleKind>().unwrap(), StyleKind::Sprite);
    assert_eq!("nutcracker".parse::<StyleKind>().unwrap(), StyleKind::SlidingJaw);
    assert!(matches!(
        "puppet".parse::<StyleKind>(),
        Err(LipsyncError::Validation(_))
    ));
    for kind in StyleKind::ALL {
        assert_eq!(kind.name().parse::<StyleKind>().unwrap(), kind);
        assert_eq!(create_style(kind).kind(), kind);
    }
}

#[test]
fn style_aliases_deserialize() {
    let kind: StyleKind = serde_json::from_str("\"nutcracker\"").unwrap();
    assert_eq!(kind, StyleKind::SlidingJaw);
    assert_eq!(serde_json::to_string(&StyleKind::TwoPart).unwrap(), "\"two-part\"");
}

#[test]
fn each_style_picks_its_extraction_and_regions() {
    let modes: Vec<_> = StyleKind::ALL
        .iter()
        .map(|&k| {
            let s = create_style(k);
            (s.extract_mode(), s.region_kind())
        })
        .collect();
    assert_eq!(
        modes,
        vec![
            (ExtractMode::Phoneme, RegionKind::Split),
            (ExtractMode::Amplitude, RegionKind::Split),
            (ExtractMode::Phoneme, RegionKind::Sprite),
            (ExtractMode::Amplitude, RegionKind::Jaw),
        ]
    );
}

#[test]
fn empty_tracks_last_one_second() {
    for kind in StyleKind::ALL {
        assert_eq!(create_style(kind).duration(&KeyframeTrack::new()), 1.0);
    }
}

#[test]
fn deformation_duration_holds_half_a_second_past_the_last_key() {
    let style = create_style(StyleKind::TwoPart);
    let geometry = split_geometry(40, 40);
    let events = [
        AudioEvent::viseme(0.0, 0.3, Viseme::B),
        AudioEvent::viseme(0.3, 0.3, Viseme::A),
    ];
    let track = style.synthesize(&events, &geometry, Fps::default(), &mut Rng64::new(3));
    let last = track.last_time().unwrap();
    assert!((style.duration(&track) - (last + 0.5)).abs() < 1e-9);
}

#[test]
fn sprite_duration_is_the_end_of_the_last_window() {
    let style = create_style(StyleKind::Sprite);
    let events = [
        AudioEvent::viseme(0.0, 0.4, Viseme::B),
        AudioEvent::viseme(0.4, 1.1, Viseme::D),
    ];
    let geometry = crate::geometry::locate(
        &RgbaImage::from_pixel(40, 40, Rgba([0, 0, 0, 255])),
        RegionKind::Sprite,
        None,
    );
    let track = style.synthesize(&events, &geometry, Fps::default(), &mut Rng64::new(0));
    assert!((style.duration(&track) - 1.5).abs() < 1e-9);
}

#[test]
fn sprite_frames_switch_inside_the_event_window() {
    let style = create_style(StyleKind::Sprite);
    let img = RgbaImage::from_pixel(100, 80, Rgba([128, 128, 128, 255]));
    let geometry = crate::geometry::locate(&img, RegionKind::Sprite, Some(PixelPoint::new(50, 40)));
    let catalog = SpriteCatalog::placeholders();
    let rig = style
        .prepare(
            &img,
            &geometry,
            RigInputs {
                sprites: &catalog,
                background: crate::compose::WHITE,
            },
        )
        .unwrap();
    let fps = Fps::default();
    let track = style.synthesize(
        &[AudioEvent::energy(0.5, 0.2, 1.0)],
        &geometry,
        fps,
        &mut Rng64::new(0),
    );

    let silent = style.composite(&rig, &track, FrameIndex(0), fps).unwrap();
    let open = style.composite(&rig, &track, FrameIndex(12), fps).unwrap();
    let after = style.composite(&rig, &track, FrameIndex(20), fps).unwrap();
    assert_ne!(silent, open);
    assert_eq!(silent, after);
}

#[test]
fn two_part_draws_rest_before_the_first_keyframe() {
    let style = create_style(StyleKind::TwoPart);
    let img = RgbaImage::from_pixel(40, 40, Rgba([255, 0, 0, 255]));
    let geometry = split_geometry(40, 40);
    let catalog = SpriteCatalog::placeholders();
    let rig = style
        .prepare(
            &img,
            &geometry,
            RigInputs {
                sprites: &catalog,
                background: crate::compose::WHITE,
            },
        )
        .unwrap();
    let fps = Fps::default();
    let track = style.synthesize(
        &[AudioEvent::viseme(1.0, 0.3, Viseme::D)],
        &geometry,
        fps,
        &mut Rng64::new(9),
    );
    let first = style.composite(&rig, &track, FrameIndex(0), fps).unwrap();
    assert_eq!(first, rig.compose(None).unwrap());
    let open = style.composite(&rig, &track, FrameIndex(27), fps).unwrap();
    assert_ne!(first, open);
}
