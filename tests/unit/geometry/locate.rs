use image::Rgba;

use super::*;

fn white(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))
}

fn with_skin_head() -> RgbaImage {
    let mut img = white(200, 300);
    for y in 40..140 {
        for x in 50..150 {
            img.put_pixel(x, y, Rgba([220, 170, 130, 255]));
        }
    }
    img
}

#[test]
fn split_is_three_quarters_down() {
    let g = locate(&white(400, 600), RegionKind::Split, None);
    assert_eq!(
        g,
        RegionGeometry::Split {
            width: 400,
            height: 600,
            split_y: 450,
            pivot: PixelPoint::new(200, 450),
        }
    );
}

#[test]
fn manual_anchor_is_used_verbatim() {
    let g = locate(&white(400, 600), RegionKind::Sprite, Some(PixelPoint::new(100, 100)));
    match g {
        RegionGeometry::Sprite {
            anchor,
            sprite_size,
            anchor_source,
            head,
            ..
        } => {
            assert_eq!(anchor, PixelPoint::new(100, 100));
            assert_eq!(sprite_size, PixelSize::new(100, 75));
            assert_eq!(anchor_source, AnchorSource::Manual);
            assert!(head.is_none());
        }
        other => panic!("unexpected geometry {other:?}"),
    }
}

#[test]
fn out_of_bounds_manual_anchor_is_clamped() {
    let g = locate(&white(400, 600), RegionKind::Sprite, Some(PixelPoint::new(-5, 900)));
    assert!(g.is_in_bounds());
    let RegionGeometry::Sprite { anchor, .. } = g else {
        panic!("expected sprite geometry");
    };
    assert_eq!(anchor, PixelPoint::new(0, 599));
}

#[test]
fn manual_anchor_is_ignored_outside_sprite_style() {
    let img = white(100, 80);
    assert_eq!(
        locate(&img, RegionKind::Split, Some(PixelPoint::new(1, 1))),
        locate(&img, RegionKind::Split, None)
    );
}

#[test]
fn skin_head_places_mouth_low_in_head() {
    let g = locate(&with_skin_head(), RegionKind::Sprite, None);
    let RegionGeometry::Sprite {
        anchor,
        head,
        anchor_source,
        sprite_size,
        ..
    } = g
    else {
        panic!("expected sprite geometry");
    };
    assert_eq!(anchor_source, AnchorSource::Head);
    let head = head.unwrap();
    assert_eq!(head.detector, "skin");
    assert_eq!(head.rect, PixelRect::new(50, 40, 100, 100));
    assert_eq!(anchor, PixelPoint::new(100, 118));
    assert_eq!(sprite_size, PixelSize::new(50, 37));
}

#[test]
fn jaw_uses_face_or_whole_image() {
    let g = locate(&with_skin_head(), RegionKind::Jaw, None);
    assert_eq!(
        g,
        RegionGeometry::Jaw {
            width: 200,
            height: 300,
            face: PixelRect::new(50, 40, 100, 100),
            face_source: FaceSource::Detected,
            jaw: PixelRect::new(85, 120, 30, 20),
        }
    );

    let g = locate(&white(100, 50), RegionKind::Jaw, None);
    let RegionGeometry::Jaw {
        face, face_source, ..
    } = &g
    else {
        panic!("expected jaw geometry");
    };
    assert_eq!(*face_source, FaceSource::WholeImage);
    assert_eq!(*face, PixelRect::new(0, 0, 100, 50));
    assert!(g.is_in_bounds());
}

#[test]
fn images_without_alpha_stay_in_bounds_and_are_stable() {
    let mut img = white(97, 131);
    for y in 10..120 {
        for x in 20..70 {
            img.put_pixel(x, y, Rgba([(x * 3) as u8, (y * 2) as u8, 90, 255]));
        }
    }
    for kind in [RegionKind::Split, RegionKind::Sprite, RegionKind::Jaw] {
        let a = locate(&img, kind, None);
        let b = locate(&img, kind, None);
        assert!(a.is_in_bounds(), "{kind:?}: {a:?}");
        assert_eq!(a, b);
        assert_eq!(a.kind(), kind);
    }
}
