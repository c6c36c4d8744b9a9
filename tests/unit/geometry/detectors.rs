use image::Rgba;

use super::*;
use crate::geometry::mask::foreground_mask;

const SKIN: Rgba<u8> = Rgba([220, 170, 130, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

fn fill(img: &mut RgbaImage, r: PixelRect, c: Rgba<u8>) {
    for y in r.y..r.bottom() {
        for x in r.x..r.right() {
            img.put_pixel(x as u32, y as u32, c);
        }
    }
}

#[test]
fn skin_blob_becomes_head() {
    let mut img = RgbaImage::from_pixel(200, 300, WHITE);
    fill(&mut img, PixelRect::new(50, 40, 100, 100), SKIN);
    let fg = foreground_mask(&img);
    let c = SkinToneDetector.detect(&img, &fg).unwrap();
    assert_eq!(c.region, PixelRect::new(50, 40, 100, 100));
    assert_eq!(c.detector, "skin");
    assert!((c.confidence - 1.0).abs() < 1e-6);
}

#[test]
fn elongated_skin_blob_is_rejected() {
    let mut img = RgbaImage::from_pixel(200, 300, WHITE);
    fill(&mut img, PixelRect::new(10, 10, 150, 60), SKIN);
    let fg = foreground_mask(&img);
    assert!(SkinToneDetector.detect(&img, &fg).is_none());
}

#[test]
fn closed_round_outline_is_found() {
    let mut img = RgbaImage::from_pixel(200, 200, WHITE);
    let (cx, cy, r) = (100.0f64, 80.0f64, 50.0f64);
    for y in 0..200u32 {
        for x in 0..200u32 {
            let d = ((f64::from(x) - cx).powi(2) + (f64::from(y) - cy).powi(2)).sqrt();
            if (d - r).abs() <= 1.0 {
                img.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
    }
    let fg = foreground_mask(&img);
    let c = EdgeCircularityDetector::default().detect(&img, &fg).unwrap();
    assert_eq!(c.detector, "shape");
    assert!(c.region.y > 30 && c.region.y < 40, "{:?}", c.region);
    assert!(c.region.width > 80 && c.region.width < 100);
}

#[test]
fn open_canvas_has_no_shape() {
    let img = RgbaImage::from_pixel(120, 120, WHITE);
    let fg = foreground_mask(&img);
    assert!(EdgeCircularityDetector::default().detect(&img, &fg).is_none());
}

#[test]
fn proportion_takes_top_of_silhouette() {
    let mut img = RgbaImage::from_pixel(200, 300, WHITE);
    fill(&mut img, PixelRect::new(20, 10, 100, 200), Rgba([30, 30, 200, 255]));
    let fg = foreground_mask(&img);
    let c = ProportionDetector::default().detect(&img, &fg).unwrap();
    assert_eq!(c.region, PixelRect::new(30, 10, 80, 90));
}

struct Fixed(&'static str, Option<(i32, f32)>);

impl HeadDetector for Fixed {
    fn name(&self) -> &'static str {
        self.0
    }

    fn detect(&self, _img: &RgbaImage, _fg: &Mask) -> Option<HeadCandidate> {
        self.1.map(|(top, confidence)| HeadCandidate {
            region: PixelRect::new(0, top, 10, 10),
            confidence,
            detector: self.0,
        })
    }
}

#[test]
fn topmost_wins_then_confidence_then_order() {
    let img = RgbaImage::new(4, 4);
    let fg = Mask::new(4, 4);

    let ds: Vec<Box<dyn HeadDetector>> = vec![
        Box::new(Fixed("a", Some((20, 0.9)))),
        Box::new(Fixed("b", None)),
        Box::new(Fixed("c", Some((10, 0.1)))),
    ];
    assert_eq!(select_head(&ds, &img, &fg).unwrap().detector, "c");

    let ds: Vec<Box<dyn HeadDetector>> = vec![
        Box::new(Fixed("a", Some((10, 0.2)))),
        Box::new(Fixed("b", Some((10, 0.8)))),
        Box::new(Fixed("c", Some((10, 0.8)))),
    ];
    assert_eq!(select_head(&ds, &img, &fg).unwrap().detector, "b");

    let none: Vec<Box<dyn HeadDetector>> = vec![Box::new(Fixed("a", None))];
    assert!(select_head(&none, &img, &fg).is_none());
}
