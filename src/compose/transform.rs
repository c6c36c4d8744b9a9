use image::RgbaImage;
use image::imageops::FilterType;

use crate::foundation::core::{Affine, Point, Vec2};

/// Resize by `factor` (at least 1x1). `FilterType::Triangle` is bilinear.
pub fn scale(img: &RgbaImage, factor: f64, filter: FilterType) -> RgbaImage {
    if (factor - 1.0).abs() < f64::EPSILON {
        return img.clone();
    }
    let w = ((f64::from(img.width()) * factor) as u32).max(1);
    let h = ((f64::from(img.height()) * factor) as u32).max(1);
    image::imageops::resize(img, w, h, filter)
}

/// Counter-clockwise (on screen) rotation by `degrees` about `pivot`, as an image-space affine.
pub fn rotation_about(degrees: f64, pivot: Point) -> Affine {
    let v = pivot.to_vec2();
    Affine::translate(v) * Affine::rotate(-degrees.to_radians()) * Affine::translate(-v)
}

/// Rotate about `pivot`, keeping the input size; uncovered pixels are transparent.
pub fn rotate_about(img: &RgbaImage, degrees: f64, pivot: Point) -> RgbaImage {
    if degrees == 0.0 {
        return img.clone();
    }
    let inverse = rotation_about(degrees, pivot).inverse();
    let (w, h) = img.dimensions();
    RgbaImage::from_fn(w, h, |x, y| {
        let p = inverse * Point::new(f64::from(x), f64::from(y));
        image::Rgba(sample_bilinear(img, p))
    })
}

/// Bilinear sample with transparent outside; interpolates premultiplied color.
pub fn sample_bilinear(img: &RgbaImage, p: Point) -> [u8; 4] {
    let (w, h) = (i64::from(img.width()), i64::from(img.height()));
    let x0 = p.x.floor();
    let y0 = p.y.floor();
    let frac = Vec2::new(p.x - x0, p.y - y0);
    let (x0, y0) = (x0 as i64, y0 as i64);

    let tap = |x: i64, y: i64| -> [f64; 4] {
        if x < 0 || y < 0 || x >= w || y >= h {
            return [0.0; 4];
        }
        let px = img.get_pixel(x as u32, y as u32).0;
        let a = f64::from(px[3]) / 255.0;
        [
            f64::from(px[0]) * a,
            f64::from(px[1]) * a,
            f64::from(px[2]) * a,
            a,
        ]
    };

    let weights = [
        ((x0, y0), (1.0 - frac.x) * (1.0 - frac.y)),
        ((x0 + 1, y0), frac.x * (1.0 - frac.y)),
        ((x0, y0 + 1), (1.0 - frac.x) * frac.y),
        ((x0 + 1, y0 + 1), frac.x * frac.y),
    ];
    let mut acc = [0.0f64; 4];
    for ((x, y), wgt) in weights {
        if wgt == 0.0 {
            continue;
        }
        let t = tap(x, y);
        for i in 0..4 {
            acc[i] += t[i] * wgt;
        }
    }

    let a = acc[3];
    if a <= 1e-6 {
        return [0, 0, 0, 0];
    }
    [
        (acc[0] / a).round().clamp(0.0, 255.0) as u8,
        (acc[1] / a).round().clamp(0.0, 255.0) as u8,
        (acc[2] / a).round().clamp(0.0, 255.0) as u8,
        (a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]
}
