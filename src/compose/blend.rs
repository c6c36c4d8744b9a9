use image::RgbaImage;

use crate::foundation::core::PixelRect;

/// Straight (non-premultiplied) RGBA8.
pub type Rgba8 = [u8; 4];

pub const WHITE: Rgba8 = [255, 255, 255, 255];

/// Porter-Duff "over" on straight alpha, computed in `f32`.
///
/// A fully transparent result is `[0, 0, 0, 0]`.
pub fn over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }
    let sa = f32::from(src[3]) / 255.0;
    let da = f32::from(dst[3]) / 255.0;
    let a = sa + da * (1.0 - sa);
    if a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (f32::from(src[i]) * sa + f32::from(dst[i]) * da * (1.0 - sa)) / a;
        out[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (a * 255.0).round().clamp(0.0, 255.0) as u8;
    out
}

/// Composite `src` onto `canvas` with its top-left at `(x, y)`, clipping to the canvas.
pub fn paste_over(canvas: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    let (cw, ch) = (i64::from(canvas.width()), i64::from(canvas.height()));
    let (sw, sh) = (i64::from(src.width()), i64::from(src.height()));
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + sw).min(cw);
    let y1 = (y + sh).min(ch);
    if x0 >= x1 || y0 >= y1 {
        return;
    }
    for cy in y0..y1 {
        for cx in x0..x1 {
            let s = src.get_pixel((cx - x) as u32, (cy - y) as u32).0;
            if s[3] == 0 {
                continue;
            }
            let d = canvas.get_pixel_mut(cx as u32, cy as u32);
            d.0 = over(d.0, s);
        }
    }
}

/// Overwrite a rectangle (clipped) with a solid color.
pub fn fill_rect(canvas: &mut RgbaImage, rect: PixelRect, color: Rgba8) {
    let r = rect.clamp_to(canvas.width(), canvas.height());
    for y in r.y..r.bottom() {
        for x in r.x..r.right() {
            canvas.put_pixel(x as u32, y as u32, image::Rgba(color));
        }
    }
}
