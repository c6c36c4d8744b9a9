//! Binary masks, connected components and color-space helpers for the locator heuristics.

use std::collections::VecDeque;

use image::RgbaImage;

use crate::assets::decode::{ALPHA_FOREGROUND_THRESHOLD, has_meaningful_alpha};
use crate::foundation::core::PixelRect;

/// Luminance at or above this counts as white background on opaque images.
pub const WHITE_THRESHOLD: f32 = 240.0;

/// Row-major boolean mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    pub width: u32,
    pub height: u32,
    bits: Vec<bool>,
}

impl Mask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut bits = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    fn idx(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[self.idx(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, v: bool) {
        if x < self.width && y < self.height {
            let i = self.idx(x, y);
            self.bits[i] = v;
        }
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|&b| b)
    }

    /// Tight bounding box of the set pixels.
    pub fn bbox(&self) -> Option<PixelRect> {
        let mut min = (u32::MAX, u32::MAX);
        let mut max = (0u32, 0u32);
        let mut any = false;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.bits[self.idx(x, y)] {
                    any = true;
                    min = (min.0.min(x), min.1.min(y));
                    max = (max.0.max(x), max.1.max(y));
                }
            }
        }
        any.then(|| PixelRect::from_inclusive(min.0 as i32, min.1 as i32, max.0 as i32, max.1 as i32))
    }
}

/// Character-vs-background mask.
///
/// Uses alpha when the image has transparent pixels, otherwise treats near-white as background.
/// An empty result is replaced by a full mask so downstream heuristics always have a region.
pub fn foreground_mask(img: &RgbaImage) -> Mask {
    let (w, h) = img.dimensions();
    let mask = if has_meaningful_alpha(img) {
        Mask::from_fn(w, h, |x, y| img.get_pixel(x, y).0[3] > ALPHA_FOREGROUND_THRESHOLD)
    } else {
        Mask::from_fn(w, h, |x, y| luminance(img.get_pixel(x, y).0) < WHITE_THRESHOLD)
    };
    if mask.is_empty() {
        tracing::debug!("foreground mask is empty, using whole image");
        return Mask::from_fn(w, h, |_, _| true);
    }
    mask
}

pub fn luminance(px: [u8; 4]) -> f32 {
    0.299 * f32::from(px[0]) + 0.587 * f32::from(px[1]) + 0.114 * f32::from(px[2])
}

/// HSV on the 8-bit OpenCV scale: `H` in `[0, 180)`, `S` and `V` in `[0, 255]`.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let (r, g, b) = (f32::from(r), f32::from(g), f32::from(b));
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let v = max;
    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };
    let mut h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }
    (h / 2.0, s, v)
}

/// Connected region of set pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Component {
    pub bbox: PixelRect,
    /// Pixel count.
    pub area: u64,
    /// Pixels with at least one 4-neighbour outside the component.
    pub perimeter: u64,
    pub touches_border: bool,
}

impl Component {
    /// `4πA / P²`; 0 for degenerate regions.
    pub fn circularity(&self) -> f64 {
        if self.perimeter == 0 {
            return 0.0;
        }
        let p = self.perimeter as f64;
        4.0 * std::f64::consts::PI * self.area as f64 / (p * p)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connectivity {
    Four,
    Eight,
}

const N4: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const N8: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Label every connected region of `mask` (breadth-first flood fill).
pub fn components(mask: &Mask, connectivity: Connectivity) -> Vec<Component> {
    let (w, h) = (mask.width, mask.height);
    let neighbours: &[(i32, i32)] = match connectivity {
        Connectivity::Four => &N4,
        Connectivity::Eight => &N8,
    };
    let mut label = vec![u32::MAX; w as usize * h as usize];
    let mut out = Vec::new();
    let mut queue = VecDeque::new();

    for sy in 0..h {
        for sx in 0..w {
            let si = mask.idx(sx, sy);
            if !mask.bits[si] || label[si] != u32::MAX {
                continue;
            }
            let id = out.len() as u32;
            label[si] = id;
            queue.push_back((sx, sy));

            let (mut min_x, mut min_y, mut max_x, mut max_y) = (sx, sy, sx, sy);
            let mut area = 0u64;
            let mut pixels = Vec::new();
            let mut touches_border = false;

            while let Some((x, y)) = queue.pop_front() {
                area += 1;
                pixels.push((x, y));
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
                if x == 0 || y == 0 || x + 1 == w || y + 1 == h {
                    touches_border = true;
                }
                for &(dx, dy) in neighbours {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                        continue;
                    }
                    let ni = mask.idx(nx as u32, ny as u32);
                    if mask.bits[ni] && label[ni] == u32::MAX {
                        label[ni] = id;
                        queue.push_back((nx as u32, ny as u32));
                    }
                }
            }

            let perimeter = pixels
                .iter()
                .filter(|&&(x, y)| {
                    N4.iter().any(|&(dx, dy)| {
                        let nx = x as i32 + dx;
                        let ny = y as i32 + dy;
                        nx < 0
                            || ny < 0
                            || nx >= w as i32
                            || ny >= h as i32
                            || label[mask.idx(nx as u32, ny as u32)] != id
                    })
                })
                .count() as u64;

            out.push(Component {
                bbox: PixelRect::from_inclusive(
                    min_x as i32,
                    min_y as i32,
                    max_x as i32,
                    max_y as i32,
                ),
                area,
                perimeter,
                touches_border,
            });
        }
    }
    out
}

/// The component with the most pixels.
pub fn largest_component(mask: &Mask, connectivity: Connectivity) -> Option<Component> {
    components(mask, connectivity)
        .into_iter()
        .max_by_key(|c| c.area)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/mask.rs"]
mod tests;
