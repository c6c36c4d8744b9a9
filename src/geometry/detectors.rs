use image::RgbaImage;

use crate::foundation::core::PixelRect;
use crate::geometry::mask::{Connectivity, Mask, components, largest_component, luminance, rgb_to_hsv};

/// A head region proposed by one detector.
#[derive(Clone, Debug, PartialEq)]
pub struct HeadCandidate {
    pub region: PixelRect,
    pub confidence: f32,
    pub detector: &'static str,
}

/// One head-finding heuristic. Detectors never fail; "nothing found" is `None`.
pub trait HeadDetector: Send + Sync {
    fn name(&self) -> &'static str;
    fn detect(&self, img: &RgbaImage, foreground: &Mask) -> Option<HeadCandidate>;
}

/// Skin-tone segmentation inside the foreground.
#[derive(Clone, Copy, Debug, Default)]
pub struct SkinToneDetector;

pub(crate) fn skin_mask(img: &RgbaImage, foreground: &Mask) -> Mask {
    Mask::from_fn(img.width(), img.height(), |x, y| {
        if !foreground.get(x, y) {
            return false;
        }
        let [r, g, b, _] = img.get_pixel(x, y).0;
        let (h, s, v) = rgb_to_hsv(r, g, b);
        (5.0..=25.0).contains(&h) && (30.0..=255.0).contains(&s) && (100.0..=255.0).contains(&v)
    })
}

impl HeadDetector for SkinToneDetector {
    fn name(&self) -> &'static str {
        "skin"
    }

    fn detect(&self, img: &RgbaImage, foreground: &Mask) -> Option<HeadCandidate> {
        let blob = largest_component(&skin_mask(img, foreground), Connectivity::Eight)?;
        let r = blob.bbox;
        let aspect = r.width as f32 / r.height as f32;
        if r.width <= 50 || r.height <= 50 || !(0.7..=1.5).contains(&aspect) {
            tracing::debug!(?r, aspect, "skin blob rejected");
            return None;
        }
        Some(HeadCandidate {
            region: r,
            confidence: (blob.area as f32 / r.area() as f32).min(1.0),
            detector: self.name(),
        })
    }
}

/// Closed outlines that look round, found in a Sobel edge map.
#[derive(Clone, Copy, Debug)]
pub struct EdgeCircularityDetector {
    pub edge_threshold: f32,
    pub min_area: u64,
    pub min_circularity: f64,
}

impl Default for EdgeCircularityDetector {
    fn default() -> Self {
        Self {
            edge_threshold: 100.0,
            min_area: 1000,
            min_circularity: 0.4,
        }
    }
}

/// Gradient magnitude over the grayscale image with background forced to white.
pub(crate) fn sobel_edges(img: &RgbaImage, foreground: &Mask, threshold: f32) -> Mask {
    let (w, h) = img.dimensions();
    let gray: Vec<f32> = (0..h)
        .flat_map(|y| (0..w).map(move |x| (x, y)))
        .map(|(x, y)| {
            if foreground.get(x, y) {
                luminance(img.get_pixel(x, y).0)
            } else {
                255.0
            }
        })
        .collect();
    let at = |x: i64, y: i64| -> f32 {
        let cx = x.clamp(0, i64::from(w) - 1) as usize;
        let cy = y.clamp(0, i64::from(h) - 1) as usize;
        gray[cy * w as usize + cx]
    };
    Mask::from_fn(w, h, |x, y| {
        let (x, y) = (i64::from(x), i64::from(y));
        let gx = at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1)
            - at(x - 1, y - 1)
            - 2.0 * at(x - 1, y)
            - at(x - 1, y + 1);
        let gy = at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1)
            - at(x - 1, y - 1)
            - 2.0 * at(x, y - 1)
            - at(x + 1, y - 1);
        (gx * gx + gy * gy).sqrt() >= threshold
    })
}

impl HeadDetector for EdgeCircularityDetector {
    fn name(&self) -> &'static str {
        "shape"
    }

    fn detect(&self, img: &RgbaImage, foreground: &Mask) -> Option<HeadCandidate> {
        let (w, h) = img.dimensions();
        if w < 3 || h < 3 {
            return None;
        }
        let edges = sobel_edges(img, foreground, self.edge_threshold);
        let inside = Mask::from_fn(w, h, |x, y| !edges.get(x, y));
        let max_top = 0.6 * f64::from(h);

        components(&inside, Connectivity::Four)
            .into_iter()
            .filter(|c| !c.touches_border && c.area >= self.min_area)
            .filter(|c| f64::from(c.bbox.y) < max_top && c.bbox.width > 60 && c.bbox.height > 60)
            .map(|c| (c.circularity(), c))
            .filter(|(circ, _)| *circ > self.min_circularity)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(circ, c)| HeadCandidate {
                region: c.bbox,
                confidence: circ.min(1.0) as f32,
                detector: self.name(),
            })
    }
}

/// Anatomical proportions of the foreground silhouette.
#[derive(Clone, Copy, Debug)]
pub struct ProportionDetector {
    pub head_height_ratio: f32,
    pub head_width_ratio: f32,
}

impl Default for ProportionDetector {
    fn default() -> Self {
        Self {
            head_height_ratio: 0.45,
            head_width_ratio: 0.8,
        }
    }
}

impl HeadDetector for ProportionDetector {
    fn name(&self) -> &'static str {
        "proportion"
    }

    fn detect(&self, _img: &RgbaImage, foreground: &Mask) -> Option<HeadCandidate> {
        let body = foreground.bbox()?;
        let head_h = ((body.height as f32 * self.head_height_ratio) as u32).max(1);
        let head_w = ((body.width as f32 * self.head_width_ratio) as u32).max(1);
        let x = body.x + ((body.width - head_w) / 2) as i32;
        Some(HeadCandidate {
            region: PixelRect::new(x, body.y, head_w, head_h),
            confidence: 0.3,
            detector: self.name(),
        })
    }
}

/// Skin, shape, then proportion.
pub fn default_detectors() -> Vec<Box<dyn HeadDetector>> {
    vec![
        Box::new(SkinToneDetector),
        Box::new(EdgeCircularityDetector::default()),
        Box::new(ProportionDetector::default()),
    ]
}

/// Run every detector and keep the topmost head; ties go to higher confidence, then list order.
pub fn select_head(
    detectors: &[Box<dyn HeadDetector>],
    img: &RgbaImage,
    foreground: &Mask,
) -> Option<HeadCandidate> {
    let mut best: Option<HeadCandidate> = None;
    for d in detectors {
        let Some(c) = d.detect(img, foreground) else {
            tracing::debug!(detector = d.name(), "no head candidate");
            continue;
        };
        tracing::debug!(detector = d.name(), region = ?c.region, confidence = c.confidence, "head candidate");
        let better = match &best {
            None => true,
            Some(b) => {
                c.region.y < b.region.y || (c.region.y == b.region.y && c.confidence > b.confidence)
            }
        };
        if better {
            best = Some(c);
        }
    }
    best
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/detectors.rs"]
mod tests;
