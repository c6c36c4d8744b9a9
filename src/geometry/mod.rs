//! Mouth/head region locator.
//!
//! Every heuristic here degrades to a defined default; `locate` never fails.

pub mod detectors;
pub mod face;
pub mod mask;

use image::RgbaImage;

use crate::foundation::core::{PixelPoint, PixelRect, PixelSize};

pub use detectors::{HeadCandidate, HeadDetector, default_detectors, select_head};
pub use face::{FaceDetector, SkinFaceDetector, jaw_rect};

/// Split line of the two-part rig as a fraction of image height.
pub const SPLIT_RATIO: f64 = 0.75;
/// Mouth position inside a detected head, as a fraction of head height.
pub const MOUTH_IN_HEAD_RATIO: f64 = 0.78;
/// Mouth position inside the foreground box when no head is found.
pub const MOUTH_IN_BODY_RATIO: f64 = 0.6;

/// Which geometry a style needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    Split,
    Sprite,
    Jaw,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HeadRegion {
    pub rect: PixelRect,
    pub detector: String,
    pub confidence: f32,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorSource {
    Manual,
    Head,
    Foreground,
    ImageCenter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceSource {
    Detected,
    WholeImage,
}

/// Where the animated parts of the character are.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegionGeometry {
    Split {
        width: u32,
        height: u32,
        split_y: u32,
        pivot: PixelPoint,
    },
    Sprite {
        width: u32,
        height: u32,
        anchor: PixelPoint,
        sprite_size: PixelSize,
        head: Option<HeadRegion>,
        anchor_source: AnchorSource,
    },
    Jaw {
        width: u32,
        height: u32,
        face: PixelRect,
        face_source: FaceSource,
        jaw: PixelRect,
    },
}

impl RegionGeometry {
    pub fn kind(&self) -> RegionKind {
        match self {
            Self::Split { .. } => RegionKind::Split,
            Self::Sprite { .. } => RegionKind::Sprite,
            Self::Jaw { .. } => RegionKind::Jaw,
        }
    }

    /// Size of the image this geometry was computed for.
    pub fn image_size(&self) -> PixelSize {
        match *self {
            Self::Split { width, height, .. }
            | Self::Sprite { width, height, .. }
            | Self::Jaw { width, height, .. } => PixelSize::new(width, height),
        }
    }

    /// Every point and rectangle lies inside the image.
    pub fn is_in_bounds(&self) -> bool {
        let PixelSize { width, height } = self.image_size();
        match self {
            Self::Split { split_y, pivot, .. } => *split_y <= height && pivot.is_within(width, height),
            Self::Sprite { anchor, .. } => anchor.is_within(width, height),
            Self::Jaw { face, jaw, .. } => face.is_within(width, height) && jaw.is_within(width, height),
        }
    }
}

/// `split_y = floor(0.75 h)`, pivot at the center of the split line.
pub fn split_geometry(width: u32, height: u32) -> RegionGeometry {
    let split_y = ((f64::from(height) * SPLIT_RATIO).floor() as u32).min(height.saturating_sub(1));
    RegionGeometry::Split {
        width,
        height,
        split_y,
        pivot: PixelPoint::new((width / 2) as i32, split_y as i32),
    }
}

/// `w = clamp(W/4, 40, 120)`, `h = clamp(H/8, 30, 80)`.
pub fn estimate_sprite_size(width: u32, height: u32) -> PixelSize {
    PixelSize::new((width / 4).clamp(40, 120), (height / 8).clamp(30, 80))
}

/// Holds the ordered head detectors and the face detector.
pub struct Locator {
    pub head_detectors: Vec<Box<dyn HeadDetector>>,
    pub face_detector: Box<dyn FaceDetector>,
}

impl Default for Locator {
    fn default() -> Self {
        Self {
            head_detectors: default_detectors(),
            face_detector: Box::new(SkinFaceDetector::default()),
        }
    }
}

impl Locator {
    #[tracing::instrument(skip(self, img), fields(width = img.width(), height = img.height()))]
    pub fn locate(
        &self,
        img: &RgbaImage,
        kind: RegionKind,
        manual_anchor: Option<PixelPoint>,
    ) -> RegionGeometry {
        let (w, h) = img.dimensions();
        if manual_anchor.is_some() && kind != RegionKind::Sprite {
            tracing::warn!(?kind, "manual anchor only applies to the sprite style, ignoring it");
        }
        let geometry = match kind {
            RegionKind::Split => split_geometry(w, h),
            RegionKind::Sprite => self.sprite_geometry(img, manual_anchor),
            RegionKind::Jaw => self.jaw_geometry(img),
        };
        tracing::debug!(?geometry, "located regions");
        geometry
    }

    fn sprite_geometry(&self, img: &RgbaImage, manual_anchor: Option<PixelPoint>) -> RegionGeometry {
        let (w, h) = img.dimensions();
        let sprite_size = estimate_sprite_size(w, h);

        if let Some(anchor) = manual_anchor {
            let clamped = anchor.clamp_to(w, h);
            if clamped != anchor {
                tracing::warn!(?anchor, ?clamped, "manual anchor outside the image, clamping");
            }
            return RegionGeometry::Sprite {
                width: w,
                height: h,
                anchor: clamped,
                sprite_size,
                head: None,
                anchor_source: AnchorSource::Manual,
            };
        }

        let fg = mask::foreground_mask(img);
        let (anchor, head, source) = match select_head(&self.head_detectors, img, &fg) {
            Some(c) => {
                let r = c.region;
                let mouth = PixelPoint::new(
                    r.x + (r.width / 2) as i32,
                    r.y + (f64::from(r.height) * MOUTH_IN_HEAD_RATIO).floor() as i32,
                );
                let head = HeadRegion {
                    rect: r,
                    detector: c.detector.to_string(),
                    confidence: c.confidence,
                };
                (mouth, Some(head), AnchorSource::Head)
            }
            None => match fg.bbox() {
                Some(b) => {
                    tracing::debug!("no head detected, anchoring on foreground box");
                    let mouth = PixelPoint::new(
                        b.x + (b.width / 2) as i32,
                        b.y + (f64::from(b.height) * MOUTH_IN_BODY_RATIO).floor() as i32,
                    );
                    (mouth, None, AnchorSource::Foreground)
                }
                None => {
                    tracing::debug!("no foreground, anchoring on image center");
                    let mouth = PixelPoint::new(
                        (w / 2) as i32,
                        (f64::from(h) * MOUTH_IN_BODY_RATIO).floor() as i32,
                    );
                    (mouth, None, AnchorSource::ImageCenter)
                }
            },
        };

        RegionGeometry::Sprite {
            width: w,
            height: h,
            anchor: anchor.clamp_to(w, h),
            sprite_size,
            head,
            anchor_source: source,
        }
    }

    fn jaw_geometry(&self, img: &RgbaImage) -> RegionGeometry {
        let (w, h) = img.dimensions();
        let fg = mask::foreground_mask(img);
        let (face, face_source) = match self.face_detector.detect_face(img, &fg) {
            Some(f) => (f.clamp_to(w, h), FaceSource::Detected),
            None => {
                tracing::debug!("no face detected, using whole image for the jaw");
                (PixelRect::new(0, 0, w, h), FaceSource::WholeImage)
            }
        };
        RegionGeometry::Jaw {
            width: w,
            height: h,
            face,
            face_source,
            jaw: jaw_rect(face).clamp_to(w, h),
        }
    }
}

/// [`Locator::locate`] with the default detector set.
pub fn locate(img: &RgbaImage, kind: RegionKind, manual_anchor: Option<PixelPoint>) -> RegionGeometry {
    Locator::default().locate(img, kind, manual_anchor)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/locate.rs"]
mod tests;
