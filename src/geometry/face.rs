use image::RgbaImage;

use crate::foundation::core::PixelRect;
use crate::geometry::detectors::skin_mask;
use crate::geometry::mask::{Connectivity, Mask, largest_component};

/// Fraction of the face box height taken by the jaw cutout (measured from the bottom).
pub const JAW_HEIGHT_RATIO: f32 = 0.2;
/// Fraction of the face box width taken by the jaw cutout (centered).
pub const JAW_WIDTH_RATIO: f32 = 0.3;

/// Finds a face bounding box for the sliding-jaw style.
pub trait FaceDetector: Send + Sync {
    fn detect_face(&self, img: &RgbaImage, foreground: &Mask) -> Option<PixelRect>;
}

/// Largest skin-tone blob, accepted when it covers at least `min_area_ratio` of the image.
#[derive(Clone, Copy, Debug)]
pub struct SkinFaceDetector {
    pub min_area_ratio: f32,
}

impl Default for SkinFaceDetector {
    fn default() -> Self {
        Self {
            min_area_ratio: 0.01,
        }
    }
}

impl FaceDetector for SkinFaceDetector {
    fn detect_face(&self, img: &RgbaImage, foreground: &Mask) -> Option<PixelRect> {
        let blob = largest_component(&skin_mask(img, foreground), Connectivity::Eight)?;
        let image_area = u64::from(img.width()) * u64::from(img.height());
        if (blob.area as f32) < self.min_area_ratio * image_area as f32 {
            return None;
        }
        Some(blob.bbox)
    }
}

/// Lower-center slice of `face` that becomes the sliding jaw.
pub fn jaw_rect(face: PixelRect) -> PixelRect {
    let h = ((face.height as f32 * JAW_HEIGHT_RATIO) as u32).max(1).min(face.height.max(1));
    let w = ((face.width as f32 * JAW_WIDTH_RATIO) as u32).max(1).min(face.width.max(1));
    let x = face.x + (face.width.saturating_sub(w) / 2) as i32;
    let y = face.bottom() - h as i32;
    PixelRect::new(x, y, w, h)
}
