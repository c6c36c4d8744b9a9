//! Per-style prepared fragments and the frame recipes that combine them.
//!
//! A rig is built once per job from the character image and its geometry; composing a frame only
//! clones prerendered canvases and pastes fragments, so it is cheap and side-effect free.

use image::RgbaImage;
use image::imageops::FilterType;

use crate::assets::sprites::{MouthSprite, SpriteCatalog};
use crate::compose::blend::{Rgba8, fill_rect, paste_over};
use crate::compose::layout::CanvasLayout;
use crate::compose::transform::{rotate_about, scale};
use crate::foundation::core::{PixelPoint, PixelRect, PixelSize, Point};
use crate::foundation::error::{LipsyncError, LipsyncResult};
use crate::geometry::RegionGeometry;
use crate::keyframes::{DeformState, JawState, VisualState};

pub const CAVITY_COLOR: Rgba8 = [20, 20, 20, 255];
/// Share of the jaw fragment (from its top edge) that fades in.
pub const JAW_RAMP_FRACTION: f64 = 0.25;

fn blank(size: PixelSize, background: Rgba8) -> RgbaImage {
    RgbaImage::from_pixel(size.width, size.height, image::Rgba(background))
}

fn crop(img: &RgbaImage, r: PixelRect) -> RgbaImage {
    let r = r.clamp_to(img.width(), img.height());
    image::imageops::crop_imm(img, r.x as u32, r.y as u32, r.width, r.height).to_image()
}

fn geometry_mismatch(expected: &str, got: &RegionGeometry) -> LipsyncError {
    LipsyncError::validation(format!(
        "{expected} rig needs {expected} geometry, got {:?}",
        got.kind()
    ))
}

/// Head cut at the split line; the top half lifts and tilts over the bottom half.
#[derive(Clone, Debug)]
pub struct TwoPartRig {
    top: RgbaImage,
    bottom: RgbaImage,
    split_scaled: i64,
    origin: PixelPoint,
    canvas: PixelSize,
    background: Rgba8,
}

impl TwoPartRig {
    pub fn prepare(
        img: &RgbaImage,
        geometry: &RegionGeometry,
        layout: CanvasLayout,
        background: Rgba8,
    ) -> LipsyncResult<Self> {
        let RegionGeometry::Split {
            width,
            height,
            split_y,
            ..
        } = *geometry
        else {
            return Err(geometry_mismatch("split", geometry));
        };
        if split_y == 0 || split_y >= height {
            return Err(LipsyncError::validation(format!(
                "split line {split_y} leaves an empty half in a {width}x{height} image"
            )));
        }

        let top = crop(img, PixelRect::new(0, 0, width, split_y));
        let bottom = crop(img, PixelRect::new(0, split_y as i32, width, height - split_y));
        let size = PixelSize::new(width, height);
        Ok(Self {
            top: scale(&top, layout.scale, FilterType::Triangle),
            bottom: scale(&bottom, layout.scale, FilterType::Triangle),
            split_scaled: (f64::from(split_y) * layout.scale) as i64,
            origin: layout.character_origin(size),
            canvas: layout.canvas_size(size),
            background,
        })
    }

    pub fn compose(&self, s: &DeformState) -> RgbaImage {
        let mut frame = blank(self.canvas, self.background);
        let base_x = i64::from(self.origin.x);
        let base_y = i64::from(self.origin.y);

        paste_over(
            &mut frame,
            &self.bottom,
            base_x + i64::from(s.bottom_x),
            base_y + self.split_scaled + i64::from(s.bottom_y),
        );

        let pivot = Point::new(
            f64::from(self.top.width() / 2),
            f64::from(self.top.height().saturating_sub(1)),
        );
        let top = rotate_about(&self.top, s.tilt_deg, pivot);
        paste_over(
            &mut frame,
            &top,
            base_x + i64::from(s.top_x),
            base_y + self.split_scaled - i64::from(top.height()) + i64::from(s.top_y),
        );
        frame
    }
}

/// Unmodified character with a mouth sprite centered on the anchor.
#[derive(Clone, Debug)]
pub struct SpriteRig {
    base: RgbaImage,
    sprites: Vec<(MouthSprite, RgbaImage)>,
    anchor: PixelPoint,
}

impl SpriteRig {
    pub fn prepare(
        img: &RgbaImage,
        geometry: &RegionGeometry,
        layout: CanvasLayout,
        catalog: &SpriteCatalog,
        background: Rgba8,
    ) -> LipsyncResult<Self> {
        let RegionGeometry::Sprite {
            width,
            height,
            anchor,
            sprite_size,
            ..
        } = *geometry
        else {
            return Err(geometry_mismatch("sprite", geometry));
        };

        let size = PixelSize::new(width, height);
        let mut base = blank(layout.canvas_size(size), background);
        let left = i64::from(layout.padding.left);
        let top = i64::from(layout.padding.top);
        paste_over(&mut base, img, left, top);

        let sprites = MouthSprite::ALL
            .iter()
            .map(|&s| {
                let art = image::imageops::resize(
                    catalog.get(s),
                    sprite_size.width.max(1),
                    sprite_size.height.max(1),
                    FilterType::Nearest,
                );
                (s, art)
            })
            .collect();

        Ok(Self {
            base,
            sprites,
            anchor: PixelPoint::new(
                (left + i64::from(anchor.x)) as i32,
                (top + i64::from(anchor.y)) as i32,
            ),
        })
    }

    pub fn compose(&self, sprite: MouthSprite) -> RgbaImage {
        let mut frame = self.base.clone();
        if let Some((_, art)) = self.sprites.iter().find(|(s, _)| *s == sprite) {
            paste_over(
                &mut frame,
                art,
                i64::from(self.anchor.x) - i64::from(art.width() / 2),
                i64::from(self.anchor.y) - i64::from(art.height() / 2),
            );
        }
        frame
    }
}

/// Character with its jaw cut out; the jaw fragment slides down over a dark cavity.
#[derive(Clone, Debug)]
pub struct JawRig {
    rest: RgbaImage,
    open: RgbaImage,
    jaw: RgbaImage,
    jaw_origin: PixelPoint,
    scale: f64,
}

/// Fade the top rows of a fragment in so the seam with the cavity is soft.
pub fn apply_top_ramp(img: &mut RgbaImage, fraction: f64) {
    let ramp = ((f64::from(img.height()) * fraction).round() as u32).min(img.height());
    if ramp == 0 {
        return;
    }
    for y in 0..ramp {
        let k = (f64::from(y) + 0.5) / f64::from(ramp);
        for x in 0..img.width() {
            let px = img.get_pixel_mut(x, y);
            px.0[3] = (f64::from(px.0[3]) * k).round() as u8;
        }
    }
}

impl JawRig {
    pub fn prepare(
        img: &RgbaImage,
        geometry: &RegionGeometry,
        layout: CanvasLayout,
        background: Rgba8,
    ) -> LipsyncResult<Self> {
        let RegionGeometry::Jaw {
            width, height, jaw, ..
        } = *geometry
        else {
            return Err(geometry_mismatch("jaw", geometry));
        };
        let jaw = jaw.clamp_to(width, height);
        if jaw.is_empty() {
            return Err(LipsyncError::validation("jaw cutout is empty"));
        }

        let size = PixelSize::new(width, height);
        let origin = layout.character_origin(size);
        let character = scale(img, layout.scale, FilterType::Triangle);

        let mut rest = blank(layout.canvas_size(size), background);
        paste_over(
            &mut rest,
            &character,
            i64::from(origin.x),
            i64::from(origin.y),
        );

        let mut fragment = scale(&crop(img, jaw), layout.scale, FilterType::Triangle);
        apply_top_ramp(&mut fragment, JAW_RAMP_FRACTION);

        let jaw_origin = PixelPoint::new(
            origin.x + (f64::from(jaw.x) * layout.scale) as i32,
            origin.y + (f64::from(jaw.y) * layout.scale) as i32,
        );
        let mut open = rest.clone();
        fill_rect(
            &mut open,
            PixelRect::new(
                jaw_origin.x,
                jaw_origin.y,
                fragment.width(),
                fragment.height(),
            ),
            CAVITY_COLOR,
        );

        Ok(Self {
            rest,
            open,
            jaw: fragment,
            jaw_origin,
            scale: layout.scale,
        })
    }

    pub fn compose(&self, s: &JawState) -> RgbaImage {
        let shift = (s.offset_px * self.scale).round() as i64;
        if shift == 0 {
            return self.rest.clone();
        }
        let mut frame = self.open.clone();
        paste_over(
            &mut frame,
            &self.jaw,
            i64::from(self.jaw_origin.x),
            i64::from(self.jaw_origin.y) + shift,
        );
        frame
    }
}

/// Prepared rig for any style.
#[derive(Clone, Debug)]
pub enum Rig {
    TwoPart(TwoPartRig),
    Sprite(SpriteRig),
    Jaw(JawRig),
}

impl Rig {
    /// Output frame size.
    pub fn canvas_size(&self) -> PixelSize {
        let img = match self {
            Self::TwoPart(r) => return r.canvas,
            Self::Sprite(r) => &r.base,
            Self::Jaw(r) => &r.rest,
        };
        PixelSize::new(img.width(), img.height())
    }

    /// Compose one frame; `None` means "before the first keyframe" and draws the rest pose.
    pub fn compose(&self, state: Option<&VisualState>) -> LipsyncResult<RgbaImage> {
        match (self, state) {
            (Self::TwoPart(r), None) => Ok(r.compose(&DeformState::REST)),
            (Self::TwoPart(r), Some(VisualState::Deform(s))) => Ok(r.compose(s)),
            (Self::Sprite(r), None) => Ok(r.compose(MouthSprite::SILENCE)),
            (Self::Sprite(r), Some(VisualState::Sprite(s))) => Ok(r.compose(s.sprite)),
            (Self::Jaw(r), None) => Ok(r.compose(&JawState::default())),
            (Self::Jaw(r), Some(VisualState::Jaw(s))) => Ok(r.compose(s)),
            (_, Some(other)) => Err(LipsyncError::render(format!(
                "keyframe state {other:?} does not fit this rig"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/rig.rs"]
mod tests;
