use image::RgbaImage;

use crate::audio::event::{AudioEvent, ExtractMode};
use crate::compose::{CanvasLayout, Rig, SpriteRig};
use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::LipsyncResult;
use crate::foundation::rng::RandomSource;
use crate::geometry::{RegionGeometry, RegionKind};
use crate::keyframes::{KeyframeTrack, VisualState, sprite};
use crate::style::{AnimationStyle, EMPTY_DURATION_SECS, RigInputs, StyleKind};

/// Mouth sprites pasted over the unmodified character.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpriteStyle;

impl AnimationStyle for SpriteStyle {
    fn kind(&self) -> StyleKind {
        StyleKind::Sprite
    }

    fn extract_mode(&self) -> ExtractMode {
        ExtractMode::Phoneme
    }

    fn region_kind(&self) -> RegionKind {
        RegionKind::Sprite
    }

    fn canvas_layout(&self) -> CanvasLayout {
        CanvasLayout::SPRITE
    }

    fn synthesize(
        &self,
        events: &[AudioEvent],
        _geometry: &RegionGeometry,
        fps: Fps,
        _rng: &mut dyn RandomSource,
    ) -> KeyframeTrack {
        sprite::synthesize(events, fps)
    }

    fn duration(&self, track: &KeyframeTrack) -> f64 {
        track.sprite_end_secs().unwrap_or(EMPTY_DURATION_SECS)
    }

    fn prepare(
        &self,
        img: &RgbaImage,
        geometry: &RegionGeometry,
        inputs: RigInputs<'_>,
    ) -> LipsyncResult<Rig> {
        SpriteRig::prepare(
            img,
            geometry,
            self.canvas_layout(),
            inputs.sprites,
            inputs.background,
        )
        .map(Rig::Sprite)
    }

    /// Frames outside every sprite window show the silence sprite.
    fn composite(
        &self,
        rig: &Rig,
        track: &KeyframeTrack,
        frame: FrameIndex,
        _fps: Fps,
    ) -> LipsyncResult<RgbaImage> {
        let state = track.sprite_at_frame(frame.0).copied().map(VisualState::Sprite);
        rig.compose(state.as_ref())
    }
}
