use image::RgbaImage;

use crate::audio::event::{AudioEvent, ExtractMode};
use crate::compose::{CanvasLayout, JawRig, Rig};
use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::LipsyncResult;
use crate::foundation::rng::RandomSource;
use crate::geometry::{RegionGeometry, RegionKind};
use crate::keyframes::{KeyframeTrack, jaw};
use crate::style::{AnimationStyle, RigInputs, StyleKind, composite_at_time, held_tail_duration};

/// Jaw fragment sliding down from a cutout ("nutcracker").
#[derive(Clone, Copy, Debug, Default)]
pub struct SlidingJawStyle;

impl AnimationStyle for SlidingJawStyle {
    fn kind(&self) -> StyleKind {
        StyleKind::SlidingJaw
    }

    fn extract_mode(&self) -> ExtractMode {
        ExtractMode::Amplitude
    }

    fn region_kind(&self) -> RegionKind {
        RegionKind::Jaw
    }

    fn canvas_layout(&self) -> CanvasLayout {
        CanvasLayout::SLIDING_JAW
    }

    fn synthesize(
        &self,
        events: &[AudioEvent],
        geometry: &RegionGeometry,
        _fps: Fps,
        _rng: &mut dyn RandomSource,
    ) -> KeyframeTrack {
        let jaw_height = match geometry {
            RegionGeometry::Jaw { jaw, .. } => jaw.height,
            other => {
                tracing::warn!(kind = ?other.kind(), "sliding jaw without jaw geometry, keeping it closed");
                0
            }
        };
        jaw::synthesize(events, jaw_height)
    }

    fn duration(&self, track: &KeyframeTrack) -> f64 {
        held_tail_duration(track)
    }

    fn prepare(
        &self,
        img: &RgbaImage,
        geometry: &RegionGeometry,
        inputs: RigInputs<'_>,
    ) -> LipsyncResult<Rig> {
        JawRig::prepare(img, geometry, self.canvas_layout(), inputs.background).map(Rig::Jaw)
    }

    fn composite(
        &self,
        rig: &Rig,
        track: &KeyframeTrack,
        frame: FrameIndex,
        fps: Fps,
    ) -> LipsyncResult<RgbaImage> {
        composite_at_time(rig, track, frame, fps)
    }
}
