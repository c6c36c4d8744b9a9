use image::RgbaImage;

use crate::audio::event::{AudioEvent, ExtractMode};
use crate::compose::{CanvasLayout, Rig, TwoPartRig};
use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::LipsyncResult;
use crate::foundation::rng::RandomSource;
use crate::geometry::{RegionGeometry, RegionKind};
use crate::keyframes::{KeyframeTrack, deform};
use crate::style::{AnimationStyle, RigInputs, StyleKind, composite_at_time, held_tail_duration};

/// Head split in two; driven by visemes or by the amplitude envelope.
#[derive(Clone, Copy, Debug)]
pub struct TwoPartStyle {
    amplitude: bool,
}

impl TwoPartStyle {
    pub fn visemes() -> Self {
        Self { amplitude: false }
    }

    pub fn amplitude() -> Self {
        Self { amplitude: true }
    }
}

impl AnimationStyle for TwoPartStyle {
    fn kind(&self) -> StyleKind {
        if self.amplitude {
            StyleKind::TwoPartAmplitude
        } else {
            StyleKind::TwoPart
        }
    }

    fn extract_mode(&self) -> ExtractMode {
        if self.amplitude {
            ExtractMode::Amplitude
        } else {
            ExtractMode::Phoneme
        }
    }

    fn region_kind(&self) -> RegionKind {
        RegionKind::Split
    }

    fn canvas_layout(&self) -> CanvasLayout {
        CanvasLayout::TWO_PART
    }

    fn synthesize(
        &self,
        events: &[AudioEvent],
        _geometry: &RegionGeometry,
        _fps: Fps,
        rng: &mut dyn RandomSource,
    ) -> KeyframeTrack {
        if self.amplitude {
            deform::synthesize_amplitude(events)
        } else {
            deform::synthesize_visemes(events, rng)
        }
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
        TwoPartRig::prepare(img, geometry, self.canvas_layout(), inputs.background).map(Rig::TwoPart)
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
