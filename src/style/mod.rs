//! Animation styles.
//!
//! A style decides which events to extract, which regions to locate, how events become keyframes,
//! how long the clip runs and how a keyframe is drawn. [`create_style`] is the only place that
//! knows the concrete types.

pub mod jaw;
pub mod sprite;
pub mod two_part;

use std::fmt;
use std::str::FromStr;

use image::RgbaImage;

use crate::assets::sprites::SpriteCatalog;
use crate::audio::event::{AudioEvent, ExtractMode};
use crate::compose::{CanvasLayout, Rgba8, Rig};
use crate::foundation::core::{FrameIndex, Fps, PixelPoint};
use crate::foundation::error::{LipsyncError, LipsyncResult};
use crate::foundation::rng::RandomSource;
use crate::geometry::{Locator, RegionGeometry, RegionKind};
use crate::keyframes::KeyframeTrack;

pub use jaw::SlidingJawStyle;
pub use sprite::SpriteStyle;
pub use two_part::TwoPartStyle;

/// Hold after the last keyframe for the deformation styles.
pub const TAIL_SECS: f64 = 0.5;
/// Clip length when there is nothing to animate.
pub const EMPTY_DURATION_SECS: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleKind {
    #[serde(alias = "canadian")]
    TwoPart,
    TwoPartAmplitude,
    #[serde(alias = "standard")]
    Sprite,
    #[serde(alias = "nutcracker")]
    SlidingJaw,
}

impl StyleKind {
    pub const ALL: [StyleKind; 4] = [
        StyleKind::TwoPart,
        StyleKind::TwoPartAmplitude,
        StyleKind::Sprite,
        StyleKind::SlidingJaw,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::TwoPart => "two-part",
            Self::TwoPartAmplitude => "two-part-amplitude",
            Self::Sprite => "sprite",
            Self::SlidingJaw => "sliding-jaw",
        }
    }
}

impl fmt::Display for StyleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StyleKind {
    type Err = LipsyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace('_', "-");
        match norm.as_str() {
            "two-part" | "canadian" => Ok(Self::TwoPart),
            "two-part-amplitude" => Ok(Self::TwoPartAmplitude),
            "sprite" | "standard" => Ok(Self::Sprite),
            "sliding-jaw" | "nutcracker" => Ok(Self::SlidingJaw),
            _ => Err(LipsyncError::validation(format!(
                "unknown style '{s}' (expected one of: two-part, two-part-amplitude, sprite, sliding-jaw)"
            ))),
        }
    }
}

/// Shared inputs for building a rig.
#[derive(Clone, Copy, Debug)]
pub struct RigInputs<'a> {
    pub sprites: &'a SpriteCatalog,
    pub background: Rgba8,
}

pub trait AnimationStyle: Send + Sync {
    fn kind(&self) -> StyleKind;

    fn extract_mode(&self) -> ExtractMode;

    fn region_kind(&self) -> RegionKind;

    fn canvas_layout(&self) -> CanvasLayout;

    fn locate(
        &self,
        locator: &Locator,
        img: &RgbaImage,
        manual_anchor: Option<PixelPoint>,
    ) -> RegionGeometry {
        locator.locate(img, self.region_kind(), manual_anchor)
    }

    fn synthesize(
        &self,
        events: &[AudioEvent],
        geometry: &RegionGeometry,
        fps: Fps,
        rng: &mut dyn RandomSource,
    ) -> KeyframeTrack;

    /// Clip length in seconds, before the one-second minimum is applied.
    fn duration(&self, track: &KeyframeTrack) -> f64;

    fn prepare(
        &self,
        img: &RgbaImage,
        geometry: &RegionGeometry,
        inputs: RigInputs<'_>,
    ) -> LipsyncResult<Rig>;

    /// Draw frame `frame` from the held keyframe state.
    fn composite(
        &self,
        rig: &Rig,
        track: &KeyframeTrack,
        frame: FrameIndex,
        fps: Fps,
    ) -> LipsyncResult<RgbaImage>;
}

/// `last keyframe + 0.5 s`, or one second when there are none.
pub(crate) fn held_tail_duration(track: &KeyframeTrack) -> f64 {
    track
        .last_time()
        .map_or(EMPTY_DURATION_SECS, |t| t + TAIL_SECS)
}

/// Time-sampled composite shared by the deformation styles.
pub(crate) fn composite_at_time(
    rig: &Rig,
    track: &KeyframeTrack,
    frame: FrameIndex,
    fps: Fps,
) -> LipsyncResult<RgbaImage> {
    let t = fps.frames_to_secs(frame.0);
    rig.compose(track.active_at(t).map(|k| &k.state))
}

pub fn create_style(kind: StyleKind) -> Box<dyn AnimationStyle> {
    match kind {
        StyleKind::TwoPart => Box::new(TwoPartStyle::visemes()),
        StyleKind::TwoPartAmplitude => Box::new(TwoPartStyle::amplitude()),
        StyleKind::Sprite => Box::new(SpriteStyle),
        StyleKind::SlidingJaw => Box::new(SlidingJawStyle),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/mod.rs"]
mod tests;
