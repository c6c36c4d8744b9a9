//! Frame production: turning a style, its rig and a keyframe track into numbered frames.

pub mod pipeline;

use image::RgbaImage;

use crate::compose::Rig;
use crate::foundation::core::{FrameIndex, Fps, PixelSize};
use crate::foundation::error::{LipsyncError, LipsyncResult};
use crate::keyframes::KeyframeTrack;
use crate::style::AnimationStyle;

pub use pipeline::{
    MIN_DURATION_SECS, RenderStats, RenderThreading, clip_duration, frame_count, render_to_sink,
};

/// Random-access source of equally sized frames.
///
/// Implementations must be pure per index so frames can be rendered on any thread.
pub trait FrameSource: Sync {
    fn frame_size(&self) -> PixelSize;

    fn fps(&self) -> Fps;

    fn frame_count(&self) -> u64;

    fn render_frame(&self, frame: FrameIndex) -> LipsyncResult<RgbaImage>;
}

/// A style's rig driven by a keyframe track.
pub struct AnimationRenderer<'a> {
    style: &'a dyn AnimationStyle,
    rig: &'a Rig,
    track: &'a KeyframeTrack,
    fps: Fps,
    duration_secs: f64,
    frames: u64,
}

impl<'a> AnimationRenderer<'a> {
    pub fn new(
        style: &'a dyn AnimationStyle,
        rig: &'a Rig,
        track: &'a KeyframeTrack,
        fps: Fps,
    ) -> Self {
        let duration_secs = clip_duration(style, track);
        Self {
            style,
            rig,
            track,
            fps,
            duration_secs,
            frames: frame_count(duration_secs, fps),
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }
}

impl FrameSource for AnimationRenderer<'_> {
    fn frame_size(&self) -> PixelSize {
        self.rig.canvas_size()
    }

    fn fps(&self) -> Fps {
        self.fps
    }

    fn frame_count(&self) -> u64 {
        self.frames
    }

    fn render_frame(&self, frame: FrameIndex) -> LipsyncResult<RgbaImage> {
        if frame.0 >= self.frames {
            return Err(LipsyncError::validation(format!(
                "frame {} is past the end of a {}-frame clip",
                frame.0, self.frames
            )));
        }
        self.style.composite(self.rig, self.track, frame, self.fps)
    }
}
