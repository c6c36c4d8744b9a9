//! lipsynth turns one character image and one audio clip into a lip-synced MP4.
//!
//! The pipeline for a job:
//!
//! - extract time-aligned mouth events from the audio ([`audio`])
//! - locate the head, mouth or jaw region in the image ([`geometry`])
//! - turn events into held keyframes for the chosen [`StyleKind`] ([`keyframes`], [`style`])
//! - composite frames on the CPU ([`compose`], [`render`]) and encode them with `ffmpeg`
//!   ([`encode`])
//!
//! [`AnimationJob`] runs all of it; the stages are public for tools that need only a part.
#![forbid(unsafe_code)]

mod foundation;

pub mod assets;
pub mod audio;
pub mod compose;
pub mod config;
pub mod encode;
pub mod geometry;
pub mod keyframes;
pub mod pipeline;
pub mod render;
pub mod style;

pub use crate::foundation::cancel::CancelToken;
pub use crate::foundation::core::{
    Affine, FrameIndex, Fps, PixelPoint, PixelRect, PixelSize, Point, Vec2,
};
pub use crate::foundation::error::{LipsyncError, LipsyncResult};
pub use crate::foundation::process::{ProcessError, is_tool_available};
pub use crate::foundation::rng::{RandomSource, Rng64};

pub use crate::audio::{AudioEvent, EventValue, ExtractMode, Viseme};
pub use crate::config::LipsyncConfig;
pub use crate::geometry::{RegionGeometry, RegionKind};
pub use crate::keyframes::{Keyframe, KeyframeTrack, VisualState};
pub use crate::pipeline::{AnimationJob, JobOutput, JobRequest, PreparedJob};
pub use crate::render::{AnimationRenderer, FrameSource};
pub use crate::style::{AnimationStyle, StyleKind, create_style};
