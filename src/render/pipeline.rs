use rayon::prelude::*;

use image::RgbaImage;

use crate::encode::sink::FrameSink;
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::{LipsyncError, LipsyncResult};
use crate::keyframes::KeyframeTrack;
use crate::render::FrameSource;
use crate::style::AnimationStyle;

/// Shortest clip ever produced, in seconds.
pub const MIN_DURATION_SECS: f64 = 1.0;

/// The style's duration for `track`, never shorter than [`MIN_DURATION_SECS`].
pub fn clip_duration(style: &dyn AnimationStyle, track: &KeyframeTrack) -> f64 {
    let d = style.duration(track);
    if d.is_finite() {
        d.max(MIN_DURATION_SECS)
    } else {
        MIN_DURATION_SECS
    }
}

/// `max(1, floor(duration * fps))`.
pub fn frame_count(duration_secs: f64, fps: Fps) -> u64 {
    fps.secs_to_frames_floor(duration_secs).max(1)
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderThreading {
    pub parallel: bool,
    pub chunk_size: usize,
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: true,
            chunk_size: 64,
            threads: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub frames_total: u64,
    pub chunks: u64,
}

/// Render every frame of `source` into `sink` in index order, then finish the sink.
///
/// Frames are produced a chunk at a time (in parallel when enabled); `cancel` is checked before
/// each chunk.
#[tracing::instrument(skip_all, fields(frames = source.frame_count(), parallel = threading.parallel))]
pub fn render_to_sink(
    source: &dyn FrameSource,
    sink: &mut dyn FrameSink,
    threading: &RenderThreading,
    cancel: &CancelToken,
) -> LipsyncResult<RenderStats> {
    let total = source.frame_count();
    if total == 0 {
        return Err(LipsyncError::validation("nothing to render: zero frames"));
    }

    let chunk_size = normalized_chunk_size(threading.chunk_size);
    let pool = if threading.parallel {
        Some(build_thread_pool(threading.threads)?)
    } else {
        None
    };

    let mut stats = RenderStats::default();
    let mut chunk_start = 0u64;
    while chunk_start < total {
        cancel.check()?;
        let chunk_end = (chunk_start + chunk_size).min(total);
        let frames = match &pool {
            Some(pool) => render_chunk_parallel(source, chunk_start, chunk_end, pool)?,
            None => render_chunk_sequential(source, chunk_start, chunk_end)?,
        };
        for frame in &frames {
            sink.push_frame(frame)?;
        }
        stats.frames_total += frames.len() as u64;
        stats.chunks += 1;
        tracing::debug!(chunk_start, chunk_end, "chunk rendered");
        chunk_start = chunk_end;
    }

    sink.finish()?;
    tracing::info!(frames = stats.frames_total, chunks = stats.chunks, "frames rendered");
    Ok(stats)
}

fn render_chunk_sequential(
    source: &dyn FrameSource,
    start: u64,
    end: u64,
) -> LipsyncResult<Vec<RgbaImage>> {
    (start..end)
        .map(|f| source.render_frame(FrameIndex(f)))
        .collect()
}

fn render_chunk_parallel(
    source: &dyn FrameSource,
    start: u64,
    end: u64,
    pool: &rayon::ThreadPool,
) -> LipsyncResult<Vec<RgbaImage>> {
    // Indexed collect keeps frame order regardless of completion order.
    pool.install(|| {
        (start..end)
            .into_par_iter()
            .map(|f| source.render_frame(FrameIndex(f)))
            .collect::<Vec<_>>()
    })
    .into_iter()
    .collect()
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> LipsyncResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(LipsyncError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| LipsyncError::render(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
