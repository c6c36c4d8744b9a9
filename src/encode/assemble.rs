use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::compose::blend::{Rgba8, WHITE};
use crate::encode::ffmpeg::{EncodeConfig, FfmpegSink};
use crate::encode::mux::{MuxOptions, MuxOutcome, mux_or_copy};
use crate::encode::probe::{FfprobeOptions, MediaInfo, probe};
use crate::foundation::cancel::CancelToken;
use crate::foundation::error::{LipsyncError, LipsyncResult};
use crate::render::{FrameSource, RenderStats, RenderThreading, render_to_sink};

/// File name of the silent intermediate inside the work directory.
pub const INTERMEDIATE_NAME: &str = "video_only.mp4";

#[derive(Clone, Debug)]
pub struct AssembleOptions {
    pub work_dir: PathBuf,
    pub mux: MuxOptions,
    pub threading: RenderThreading,
    pub background: Rgba8,
    pub encode_timeout: Duration,
    /// `ffprobe` settings for reading back the finished output; skipped when `None`.
    pub ffprobe: Option<FfprobeOptions>,
}

impl AssembleOptions {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            mux: MuxOptions::default(),
            threading: RenderThreading::default(),
            background: WHITE,
            encode_timeout: Duration::from_secs(1800),
            ffprobe: Some(FfprobeOptions::default()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssembleOutcome {
    pub output: PathBuf,
    pub frames: u64,
    pub duration_secs: f64,
    /// `false` when the output carries no audio track.
    pub muxed: bool,
    pub warnings: Vec<String>,
    pub stats: RenderStats,
    /// What `ffprobe` reports about the output, when it ran and succeeded.
    pub media: Option<MediaInfo>,
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Render `source` to a silent H.264 intermediate, then mux it with `audio` into `out`.
///
/// A missing or empty intermediate is a render error. A failed mux is reported in
/// [`AssembleOutcome::warnings`] and leaves a video-only output.
#[tracing::instrument(skip_all, fields(out = %out.display(), frames = source.frame_count()))]
pub fn assemble(
    source: &dyn FrameSource,
    audio: &Path,
    out: &Path,
    opts: &AssembleOptions,
    cancel: &CancelToken,
) -> LipsyncResult<AssembleOutcome> {
    let started = Instant::now();
    let intermediate = opts.work_dir.join(INTERMEDIATE_NAME);
    let _guard = TempFileGuard(Some(intermediate.clone()));

    let mut cfg = EncodeConfig::new(&intermediate, source.frame_size(), source.fps());
    cfg.ffmpeg = opts.mux.ffmpeg.clone();
    cfg.timeout = opts.encode_timeout;
    let mut sink = FfmpegSink::new(cfg, opts.background)?;
    let stats = render_to_sink(source, &mut sink, &opts.threading, cancel)?;
    drop(sink);

    let written = std::fs::metadata(&intermediate).map(|m| m.len()).unwrap_or(0);
    if written == 0 {
        return Err(LipsyncError::render(format!(
            "intermediate video '{}' is missing or empty",
            intermediate.display()
        )));
    }

    cancel.check()?;
    let mut warnings = Vec::new();
    let muxed = match mux_or_copy(&intermediate, audio, out, &opts.mux)? {
        MuxOutcome::Muxed => true,
        MuxOutcome::VideoOnly { reason } => {
            warnings.push(format!("audio could not be muxed, output is video-only: {reason}"));
            false
        }
    };

    let fps = source.fps();
    let duration_secs = fps.frames_to_secs(stats.frames_total);
    let media = opts
        .ffprobe
        .as_ref()
        .and_then(|p| inspect_output(out, p, duration_secs, fps.frames_to_secs(1)));
    let outcome = AssembleOutcome {
        output: out.to_path_buf(),
        frames: stats.frames_total,
        duration_secs,
        muxed,
        warnings,
        stats,
        media,
    };
    tracing::info!(
        frames = outcome.frames,
        muxed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "video assembled"
    );
    Ok(outcome)
}

/// Read back the output's media info and log how its duration compares with the rendered clip.
///
/// `-shortest` may trim the video to the audio, so a shorter file is only logged, never an error.
fn inspect_output(
    out: &Path,
    opts: &FfprobeOptions,
    expected: f64,
    frame: f64,
) -> Option<MediaInfo> {
    match probe(out, opts) {
        Ok(info) => {
            if info.duration_secs > expected + frame + 0.1 {
                tracing::warn!(
                    media_secs = info.duration_secs,
                    expected,
                    "output is longer than the rendered clip"
                );
            } else {
                tracing::debug!(media_secs = info.duration_secs, expected, "output media info read");
            }
            Some(info)
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not read the output media info");
            None
        }
    }
}
