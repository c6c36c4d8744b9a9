use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::error::{LipsyncError, LipsyncResult};
use crate::foundation::process::run_with_timeout;

#[derive(Clone, Debug)]
pub struct MuxOptions {
    pub ffmpeg: PathBuf,
    pub timeout: Duration,
}

impl Default for MuxOptions {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            timeout: Duration::from_secs(300),
        }
    }
}

/// How the final output was produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MuxOutcome {
    Muxed,
    /// Muxing failed; the output is the silent intermediate video.
    VideoOnly { reason: String },
}

pub fn mux_command(video: &Path, audio: &Path, out: &Path, ffmpeg: &Path) -> Command {
    let mut cmd = Command::new(ffmpeg);
    cmd.args(["-loglevel", "error", "-i"])
        .arg(video)
        .arg("-i")
        .arg(audio)
        .args([
            "-c:v",
            "libx264",
            "-preset",
            "fast",
            "-crf",
            "23",
            "-c:a",
            "aac",
            "-b:a",
            "128k",
            "-movflags",
            "+faststart",
            "-shortest",
            "-y",
        ])
        .arg(out);
    cmd
}

/// Combine `video` with `audio` into `out` (H.264 + AAC).
#[tracing::instrument(skip_all, fields(out = %out.display()))]
pub fn mux_audio(video: &Path, audio: &Path, out: &Path, opts: &MuxOptions) -> LipsyncResult<()> {
    ensure_parent_dir(out)?;
    run_with_timeout(&mut mux_command(video, audio, out, &opts.ffmpeg), opts.timeout)
        .map_err(|e| LipsyncError::mux(e.to_string()))?;
    let written = std::fs::metadata(out).map(|m| m.len()).unwrap_or(0);
    if written == 0 {
        return Err(LipsyncError::mux(format!(
            "ffmpeg produced no output at '{}'",
            out.display()
        )));
    }
    Ok(())
}

/// [`mux_audio`], falling back to copying the video-only intermediate when muxing fails.
///
/// Only a failed copy is an error.
pub fn mux_or_copy(
    video: &Path,
    audio: &Path,
    out: &Path,
    opts: &MuxOptions,
) -> LipsyncResult<MuxOutcome> {
    match mux_audio(video, audio, out, opts) {
        Ok(()) => Ok(MuxOutcome::Muxed),
        Err(err) => {
            tracing::warn!(error = %err, "mux failed, writing video without audio");
            ensure_parent_dir(out)?;
            std::fs::copy(video, out).map_err(|e| {
                LipsyncError::render(format!(
                    "failed to copy '{}' to '{}': {e}",
                    video.display(),
                    out.display()
                ))
            })?;
            Ok(MuxOutcome::VideoOnly {
                reason: err.to_string(),
            })
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/mux.rs"]
mod tests;
