use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::foundation::error::{LipsyncError, LipsyncResult};
use crate::foundation::process::run_with_timeout;

/// Extensions the codec tool is asked to convert to WAV.
pub const TRANSCODABLE_EXTENSIONS: &[&str] = &["mp3", "m4a", "ogg", "aac", "mp4"];

#[derive(Clone, Debug)]
pub struct TranscodeOptions {
    pub ffmpeg: PathBuf,
    pub timeout: Duration,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            timeout: Duration::from_secs(120),
        }
    }
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Whether `path` has an audio extension the pipeline accepts.
pub fn is_supported_audio(path: &Path) -> bool {
    match lowercase_extension(path) {
        Some(ext) => ext == "wav" || TRANSCODABLE_EXTENSIONS.contains(&ext.as_str()),
        None => false,
    }
}

/// Return a WAV path for `input`, converting through ffmpeg into `work_dir` when needed.
///
/// WAV inputs are returned unchanged.
#[tracing::instrument(skip_all, fields(input = %input.display()))]
pub fn ensure_wav(input: &Path, work_dir: &Path, opts: &TranscodeOptions) -> LipsyncResult<PathBuf> {
    if !input.is_file() {
        return Err(LipsyncError::input(format!(
            "audio file '{}' does not exist",
            input.display()
        )));
    }

    let ext = lowercase_extension(input).unwrap_or_default();
    if ext == "wav" {
        return Ok(input.to_path_buf());
    }
    if !TRANSCODABLE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(LipsyncError::input(format!(
            "unsupported audio format '{ext}' for '{}'",
            input.display()
        )));
    }

    std::fs::create_dir_all(work_dir).map_err(|e| {
        LipsyncError::transcode(format!(
            "failed to create working directory '{}': {e}",
            work_dir.display()
        ))
    })?;
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    let out = work_dir.join(format!("{stem}.wav"));

    tracing::info!(to = %out.display(), "transcoding audio to wav");
    let mut cmd = Command::new(&opts.ffmpeg);
    cmd.args(["-loglevel", "error", "-y", "-i"])
        .arg(input)
        .args(["-vn", "-acodec", "pcm_s16le"])
        .arg(&out);
    run_with_timeout(&mut cmd, opts.timeout)
        .map_err(|e| LipsyncError::transcode(e.to_string()))?;

    let len = std::fs::metadata(&out).map(|m| m.len()).unwrap_or(0);
    if len == 0 {
        return Err(LipsyncError::transcode(format!(
            "ffmpeg produced no output at '{}'",
            out.display()
        )));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/transcode.rs"]
mod tests;
