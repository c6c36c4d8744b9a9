use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::foundation::error::{LipsyncError, LipsyncResult};
use crate::foundation::process::run_with_timeout;

#[derive(Clone, Debug)]
pub struct FfprobeOptions {
    pub ffprobe: PathBuf,
    pub timeout: Duration,
}

impl Default for FfprobeOptions {
    fn default() -> Self {
        Self {
            ffprobe: PathBuf::from("ffprobe"),
            timeout: Duration::from_secs(30),
        }
    }
}

/// What `ffprobe` reports about a rendered file.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaInfo {
    pub duration_secs: f64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub has_video: bool,
    pub has_audio: bool,
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Parse `ffprobe -print_format json -show_streams -show_format` output.
pub fn parse_probe_json(json: &[u8]) -> LipsyncResult<MediaInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| LipsyncError::input(format!("ffprobe json parse failed: {e}")))?;
    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| LipsyncError::input("ffprobe reported no duration"))?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));
    Ok(MediaInfo {
        duration_secs,
        width: video.and_then(|s| s.width),
        height: video.and_then(|s| s.height),
        has_video: video.is_some(),
        has_audio: parsed
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio")),
    })
}

pub fn probe(path: &Path, opts: &FfprobeOptions) -> LipsyncResult<MediaInfo> {
    let mut cmd = Command::new(&opts.ffprobe);
    cmd.args([
        "-v",
        "error",
        "-print_format",
        "json",
        "-show_streams",
        "-show_format",
    ])
    .arg(path);
    let out = run_with_timeout(&mut cmd, opts.timeout).map_err(|e| {
        LipsyncError::input(format!("ffprobe failed for '{}': {e}", path.display()))
    })?;
    parse_probe_json(&out.stdout)
}

/// Container duration in seconds.
pub fn probe_duration(path: &Path, opts: &FfprobeOptions) -> LipsyncResult<f64> {
    probe(path, opts).map(|info| info.duration_secs)
}
