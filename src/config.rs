//! Job configuration, loaded from JSON and overridable from the command line.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::audio::extract::ExtractOptions;
use crate::audio::transcode::TranscodeOptions;
use crate::compose::blend::{Rgba8, WHITE};
use crate::encode::mux::MuxOptions;
use crate::encode::probe::FfprobeOptions;
use crate::foundation::core::Fps;
use crate::foundation::error::{LipsyncError, LipsyncResult};
use crate::render::RenderThreading;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LipsyncConfig {
    pub fps: u32,
    pub recognizer: PathBuf,
    pub recognizer_timeout_secs: u64,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub transcode_timeout_secs: u64,
    /// Budget for rendering and encoding the intermediate video.
    pub encode_timeout_secs: u64,
    pub mux_timeout_secs: u64,
    pub ffprobe_timeout_secs: u64,
    /// Directory holding the mouth sprite PNGs; placeholders are drawn when unset.
    pub sprites_dir: Option<PathBuf>,
    /// Parent of per-job work directories; the system temp dir when unset.
    pub temp_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Fixed seed for reproducible jitter; derived from the job id when unset.
    pub seed: Option<u64>,
    pub render: RenderThreading,
    /// Canvas color, straight RGBA8. Must be opaque.
    pub background: Rgba8,
}

impl Default for LipsyncConfig {
    fn default() -> Self {
        Self {
            fps: 24,
            recognizer: PathBuf::from("rhubarb"),
            recognizer_timeout_secs: 300,
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            transcode_timeout_secs: 120,
            encode_timeout_secs: 1800,
            mux_timeout_secs: 300,
            ffprobe_timeout_secs: 30,
            sprites_dir: None,
            temp_dir: None,
            output_dir: PathBuf::from("output"),
            seed: None,
            render: RenderThreading::default(),
            background: WHITE,
        }
    }
}

impl LipsyncConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> LipsyncResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| LipsyncError::validation(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> LipsyncResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            LipsyncError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> LipsyncResult<()> {
        if self.fps == 0 {
            return Err(LipsyncError::validation("fps must be > 0"));
        }
        for (name, secs) in [
            ("recognizer_timeout_secs", self.recognizer_timeout_secs),
            ("transcode_timeout_secs", self.transcode_timeout_secs),
            ("encode_timeout_secs", self.encode_timeout_secs),
            ("mux_timeout_secs", self.mux_timeout_secs),
            ("ffprobe_timeout_secs", self.ffprobe_timeout_secs),
        ] {
            if secs == 0 {
                return Err(LipsyncError::validation(format!("{name} must be > 0")));
            }
        }
        if self.render.threads == Some(0) {
            return Err(LipsyncError::validation(
                "render.threads must be >= 1 when set",
            ));
        }
        if self.background[3] != 255 {
            return Err(LipsyncError::validation("background color must be opaque"));
        }
        Ok(())
    }

    pub fn frame_rate(&self) -> LipsyncResult<Fps> {
        Fps::integer(self.fps)
    }

    pub fn temp_root(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn transcode_options(&self) -> TranscodeOptions {
        TranscodeOptions {
            ffmpeg: self.ffmpeg.clone(),
            timeout: Duration::from_secs(self.transcode_timeout_secs),
        }
    }

    pub fn extract_options(&self, work_dir: &Path) -> ExtractOptions {
        ExtractOptions {
            recognizer: self.recognizer.clone(),
            recognizer_timeout: Duration::from_secs(self.recognizer_timeout_secs),
            transcode: self.transcode_options(),
            work_dir: work_dir.to_path_buf(),
        }
    }

    pub fn mux_options(&self) -> MuxOptions {
        MuxOptions {
            ffmpeg: self.ffmpeg.clone(),
            timeout: Duration::from_secs(self.mux_timeout_secs),
        }
    }

    pub fn ffprobe_options(&self) -> FfprobeOptions {
        FfprobeOptions {
            ffprobe: self.ffprobe.clone(),
            timeout: Duration::from_secs(self.ffprobe_timeout_secs),
        }
    }

    pub fn encode_timeout(&self) -> Duration {
        Duration::from_secs(self.encode_timeout_secs)
    }
}
