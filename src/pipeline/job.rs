use std::path::{Path, PathBuf};
use std::time::Instant;

use image::RgbaImage;

use crate::assets::decode::load_character;
use crate::assets::sprites::SpriteCatalog;
use crate::audio::event::AudioEvent;
use crate::audio::extract::extract_with;
use crate::audio::recognizer::{Recognizer, RhubarbRecognizer};
use crate::audio::transcode::is_supported_audio;
use crate::compose::Rig;
use crate::config::LipsyncConfig;
use crate::encode::assemble::{AssembleOptions, assemble};
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::{FrameIndex, Fps, PixelPoint};
use crate::foundation::error::{LipsyncError, LipsyncResult};
use crate::foundation::rng::{Rng64, fold_u128};
use crate::geometry::{Locator, RegionGeometry};
use crate::keyframes::KeyframeTrack;
use crate::pipeline::workdir::WorkDir;
use crate::render::{AnimationRenderer, FrameSource};
use crate::style::{AnimationStyle, RigInputs, StyleKind, create_style};

/// What to animate.
#[derive(Clone, Debug, PartialEq)]
pub struct JobRequest {
    pub image: PathBuf,
    pub audio: PathBuf,
    pub style: StyleKind,
    /// Mouth position for the sprite style, in image pixels.
    pub manual_anchor: Option<PixelPoint>,
    /// Explicit output path; `<output_dir>/talking_head_<id>.mp4` otherwise.
    pub output: Option<PathBuf>,
}

impl JobRequest {
    pub fn new(image: impl Into<PathBuf>, audio: impl Into<PathBuf>, style: StyleKind) -> Self {
        Self {
            image: image.into(),
            audio: audio.into(),
            style,
            manual_anchor: None,
            output: None,
        }
    }
}

/// Result of a finished job.
#[derive(Clone, Debug, PartialEq)]
pub struct JobOutput {
    pub job_id: uuid::Uuid,
    pub output: PathBuf,
    pub style: StyleKind,
    pub events: usize,
    pub keyframes: usize,
    pub frames: u64,
    pub duration_secs: f64,
    pub muxed: bool,
    /// Output duration reported by `ffprobe`, when available.
    pub media_duration_secs: Option<f64>,
    pub warnings: Vec<String>,
}

/// Everything a job computes before frames are drawn.
pub struct PreparedJob {
    pub style: Box<dyn AnimationStyle>,
    pub events: Vec<AudioEvent>,
    pub geometry: RegionGeometry,
    pub track: KeyframeTrack,
    pub rig: Rig,
    pub fps: Fps,
}

impl PreparedJob {
    pub fn renderer(&self) -> AnimationRenderer<'_> {
        AnimationRenderer::new(self.style.as_ref(), &self.rig, &self.track, self.fps)
    }

    pub fn render_frame(&self, frame: FrameIndex) -> LipsyncResult<RgbaImage> {
        self.renderer().render_frame(frame)
    }
}

/// One lip-sync run: unique id, private work directory, inputs and output path.
pub struct AnimationJob {
    id: uuid::Uuid,
    request: JobRequest,
    config: LipsyncConfig,
    work_dir: WorkDir,
    output: PathBuf,
    recognizer: Box<dyn Recognizer>,
    locator: Locator,
}

impl AnimationJob {
    pub fn new(request: JobRequest, config: LipsyncConfig) -> LipsyncResult<Self> {
        config.validate()?;
        if !request.image.is_file() {
            return Err(LipsyncError::input(format!(
                "image file '{}' does not exist",
                request.image.display()
            )));
        }
        if !request.audio.is_file() {
            return Err(LipsyncError::input(format!(
                "audio file '{}' does not exist",
                request.audio.display()
            )));
        }
        if !is_supported_audio(&request.audio) {
            return Err(LipsyncError::input(format!(
                "unsupported audio format for '{}'",
                request.audio.display()
            )));
        }

        let id = uuid::Uuid::new_v4();
        let work_dir = WorkDir::create(config.temp_root().join(format!("lipsynth-{id}")))?;
        let output = request
            .output
            .clone()
            .unwrap_or_else(|| config.output_dir.join(format!("talking_head_{id}.mp4")));
        let recognizer = Box::new(RhubarbRecognizer::new(
            &config.recognizer,
            std::time::Duration::from_secs(config.recognizer_timeout_secs),
        ));

        tracing::info!(job_id = %id, style = %request.style, "job created");
        Ok(Self {
            id,
            request,
            config,
            work_dir,
            output,
            recognizer,
            locator: Locator::default(),
        })
    }

    /// Replace the phoneme recognizer.
    pub fn with_recognizer(mut self, recognizer: Box<dyn Recognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    /// Replace the head/face detectors.
    pub fn with_locator(mut self, locator: Locator) -> Self {
        self.locator = locator;
        self
    }

    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    pub fn work_dir(&self) -> &Path {
        self.work_dir.path()
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Keep the work directory after the job is dropped.
    pub fn keep_work_dir(&mut self) {
        self.work_dir.keep();
    }

    pub fn seed(&self) -> u64 {
        self.config
            .seed
            .unwrap_or_else(|| fold_u128(self.id.as_u128()))
    }

    /// Extract events and locate regions (concurrently), then synthesize keyframes and build
    /// the rig.
    #[tracing::instrument(skip_all, fields(job_id = %self.id))]
    pub fn prepare(&self) -> LipsyncResult<PreparedJob> {
        let style = create_style(self.request.style);
        let fps = self.config.frame_rate()?;
        let extract_opts = self.config.extract_options(self.work_dir.path());
        let mut rng = Rng64::new(self.seed());

        let (events, located) = rayon::join(
            || {
                extract_with(
                    &self.request.audio,
                    style.extract_mode(),
                    &extract_opts,
                    self.recognizer.as_ref(),
                    &mut rng,
                )
            },
            || -> LipsyncResult<(RgbaImage, RegionGeometry)> {
                let img = load_character(&self.request.image)?;
                let geometry = style.locate(&self.locator, &img, self.request.manual_anchor);
                Ok((img, geometry))
            },
        );
        let events = events?;
        let (img, geometry) = located?;

        let track = style.synthesize(&events, &geometry, fps, &mut rng);
        tracing::info!(events = events.len(), keyframes = track.len(), "keyframes synthesized");

        let sprites = match style.kind() {
            StyleKind::Sprite => SpriteCatalog::load(self.config.sprites_dir.as_deref()),
            _ => SpriteCatalog::placeholders(),
        };
        let rig = style.prepare(
            &img,
            &geometry,
            RigInputs {
                sprites: &sprites,
                background: self.config.background,
            },
        )?;

        Ok(PreparedJob {
            style,
            events,
            geometry,
            track,
            rig,
            fps,
        })
    }

    /// Run the whole pipeline and write the output video.
    #[tracing::instrument(skip_all, fields(job_id = %self.id, style = %self.request.style))]
    pub fn run(&self, cancel: &CancelToken) -> LipsyncResult<JobOutput> {
        let started = Instant::now();
        cancel.check()?;
        let prepared = self.prepare()?;
        cancel.check()?;

        let renderer = prepared.renderer();
        let opts = AssembleOptions {
            work_dir: self.work_dir.path().to_path_buf(),
            mux: self.config.mux_options(),
            threading: self.config.render.clone(),
            background: self.config.background,
            encode_timeout: self.config.encode_timeout(),
            ffprobe: Some(self.config.ffprobe_options()),
        };
        let outcome = assemble(&renderer, &self.request.audio, &self.output, &opts, cancel)?;

        tracing::info!(
            output = %outcome.output.display(),
            frames = outcome.frames,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "job finished"
        );
        Ok(JobOutput {
            job_id: self.id,
            output: outcome.output,
            style: self.request.style,
            events: prepared.events.len(),
            keyframes: prepared.track.len(),
            frames: outcome.frames,
            duration_secs: outcome.duration_secs,
            muxed: outcome.muxed,
            media_duration_secs: outcome.media.as_ref().map(|m| m.duration_secs),
            warnings: outcome.warnings,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/job.rs"]
mod tests;
