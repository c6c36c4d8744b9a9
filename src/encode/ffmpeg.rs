//! Raw RGBA frames piped into the system `ffmpeg` binary.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use image::RgbaImage;

use crate::compose::blend::Rgba8;
use crate::encode::sink::{FrameSink, check_frame_size};
use crate::foundation::core::{Fps, PixelSize};
use crate::foundation::error::{LipsyncError, LipsyncResult};
use crate::foundation::process::{
    Drain, POLL_INTERVAL, ProcessError, join_drain, spawn_drain, wait_with_timeout,
};

/// Frames buffered between the renderer and the stdin writer thread.
const QUEUED_FRAMES: usize = 2;

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    pub out_path: PathBuf,
    pub overwrite: bool,
    pub ffmpeg: PathBuf,
    /// Budget for the whole encode, from spawn until `ffmpeg` exits.
    pub timeout: Duration,
}

impl EncodeConfig {
    pub fn new(out_path: impl Into<PathBuf>, size: PixelSize, fps: Fps) -> Self {
        Self {
            width: size.width,
            height: size.height,
            fps,
            out_path: out_path.into(),
            overwrite: true,
            ffmpeg: PathBuf::from("ffmpeg"),
            timeout: Duration::from_secs(1800),
        }
    }

    pub fn validate(&self) -> LipsyncResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(LipsyncError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(LipsyncError::validation(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }

    fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }
}

pub fn ensure_parent_dir(path: &Path) -> LipsyncResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Streams frames into `ffmpeg` as `libx264`/`yuv420p` without audio.
///
/// A writer thread owns the child's stdin, so a stalled encoder can't block the caller past
/// [`EncodeConfig::timeout`].
pub struct FfmpegSink {
    cfg: EncodeConfig,
    background: Rgba8,
    program: String,
    deadline: Instant,
    child: Option<Child>,
    frames: Option<SyncSender<Vec<u8>>>,
    writer: Option<JoinHandle<std::io::Result<()>>>,
    stderr: Option<Drain>,
}

impl FfmpegSink {
    pub fn new(cfg: EncodeConfig, background: Rgba8) -> LipsyncResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(LipsyncError::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        let mut cmd = Command::new(&cfg.ffmpeg);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if cfg.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&cfg.out_path);

        tracing::debug!(out = %cfg.out_path.display(), width = cfg.width, height = cfg.height, timeout = ?cfg.timeout, "starting encoder");
        let mut child = cmd.spawn().map_err(|e| {
            LipsyncError::render(format!(
                "failed to spawn '{}' (is it installed and on PATH?): {e}",
                cfg.ffmpeg.display()
            ))
        })?;
        let deadline = Instant::now() + cfg.timeout;
        let Some(mut stdin) = child.stdin.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(LipsyncError::render("failed to open ffmpeg stdin"));
        };
        let stderr = child.stderr.take().map(spawn_drain);

        let (tx, rx) = mpsc::sync_channel::<Vec<u8>>(QUEUED_FRAMES);
        let writer = std::thread::spawn(move || -> std::io::Result<()> {
            for frame in rx {
                stdin.write_all(&frame)?;
            }
            Ok(())
        });

        Ok(Self {
            program: cfg.ffmpeg.display().to_string(),
            cfg,
            background,
            deadline,
            child: Some(child),
            frames: Some(tx),
            writer: Some(writer),
            stderr,
        })
    }

    pub fn out_path(&self) -> &Path {
        &self.cfg.out_path
    }

    fn timed_out(&mut self) -> LipsyncError {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        tracing::warn!(program = %self.program, timeout = ?self.cfg.timeout, "encoder timed out and was killed");
        LipsyncError::render(format!(
            "ffmpeg encoder timed out after {:?}",
            self.cfg.timeout
        ))
    }

    fn writer_error(&mut self) -> Option<LipsyncError> {
        let handle = self.writer.take()?;
        match handle.join() {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(LipsyncError::render(format!(
                "failed to write frame to ffmpeg stdin: {e}"
            ))),
            Err(_) => Some(LipsyncError::render("ffmpeg stdin writer panicked")),
        }
    }
}

impl FrameSink for FfmpegSink {
    fn push_frame(&mut self, frame: &RgbaImage) -> LipsyncResult<()> {
        check_frame_size(frame, self.cfg.size())?;
        let mut pending = vec![0u8; frame.as_raw().len()];
        flatten_to_opaque_rgba8(&mut pending, frame.as_raw(), self.background)?;

        loop {
            let Some(tx) = self.frames.as_ref() else {
                return Err(LipsyncError::render("ffmpeg encoder is already finalized"));
            };
            match tx.try_send(pending) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(back)) => {
                    if Instant::now() >= self.deadline {
                        self.frames = None;
                        return Err(self.timed_out());
                    }
                    pending = back;
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(TrySendError::Disconnected(_)) => {
                    self.frames = None;
                    return Err(self
                        .writer_error()
                        .unwrap_or_else(|| LipsyncError::render("ffmpeg stopped accepting frames")));
                }
            }
        }
    }

    fn finish(&mut self) -> LipsyncResult<()> {
        // Closing the channel lets the writer flush and close stdin.
        drop(self.frames.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        let remaining = self.deadline.saturating_duration_since(Instant::now());
        let status = match wait_with_timeout(&mut child, &self.program, remaining) {
            Ok(status) => status,
            Err(ProcessError::TimedOut { .. }) => return Err(self.timed_out()),
            Err(e) => return Err(LipsyncError::render(e.to_string())),
        };
        let write_err = self.writer_error();
        let stderr = join_drain(self.stderr.take());

        if !status.success() {
            return Err(LipsyncError::render(format!(
                "ffmpeg exited with status {status}: {}",
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        match write_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        drop(self.frames.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Flatten straight-alpha RGBA8 over an opaque background color.
pub fn flatten_to_opaque_rgba8(dst: &mut [u8], src: &[u8], bg: Rgba8) -> LipsyncResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(LipsyncError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for i in 0..3 {
            let c = mul_div255(u16::from(s[i]), a) + mul_div255(u16::from(bg[i]), inv);
            d[i] = c.min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}
