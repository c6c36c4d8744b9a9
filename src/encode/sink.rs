use image::RgbaImage;

use crate::foundation::core::PixelSize;
use crate::foundation::error::{LipsyncError, LipsyncResult};

/// Ordered consumer of rendered frames.
pub trait FrameSink {
    /// Accept the next frame; frames arrive in strict index order.
    fn push_frame(&mut self, frame: &RgbaImage) -> LipsyncResult<()>;

    /// Flush and close. No frames may be pushed afterwards.
    fn finish(&mut self) -> LipsyncResult<()>;
}

pub(crate) fn check_frame_size(frame: &RgbaImage, expected: PixelSize) -> LipsyncResult<()> {
    if frame.dimensions() != (expected.width, expected.height) {
        return Err(LipsyncError::render(format!(
            "frame size mismatch: got {}x{}, expected {}x{}",
            frame.width(),
            frame.height(),
            expected.width,
            expected.height
        )));
    }
    Ok(())
}

/// Collects frames in memory; used for previews and tests.
#[derive(Clone, Debug)]
pub struct InMemorySink {
    size: PixelSize,
    frames: Vec<RgbaImage>,
    finished: bool,
}

impl InMemorySink {
    pub fn new(size: PixelSize) -> Self {
        Self {
            size,
            frames: Vec::new(),
            finished: false,
        }
    }

    pub fn frames(&self) -> &[RgbaImage] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<RgbaImage> {
        self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn push_frame(&mut self, frame: &RgbaImage) -> LipsyncResult<()> {
        if self.finished {
            return Err(LipsyncError::render("frame pushed after finish"));
        }
        check_frame_size(frame, self.size)?;
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> LipsyncResult<()> {
        self.finished = true;
        Ok(())
    }
}
