use std::path::Path;

use anyhow::Context;
use image::RgbaImage;

use crate::foundation::error::{LipsyncError, LipsyncResult};

/// Alpha values at or below this are treated as background.
pub const ALPHA_FOREGROUND_THRESHOLD: u8 = 50;

/// Decode PNG/JPEG bytes into straight-alpha RGBA8.
pub fn decode_image(bytes: &[u8]) -> LipsyncResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(dyn_img.to_rgba8())
}

/// Load the character portrait. Any read or decode failure is an input error.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_character(path: &Path) -> LipsyncResult<RgbaImage> {
    let bytes = std::fs::read(path).map_err(|e| {
        LipsyncError::input(format!("failed to read image '{}': {e}", path.display()))
    })?;
    let img = decode_image(&bytes).map_err(|e| {
        LipsyncError::input(format!("failed to decode image '{}': {e:#}", path.display()))
    })?;
    if img.width() == 0 || img.height() == 0 {
        return Err(LipsyncError::input(format!(
            "image '{}' has zero size",
            path.display()
        )));
    }
    tracing::debug!(width = img.width(), height = img.height(), "loaded character");
    Ok(img)
}

/// `true` when some pixel is transparent enough to count as background.
pub fn has_meaningful_alpha(img: &RgbaImage) -> bool {
    img.pixels().any(|p| p.0[3] <= ALPHA_FOREGROUND_THRESHOLD)
}
