use crate::foundation::core::{PixelPoint, PixelSize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Padding {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Padding {
    pub const fn uniform(px: u32) -> Self {
        Self {
            top: px,
            bottom: px,
            left: px,
            right: px,
        }
    }
}

/// Canvas padding around the character and the scale applied to the character's parts.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CanvasLayout {
    pub padding: Padding,
    pub scale: f64,
}

impl CanvasLayout {
    pub const TWO_PART: CanvasLayout = CanvasLayout {
        padding: Padding {
            top: 120,
            bottom: 60,
            left: 60,
            right: 60,
        },
        scale: 0.7,
    };

    pub const SPRITE: CanvasLayout = CanvasLayout {
        padding: Padding::uniform(40),
        scale: 1.0,
    };

    pub const SLIDING_JAW: CanvasLayout = CanvasLayout {
        padding: Padding {
            top: 40,
            bottom: 80,
            left: 40,
            right: 40,
        },
        scale: 0.85,
    };

    /// Character size plus padding, rounded up to even dimensions for yuv420p.
    pub fn canvas_size(&self, character: PixelSize) -> PixelSize {
        let w = character.width + self.padding.left + self.padding.right;
        let h = character.height + self.padding.top + self.padding.bottom;
        PixelSize::new(w + w % 2, h + h % 2)
    }

    /// Length of `px` after scaling, truncated like the fragment resize.
    pub fn scaled(&self, px: u32) -> u32 {
        ((f64::from(px) * self.scale) as u32).max(1)
    }

    /// Top-left of the scaled character: horizontally centered, below the top padding.
    pub fn character_origin(&self, character: PixelSize) -> PixelPoint {
        let canvas = self.canvas_size(character);
        let char_w = self.scaled(character.width);
        PixelPoint::new(
            (i64::from(canvas.width) - i64::from(char_w)).div_euclid(2) as i32,
            self.padding.top as i32,
        )
    }
}
