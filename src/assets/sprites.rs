use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::assets::decode::decode_image;
use crate::audio::event::{EventValue, Viseme};

/// Named mouth sprite artwork.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum MouthSprite {
    Closed,
    Small,
    Medium,
    Wide,
    Round,
    Teeth,
    Special,
}

impl MouthSprite {
    pub const ALL: [MouthSprite; 7] = [
        MouthSprite::Closed,
        MouthSprite::Small,
        MouthSprite::Medium,
        MouthSprite::Wide,
        MouthSprite::Round,
        MouthSprite::Teeth,
        MouthSprite::Special,
    ];

    /// The sprite used for idle / silence.
    pub const SILENCE: MouthSprite = MouthSprite::Closed;

    pub fn for_viseme(v: Viseme) -> Self {
        match v {
            Viseme::A | Viseme::X => Self::Closed,
            Viseme::B => Self::Small,
            Viseme::C => Self::Medium,
            Viseme::D | Viseme::H => Self::Wide,
            Viseme::E => Self::Round,
            Viseme::F => Self::Teeth,
            Viseme::G => Self::Special,
        }
    }

    /// Energy values go through the representative viseme of their bucket.
    pub fn for_value(value: EventValue) -> Self {
        Self::for_viseme(value.viseme())
    }

    /// File stem under the sprites directory.
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Closed => "southparkClosed(M_B_P)",
            Self::Small => "southparkSmall(E_I)",
            Self::Medium => "southparkMedium(E_EH)",
            Self::Wide => "southparkWide(A_AH)",
            Self::Round => "southparkRound(O_OO)",
            Self::Teeth => "southparkTeeth(F_V)",
            Self::Special => "southparkSpecial(L_TH_R)",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn placeholder_color(self) -> Rgba<u8> {
        let rgb = match self {
            Self::Closed => [255, 0, 0],
            Self::Small => [0, 255, 0],
            Self::Medium => [0, 0, 255],
            Self::Wide => [255, 255, 0],
            Self::Round => [255, 0, 255],
            Self::Teeth => [0, 255, 255],
            Self::Special => [128, 128, 128],
        };
        Rgba([rgb[0], rgb[1], rgb[2], 128])
    }
}

pub const PLACEHOLDER_WIDTH: u32 = 60;
pub const PLACEHOLDER_HEIGHT: u32 = 40;

/// Transparent 60x40 tile with a half-transparent colored bar at x 10..=50, y 15..=25.
pub fn placeholder(sprite: MouthSprite) -> RgbaImage {
    let mut img = RgbaImage::new(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT);
    let color = sprite.placeholder_color();
    for y in 15..=25 {
        for x in 10..=50 {
            img.put_pixel(x, y, color);
        }
    }
    img
}

/// All mouth sprites for one job, with placeholders standing in for missing artwork.
#[derive(Clone, Debug)]
pub struct SpriteCatalog {
    images: Vec<RgbaImage>,
}

impl SpriteCatalog {
    /// Load `<dir>/<stem>.png` for every sprite; `None` uses placeholders throughout.
    pub fn load(dir: Option<&Path>) -> Self {
        let images = MouthSprite::ALL
            .iter()
            .map(|&s| match dir {
                Some(dir) => load_one(dir, s),
                None => placeholder(s),
            })
            .collect();
        Self { images }
    }

    pub fn placeholders() -> Self {
        Self::load(None)
    }

    pub fn get(&self, sprite: MouthSprite) -> &RgbaImage {
        &self.images[sprite.index()]
    }
}

fn load_one(dir: &Path, sprite: MouthSprite) -> RgbaImage {
    let path = dir.join(format!("{}.png", sprite.file_stem()));
    let decoded = std::fs::read(&path)
        .map_err(anyhow::Error::from)
        .and_then(|bytes| decode_image(&bytes).map_err(anyhow::Error::from));
    match decoded {
        Ok(img) if img.width() > 0 && img.height() > 0 => img,
        Ok(_) => {
            tracing::warn!(path = %path.display(), "sprite is empty, using placeholder");
            placeholder(sprite)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "sprite unavailable, using placeholder");
            placeholder(sprite)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/sprites.rs"]
mod tests;
