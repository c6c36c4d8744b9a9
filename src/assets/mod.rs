pub mod decode;
pub mod sprites;

pub use decode::{decode_image, has_meaningful_alpha, load_character};
pub use sprites::{MouthSprite, SpriteCatalog};
