//! Frame compositing: canvas layout, pixel blending, and the per-style rigs.

pub mod blend;
pub mod layout;
pub mod rig;
pub mod transform;

pub use blend::{Rgba8, WHITE};
pub use layout::{CanvasLayout, Padding};
pub use rig::{JawRig, Rig, SpriteRig, TwoPartRig};
