//! Terrain colour: the packed-HSL palette and the blend engine.

pub mod blend;
pub mod palette;

pub use blend::{BlendEngine, BlendedPlane, Hsl, OverlayPaint, TilePaint};
pub use palette::{adjust_lightness, pack_hsl, ColorPalette};
