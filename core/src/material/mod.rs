//! Material and texture data extracted from an avatar asset.
//!
//! - [`Material`] - alpha mode, sidedness, base color and texture slots
//! - [`AlphaMode`] - opaque, mask with cutoff, blend
//! - [`Texture`] - still-encoded image bytes for a texture slot

mod types;

pub use types::{AlphaMode, Material, Texture};
