//! Rendering: CPU pixmaps, label rasterization, image loading, GL quads.

pub mod loader;
pub mod pixmap;
pub mod renderer;
pub mod shaders;
pub mod text;

pub use pixmap::Pixmap;
pub use renderer::{CardRenderer, QuadDraw, ScenePlan};
