//! Card image loading.
//!
//! Decodes a diary photo from disk and downscales it to texture size.
//! Runs on worker threads; a failure is logged by the caller and leaves the
//! card in its untextured state, it never aborts the rest of the display set.

use std::path::Path;

use log::debug;
use thiserror::Error;

use super::pixmap::Pixmap;

/// Longest edge of a card texture after downscale.
pub const MAX_TEXTURE_EDGE: u32 = 512;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open image {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Load and downscale one card image.
pub fn load_card_image(path: &Path) -> Result<Pixmap, LoadError> {
    debug!("Loading card image: {}", path.display());

    // Surface missing files as I/O errors rather than decode noise.
    let bytes = std::fs::read(path).map_err(|source| LoadError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let img = image::load_from_memory(&bytes).map_err(|source| LoadError::Decode {
        path: path.display().to_string(),
        source,
    })?;

    let img = if img.width() > MAX_TEXTURE_EDGE || img.height() > MAX_TEXTURE_EDGE {
        img.thumbnail(MAX_TEXTURE_EDGE, MAX_TEXTURE_EDGE)
    } else {
        img
    };

    let width = img.width() as usize;
    let height = img.height() as usize;
    let pixels = img.to_rgba8().into_raw();
    Ok(Pixmap::from_rgba8(pixels, width, height))
}
