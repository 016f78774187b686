//! Boundary capability for reading source text and images.

use std::path::Path;

use asset::TextureData;
use corelib::FetchError;

/// Asynchronous access to model files. Implementations decide what a path
/// means (filesystem, archive, network).
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn fetch_text(&self, path: &Path) -> Result<String, FetchError>;

    /// Fetch and decode an image into RGBA8 pixels.
    async fn fetch_image(&self, path: &Path) -> Result<TextureData, FetchError>;
}
