//! Boundary capabilities of the graphics layer that owns GPU objects.

use asset::{TextureData, VertexAttributes};

/// Color shown by a file texture until its image arrives.
pub const PLACEHOLDER_RGBA: [u8; 4] = [128, 192, 255, 255];

/// Initial contents of a new texture.
#[derive(Clone, Debug, PartialEq)]
pub enum TextureSource {
    Pixels(TextureData),
    Solid([u8; 4]),
}

/// Texture and vertex-buffer allocation. Handles are returned synchronously;
/// texture content may be replaced later through [`upload_texture`].
///
/// [`upload_texture`]: GraphicsContext::upload_texture
pub trait GraphicsContext {
    type Texture: Clone;
    type Buffers;

    fn create_texture(&self, source: TextureSource) -> Self::Texture;

    /// Replace the content of an existing texture.
    fn upload_texture(&self, texture: &Self::Texture, pixels: TextureData);

    /// Called once per geometry with its finished attribute set.
    fn create_vertex_buffers(&self, attributes: &VertexAttributes) -> Self::Buffers;
}
