//! Render-side assembly of loaded meshes.
//!
//! The graphics device and the file/network layer stay outside this crate:
//! they are reached through [`GraphicsContext`] and [`Fetch`].

pub mod fetch;
pub mod gfx;
pub mod headless;
pub mod loader;
pub mod texture_cache;

pub use fetch::Fetch;
pub use gfx::{GraphicsContext, PLACEHOLDER_RGBA, TextureSource};
pub use headless::HeadlessContext;
pub use loader::{LoadOptions, LoadedMesh, LoadedMeshFor, MeshLoader, MeshPart, SuppliedAttributes};
pub use texture_cache::{TextureCache, TextureKey, TextureUploads, UploadReport};
