//! Texture handles shared by resolved path, plus the image uploads that are
//! still owed to file textures.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use asset::{BuiltinTexture, TextureRef};
use futures::future::join_all;
use parking_lot::Mutex;

use crate::{
    fetch::Fetch,
    gfx::{GraphicsContext, PLACEHOLDER_RGBA, TextureSource},
};

/// What a cached handle stands for. File textures are keyed by the path they
/// will be fetched from, so equal MTL filenames in different directories
/// stay distinct.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureKey {
    Builtin(BuiltinTexture),
    File(PathBuf),
}

impl TextureKey {
    /// Key for a material's texture slot, resolving file names against `base`.
    pub fn resolve(texture: TextureRef, base: &Path) -> Self {
        match texture {
            TextureRef::Builtin(builtin) => Self::Builtin(builtin),
            TextureRef::File(name) => Self::File(base.join(name)),
        }
    }
}

/// Texture key to handle. At most one handle is ever created per key,
/// however many materials reference it.
pub struct TextureCache<T> {
    entries: Mutex<HashMap<TextureKey, T>>,
}

impl<T: Clone> TextureCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached handle for `key`, calling `create` on first use.
    /// The flag is `true` when this call created it.
    pub fn get_or_create(&self, key: &TextureKey, create: impl FnOnce() -> T) -> (T, bool) {
        let mut entries = self.entries.lock();
        if let Some(handle) = entries.get(key) {
            return (handle.clone(), false);
        }
        let handle = create();
        entries.insert(key.clone(), handle.clone());
        (handle, true)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Default for TextureCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a texture slot to a handle, creating it through `gfx` on first
/// use. File names are resolved against `base`. New file textures start as
/// the placeholder color and are queued on `uploads`.
pub(crate) fn texture_handle<G: GraphicsContext>(
    gfx: &G,
    cache: &TextureCache<G::Texture>,
    texture: TextureRef,
    base: &Path,
    uploads: &mut TextureUploads<G::Texture>,
) -> G::Texture {
    let key = TextureKey::resolve(texture, base);
    let (handle, created) = cache.get_or_create(&key, || match &key {
        TextureKey::Builtin(builtin) => gfx.create_texture(TextureSource::Solid(builtin.rgba())),
        TextureKey::File(_) => gfx.create_texture(TextureSource::Solid(PLACEHOLDER_RGBA)),
    });
    if created {
        match key {
            TextureKey::File(path) => {
                log::debug!("Created texture for {}", path.display());
                uploads.pending.push(PendingUpload {
                    texture: handle.clone(),
                    path,
                });
            }
            TextureKey::Builtin(builtin) => {
                log::debug!("Created built-in texture {builtin:?}");
            }
        }
    }
    handle
}

/// A file texture whose image has not been loaded yet.
#[derive(Clone, Debug)]
pub struct PendingUpload<T> {
    pub texture: T,
    pub path: PathBuf,
}

/// Outcome of [`TextureUploads::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub loaded: usize,
    pub failed: usize,
}

/// Image loads owed to textures created during a mesh load. The mesh is
/// usable before these run; until then the textures show the placeholder.
#[derive(Clone, Debug)]
pub struct TextureUploads<T> {
    pending: Vec<PendingUpload<T>>,
}

impl<T> Default for TextureUploads<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<T> TextureUploads<T> {
    pub fn pending(&self) -> &[PendingUpload<T>] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Fetch every image concurrently and upload the ones that arrive.
    /// A failed fetch leaves its texture on the placeholder for good.
    pub async fn run<F, G>(self, fetcher: &F, gfx: &G) -> UploadReport
    where
        F: Fetch,
        G: GraphicsContext<Texture = T>,
    {
        let fetches = self.pending.iter().map(|p| fetcher.fetch_image(&p.path));
        let results = join_all(fetches).await;

        let mut report = UploadReport::default();
        for (pending, result) in self.pending.iter().zip(results) {
            match result {
                Ok(pixels) => {
                    gfx.upload_texture(&pending.texture, pixels);
                    report.loaded += 1;
                }
                Err(err) => {
                    log::warn!("Texture stays as placeholder: {err}");
                    report.failed += 1;
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessContext;

    #[test]
    fn creates_once_per_key() {
        let cache: TextureCache<u32> = TextureCache::new();
        let mut calls = 0;
        let key = TextureKey::File("a.png".into());
        let (a, created_a) = cache.get_or_create(&key, || {
            calls += 1;
            7
        });
        let (b, created_b) = cache.get_or_create(&key, || {
            calls += 1;
            8
        });
        assert_eq!((a, b), (7, 7));
        assert!(created_a);
        assert!(!created_b);
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn builtin_keys_do_not_collide_with_filenames() {
        let cache: TextureCache<u32> = TextureCache::new();
        cache.get_or_create(&TextureKey::Builtin(BuiltinTexture::White), || 1);
        let (h, created) = cache.get_or_create(&TextureKey::File("White".into()), || 2);
        assert_eq!(h, 2);
        assert!(created);
    }

    #[test]
    fn only_new_file_textures_are_queued() {
        let gfx = HeadlessContext::new();
        let cache = TextureCache::new();
        let mut uploads = TextureUploads::default();
        let dir = Path::new("models");

        for texture in [
            TextureRef::File("wood.png".into()),
            TextureRef::File("wood.png".into()),
            TextureRef::Builtin(BuiltinTexture::White),
        ] {
            texture_handle(&gfx, &cache, texture, dir, &mut uploads);
        }

        assert_eq!(gfx.textures().len(), 2);
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads.pending()[0].path, PathBuf::from("models/wood.png"));
        assert_eq!(
            gfx.textures()[0].source,
            TextureSource::Solid(PLACEHOLDER_RGBA)
        );
    }

    #[test]
    fn same_filename_in_other_directory_is_a_new_texture() {
        let gfx = HeadlessContext::new();
        let cache = TextureCache::new();
        let mut uploads = TextureUploads::default();

        let a = texture_handle(
            &gfx,
            &cache,
            TextureRef::File("diffuse.png".into()),
            Path::new("a"),
            &mut uploads,
        );
        let b = texture_handle(
            &gfx,
            &cache,
            TextureRef::File("diffuse.png".into()),
            Path::new("b"),
            &mut uploads,
        );

        assert_ne!(a, b);
        let paths: Vec<_> = uploads.pending().iter().map(|p| p.path.clone()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("a/diffuse.png"), PathBuf::from("b/diffuse.png")]
        );
    }
}
