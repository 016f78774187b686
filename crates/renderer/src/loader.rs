//! Mesh assembly: fetch OBJ and MTL text, parse, resolve materials and
//! textures, and hand each geometry's attributes to the graphics context.

use std::path::{Path, PathBuf};

use asset::{
    Extents, ResolvedMaterial, VertexAttributes, mesh::geometries_extents, parse_mtl, parse_obj,
    tokenize::Unhandled,
};
use corelib::{LoadError, LoadResult};
use futures::future::{try_join, try_join_all};

use crate::{
    fetch::Fetch,
    gfx::GraphicsContext,
    texture_cache::{TextureCache, TextureUploads, texture_handle},
};

/// Per-load settings.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    /// When set, this MTL file is the only material source and the OBJ's
    /// `mtllib` declarations are ignored.
    pub material_override: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_material_override(mut self, path: impl Into<PathBuf>) -> Self {
        self.material_override = Some(path.into());
        self
    }
}

/// One drawable piece of a mesh: one geometry with its material.
#[derive(Clone, Debug)]
pub struct MeshPart<T, B> {
    pub object: String,
    pub groups: Vec<String>,
    pub material_name: String,
    pub material: ResolvedMaterial<T>,
    pub buffers: B,
    pub vertex_count: usize,
    /// Which attributes came from the file rather than defaults.
    pub supplied: SuppliedAttributes,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SuppliedAttributes {
    pub texcoord: bool,
    pub normal: bool,
    pub color: bool,
}

/// Result of a successful load.
#[derive(Clone, Debug)]
pub struct LoadedMesh<T, B> {
    pub parts: Vec<MeshPart<T, B>>,
    pub extents: Option<Extents>,
    /// Images still to fetch for the file textures created by this load.
    pub uploads: TextureUploads<T>,
    /// Lines skipped for unknown keywords, OBJ first then MTL.
    pub unhandled: Vec<Unhandled>,
}

pub type LoadedMeshFor<G> =
    LoadedMesh<<G as GraphicsContext>::Texture, <G as GraphicsContext>::Buffers>;

/// Loads meshes through a [`Fetch`] source into a [`GraphicsContext`].
pub struct MeshLoader<'a, F, G: GraphicsContext> {
    fetcher: &'a F,
    gfx: &'a G,
    textures: Option<&'a TextureCache<G::Texture>>,
}

impl<'a, F: Fetch, G: GraphicsContext> MeshLoader<'a, F, G> {
    pub fn new(fetcher: &'a F, gfx: &'a G) -> Self {
        Self {
            fetcher,
            gfx,
            textures: None,
        }
    }

    /// Share texture handles with other loads. Without this each load
    /// starts from an empty cache.
    pub fn with_texture_cache(mut self, cache: &'a TextureCache<G::Texture>) -> Self {
        self.textures = Some(cache);
        self
    }

    /// Load the OBJ at `path`. Fails only if the geometry or a material
    /// library cannot be fetched; texture images are left to
    /// [`LoadedMesh::uploads`].
    pub async fn load(
        &self,
        path: impl AsRef<Path>,
        options: &LoadOptions,
    ) -> LoadResult<LoadedMeshFor<G>> {
        let path = path.as_ref();
        let base = path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();

        let (obj_text, override_text) = match &options.material_override {
            Some(mtl_path) => {
                let (obj, mtl) =
                    try_join(self.fetch_geometry(path), self.fetch_material(mtl_path.clone()))
                        .await?;
                (obj, Some(mtl))
            }
            None => (self.fetch_geometry(path).await?, None),
        };

        let obj = parse_obj(&obj_text);
        log::debug!(
            "Parsed {}: {} geometries, {} material libraries",
            path.display(),
            obj.geometries.len(),
            obj.material_libs.len()
        );

        let mtl_text = match override_text {
            Some(text) => text,
            None => {
                let libs = obj.material_libs.iter().map(|name| base.join(name));
                // Completion order is irrelevant: results keep declaration order.
                try_join_all(libs.map(|p| self.fetch_material(p)))
                    .await?
                    .join("\n")
            }
        };
        let mtl = parse_mtl(&mtl_text);

        let local_cache;
        let cache = match self.textures {
            Some(cache) => cache,
            None => {
                local_cache = TextureCache::new();
                &local_cache
            }
        };

        let extents = geometries_extents(&obj.geometries);
        let mut uploads = TextureUploads::default();
        let mut parts = Vec::with_capacity(obj.geometries.len());

        for geometry in obj.geometries {
            let props = mtl.materials.get(&geometry.material);
            if props.is_none() && geometry.material != "default" {
                log::debug!("Unknown material '{}', using defaults", geometry.material);
            }
            let material = ResolvedMaterial::merged(props).map_textures(|texture| {
                texture_handle(self.gfx, cache, texture, &base, &mut uploads)
            });

            let supplied = SuppliedAttributes {
                texcoord: geometry.data.texcoord.is_some(),
                normal: geometry.data.normal.is_some(),
                color: geometry.data.color.is_some(),
            };
            let attributes = VertexAttributes::from_geometry(geometry.data);
            let buffers = self.gfx.create_vertex_buffers(&attributes);

            parts.push(MeshPart {
                object: geometry.object,
                groups: geometry.groups,
                material_name: geometry.material,
                material,
                buffers,
                vertex_count: attributes.vertex_count,
                supplied,
            });
        }

        log::info!(
            "Loaded {} with {} parts, {} textures pending",
            path.display(),
            parts.len(),
            uploads.len()
        );

        let mut unhandled = obj.unhandled;
        unhandled.extend(mtl.unhandled);
        Ok(LoadedMesh {
            parts,
            extents,
            uploads,
            unhandled,
        })
    }

    async fn fetch_geometry(&self, path: &Path) -> LoadResult<String> {
        self.fetcher
            .fetch_text(path)
            .await
            .map_err(|source| LoadError::Geometry {
                path: path.to_path_buf(),
                source,
            })
    }

    async fn fetch_material(&self, path: PathBuf) -> LoadResult<String> {
        match self.fetcher.fetch_text(&path).await {
            Ok(text) => Ok(text),
            Err(source) => Err(LoadError::Material { path, source }),
        }
    }
}
