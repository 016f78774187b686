//! Surface materials: the partial record parsed from MTL text and the
//! complete record obtained by merging it over the default template.

use std::fmt;

/// Material fields as declared in an MTL file. Anything the file does not
/// mention stays `None` until merged with [`ResolvedMaterial::template`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialProperties {
    /// `Ns`
    pub shininess: Option<f32>,
    /// `Ka`
    pub ambient: Option<[f32; 3]>,
    /// `Kd`
    pub diffuse: Option<[f32; 3]>,
    /// `Ks`
    pub specular: Option<[f32; 3]>,
    /// `Ke`
    pub emissive: Option<[f32; 3]>,
    /// `d`
    pub opacity: Option<f32>,
    /// `Ni`
    pub optical_density: Option<f32>,
    /// `illum`
    pub illum: Option<i32>,
    /// `map_Kd`
    pub diffuse_map: Option<String>,
    /// `map_Ns`
    pub specular_map: Option<String>,
    /// `map_Bump`
    pub normal_map: Option<String>,
}

/// 1x1 textures used where a material names no file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinTexture {
    White,
    FlatNormal,
}

impl BuiltinTexture {
    pub const fn rgba(self) -> [u8; 4] {
        match self {
            Self::White => [255, 255, 255, 255],
            Self::FlatNormal => [127, 127, 255, 0],
        }
    }
}

/// What a texture slot points at before it is turned into a GPU handle.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureRef {
    Builtin(BuiltinTexture),
    File(String),
}

impl fmt::Display for TextureRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(b) => write!(f, "<{b:?}>"),
            Self::File(name) => f.write_str(name),
        }
    }
}

/// A fully populated material. `T` is the texture type: [`TextureRef`]
/// after merging, a renderer handle after textures are created.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedMaterial<T> {
    pub shininess: f32,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub emissive: Option<[f32; 3]>,
    pub opacity: f32,
    pub optical_density: Option<f32>,
    pub illum: Option<i32>,
    pub diffuse_map: T,
    pub specular_map: T,
    pub normal_map: T,
}

impl ResolvedMaterial<TextureRef> {
    /// The default material every parsed record is merged over.
    pub fn template() -> Self {
        Self {
            shininess: 400.0,
            ambient: [0.0, 0.0, 0.0],
            diffuse: [1.0, 1.0, 1.0],
            specular: [1.0, 1.0, 1.0],
            emissive: None,
            opacity: 1.0,
            optical_density: None,
            illum: None,
            diffuse_map: TextureRef::Builtin(BuiltinTexture::White),
            specular_map: TextureRef::Builtin(BuiltinTexture::White),
            normal_map: TextureRef::Builtin(BuiltinTexture::FlatNormal),
        }
    }

    /// Merge `props` over the template. `None` (unknown material name)
    /// yields the template unchanged.
    pub fn merged(props: Option<&MaterialProperties>) -> Self {
        let base = Self::template();
        let Some(p) = props else {
            return base;
        };
        let file = |name: &Option<String>, fallback: TextureRef| {
            name.clone().map_or(fallback, TextureRef::File)
        };

        Self {
            shininess: p.shininess.unwrap_or(base.shininess),
            ambient: p.ambient.unwrap_or(base.ambient),
            diffuse: p.diffuse.unwrap_or(base.diffuse),
            specular: p.specular.unwrap_or(base.specular),
            emissive: p.emissive.or(base.emissive),
            opacity: p.opacity.unwrap_or(base.opacity),
            optical_density: p.optical_density.or(base.optical_density),
            illum: p.illum.or(base.illum),
            diffuse_map: file(&p.diffuse_map, base.diffuse_map),
            specular_map: file(&p.specular_map, base.specular_map),
            normal_map: file(&p.normal_map, base.normal_map),
        }
    }
}

impl<T> ResolvedMaterial<T> {
    /// Replace the three texture slots, keeping every scalar field.
    pub fn map_textures<U>(self, mut f: impl FnMut(T) -> U) -> ResolvedMaterial<U> {
        ResolvedMaterial {
            shininess: self.shininess,
            ambient: self.ambient,
            diffuse: self.diffuse,
            specular: self.specular,
            emissive: self.emissive,
            opacity: self.opacity,
            optical_density: self.optical_density,
            illum: self.illum,
            diffuse_map: f(self.diffuse_map),
            specular_map: f(self.specular_map),
            normal_map: f(self.normal_map),
        }
    }

    pub fn textures(&self) -> [&T; 3] {
        [&self.diffuse_map, &self.specular_map, &self.normal_map]
    }
}
