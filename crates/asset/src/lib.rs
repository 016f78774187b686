//! Asset parsers for OBJ geometry and MTL material libraries.
//! Produces non-indexed geometry, partial material records, tangents and
//! CPU-side texture data. Nothing here touches a graphics device.

pub mod material;
pub mod mesh;
pub mod mtl;
pub mod obj;
pub mod tangent;
pub mod texture;
pub mod tokenize;

pub use material::{BuiltinTexture, MaterialProperties, ResolvedMaterial, TextureRef};
pub use mesh::{Attribute, Extents, Geometry, GeometryData, VertexAttributes};
pub use mtl::{MtlData, parse_mtl};
pub use obj::{ObjData, parse_obj};
pub use texture::TextureData;
