//! CPU-side mesh representation used by loaders.
//!
//! Geometry is kept non-indexed: every triangle corner owns its own copy of
//! each attribute, three vertices per triangle. Texcoord and normal arrays
//! only grow for corners that name them, so a geometry mixing `v` and
//! `v/vt/vn` corners ends up with them shorter than position.

use corelib::Vec3;

use crate::tangent::generate_tangents;

/// Expanded attribute arrays of one [`Geometry`]. Attributes that no face
/// supplied are `None` rather than empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryData {
    /// xyz per vertex. Never empty for a geometry returned by the parser.
    pub position: Vec<f32>,
    /// uv per vertex.
    pub texcoord: Option<Vec<f32>>,
    /// xyz per vertex.
    pub normal: Option<Vec<f32>>,
    /// rgb per vertex, from the `v x y z r g b` extension.
    pub color: Option<Vec<f32>>,
}

impl GeometryData {
    pub fn vertex_count(&self) -> usize {
        self.position.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    /// Names of present attributes holding fewer vertices than position.
    pub fn short_attributes(&self) -> Vec<&'static str> {
        let vertices = self.vertex_count();
        [
            ("texcoord", &self.texcoord, 2),
            ("normal", &self.normal, 3),
            ("color", &self.color, 3),
        ]
        .into_iter()
        .filter_map(|(name, data, components)| {
            let len = data.as_ref()?.len();
            (len / components < vertices).then_some(name)
        })
        .collect()
    }
}

/// One run of triangles sharing object, groups and material.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    pub object: String,
    pub groups: Vec<String>,
    pub material: String,
    pub data: GeometryData,
}

/// A vertex attribute: either one value per vertex or a single constant.
#[derive(Clone, Debug, PartialEq)]
pub enum Attribute {
    Buffer { components: u32, data: Vec<f32> },
    Constant { components: u32, value: [f32; 4] },
}

impl Attribute {
    pub fn buffer(components: u32, data: Vec<f32>) -> Self {
        Self::Buffer { components, data }
    }

    /// Constant attribute from up to four components.
    pub fn constant(value: &[f32]) -> Self {
        let mut padded = [0.0; 4];
        let n = value.len().min(4);
        padded[..n].copy_from_slice(&value[..n]);
        Self::Constant {
            components: n as u32,
            value: padded,
        }
    }

    pub fn components(&self) -> u32 {
        match self {
            Self::Buffer { components, .. } | Self::Constant { components, .. } => *components,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant { .. })
    }

    /// The per-vertex data, or the constant value.
    pub fn values(&self) -> &[f32] {
        match self {
            Self::Buffer { data, .. } => data,
            Self::Constant { components, value } => &value[..*components as usize],
        }
    }
}

pub const DEFAULT_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const DEFAULT_TEXCOORD: [f32; 2] = [0.0, 0.0];
pub const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];
pub const DEFAULT_TANGENT: [f32; 3] = [1.0, 0.0, 0.0];

/// Render-ready attribute set: every slot filled, missing ones by constants.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexAttributes {
    pub position: Attribute,
    pub texcoord: Attribute,
    pub normal: Attribute,
    pub color: Attribute,
    pub tangent: Attribute,
    pub vertex_count: usize,
}

impl VertexAttributes {
    /// Fill absent attributes with defaults and synthesize tangents when both
    /// texture coordinates and normals are present.
    pub fn from_geometry(data: GeometryData) -> Self {
        let vertex_count = data.vertex_count();
        let tangent = match (&data.texcoord, &data.normal) {
            (Some(texcoord), Some(_)) => {
                Attribute::buffer(3, generate_tangents(&data.position, texcoord))
            }
            _ => Attribute::constant(&DEFAULT_TANGENT),
        };

        Self {
            texcoord: data
                .texcoord
                .map_or_else(|| Attribute::constant(&DEFAULT_TEXCOORD), |d| Attribute::buffer(2, d)),
            normal: data
                .normal
                .map_or_else(|| Attribute::constant(&DEFAULT_NORMAL), |d| Attribute::buffer(3, d)),
            color: data
                .color
                .map_or_else(|| Attribute::constant(&DEFAULT_COLOR), |d| Attribute::buffer(3, d)),
            position: Attribute::buffer(3, data.position),
            tangent,
            vertex_count,
        }
    }

    /// Attributes by shader-facing name, in a fixed order.
    pub fn named(&self) -> [(&'static str, &Attribute); 5] {
        [
            ("position", &self.position),
            ("texcoord", &self.texcoord),
            ("normal", &self.normal),
            ("color", &self.color),
            ("tangent", &self.tangent),
        ]
    }
}

/// Axis-aligned bounds of position data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extents {
    pub min: Vec3,
    pub max: Vec3,
}

impl Extents {
    /// Bounds of a flat xyz array; `None` when it holds no complete vertex.
    pub fn of_positions(position: &[f32]) -> Option<Self> {
        position
            .chunks_exact(3)
            .map(Vec3::from_slice)
            .fold(None, |acc: Option<Self>, p| {
                Some(match acc {
                    Some(e) => Self {
                        min: e.min.min(p),
                        max: e.max.max(p),
                    },
                    None => Self { min: p, max: p },
                })
            })
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Bounds over every geometry of a parsed model.
pub fn geometries_extents(geometries: &[Geometry]) -> Option<Extents> {
    geometries
        .iter()
        .filter_map(|g| Extents::of_positions(&g.data.position))
        .reduce(Extents::union)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> GeometryData {
        GeometryData {
            position: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            ..Default::default()
        }
    }

    #[test]
    fn missing_attributes_become_constants() {
        let attrs = VertexAttributes::from_geometry(triangle());
        assert_eq!(attrs.vertex_count, 3);
        assert!(!attrs.position.is_constant());
        assert_eq!(attrs.texcoord.values(), &DEFAULT_TEXCOORD);
        assert_eq!(attrs.normal.values(), &DEFAULT_NORMAL);
        assert_eq!(attrs.color.values(), &DEFAULT_COLOR);
        assert_eq!(attrs.tangent.values(), &DEFAULT_TANGENT);
    }

    #[test]
    fn tangents_need_texcoords_and_normals() {
        let mut data = triangle();
        data.texcoord = Some(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        let attrs = VertexAttributes::from_geometry(data.clone());
        assert!(attrs.tangent.is_constant());

        data.normal = Some(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        let attrs = VertexAttributes::from_geometry(data);
        assert_eq!(attrs.tangent.components(), 3);
        assert_eq!(attrs.tangent.values().len(), 9);
        assert!(!attrs.tangent.is_constant());
    }

    #[test]
    fn extents_cover_all_geometries() {
        let a = Geometry {
            object: "default".into(),
            groups: vec!["default".into()],
            material: "default".into(),
            data: triangle(),
        };
        let mut b = a.clone();
        b.data.position = vec![-2.0, 5.0, 1.0, 0.0, 0.0, -3.0, 0.0, 0.0, 0.0];

        let e = geometries_extents(&[a, b]).expect("non-empty");
        assert_eq!(e.min, Vec3::new(-2.0, 0.0, -3.0));
        assert_eq!(e.max, Vec3::new(1.0, 5.0, 1.0));
        assert_eq!(e.center(), Vec3::new(-0.5, 2.5, -1.0));
        assert_eq!(e.size(), Vec3::new(3.0, 5.0, 4.0));
    }

    #[test]
    fn short_attributes_are_named() {
        let mut data = triangle();
        assert!(data.short_attributes().is_empty());
        data.texcoord = Some(vec![0.0; 6]);
        data.normal = Some(vec![0.0; 3]);
        assert_eq!(data.short_attributes(), vec!["normal"]);
    }

    #[test]
    fn extents_of_nothing() {
        assert!(Extents::of_positions(&[]).is_none());
        assert!(geometries_extents(&[]).is_none());
    }
}
