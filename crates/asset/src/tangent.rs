//! Flat per-triangle tangents for normal mapping.

use corelib::{Vec2, Vec3};

/// Tangent used when a triangle's UV mapping has zero area.
pub const FALLBACK_TANGENT: Vec3 = Vec3::X;

/// Compute one tangent per vertex of a non-indexed triangle list.
///
/// `position` holds xyz triples and `texcoord` uv pairs, three consecutive
/// vertices per triangle. All three vertices of a triangle receive the same
/// tangent. Triangles whose UV determinant is zero (or that lack UVs) get
/// [`FALLBACK_TANGENT`]. The result has the same length as `position`,
/// rounded down to whole triangles.
pub fn generate_tangents(position: &[f32], texcoord: &[f32]) -> Vec<f32> {
    let triangles = position.len() / 9;
    let mut tangents = Vec::with_capacity(triangles * 9);

    for tri in 0..triangles {
        let p = &position[tri * 9..tri * 9 + 9];
        let tangent = texcoord
            .get(tri * 6..tri * 6 + 6)
            .map_or(FALLBACK_TANGENT, |uv| triangle_tangent(p, uv));
        for _ in 0..3 {
            tangents.extend_from_slice(&tangent.to_array());
        }
    }

    tangents
}

fn triangle_tangent(p: &[f32], uv: &[f32]) -> Vec3 {
    let p1 = Vec3::from_slice(&p[0..3]);
    let p2 = Vec3::from_slice(&p[3..6]);
    let p3 = Vec3::from_slice(&p[6..9]);
    let uv1 = Vec2::from_slice(&uv[0..2]);
    let uv2 = Vec2::from_slice(&uv[2..4]);
    let uv3 = Vec2::from_slice(&uv[4..6]);

    let dp12 = p2 - p1;
    let dp13 = p3 - p1;
    let duv12 = uv2 - uv1;
    let duv13 = uv3 - uv1;

    let f = 1.0 / (duv12.x * duv13.y - duv13.x * duv12.y);
    if !f.is_finite() {
        return FALLBACK_TANGENT;
    }
    ((dp12 * duv13.y - dp13 * duv12.y) * f).normalize_or_zero()
}
