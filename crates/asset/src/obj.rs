//! OBJ geometry parser producing non-indexed geometries grouped by
//! object, group and material.

use anyhow::{Context, Result, anyhow, bail};

use crate::{
    mesh::{Geometry, GeometryData},
    tokenize::{Statement, Unhandled, parse_floats, statements},
};

const DEFAULT_NAME: &str = "default";
const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

/// Everything extracted from one OBJ text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjData {
    pub geometries: Vec<Geometry>,
    /// `mtllib` filenames in declaration order, duplicates kept.
    pub material_libs: Vec<String>,
    pub unhandled: Vec<Unhandled>,
}

/// Parse OBJ text. Never fails: problems are logged and the offending line
/// (or face) is skipped.
pub fn parse_obj(text: &str) -> ObjData {
    let mut parser = ObjParser::new();
    for statement in statements(text) {
        parser.handle(&statement);
    }
    parser.finish()
}

/// Attribute pools. Index 0 of each is a sentinel so OBJ's 1-based indices
/// address entries directly.
struct Pools {
    position: Vec<[f32; 3]>,
    texcoord: Vec<[f32; 2]>,
    normal: Vec<[f32; 3]>,
    /// Parallel to `position` once the first coloured vertex is seen.
    color: Vec<[f32; 3]>,
}

impl Pools {
    fn new() -> Self {
        Self {
            position: vec![[0.0; 3]],
            texcoord: vec![[0.0; 2]],
            normal: vec![[0.0; 3]],
            color: vec![WHITE],
        }
    }

    fn has_colors(&self) -> bool {
        self.color.len() > 1
    }

    fn push_vertex(&mut self, position: [f32; 3], color: Option<[f32; 3]>) {
        self.position.push(position);
        if color.is_some() || self.has_colors() {
            self.color.resize(self.position.len() - 1, WHITE);
            self.color.push(color.unwrap_or(WHITE));
        }
    }
}

/// Pool indices of one face corner, already resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Corner {
    position: usize,
    texcoord: Option<usize>,
    normal: Option<usize>,
}

/// Geometry under construction.
#[derive(Default)]
struct GeometryBuilder {
    object: String,
    groups: Vec<String>,
    material: String,
    position: Vec<f32>,
    texcoord: Vec<f32>,
    normal: Vec<f32>,
    color: Vec<f32>,
}

impl GeometryBuilder {
    fn push_corner(&mut self, pools: &Pools, corner: Corner) {
        self.position.extend_from_slice(&pools.position[corner.position]);
        if let Some(i) = corner.texcoord {
            self.texcoord.extend_from_slice(&pools.texcoord[i]);
        }
        if let Some(i) = corner.normal {
            self.normal.extend_from_slice(&pools.normal[i]);
        }
        if pools.has_colors() {
            // Corners pushed before the first coloured vertex read as white.
            self.color.resize(self.position.len() - 3, 1.0);
            let color = pools.color.get(corner.position).copied().unwrap_or(WHITE);
            self.color.extend_from_slice(&color);
        }
    }

    fn build(self) -> Geometry {
        let non_empty = |v: Vec<f32>| (!v.is_empty()).then_some(v);
        let data = GeometryData {
            position: self.position,
            texcoord: non_empty(self.texcoord),
            normal: non_empty(self.normal),
            color: non_empty(self.color),
        };
        let short = data.short_attributes();
        if !short.is_empty() {
            log::warn!(
                "geometry '{}/{}' mixes corner layouts: {:?} cover fewer than {} vertices",
                self.object,
                self.material,
                short,
                data.vertex_count()
            );
        }
        Geometry {
            object: self.object,
            groups: self.groups,
            material: self.material,
            data,
        }
    }
}

/// A change of the active naming context.
enum ContextSwitch {
    Material(String),
    Groups(Vec<String>),
    Object(String),
}

struct ObjParser {
    pools: Pools,
    object: String,
    groups: Vec<String>,
    material: String,
    current: Option<GeometryBuilder>,
    geometries: Vec<Geometry>,
    material_libs: Vec<String>,
    unhandled: Vec<Unhandled>,
}

impl ObjParser {
    fn new() -> Self {
        Self {
            pools: Pools::new(),
            object: DEFAULT_NAME.to_string(),
            groups: vec![DEFAULT_NAME.to_string()],
            material: DEFAULT_NAME.to_string(),
            current: None,
            geometries: Vec::new(),
            material_libs: Vec::new(),
            unhandled: Vec::new(),
        }
    }

    fn handle(&mut self, st: &Statement<'_>) {
        match st.keyword {
            "v" => self.vertex(st),
            "vt" => {
                if let Some(uv) = parse_floats::<2>(st) {
                    self.pools.texcoord.push(uv);
                }
            }
            "vn" => {
                if let Some(n) = parse_floats::<3>(st) {
                    self.pools.normal.push(n);
                }
            }
            "f" => self.face(st),
            "usemtl" => self.switch(ContextSwitch::Material(name_or_default(st.rest))),
            "g" => {
                let groups = if st.args.is_empty() {
                    vec![DEFAULT_NAME.to_string()]
                } else {
                    st.args.iter().map(|s| s.to_string()).collect()
                };
                self.switch(ContextSwitch::Groups(groups));
            }
            "o" => self.switch(ContextSwitch::Object(name_or_default(st.rest))),
            "mtllib" => {
                if st.rest.is_empty() {
                    log::warn!("mtllib without a filename on line {}", st.line);
                } else {
                    self.material_libs.push(st.rest.to_string());
                }
            }
            // Smoothing groups have no effect on flat, non-indexed output.
            "s" => {}
            _ => self.unhandled.push(Unhandled::report(st, "obj")),
        }
    }

    fn vertex(&mut self, st: &Statement<'_>) {
        let Some(position) = parse_floats::<3>(st) else {
            return;
        };
        let color = if st.args.len() > 3 {
            let parsed: Option<Vec<f32>> = st.args[3..]
                .iter()
                .take(3)
                .map(|t| t.parse::<f32>().ok())
                .collect();
            match parsed.as_deref() {
                Some(&[r, g, b]) => Some([r, g, b]),
                _ => {
                    log::warn!("ignoring incomplete vertex color on line {}", st.line);
                    None
                }
            }
        } else {
            None
        };
        self.pools.push_vertex(position, color);
    }

    /// Close the current geometry (if it has faces) and apply the switch.
    /// The next face opens a new geometry under the new context.
    fn switch(&mut self, change: ContextSwitch) {
        self.close_geometry();
        match change {
            ContextSwitch::Material(name) => self.material = name,
            ContextSwitch::Groups(groups) => self.groups = groups,
            ContextSwitch::Object(name) => self.object = name,
        }
    }

    fn close_geometry(&mut self) {
        if let Some(current) = self.current.take() {
            if !current.position.is_empty() {
                self.geometries.push(current.build());
            }
        }
    }

    fn face(&mut self, st: &Statement<'_>) {
        if st.args.len() < 3 {
            log::warn!(
                "face on line {} has {} vertices, need at least 3",
                st.line,
                st.args.len()
            );
            return;
        }

        // Resolve every corner before touching the geometry so a bad index
        // drops the whole face.
        let corners: Result<Vec<Corner>> = st
            .args
            .iter()
            .map(|token| parse_corner(token, &self.pools))
            .collect();
        let corners = match corners {
            Ok(corners) => corners,
            Err(err) => {
                log::warn!("skipping face on line {}: {err:#}", st.line);
                return;
            }
        };

        let geometry = self.current.get_or_insert_with(|| GeometryBuilder {
            object: self.object.clone(),
            groups: self.groups.clone(),
            material: self.material.clone(),
            ..Default::default()
        });
        for k in 0..corners.len() - 2 {
            for corner in [corners[0], corners[k + 1], corners[k + 2]] {
                geometry.push_corner(&self.pools, corner);
            }
        }
    }

    fn finish(mut self) -> ObjData {
        self.close_geometry();
        ObjData {
            geometries: self.geometries,
            material_libs: self.material_libs,
            unhandled: self.unhandled,
        }
    }
}

fn name_or_default(rest: &str) -> String {
    if rest.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        rest.to_string()
    }
}

/// Parse a `v[/vt][/vn]` corner token against the current pool lengths.
fn parse_corner(token: &str, pools: &Pools) -> Result<Corner> {
    let mut split = token.split('/');
    let position = match split.next() {
        Some(value) if !value.is_empty() => resolve_index(value, pools.position.len())?,
        _ => bail!("face corner '{}' has no position index", token),
    };
    let texcoord = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(value, pools.texcoord.len())?),
        _ => None,
    };
    let normal = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(value, pools.normal.len())?),
        _ => None,
    };
    if split.next().is_some() {
        bail!("face corner '{}' has more than three indices", token);
    }

    Ok(Corner {
        position,
        texcoord,
        normal,
    })
}

/// Map a 1-based or negative OBJ index onto a pool of `len` entries
/// (sentinel included). `-1` is the last entry appended so far.
fn resolve_index(token: &str, len: usize) -> Result<usize> {
    let raw = token
        .parse::<i64>()
        .with_context(|| format!("invalid index '{}'", token))?;
    let idx = if raw < 0 { len as i64 + raw } else { raw };
    if idx < 1 || idx >= len as i64 {
        return Err(anyhow!(
            "index {} out of range ({} entries)",
            raw,
            len.saturating_sub(1)
        ));
    }
    Ok(idx as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_triangle() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let obj = parse_obj(src);
        assert_eq!(obj.geometries.len(), 1);
        let g = &obj.geometries[0];
        assert_eq!(g.material, "default");
        assert_eq!(g.object, "default");
        assert_eq!(g.groups, vec!["default".to_string()]);
        assert_eq!(
            g.data.position,
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
        assert!(g.data.texcoord.is_none());
        assert!(g.data.normal.is_none());
        assert!(g.data.color.is_none());
        assert!(obj.unhandled.is_empty());
    }

    #[test]
    fn quad_is_fan_triangulated() {
        let src = r#"
            v 0 0 0
            v 1 0 0
            v 1 1 0
            v 0 1 0
            f 1 2 3 4
        "#;
        let obj = parse_obj(src);
        let p = &obj.geometries[0].data.position;
        assert_eq!(obj.geometries[0].data.triangle_count(), 2);
        // (1,2,3) then (1,3,4)
        assert_eq!(
            p,
            &vec![
                0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
            ]
        );
    }

    #[test]
    fn ngon_yields_n_minus_two_triangles() {
        let mut src = String::new();
        for i in 0..7 {
            src.push_str(&format!("v {i} {} 0\n", i * i));
        }
        src.push_str("f 1 2 3 4 5 6 7\n");
        let obj = parse_obj(&src);
        assert_eq!(obj.geometries[0].data.triangle_count(), 5);
        assert_eq!(obj.geometries[0].data.position.len() % 9, 0);
    }

    #[test]
    fn negative_indices_resolve_at_face_time() {
        let src = r#"
            v 0 0 0
            v 1 0 0
            v 0 1 0
            f -3 -2 -1
            v 5 5 5
            v 6 6 6
            v 7 7 7
            f -1 -2 -3
        "#;
        let obj = parse_obj(src);
        let p = &obj.geometries[0].data.position;
        assert_eq!(&p[0..9], &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(&p[9..18], &[7.0, 7.0, 7.0, 6.0, 6.0, 6.0, 5.0, 5.0, 5.0]);
    }

    #[test]
    fn corner_sub_fields() {
        let src = r#"
            v 0 0 0
            v 1 0 0
            v 0 1 0
            vt 0.5 0.25
            vn 0 0 1
            f 1//1 2//1 3//1
            f 1/1 2/1 3/1
            f 1/1/1 2/1/1 3/1/1
        "#;
        let obj = parse_obj(src);
        let data = &obj.geometries[0].data;
        assert_eq!(data.vertex_count(), 9);
        assert_eq!(data.normal.as_ref().map(Vec::len), Some(18));
        assert_eq!(data.texcoord.as_ref().map(Vec::len), Some(12));
        assert_eq!(&data.texcoord.as_ref().unwrap()[0..2], &[0.5, 0.25]);
    }

    #[test]
    fn vertex_colors_follow_positions() {
        let src = r#"
            v 0 0 0 1 0 0
            v 1 0 0 0 1 0
            v 0 1 0 0 0 1
            v 1 1 0
            f 1 2 3
            f 2 4 3
        "#;
        let obj = parse_obj(src);
        let data = &obj.geometries[0].data;
        let color = data.color.as_ref().expect("colors present");
        assert_eq!(color.len(), data.position.len());
        assert_eq!(&color[0..9], &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        // vertex 4 had no color
        assert_eq!(&color[12..15], &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn first_color_after_a_face_backfills_white() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nv 1 1 0 1 0 0\nf 2 4 3\n";
        let obj = parse_obj(src);
        let data = &obj.geometries[0].data;
        let color = data.color.as_ref().expect("colors present");
        assert_eq!(color.len(), data.position.len());
        assert!(color[0..12].iter().all(|&c| c == 1.0));
        assert_eq!(&color[12..15], &[1.0, 0.0, 0.0]);
        assert_eq!(&color[15..18], &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn mixed_corner_layouts_leave_short_arrays() {
        let src = r#"
            v 0 0 0
            v 1 0 0
            v 0 1 0
            vt 0 0
            f 1/1 2/1 3/1
            f 1 2 3
        "#;
        let obj = parse_obj(src);
        let data = &obj.geometries[0].data;
        assert_eq!(data.vertex_count(), 6);
        assert_eq!(data.texcoord.as_ref().map(Vec::len), Some(6));
        assert_eq!(data.short_attributes(), vec!["texcoord"]);
    }

    #[test]
    fn material_switches_split_geometries() {
        let src = r#"
            mtllib a.mtl
            mtllib b.mtl
            mtllib a.mtl
            v 0 0 0
            v 1 0 0
            v 0 1 0
            usemtl red
            f 1 2 3
            usemtl green
            usemtl blue
            f 1 2 3
            g wheels left
            o car
            f 1 2 3
        "#;
        let obj = parse_obj(src);
        assert_eq!(obj.material_libs, vec!["a.mtl", "b.mtl", "a.mtl"]);
        assert_eq!(obj.geometries.len(), 3);
        assert_eq!(obj.geometries[0].material, "red");
        assert_eq!(obj.geometries[1].material, "blue");
        assert_eq!(obj.geometries[2].material, "blue");
        assert_eq!(obj.geometries[2].object, "car");
        assert_eq!(obj.geometries[2].groups, vec!["wheels", "left"]);
        assert!(obj.geometries.iter().all(|g| !g.data.position.is_empty()));
    }

    #[test]
    fn switching_without_faces_emits_nothing() {
        let src = "usemtl a\nusemtl b\ng x\no y\n";
        let obj = parse_obj(src);
        assert!(obj.geometries.is_empty());
    }

    #[test]
    fn unknown_keyword_is_reported_once() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nxyz foo\ns 1\nf 1 2 3\n";
        let obj = parse_obj(src);
        assert_eq!(obj.geometries.len(), 1);
        assert_eq!(
            obj.unhandled,
            vec![Unhandled {
                line: 4,
                keyword: "xyz".into()
            }]
        );
    }

    #[test]
    fn bad_faces_are_skipped_whole() {
        let src = r#"
            v 0 0 0
            v 1 0 0
            v 0 1 0
            f 1 2 9
            f 0 1 2
            f 1 2
            f a b c
            f 1 2 3
        "#;
        let obj = parse_obj(src);
        assert_eq!(obj.geometries.len(), 1);
        assert_eq!(obj.geometries[0].data.triangle_count(), 1);
    }

    #[test]
    fn resolve_index_bounds() {
        // pool of 3 real entries plus sentinel
        assert_eq!(resolve_index("1", 4).unwrap(), 1);
        assert_eq!(resolve_index("3", 4).unwrap(), 3);
        assert_eq!(resolve_index("-1", 4).unwrap(), 3);
        assert_eq!(resolve_index("-3", 4).unwrap(), 1);
        assert!(resolve_index("-4", 4).is_err());
        assert!(resolve_index("4", 4).is_err());
        assert!(resolve_index("0", 4).is_err());
    }
}
