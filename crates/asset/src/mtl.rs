//! MTL material-library parser.

use std::collections::HashMap;

use crate::{
    material::MaterialProperties,
    tokenize::{Statement, Unhandled, parse_floats, statements},
};

/// Materials declared in one (possibly concatenated) MTL text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MtlData {
    pub materials: HashMap<String, MaterialProperties>,
    pub unhandled: Vec<Unhandled>,
}

/// Parse MTL text. A repeated `newmtl` name replaces the earlier record.
pub fn parse_mtl(text: &str) -> MtlData {
    let mut data = MtlData::default();
    let mut current: Option<(String, MaterialProperties)> = None;

    for st in statements(text) {
        if st.keyword == "newmtl" {
            if let Some((name, props)) = current.take() {
                data.materials.insert(name, props);
            }
            current = Some((st.rest.to_string(), MaterialProperties::default()));
            continue;
        }

        let Some((_, props)) = current.as_mut() else {
            if !is_known(st.keyword) {
                data.unhandled.push(Unhandled::report(&st, "mtl"));
            } else {
                log::debug!("'{}' outside of newmtl on line {}", st.keyword, st.line);
            }
            continue;
        };
        if !apply(props, &st) {
            data.unhandled.push(Unhandled::report(&st, "mtl"));
        }
    }

    if let Some((name, props)) = current {
        data.materials.insert(name, props);
    }
    data
}

fn is_known(keyword: &str) -> bool {
    matches!(
        keyword,
        "Ns" | "Ka" | "Kd" | "Ks" | "Ke" | "Ni" | "d" | "illum" | "map_Kd" | "map_Ns" | "map_Bump"
    )
}

/// Apply one statement to the open material. Returns `false` for keywords
/// this parser does not handle.
fn apply(props: &mut MaterialProperties, st: &Statement<'_>) -> bool {
    match st.keyword {
        "Ns" => set(&mut props.shininess, parse_floats::<1>(st).map(|[v]| v)),
        "Ni" => set(&mut props.optical_density, parse_floats::<1>(st).map(|[v]| v)),
        "d" => set(&mut props.opacity, parse_floats::<1>(st).map(|[v]| v)),
        "Ka" => set(&mut props.ambient, parse_floats::<3>(st)),
        "Kd" => set(&mut props.diffuse, parse_floats::<3>(st)),
        "Ks" => set(&mut props.specular, parse_floats::<3>(st)),
        "Ke" => set(&mut props.emissive, parse_floats::<3>(st)),
        "illum" => {
            let parsed = st.args.first().and_then(|t| t.parse::<i32>().ok());
            if parsed.is_none() {
                log::warn!("invalid illum value on line {}", st.line);
            }
            set(&mut props.illum, parsed);
        }
        // Option flags are not parsed: the whole remainder is the filename.
        "map_Kd" => set(&mut props.diffuse_map, texture_name(st)),
        "map_Ns" => set(&mut props.specular_map, texture_name(st)),
        "map_Bump" => set(&mut props.normal_map, texture_name(st)),
        _ => return false,
    }
    true
}

fn set<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn texture_name(st: &Statement<'_>) -> Option<String> {
    if st.rest.is_empty() {
        log::warn!("'{}' without a filename on line {}", st.keyword, st.line);
        None
    } else {
        Some(st.rest.to_string())
    }
}
