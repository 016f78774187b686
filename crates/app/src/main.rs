//! Entry point for the wavemesh inspector.
//! Loads an OBJ (and its materials) through the headless context and logs
//! what a renderer would receive.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use platform::FsFetcher;
use renderer::{HeadlessContext, LoadOptions, MeshLoader};

struct Args {
    model: PathBuf,
    material: Option<PathBuf>,
    root: PathBuf,
    skip_textures: bool,
}

fn parse_args() -> Result<Args> {
    // Accept: <model.obj> [--mtl=path] [--root=dir] [--skip-textures]
    let mut model = None;
    let mut material = None;
    let mut root = PathBuf::from(".");
    let mut skip_textures = false;

    for arg in std::env::args().skip(1) {
        if let Some(val) = arg.strip_prefix("--mtl=") {
            material = Some(PathBuf::from(val));
        } else if let Some(val) = arg.strip_prefix("--root=") {
            root = PathBuf::from(val);
        } else if arg == "--skip-textures" {
            skip_textures = true;
        } else if arg.starts_with("--") {
            log::warn!("Unknown flag '{}', ignoring.", arg);
        } else if model.is_none() {
            model = Some(PathBuf::from(arg));
        } else {
            bail!("Only one model path may be given (extra: '{}')", arg);
        }
    }

    let Some(model) = model else {
        bail!("Usage: app <model.obj> [--mtl=<file.mtl>] [--root=<dir>] [--skip-textures]");
    };
    Ok(Args {
        model,
        material,
        root,
        skip_textures,
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let fetcher = FsFetcher::new(&args.root)?;
    let gfx = HeadlessContext::new();

    let mut options = LoadOptions::default();
    if let Some(mtl) = &args.material {
        options = options.with_material_override(mtl);
    }

    let mesh = pollster::block_on(MeshLoader::new(&fetcher, &gfx).load(&args.model, &options))
        .with_context(|| format!("Failed to load {}", args.model.display()))?;

    for (i, part) in mesh.parts.iter().enumerate() {
        log::info!(
            "part {}: object='{}' groups={:?} material='{}' vertices={} texcoord={} normal={} color={}",
            i,
            part.object,
            part.groups,
            part.material_name,
            part.vertex_count,
            part.supplied.texcoord,
            part.supplied.normal,
            part.supplied.color
        );
        log::info!(
            "  diffuse={:?} specular={:?} shininess={} opacity={}",
            part.material.diffuse,
            part.material.specular,
            part.material.shininess,
            part.material.opacity
        );
    }
    if let Some(extents) = mesh.extents {
        log::info!(
            "extents: min={:?} max={:?} center={:?}",
            extents.min,
            extents.max,
            extents.center()
        );
    }
    if !mesh.unhandled.is_empty() {
        log::info!("{} lines with unhandled keywords", mesh.unhandled.len());
    }

    if args.skip_textures {
        log::info!("Skipping {} texture uploads", mesh.uploads.len());
    } else {
        let report = pollster::block_on(mesh.uploads.run(&fetcher, &gfx));
        log::info!(
            "Textures: {} created, {} loaded, {} left as placeholder",
            gfx.textures().len(),
            report.loaded,
            report.failed
        );
    }

    Ok(())
}
