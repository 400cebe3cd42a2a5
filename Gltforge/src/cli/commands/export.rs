//! Scene export command

use std::path::Path;
use std::time::Instant;

use anyhow::Context;

use crate::cli::progress::{CUBE, DISK, LOOKING_GLASS, WARNING, export_bar, print_done, print_step, update_bar};
use crate::export::{CancellationToken, ExportOptions, ExportProgress, export_scene_with_options};
use crate::scene::Scene;

/// Arguments of `gltforge export`.
pub struct ExportArgs<'a> {
    pub scene: &'a Path,
    pub output: &'a Path,
    pub binary: bool,
    pub pretty: bool,
    pub copy_textures: bool,
    pub copyright: Option<&'a str>,
    pub quiet: bool,
}

/// Load a scene description and export it.
pub fn execute(args: &ExportArgs<'_>) -> anyhow::Result<()> {
    let started = Instant::now();

    print_step(1, 3, LOOKING_GLASS, &format!("Reading {}...", args.scene.display()));
    let scene = Scene::from_json_file(args.scene)
        .with_context(|| format!("failed to load scene {}", args.scene.display()))?;
    println!(
        "      {} meshes, {} lights, {} cameras, {} materials",
        scene.meshes.len(),
        scene.lights.len(),
        scene.cameras.len(),
        scene.materials.len()
    );

    let mut options = ExportOptions::new()
        .with_binary(args.binary)
        .with_pretty(args.pretty)
        .with_copy_textures(args.copy_textures)
        .with_cancellation(CancellationToken::new());
    if let Some(copyright) = args.copyright {
        options = options.with_copyright(copyright);
    }

    let format = if args.binary { "GLB" } else { "glTF" };
    print_step(2, 3, CUBE, &format!("Exporting {format}..."));

    let pb = (!args.quiet).then(export_bar);
    let on_progress = |progress: &ExportProgress| {
        if let Some(pb) = &pb {
            update_bar(pb, progress);
        }
    };
    let options = options.with_progress(&on_progress);

    let result = export_scene_with_options(&scene, args.output, &options);
    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }
    let report = result.with_context(|| format!("failed to export {}", args.scene.display()))?;

    print_step(3, 3, DISK, "Written:");
    for path in &report.output_files {
        println!("      {}", path.display());
    }
    println!(
        "      {} nodes, {} meshes, {} materials, {} images, {} buffer bytes",
        report.node_count,
        report.mesh_count,
        report.material_count,
        report.image_count,
        report.binary_bytes
    );

    if !report.warnings.is_empty() || !report.errors.is_empty() {
        println!(
            "{}{} warnings, {} skipped nodes (see log)",
            WARNING,
            report.warnings.len(),
            report.errors.len()
        );
    }

    print_done(started.elapsed());
    Ok(())
}
