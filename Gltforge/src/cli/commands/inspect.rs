//! GLB inspection command

use std::path::Path;

use crate::gltf::read_glb_info;

/// Print the header and chunk table of a GLB file.
pub fn execute(path: &Path, show_json: bool) -> anyhow::Result<()> {
    println!("Inspecting GLB file: {}", path.display());
    println!();

    let bytes = std::fs::read(path)?;
    let info = read_glb_info(&bytes)?;

    println!("GLB Container");
    println!("=============");
    println!("Version:     {}", info.version);
    println!("Length:      {} bytes", info.length);
    println!("Chunks:      {}", info.chunks.len());
    println!();

    println!("Chunks:");
    println!("-------");
    for (i, chunk) in info.chunks.iter().enumerate() {
        println!(
            "  [{i:2}] {:<7} | offset {:>8} | {:>8} bytes",
            chunk.type_name(),
            chunk.offset,
            chunk.length
        );
    }

    let document: serde_json::Value = serde_json::from_str(&info.json)?;
    println!();
    for key in ["nodes", "meshes", "materials", "images", "bufferViews", "accessors"] {
        let count = document
            .get(key)
            .and_then(serde_json::Value::as_array)
            .map_or(0, Vec::len);
        println!("{key:<12} {count}");
    }

    if show_json {
        println!();
        println!("{}", serde_json::to_string_pretty(&document)?);
    }

    Ok(())
}
