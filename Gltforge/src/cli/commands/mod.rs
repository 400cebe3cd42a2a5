//! CLI command definitions

use clap::Subcommand;
use std::path::PathBuf;

pub mod execute;
pub mod export;
pub mod inspect;

#[derive(Subcommand)]
pub enum Commands {
    /// Export a JSON scene description as glTF 2.0
    Export {
        /// Scene description (JSON)
        #[arg(short, long)]
        scene: PathBuf,

        /// Output path without extension (e.g. `out/scene`)
        #[arg(short, long)]
        output: PathBuf,

        /// Write a single .glb instead of .gltf + .bin
        #[arg(short, long)]
        binary: bool,

        /// Indent the .gltf JSON
        #[arg(long, conflicts_with = "binary")]
        pretty: bool,

        /// Reference textures in place instead of copying them next to the .gltf
        #[arg(long)]
        no_copy_textures: bool,

        /// Value for asset.copyright
        #[arg(long)]
        copyright: Option<String>,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show the header and chunk table of a .glb file
    Inspect {
        /// GLB file
        path: PathBuf,

        /// Also print the JSON chunk, indented
        #[arg(long)]
        json: bool,
    },
}
