//! Command execution implementations

use super::Commands;
use super::export::ExportArgs;
use super::{export, inspect};

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Export {
                scene,
                output,
                binary,
                pretty,
                no_copy_textures,
                copyright,
                quiet,
            } => export::execute(&ExportArgs {
                scene,
                output,
                binary: *binary,
                pretty: *pretty,
                copy_textures: !*no_copy_textures,
                copyright: copyright.as_deref(),
                quiet: *quiet,
            }),
            Commands::Inspect { path, json } => inspect::execute(path, *json),
        }
    }
}
