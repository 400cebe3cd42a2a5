//! Gltforge command-line entry point

fn main() -> anyhow::Result<()> {
    gltforge::cli::run_cli()
}
