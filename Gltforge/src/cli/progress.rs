//! CLI progress display utilities
//!
//! Step indicators and the percentage bar fed by the exporter's progress
//! callback.

use std::time::Duration;

use console::{Emoji, style};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

use crate::export::ExportProgress;

/// Magnifying glass - for reading/scanning operations
pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
/// Floppy disk - for writing/saving operations
pub static DISK: Emoji<'_, '_> = Emoji("💾 ", "");
/// Cube - for 3D model operations
pub static CUBE: Emoji<'_, '_> = Emoji("📐 ", "");
/// Sparkles - for completion
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");
/// Warning sign - for contained problems
pub static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "! ");

/// Print a step indicator: `[1/3] 🔍 Message...`
pub fn print_step(current: usize, total: usize, emoji: Emoji, msg: &str) {
    println!(
        "{} {}{}",
        style(format!("[{current}/{total}]")).bold().dim(),
        emoji,
        msg
    );
}

/// Print completion message: `✨ Done in 2s`
pub fn print_done(elapsed: Duration) {
    println!("{} Done in {}", SPARKLE, HumanDuration(elapsed));
}

/// Progress bar style with percentage
///
/// Format: `Exporting nodes [████████░░░░░░░░] 50%`
///
/// # Panics
/// Panics if the template string is invalid (this is a compile-time constant).
#[must_use]
pub fn percent_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg:>20} [{bar:40.cyan/blue}] {pos:>3}%")
        .expect("valid template")
        .progress_chars("##-")
}

/// A 0-100 bar for export progress updates.
#[must_use]
pub fn export_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(percent_style());
    pb
}

/// Apply an export progress update to `pb`.
pub fn update_bar(pb: &ProgressBar, progress: &ExportProgress) {
    pb.set_position(u64::from(progress.percent));
    match &progress.current_item {
        Some(item) => pb.set_message(format!("{} ({item})", progress.phase.as_str())),
        None => pb.set_message(progress.phase.as_str()),
    }
}
