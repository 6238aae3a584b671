//! Implementation of the `ovpack init` command.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use ovpack_lib::init::{InitOptions, init};

use crate::output::symbols;

/// Scaffold `ovpack.toml` and the launcher scripts in `path`.
///
/// # Errors
///
/// Returns an error if any of the files already exist and `force` is not set.
pub fn cmd_init(path: &Path, force: bool) -> Result<()> {
  let result = init(&InitOptions {
    project_dir: path.to_path_buf(),
    force,
  })
  .context("Failed to initialize project")?;

  println!(
    "{} {}",
    symbols::SUCCESS.green(),
    "Initialized ovpack project!".green().bold()
  );
  println!();
  println!("  {} Project file: {}", symbols::INFO.cyan(), result.project_file.display());
  println!("  {} Launcher:     {}", symbols::INFO.cyan(), result.run_sh.display());
  println!("  {} Launcher:     {}", symbols::INFO.cyan(), result.run_bat.display());
  println!();
  println!("{}", "Next steps:".bold());
  println!(
    "  1. Edit {} to match your application",
    result.project_file.display().to_string().cyan()
  );
  println!(
    "  2. Run: {}",
    format!("ovpack build --project {}", result.project_dir.display()).cyan()
  );
  Ok(())
}
