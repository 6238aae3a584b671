//! Implementation of the `ovpack clean` command.

use std::path::Path;

use anyhow::{Context, Result};

use ovpack_lib::clean::clean;
use ovpack_lib::config::{ConfigOverrides, ProjectLayout};

use crate::output::{print_info, print_success};

/// Remove the output and bundler work directories of the project.
pub fn cmd_clean(project: &Path, overrides: &ConfigOverrides) -> Result<()> {
  let layout = ProjectLayout::resolve(project, overrides).context("Failed to load project layout")?;
  let removed = clean(&layout).context("Failed to clean build outputs")?;

  if removed.is_empty() {
    print_info("Nothing to clean");
  }
  for dir in removed {
    print_success(&format!("Removed {}", dir.display()));
  }
  Ok(())
}
