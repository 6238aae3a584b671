//! Implementation of the `ovpack provision` command.
//!
//! Creates the virtual environment and installs the requirements manifest
//! without compiling anything.

use std::path::Path;

use anyhow::{Context, Result};

use ovpack_lib::config::{BuildConfig, ConfigOverrides};
use ovpack_lib::process::SystemRunner;
use ovpack_lib::provision::provision;

use crate::output::{print_stat, print_success};

pub fn cmd_provision(project: &Path, overrides: &ConfigOverrides, quiet: bool) -> Result<()> {
  let config = BuildConfig::resolve(project, overrides).context("Failed to load build configuration")?;

  let result = provision(
    &config.python,
    &config.project_dir,
    &SystemRunner::new(quiet),
    true,
  )
  .context("Dependency provisioning failed")?;

  print_success("Dependencies installed");
  print_stat("Interpreter", &result.python.display().to_string());
  print_stat("Manifest", &config.python.manifest.display().to_string());
  print_stat("Requirements", &result.manifest.requirements().count().to_string());
  if result.venv_created {
    print_stat("Created venv", "yes");
  }
  Ok(())
}
