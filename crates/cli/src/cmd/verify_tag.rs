//! Implementation of the `ovpack verify-tag` command.
//!
//! Used by CI before publishing: the pushed tag must name the version the
//! archives will carry.

use std::path::Path;

use anyhow::{Context, Result, bail};

use ovpack_lib::config::{BuildConfig, ConfigOverrides};
use ovpack_lib::release::verify_tag;

use crate::output::print_success;

pub fn cmd_verify_tag(project: &Path, tag: Option<&str>) -> Result<()> {
  let Some(tag) = tag else {
    bail!("No release tag given (pass one or set GITHUB_REF_NAME)");
  };
  let config =
    BuildConfig::resolve(project, &ConfigOverrides::default()).context("Failed to load build configuration")?;

  let version = verify_tag(tag, &config.version)?;
  print_success(&format!("Tag {} matches {} {}", tag, config.product_name, version));
  Ok(())
}
