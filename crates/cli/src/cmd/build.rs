//! Implementation of the `ovpack build` command.
//!
//! Runs the full pipeline (provision, platform check, compile, archive) and
//! prints the produced artifacts. Any failure exits non-zero with the failing
//! step named in the diagnostic.

use std::path::PathBuf;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use tracing::debug;

use ovpack_lib::clean::clean;
use ovpack_lib::config::{BuildConfig, ConfigOverrides};
use ovpack_lib::pipeline::{Pipeline, PipelineOptions};
use ovpack_lib::process::SystemRunner;
use ovpack_lib::release::verify_tag;

use crate::output::{OutputFormat, print_build_summary, print_info, print_json, print_step, print_warning};

pub struct BuildOptions {
  pub project: PathBuf,
  pub overrides: ConfigOverrides,
  pub install: bool,
  pub clean: bool,
  pub tag: Option<String>,
  pub quiet: bool,
  pub output: OutputFormat,
}

/// Execute the build command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be resolved, the release tag
/// does not match, or any pipeline step fails.
pub fn cmd_build(options: BuildOptions) -> Result<()> {
  let config = BuildConfig::resolve(&options.project, &options.overrides).context("Failed to load build configuration")?;
  debug!(?config, "resolved build configuration");
  let json = options.output.is_json();

  if let Some(tag) = &options.tag {
    verify_tag(tag, &config.version).context("Release tag check failed")?;
  }

  if options.clean {
    let removed = clean(&config.layout()).context("Failed to clean previous build")?;
    if !json {
      for dir in removed {
        print_info(&format!("Removed {}", dir.display()));
      }
    }
  }

  if !json {
    println!(
      "{} {} {} for {}",
      "Building".bold(),
      config.product_name.cyan(),
      config.version.cyan(),
      config.platform.label()
    );
    if !options.install {
      print_warning("Skipping dependency installation");
    }
  }

  // JSON output must stay parseable, so child output is captured.
  let runner = SystemRunner::new(options.quiet || json);
  let report = Pipeline::new(&config, runner)
    .with_options(PipelineOptions {
      install: options.install,
    })
    .run_with(|event| {
      if !json {
        print_step(&event);
      }
    })
    .map_err(|e| {
      let step = e.step();
      anyhow::Error::new(e).context(format!("Build failed during {} step", step))
    })?;

  if json {
    print_json(&report)?;
  } else {
    print_build_summary(&report);
  }
  Ok(())
}
