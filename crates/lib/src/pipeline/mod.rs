//! Build orchestration.
//!
//! Runs the four steps in fixed order, each consuming the previous step's
//! output:
//!
//! ```text
//! Provision -> Detect -> Compile -> Archive
//! ```
//!
//! The first failing step ends the run; no later step is attempted. A run ends
//! in exactly one of two states: `Ok(BuildReport)` with both artifacts on
//! disk, or `Err(BuildError)` naming the failed step.

mod types;

use std::time::Instant;

use tracing::{error, info};

use crate::archive;
use crate::compile;
use crate::config::BuildConfig;
use crate::process::CommandRunner;
use crate::provision;

pub use types::{Artifact, ArtifactKind, BuildError, BuildReport, Step, StepEvent};

/// Options that change how the pipeline runs, not what it builds.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
  /// Create the venv and install dependencies. When false the manifest is
  /// still validated.
  pub install: bool,
}

impl Default for PipelineOptions {
  fn default() -> Self {
    Self { install: true }
  }
}

/// A single build run over an immutable configuration.
pub struct Pipeline<'a, R: CommandRunner> {
  config: &'a BuildConfig,
  runner: R,
  options: PipelineOptions,
}

impl<'a, R: CommandRunner> Pipeline<'a, R> {
  pub fn new(config: &'a BuildConfig, runner: R) -> Self {
    Self {
      config,
      runner,
      options: PipelineOptions::default(),
    }
  }

  pub fn with_options(mut self, options: PipelineOptions) -> Self {
    self.options = options;
    self
  }

  /// Run every step without progress reporting.
  pub fn run(&self) -> Result<BuildReport, BuildError> {
    self.run_with(|_| {})
  }

  /// Run every step, calling `observer` as each one starts and finishes.
  pub fn run_with<F: FnMut(StepEvent)>(&self, mut observer: F) -> Result<BuildReport, BuildError> {
    let started = Instant::now();
    info!(
      product = %self.config.product_name,
      version = %self.config.version,
      platform = %self.config.platform,
      "starting build"
    );

    let result = self.execute(&mut observer, started);
    match &result {
      Ok(report) => info!(
        artifacts = report.artifacts.len(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "build succeeded"
      ),
      Err(e) => error!(step = %e.step(), error = %e, "build failed"),
    }
    result
  }

  fn execute<F: FnMut(StepEvent)>(&self, observer: &mut F, started: Instant) -> Result<BuildReport, BuildError> {
    let config = self.config;

    let provisioned = self.step(Step::Provision, observer, || {
      provision::provision(&config.python, &config.project_dir, &self.runner, self.options.install)
        .map_err(BuildError::from)
    })?;

    let format = self.step(Step::Detect, observer, || {
      config
        .archive_format()
        .ok_or(BuildError::UnsupportedPlatform(config.platform))
    })?;

    let executable = self.step(Step::Compile, observer, || {
      compile::compile(config, &provisioned.python, &self.runner).map_err(BuildError::from)
    })?;

    let archive_path = self.step(Step::Archive, observer, || {
      let dest = config
        .archive_path()
        .ok_or(BuildError::UnsupportedPlatform(config.platform))?;
      archive::package(
        config.platform,
        &executable,
        &config.assets,
        &dest,
        config.source_date_epoch,
      )
      .map_err(BuildError::from)
    })?;

    Ok(BuildReport {
      product_name: config.product_name.clone(),
      version: config.version.clone(),
      platform: config.platform,
      archive_format: format,
      artifacts: vec![
        Artifact::describe(ArtifactKind::Executable, executable)?,
        Artifact::describe(ArtifactKind::Archive, archive_path)?,
      ],
      elapsed: started.elapsed(),
    })
  }

  fn step<T, F, G>(&self, step: Step, observer: &mut F, body: G) -> Result<T, BuildError>
  where
    F: FnMut(StepEvent),
    G: FnOnce() -> Result<T, BuildError>,
  {
    observer(StepEvent::Started(step));
    let started = Instant::now();
    let result = body();
    match &result {
      Ok(_) => observer(StepEvent::Finished(step, started.elapsed())),
      Err(_) => observer(StepEvent::Failed(step)),
    }
    result
  }
}
