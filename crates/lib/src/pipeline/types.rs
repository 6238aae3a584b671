//! Types for build orchestration: steps, progress events, artifacts, errors.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::archive::{ArchiveError, ArchiveFormat};
use crate::compile::CompileError;
use crate::platform::Platform;
use crate::provision::ProvisionError;
use crate::util::hash::{ContentHash, hash_file};

/// One stage of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
  Provision,
  Detect,
  Compile,
  Archive,
}

impl Step {
  pub fn describe(&self) -> &'static str {
    match self {
      Step::Provision => "Provisioning dependencies",
      Step::Detect => "Checking target platform",
      Step::Compile => "Compiling executable",
      Step::Archive => "Creating archive",
    }
  }
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Step::Provision => "provision",
      Step::Detect => "detect",
      Step::Compile => "compile",
      Step::Archive => "archive",
    };
    write!(f, "{}", name)
  }
}

/// Progress notification passed to the pipeline observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
  Started(Step),
  Finished(Step, Duration),
  Failed(Step),
}

/// Errors that end a build. Each belongs to exactly one step.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error(transparent)]
  Provision(#[from] ProvisionError),

  #[error("unsupported platform '{0}': no packaging format is defined for it")]
  UnsupportedPlatform(Platform),

  #[error(transparent)]
  Compile(#[from] CompileError),

  #[error(transparent)]
  Archive(#[from] ArchiveError),

  #[error("failed to inspect artifact {}: {source}", path.display())]
  Inspect { path: PathBuf, source: std::io::Error },
}

impl BuildError {
  /// The step that failed.
  pub fn step(&self) -> Step {
    match self {
      BuildError::Provision(_) => Step::Provision,
      BuildError::UnsupportedPlatform(_) => Step::Detect,
      BuildError::Compile(_) => Step::Compile,
      BuildError::Archive(ArchiveError::UnsupportedPlatform(_)) => Step::Detect,
      BuildError::Archive(_) | BuildError::Inspect { .. } => Step::Archive,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
  Executable,
  Archive,
}

/// A file produced by the build.
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
  pub kind: ArtifactKind,
  pub path: PathBuf,
  pub size: u64,
  pub sha256: ContentHash,
}

impl Artifact {
  pub fn describe(kind: ArtifactKind, path: PathBuf) -> Result<Self, BuildError> {
    let inspect = |source| BuildError::Inspect {
      path: path.clone(),
      source,
    };
    let size = std::fs::metadata(&path).map_err(inspect)?.len();
    let sha256 = hash_file(&path).map_err(inspect)?;
    Ok(Self {
      kind,
      path,
      size,
      sha256,
    })
  }
}

/// Summary of a successful build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
  pub product_name: String,
  pub version: String,
  pub platform: Platform,
  pub archive_format: ArchiveFormat,
  /// Executable first, archive second.
  pub artifacts: Vec<Artifact>,
  #[serde(serialize_with = "serialize_millis", rename = "elapsed_ms")]
  pub elapsed: Duration,
}

impl BuildReport {
  pub fn executable(&self) -> Option<&Artifact> {
    self.artifacts.iter().find(|a| a.kind == ArtifactKind::Executable)
  }

  pub fn archive(&self) -> Option<&Artifact> {
    self.artifacts.iter().find(|a| a.kind == ArtifactKind::Archive)
  }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
  s.serialize_u64(d.as_millis() as u64)
}
