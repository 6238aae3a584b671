//! Dependency provisioning.
//!
//! Makes sure an isolated interpreter exists and has the requirements
//! manifest installed, mirroring what the `run.sh` / `run.bat` launchers do by
//! hand:
//! 1. validate the manifest (fails before anything is spawned)
//! 2. create the virtual environment if its interpreter is missing
//! 3. `pip install -r <manifest>` plus the bundler package, in one invocation
//!
//! A single failed install aborts provisioning; nothing is retried.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::PythonConfig;
use crate::manifest::{Manifest, ManifestError};
use crate::platform::venv_interpreter;
use crate::process::{CommandRunner, Invocation};

#[derive(Debug, Error)]
pub enum ProvisionError {
  #[error("requirements manifest not found: {}", path.display())]
  MissingManifest { path: PathBuf },

  #[error("invalid requirements manifest: {0}")]
  InvalidManifest(#[source] ManifestError),

  #[error("could not start interpreter '{}': {source}", program.display())]
  InterpreterUnavailable { program: PathBuf, source: std::io::Error },

  #[error("failed to create virtual environment at {}: {detail}", path.display())]
  VenvFailed { path: PathBuf, detail: String },

  #[error("dependency installation failed: {detail}")]
  DependencyInstallFailed { detail: String },
}

impl From<ManifestError> for ProvisionError {
  fn from(err: ManifestError) -> Self {
    match err {
      ManifestError::Missing { path } => ProvisionError::MissingManifest { path },
      other => ProvisionError::InvalidManifest(other),
    }
  }
}

/// Result of provisioning.
#[derive(Debug)]
pub struct Provisioned {
  /// Interpreter the bundler must run under.
  pub python: PathBuf,
  pub manifest: Manifest,
  pub venv_created: bool,
  pub installed: bool,
}

/// Provision the environment described by `config`.
///
/// With `install == false` the manifest is still validated and an existing
/// venv is still picked up, but nothing is created or installed.
pub fn provision<R: CommandRunner>(
  config: &PythonConfig,
  project_dir: &Path,
  runner: &R,
  install: bool,
) -> Result<Provisioned, ProvisionError> {
  let manifest = Manifest::load(&config.manifest)?;
  let count = manifest.requirements().count();
  if count == 0 {
    warn!(path = %config.manifest.display(), "requirements manifest lists no packages");
  }

  let (python, venv_created) = match &config.venv {
    Some(venv) => ensure_venv(config, venv, project_dir, runner, install)?,
    None => (config.interpreter.clone(), false),
  };

  if !install {
    info!(python = %python.display(), "skipping dependency installation");
    return Ok(Provisioned {
      python,
      manifest,
      venv_created,
      installed: false,
    });
  }

  let invocation = install_invocation(&python, &config.manifest, &config.extra_packages).current_dir(project_dir);
  info!(requirements = count, extra = ?config.extra_packages, "installing dependencies");

  let output = runner.run(&invocation).map_err(|e| ProvisionError::DependencyInstallFailed {
    detail: format!("could not start {}: {}", python.display(), e),
  })?;
  if !output.success {
    return Err(ProvisionError::DependencyInstallFailed {
      detail: output.failure_summary(),
    });
  }

  Ok(Provisioned {
    python,
    manifest,
    venv_created,
    installed: true,
  })
}

/// `<python> -m pip install ... -r <manifest> <extra...>`
pub fn install_invocation(python: &Path, manifest: &Path, extra_packages: &[String]) -> Invocation {
  Invocation::new(python)
    .args(["-m", "pip", "install", "--disable-pip-version-check", "--no-input", "-r"])
    .arg(manifest)
    .args(extra_packages)
}

fn ensure_venv<R: CommandRunner>(
  config: &PythonConfig,
  venv: &Path,
  project_dir: &Path,
  runner: &R,
  install: bool,
) -> Result<(PathBuf, bool), ProvisionError> {
  let python = venv_interpreter(venv);
  if python.is_file() {
    debug!(venv = %venv.display(), "reusing virtual environment");
    return Ok((python, false));
  }
  if !install {
    warn!(
      venv = %venv.display(),
      "virtual environment missing, using {}",
      config.interpreter.display()
    );
    return Ok((config.interpreter.clone(), false));
  }

  info!(venv = %venv.display(), "creating virtual environment");
  let invocation = Invocation::new(&config.interpreter)
    .args(["-m", "venv"])
    .arg(venv)
    .current_dir(project_dir);
  let output = runner
    .run(&invocation)
    .map_err(|source| ProvisionError::InterpreterUnavailable {
      program: config.interpreter.clone(),
      source,
    })?;

  if !output.success {
    return Err(ProvisionError::VenvFailed {
      path: venv.to_path_buf(),
      detail: output.failure_summary(),
    });
  }
  if !python.is_file() {
    return Err(ProvisionError::VenvFailed {
      path: venv.to_path_buf(),
      detail: format!("interpreter {} was not created", python.display()),
    });
  }
  Ok((python, true))
}
