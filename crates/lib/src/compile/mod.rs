//! Executable compilation through the bundler (PyInstaller).
//!
//! Policy applied to every build:
//! - single-file output (`--onefile`), never a dependency directory
//! - maximum bytecode optimization (`--optimize 2`)
//! - debug symbols stripped on Linux (`--strip`)
//! - no console window on Windows (`--windowed`) unless overridden
//!
//! The bundler runs under the provisioned interpreter as `python -m PyInstaller`.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::BuildConfig;
use crate::platform::Platform;
use crate::process::{CommandRunner, Invocation};

/// Module name the bundler is invoked as.
pub const BUNDLER_MODULE: &str = "PyInstaller";

#[derive(Debug, Error)]
pub enum CompileError {
  #[error("entry point not found: {}", path.display())]
  EntryPointMissing { path: PathBuf },

  #[error("bundler is not available under {}: {detail}", python.display())]
  BundlerMissing { python: PathBuf, detail: String },

  #[error("bundler failed: {detail}")]
  CompileFailed { detail: String },

  #[error("bundler finished but produced no executable at {}", path.display())]
  ExecutableMissing { path: PathBuf },

  #[error("failed to prepare output directory {}: {source}", path.display())]
  Prepare { path: PathBuf, source: std::io::Error },
}

/// Windows builds hide the console unless asked otherwise.
pub fn windowed_by_default(platform: Platform) -> bool {
  platform == Platform::Windows
}

/// Linux builds strip debug symbols.
pub fn strip_by_default(platform: Platform) -> bool {
  platform == Platform::Linux
}

/// Bundler arguments for `config`, without the interpreter.
pub fn bundler_args(config: &BuildConfig) -> Vec<String> {
  let bundler = &config.bundler;
  let mut args: Vec<String> = vec![
    "-m".into(),
    BUNDLER_MODULE.into(),
    "--noconfirm".into(),
    "--name".into(),
    config.product_name.clone(),
    "--onefile".into(),
    "--optimize".into(),
    bundler.optimize.to_string(),
  ];

  if bundler.windowed {
    args.push("--windowed".into());
  }
  if bundler.strip {
    args.push("--strip".into());
  }

  if config.platform == Platform::Windows {
    for (flag, path) in [("--icon", &bundler.icon), ("--version-file", &bundler.version_file)] {
      match path {
        Some(p) if p.is_file() => {
          args.push(flag.into());
          args.push(p.display().to_string());
        }
        Some(p) => debug!(path = %p.display(), "{} file not found, skipping", flag),
        None => {}
      }
    }
  }

  for path in &bundler.search_paths {
    args.push("--paths".into());
    args.push(path.display().to_string());
  }
  for import in &bundler.hidden_imports {
    args.push(format!("--hidden-import={}", import));
  }

  args.extend([
    "--distpath".into(),
    config.dist_dir.display().to_string(),
    "--workpath".into(),
    config.work_dir.display().to_string(),
    "--specpath".into(),
    config.work_dir.display().to_string(),
  ]);
  args.extend(bundler.extra_args.iter().cloned());
  args.push(config.entry_point.display().to_string());
  args
}

/// Check that `python -m PyInstaller` can be imported.
pub fn probe_bundler<R: CommandRunner>(python: &Path, runner: &R) -> Result<(), CompileError> {
  let invocation = Invocation::new(python).args(["-m", BUNDLER_MODULE, "--version"]);
  let missing = |detail: String| CompileError::BundlerMissing {
    python: python.to_path_buf(),
    detail,
  };
  match runner.run(&invocation) {
    Ok(output) if output.success => Ok(()),
    Ok(output) => Err(missing(output.failure_summary())),
    Err(e) => Err(missing(e.to_string())),
  }
}

/// Remove this target's executable and archive left by an earlier run, so a
/// failed compile cannot leave a stale artifact that looks current.
pub fn remove_stale_artifacts(config: &BuildConfig) -> Result<(), CompileError> {
  let stale = std::iter::once(config.executable_path()).chain(config.archive_path());
  for path in stale {
    match fs::remove_file(&path) {
      Ok(()) => debug!(path = %path.display(), "removed stale artifact"),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
      Err(source) => return Err(CompileError::Prepare { path, source }),
    }
  }
  Ok(())
}

/// Compile the entry point into a single executable and return its path.
pub fn compile<R: CommandRunner>(config: &BuildConfig, python: &Path, runner: &R) -> Result<PathBuf, CompileError> {
  if !config.entry_point.is_file() {
    return Err(CompileError::EntryPointMissing {
      path: config.entry_point.clone(),
    });
  }
  if config.platform != Platform::current() {
    warn!(
      target = %config.platform,
      host = %Platform::current(),
      "bundler cannot cross-compile; the executable will be built for the host"
    );
  }

  probe_bundler(python, runner)?;
  remove_stale_artifacts(config)?;
  fs::create_dir_all(&config.dist_dir).map_err(|source| CompileError::Prepare {
    path: config.dist_dir.clone(),
    source,
  })?;

  let invocation = Invocation::new(python)
    .args(bundler_args(config))
    .current_dir(&config.project_dir);
  info!(
    product = %config.product_name,
    version = %config.version,
    platform = %config.platform,
    "compiling executable"
  );

  let output = runner.run(&invocation).map_err(|e| CompileError::CompileFailed {
    detail: format!("could not start {}: {}", python.display(), e),
  })?;
  if !output.success {
    return Err(CompileError::CompileFailed {
      detail: output.failure_summary(),
    });
  }

  let executable = config.executable_path();
  if !executable.is_file() {
    return Err(CompileError::ExecutableMissing { path: executable });
  }
  info!(path = %executable.display(), "executable built");
  Ok(executable)
}
