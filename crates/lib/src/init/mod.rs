//! Scaffold a project for ovpack.
//!
//! Writes into the project directory:
//! - `ovpack.toml` with the overlay's defaults
//! - `run.sh` / `run.bat` launchers that provision a venv and start the app

mod templates;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::{DEFAULT_ENTRY_POINT, DEFAULT_MANIFEST, DEFAULT_VENV_DIR, PROJECT_FILE};

pub use templates::{PROJECT_TOML_TEMPLATE, RUN_BAT_TEMPLATE, RUN_SH_TEMPLATE};

#[derive(Debug, Error)]
pub enum InitError {
  #[error("file already exists: {}", path.display())]
  PathExists { path: PathBuf },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error("failed to write file {}: {source}", path.display())]
  WriteFile { path: PathBuf, source: std::io::Error },
}

pub struct InitOptions {
  pub project_dir: PathBuf,
  /// Overwrite existing files.
  pub force: bool,
}

#[derive(Debug)]
pub struct InitResult {
  pub project_dir: PathBuf,
  pub project_file: PathBuf,
  pub run_sh: PathBuf,
  pub run_bat: PathBuf,
}

/// Write the project file and launchers.
///
/// # Errors
///
/// Fails without writing anything if any target exists and `force` is false.
pub fn init(options: &InitOptions) -> Result<InitResult, InitError> {
  let project_dir = &options.project_dir;
  fs::create_dir_all(project_dir).map_err(|source| InitError::CreateDir {
    path: project_dir.clone(),
    source,
  })?;
  let project_dir = dunce::canonicalize(project_dir).unwrap_or_else(|_| project_dir.clone());

  let project_file = project_dir.join(PROJECT_FILE);
  let run_sh = project_dir.join("run.sh");
  let run_bat = project_dir.join("run.bat");

  if !options.force {
    for path in [&project_file, &run_sh, &run_bat] {
      if path.exists() {
        return Err(InitError::PathExists { path: path.clone() });
      }
    }
  }

  write(&project_file, PROJECT_TOML_TEMPLATE)?;
  write(&run_sh, &render_launcher(RUN_SH_TEMPLATE, '/'))?;
  write(&run_bat, &render_launcher(RUN_BAT_TEMPLATE, '\\'))?;
  make_executable(&run_sh)?;

  Ok(InitResult {
    project_dir,
    project_file,
    run_sh,
    run_bat,
  })
}

/// Fill launcher placeholders, using `sep` as the path separator.
pub fn render_launcher(template: &str, sep: char) -> String {
  let native = |p: &str| p.replace('/', &sep.to_string());
  template
    .replace("{venv}", &native(DEFAULT_VENV_DIR))
    .replace("{requirements}", &native(DEFAULT_MANIFEST))
    .replace("{entry}", &native(DEFAULT_ENTRY_POINT))
}

fn write(path: &Path, content: &str) -> Result<(), InitError> {
  debug!(path = %path.display(), "writing");
  fs::write(path, content).map_err(|source| InitError::WriteFile {
    path: path.to_path_buf(),
    source,
  })
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), InitError> {
  use std::os::unix::fs::PermissionsExt;
  fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|source| InitError::WriteFile {
    path: path.to_path_buf(),
    source,
  })
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), InitError> {
  Ok(())
}
