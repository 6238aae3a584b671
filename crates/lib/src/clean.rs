//! Removal of build outputs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::config::ProjectLayout;

#[derive(Debug, Error)]
pub enum CleanError {
  #[error("refusing to remove {}: it contains the project directory", path.display())]
  ContainsProject { path: PathBuf },

  #[error("failed to remove {}: {source}", path.display())]
  Remove { path: PathBuf, source: io::Error },
}

/// Remove the output and bundler work directories.
///
/// Returns the directories that existed and were removed.
pub fn clean(layout: &ProjectLayout) -> Result<Vec<PathBuf>, CleanError> {
  let mut removed = Vec::new();
  for dir in [&layout.dist_dir, &layout.work_dir] {
    if remove_dir(dir, &layout.project_dir)? {
      removed.push(dir.clone());
    }
  }
  Ok(removed)
}

fn remove_dir(dir: &Path, project_dir: &Path) -> Result<bool, CleanError> {
  let canonical = |p: &Path| dunce::canonicalize(p).unwrap_or_else(|_| p.to_path_buf());
  if canonical(project_dir).starts_with(canonical(dir)) {
    return Err(CleanError::ContainsProject { path: dir.to_path_buf() });
  }
  match fs::remove_dir_all(dir) {
    Ok(()) => {
      info!(path = %dir.display(), "removed");
      Ok(true)
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
    Err(source) => Err(CleanError::Remove {
      path: dir.to_path_buf(),
      source,
    }),
  }
}
