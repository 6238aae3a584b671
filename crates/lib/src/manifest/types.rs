//! Types for the requirements manifest.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("requirements manifest not found: {}", path.display())]
  Missing { path: PathBuf },

  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("{}:{line}: {message}", path.display())]
  Invalid { path: PathBuf, line: usize, message: String },
}

/// A single package requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
  pub name: String,
  pub extras: Vec<String>,
  /// Version specifier or direct reference, verbatim (e.g. `>=1.21`).
  pub version: Option<String>,
  /// Environment marker, verbatim (e.g. `sys_platform == 'win32'`).
  pub marker: Option<String>,
}

/// One meaningful line of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestEntry {
  Requirement(Requirement),
  /// pip option line such as `--index-url ...` or `-r other.txt`.
  Option(String),
}

/// Parsed requirements manifest, in file order.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
  pub entries: Vec<ManifestEntry>,
}

impl Manifest {
  pub fn requirements(&self) -> impl Iterator<Item = &Requirement> {
    self.entries.iter().filter_map(|e| match e {
      ManifestEntry::Requirement(r) => Some(r),
      ManifestEntry::Option(_) => None,
    })
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
