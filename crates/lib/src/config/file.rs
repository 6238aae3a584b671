//! On-disk shape of `ovpack.toml`.
//!
//! Every key is optional; missing sections fall back to the defaults in
//! [`crate::consts`]. Unknown keys are rejected so typos surface early.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectFile {
  pub package: PackageSection,
  pub paths: PathsSection,
  pub python: PythonSection,
  pub bundler: BundlerSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageSection {
  pub name: Option<String>,
  pub version: Option<String>,
  pub entry: Option<PathBuf>,
  pub assets: Vec<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsSection {
  pub dist: Option<PathBuf>,
  pub work: Option<PathBuf>,
  pub search: Option<Vec<PathBuf>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PythonSection {
  pub interpreter: Option<PathBuf>,
  /// Virtual environment directory; an empty string disables the venv.
  pub venv: Option<PathBuf>,
  pub requirements: Option<PathBuf>,
  pub extra_packages: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundlerSection {
  /// Replaces the built-in list when set.
  pub hidden_imports: Option<Vec<String>>,
  pub optimize: Option<u8>,
  pub windowed: Option<bool>,
  pub strip: Option<bool>,
  /// An empty string disables the icon.
  pub icon: Option<PathBuf>,
  /// An empty string disables the version resource.
  pub version_file: Option<PathBuf>,
  pub extra_args: Vec<String>,
  pub windows: PlatformSection,
  pub linux: PlatformSection,
  pub macos: PlatformSection,
}

/// Additions applied only when building for one platform.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlatformSection {
  /// Replaces the platform's built-in additions when set.
  pub hidden_imports: Option<Vec<String>>,
  pub extra_args: Vec<String>,
}
