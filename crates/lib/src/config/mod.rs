//! Build configuration.
//!
//! [`BuildConfig::resolve`] merges, in increasing precedence:
//! 1. built-in defaults,
//! 2. the project file (`ovpack.toml`) and application metadata,
//! 3. explicit overrides from the command line,
//!
//! together with the detected platform, into one immutable value that every
//! pipeline step receives. Nothing downstream consults the environment again.

mod file;

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::archive::ArchiveFormat;
use crate::compile;
use crate::consts::{
  DEFAULT_DIST_DIR, DEFAULT_ENTRY_POINT, DEFAULT_EXTRA_PACKAGES, DEFAULT_HIDDEN_IMPORTS, DEFAULT_ICON,
  DEFAULT_INTERPRETER, DEFAULT_MANIFEST, DEFAULT_PRODUCT_NAME, DEFAULT_SEARCH_PATH, DEFAULT_VENV_DIR,
  DEFAULT_VERSION_FILE, DEFAULT_WINDOWS_HIDDEN_IMPORTS, DEFAULT_WORK_DIR, MAX_OPTIMIZE_LEVEL, PROJECT_FILE,
};
use crate::metadata::{self, MetadataError};
use crate::platform::Platform;

pub use file::{BundlerSection, PackageSection, PathsSection, PlatformSection, ProjectFile, PythonSection};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("project directory not found: {}", path.display())]
  ProjectDir { path: PathBuf },

  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse {}: {source}", path.display())]
  Parse { path: PathBuf, source: toml::de::Error },

  #[error("could not determine version: {0}")]
  Version(#[from] MetadataError),

  #[error("invalid product name '{0}': must be non-empty and contain no path separators")]
  InvalidProductName(String),

  #[error("invalid version '{0}': must be non-empty and contain no whitespace or path separators")]
  InvalidVersion(String),

  #[error("invalid SOURCE_DATE_EPOCH '{0}': expected seconds since the Unix epoch")]
  InvalidSourceDateEpoch(String),
}

/// Values supplied on the command line. `None` leaves the project setting.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
  pub platform: Option<Platform>,
  pub dist_dir: Option<PathBuf>,
  pub version: Option<String>,
  pub interpreter: Option<PathBuf>,
  pub manifest: Option<PathBuf>,
  /// Keep the console window on Windows builds.
  pub console: bool,
}

/// Where a project keeps its outputs. Resolvable without version metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectLayout {
  pub project_dir: PathBuf,
  pub dist_dir: PathBuf,
  pub work_dir: PathBuf,
}

impl ProjectLayout {
  pub fn resolve(project_dir: &Path, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
    let project_dir = canonical_project_dir(project_dir)?;
    let file = load_project_file(&project_dir)?;
    Ok(Self::from_parts(project_dir, &file.paths, overrides))
  }

  fn from_parts(project_dir: PathBuf, paths: &PathsSection, overrides: &ConfigOverrides) -> Self {
    let dist_dir = match &overrides.dist_dir {
      Some(dir) => project_dir.join(dir),
      None => project_dir.join(paths.dist.as_deref().unwrap_or(Path::new(DEFAULT_DIST_DIR))),
    };
    let work_dir = project_dir.join(paths.work.as_deref().unwrap_or(Path::new(DEFAULT_WORK_DIR)));
    Self {
      project_dir,
      dist_dir,
      work_dir,
    }
  }
}

/// Interpreter and dependency settings for the provisioning step.
#[derive(Debug, Clone, Serialize)]
pub struct PythonConfig {
  /// Base interpreter; a bare name is looked up on `PATH`.
  pub interpreter: PathBuf,
  pub venv: Option<PathBuf>,
  pub manifest: PathBuf,
  pub extra_packages: Vec<String>,
}

/// Bundler flags with platform policy already applied.
#[derive(Debug, Clone, Serialize)]
pub struct BundlerConfig {
  pub search_paths: Vec<PathBuf>,
  pub hidden_imports: Vec<String>,
  pub optimize: u8,
  pub windowed: bool,
  pub strip: bool,
  pub icon: Option<PathBuf>,
  pub version_file: Option<PathBuf>,
  pub extra_args: Vec<String>,
}

/// Immutable description of one build run.
#[derive(Debug, Clone, Serialize)]
pub struct BuildConfig {
  pub project_dir: PathBuf,
  pub product_name: String,
  pub version: String,
  pub entry_point: PathBuf,
  pub dist_dir: PathBuf,
  pub work_dir: PathBuf,
  pub platform: Platform,
  pub assets: Vec<PathBuf>,
  pub python: PythonConfig,
  pub bundler: BundlerConfig,
  /// Fixed mtime for archive entries, from `SOURCE_DATE_EPOCH`.
  pub source_date_epoch: Option<u64>,
}

impl BuildConfig {
  /// Load `ovpack.toml` (if present) from `project_dir` and resolve it for
  /// the host platform, or for `overrides.platform` when given.
  pub fn resolve(project_dir: &Path, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
    let project_dir = canonical_project_dir(project_dir)?;
    let file = load_project_file(&project_dir)?;
    let platform = overrides.platform.unwrap_or_else(crate::platform::detect);
    let source_date_epoch = source_date_epoch_from_env()?;
    Self::from_parts(project_dir, file, overrides, platform, source_date_epoch)
  }

  /// Resolve from already-loaded parts. `project_dir` must be absolute.
  pub fn from_parts(
    project_dir: PathBuf,
    file: ProjectFile,
    overrides: &ConfigOverrides,
    platform: Platform,
    source_date_epoch: Option<u64>,
  ) -> Result<Self, ConfigError> {
    let ProjectFile {
      package,
      paths,
      python,
      bundler,
    } = file;

    let product_name = package.name.unwrap_or_else(|| DEFAULT_PRODUCT_NAME.to_string());
    if !is_plain_component(&product_name) {
      return Err(ConfigError::InvalidProductName(product_name));
    }

    let version = match overrides.version.clone().or(package.version) {
      Some(v) => v,
      None => metadata::read_version(&project_dir)?,
    };
    let version = version.trim().to_string();
    if !is_plain_component(&version) || version.contains(char::is_whitespace) {
      return Err(ConfigError::InvalidVersion(version));
    }

    let ProjectLayout {
      project_dir,
      dist_dir,
      work_dir,
    } = ProjectLayout::from_parts(project_dir, &paths, overrides);
    let at = |p: &Path| project_dir.join(p);

    let entry_point = at(package.entry.as_deref().unwrap_or(Path::new(DEFAULT_ENTRY_POINT)));
    let search_paths = paths
      .search
      .unwrap_or_else(|| vec![PathBuf::from(DEFAULT_SEARCH_PATH)])
      .iter()
      .map(|p| at(p))
      .collect();
    let assets = package.assets.iter().map(|p| at(p)).collect();

    let interpreter = overrides
      .interpreter
      .clone()
      .or(python.interpreter)
      .unwrap_or_else(|| PathBuf::from(DEFAULT_INTERPRETER));
    let interpreter = if interpreter.components().count() > 1 {
      at(&interpreter)
    } else {
      interpreter
    };
    let venv = match python.venv {
      Some(dir) if dir.as_os_str().is_empty() => None,
      Some(dir) => Some(at(&dir)),
      None => Some(at(Path::new(DEFAULT_VENV_DIR))),
    };
    let manifest = match &overrides.manifest {
      Some(m) => at(m),
      None => at(python.requirements.as_deref().unwrap_or(Path::new(DEFAULT_MANIFEST))),
    };
    let extra_packages = python
      .extra_packages
      .unwrap_or_else(|| owned(DEFAULT_EXTRA_PACKAGES));

    let platform_section = match platform {
      Platform::Windows => bundler.windows,
      Platform::Linux => bundler.linux,
      Platform::MacOs => bundler.macos,
      Platform::Unknown => PlatformSection::default(),
    };
    let mut hidden_imports = bundler.hidden_imports.unwrap_or_else(|| owned(DEFAULT_HIDDEN_IMPORTS));
    let platform_imports = platform_section.hidden_imports.unwrap_or_else(|| match platform {
      Platform::Windows => owned(DEFAULT_WINDOWS_HIDDEN_IMPORTS),
      _ => Vec::new(),
    });
    for import in platform_imports {
      if !hidden_imports.contains(&import) {
        hidden_imports.push(import);
      }
    }
    let mut extra_args = bundler.extra_args;
    extra_args.extend(platform_section.extra_args);

    let optimize = match bundler.optimize {
      Some(level) if level > MAX_OPTIMIZE_LEVEL => {
        warn!(level, max = MAX_OPTIMIZE_LEVEL, "optimize level out of range, clamping");
        MAX_OPTIMIZE_LEVEL
      }
      Some(level) => level,
      None => MAX_OPTIMIZE_LEVEL,
    };
    let windowed = !overrides.console && bundler.windowed.unwrap_or_else(|| compile::windowed_by_default(platform));
    let strip = bundler.strip.unwrap_or_else(|| compile::strip_by_default(platform));

    let config = Self {
      product_name,
      version,
      entry_point,
      dist_dir,
      work_dir,
      platform,
      assets,
      python: PythonConfig {
        interpreter,
        venv,
        manifest,
        extra_packages,
      },
      bundler: BundlerConfig {
        search_paths,
        hidden_imports,
        optimize,
        windowed,
        strip,
        icon: optional_file(bundler.icon, DEFAULT_ICON).map(|p| at(&p)),
        version_file: optional_file(bundler.version_file, DEFAULT_VERSION_FILE).map(|p| at(&p)),
        extra_args,
      },
      source_date_epoch,
      project_dir,
    };
    debug!(
      product = %config.product_name,
      version = %config.version,
      platform = %config.platform,
      "resolved build configuration"
    );
    Ok(config)
  }

  pub fn layout(&self) -> ProjectLayout {
    ProjectLayout {
      project_dir: self.project_dir.clone(),
      dist_dir: self.dist_dir.clone(),
      work_dir: self.work_dir.clone(),
    }
  }

  /// Archive format for the target, `None` for an unsupported platform.
  pub fn archive_format(&self) -> Option<ArchiveFormat> {
    ArchiveFormat::for_platform(self.platform)
  }

  /// File name of the bundled executable, e.g. `FreeOverlay.exe`.
  pub fn executable_name(&self) -> String {
    format!("{}{}", self.product_name, self.platform.exe_suffix())
  }

  pub fn executable_path(&self) -> PathBuf {
    self.dist_dir.join(self.executable_name())
  }

  /// File name of the distributable, e.g. `FreeOverlay-Linux-9.0.0.tar.gz`.
  pub fn archive_name(&self) -> Option<String> {
    let format = self.archive_format()?;
    Some(format!(
      "{}-{}-{}.{}",
      self.product_name,
      self.platform.label(),
      self.version,
      format.extension()
    ))
  }

  pub fn archive_path(&self) -> Option<PathBuf> {
    self.archive_name().map(|name| self.dist_dir.join(name))
  }
}

fn canonical_project_dir(project_dir: &Path) -> Result<PathBuf, ConfigError> {
  dunce::canonicalize(project_dir).map_err(|_| ConfigError::ProjectDir {
    path: project_dir.to_path_buf(),
  })
}

fn owned(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

/// Configured path, the default when unset, or nothing when set to "".
fn optional_file(configured: Option<PathBuf>, default: &str) -> Option<PathBuf> {
  match configured {
    Some(p) if p.as_os_str().is_empty() => None,
    Some(p) => Some(p),
    None => Some(PathBuf::from(default)),
  }
}

fn load_project_file(project_dir: &Path) -> Result<ProjectFile, ConfigError> {
  let path = project_dir.join(PROJECT_FILE);
  if !path.is_file() {
    debug!(path = %path.display(), "no project file, using defaults");
    return Ok(ProjectFile::default());
  }
  let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
    path: path.clone(),
    source,
  })?;
  toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
}

fn source_date_epoch_from_env() -> Result<Option<u64>, ConfigError> {
  match std::env::var("SOURCE_DATE_EPOCH") {
    Ok(value) if !value.trim().is_empty() => value
      .trim()
      .parse()
      .map(Some)
      .map_err(|_| ConfigError::InvalidSourceDateEpoch(value)),
    _ => Ok(None),
  }
}

/// Usable as a single file name component.
fn is_plain_component(s: &str) -> bool {
  !s.is_empty() && s != "." && s != ".." && !s.contains(['/', '\\'])
}
