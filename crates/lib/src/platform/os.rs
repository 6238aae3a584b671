use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operating system a build targets.
///
/// `Unknown` is a valid detection result but has no packaging format, so the
/// pipeline refuses to go past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
  Windows,
  Linux,
  MacOs,
  Unknown,
}

impl Platform {
  /// Detect the host operating system at runtime
  pub fn current() -> Self {
    Self::from_os_name(std::env::consts::OS)
  }

  /// Map a `std::env::consts::OS` style identifier to a platform
  pub fn from_os_name(name: &str) -> Self {
    match name {
      "windows" => Self::Windows,
      "linux" => Self::Linux,
      "macos" => Self::MacOs,
      _ => Self::Unknown,
    }
  }

  /// Returns the lowercase identifier for this platform
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Windows => "windows",
      Self::Linux => "linux",
      Self::MacOs => "macos",
      Self::Unknown => "unknown",
    }
  }

  /// Label embedded in archive names (e.g. `FreeOverlay-Linux-9.0.0.tar.gz`)
  pub fn label(&self) -> &'static str {
    match self {
      Self::Windows => "Windows",
      Self::Linux => "Linux",
      Self::MacOs => "macOS",
      Self::Unknown => "Unknown",
    }
  }

  pub fn is_supported(&self) -> bool {
    !matches!(self, Self::Unknown)
  }

  /// File suffix the bundler appends to executables on this platform
  pub fn exe_suffix(&self) -> &'static str {
    match self {
      Self::Windows => ".exe",
      _ => "",
    }
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Platform {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "windows" | "win32" | "win" => Ok(Self::Windows),
      "linux" => Ok(Self::Linux),
      "macos" | "darwin" | "osx" => Ok(Self::MacOs),
      other => Err(format!("unknown platform '{}' (expected windows, linux or macos)", other)),
    }
  }
}

/// Detect the platform this binary is running on.
///
/// Hosts other than Windows, Linux and macOS yield [`Platform::Unknown`].
pub fn detect() -> Platform {
  Platform::current()
}
