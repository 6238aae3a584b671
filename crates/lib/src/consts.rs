//! Names and defaults shared across the pipeline.

/// Name of the tool, used for the project file and temporary file prefixes.
pub const APP_NAME: &str = "ovpack";

/// Project file read from the project directory.
pub const PROJECT_FILE: &str = "ovpack.toml";

pub const DEFAULT_PRODUCT_NAME: &str = "FreeOverlay";
pub const DEFAULT_ENTRY_POINT: &str = "python/cyber_watch.py";
pub const DEFAULT_DIST_DIR: &str = "dist";
pub const DEFAULT_WORK_DIR: &str = "build";
pub const DEFAULT_SEARCH_PATH: &str = "python";
pub const DEFAULT_VENV_DIR: &str = ".venv";
pub const DEFAULT_MANIFEST: &str = "requirements.txt";

/// Packages installed alongside the manifest so the bundler is importable.
pub const DEFAULT_EXTRA_PACKAGES: &[&str] = &["pyinstaller"];

/// Modules the overlay imports dynamically, which the bundler's static
/// analysis would otherwise miss.
pub const DEFAULT_HIDDEN_IMPORTS: &[&str] = &[
  "openvr",
  "numpy",
  "PIL",
  "psutil",
  "pyautogui",
  "mss",
  "OpenGL",
  "glfw",
];

/// Windows-only additions to [`DEFAULT_HIDDEN_IMPORTS`].
pub const DEFAULT_WINDOWS_HIDDEN_IMPORTS: &[&str] = &["winsdk"];

/// Resource files picked up for Windows builds when present.
pub const DEFAULT_ICON: &str = "icon.ico";
pub const DEFAULT_VERSION_FILE: &str = "version_info.txt";

/// Highest optimization level the bundler accepts.
pub const MAX_OPTIMIZE_LEVEL: u8 = 2;

#[cfg(windows)]
pub const DEFAULT_INTERPRETER: &str = "python";
#[cfg(not(windows))]
pub const DEFAULT_INTERPRETER: &str = "python3";
