//! Host detection.
//!
//! Detection is a pure function of the running binary. The result is captured
//! once in [`crate::config::BuildConfig`] and never re-read mid-pipeline.

pub mod arch;
pub mod os;

pub use arch::Arch;
pub use os::{Platform, detect};

/// Platform identifier for display (e.g. "linux-x86_64")
pub fn host_triple() -> String {
  format!("{}-{}", Platform::current(), Arch::current())
}

/// Path of the interpreter inside a virtual environment.
///
/// The layout follows the host, not the build target, since the venv is always
/// created on the machine running the build.
pub fn venv_interpreter(venv: &std::path::Path) -> std::path::PathBuf {
  if cfg!(windows) {
    venv.join("Scripts").join("python.exe")
  } else {
    venv.join("bin").join("python")
  }
}
