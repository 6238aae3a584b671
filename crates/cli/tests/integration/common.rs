//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Shell script standing in for a Python interpreter.
///
/// Understands the three modules the pipeline runs:
/// - `-m venv DIR` copies itself to `DIR/bin/python`
/// - `-m pip ...` logs the call and succeeds
/// - `-m PyInstaller` answers `--version`, otherwise writes `<distpath>/<name>`
///
/// Every call is appended to `calls.log` next to the project.
#[cfg(unix)]
const FAKE_PYTHON: &str = r#"#!/bin/sh
log="${OVPACK_TEST_LOG:-/dev/null}"
echo "$*" >> "$log"
if [ "$1" != "-m" ]; then
  exit 2
fi
module="$2"
shift 2
case "$module" in
  venv)
    mkdir -p "$1/bin"
    cp "$0" "$1/bin/python"
    chmod 755 "$1/bin/python"
    ;;
  pip)
    [ -n "$OVPACK_TEST_FAIL_PIP" ] && { echo "ERROR: No matching distribution" >&2; exit 1; }
    ;;
  PyInstaller)
    [ "$1" = "--version" ] && { echo "6.3.0"; exit 0; }
    name=""
    dist=""
    while [ $# -gt 0 ]; do
      case "$1" in
        --name) name="$2"; shift ;;
        --distpath) dist="$2"; shift ;;
      esac
      shift
    done
    mkdir -p "$dist"
    printf 'fake executable\n' > "$dist/$name"
    ;;
  *)
    exit 2
    ;;
esac
exit 0
"#;

/// Isolated project directory with the overlay sources and a fake interpreter.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create a project laid out like the overlay application.
  pub fn overlay() -> Self {
    let env = Self::empty();
    env.write_file("python/cyber_watch.py", "print('overlay')\n");
    env.write_file("requirements.txt", "# runtime\nnumpy>=1.21\npynput\n");
    env.write_file("setup.py", "setup(\n    name=\"FreeOverlay\",\n    version=\"9.0.0\",\n)\n");
    env.install_fake_python();
    env
  }

  pub fn empty() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  /// Write a file relative to the project directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Path of the stand-in interpreter (outside the project tree).
  pub fn fake_python(&self) -> PathBuf {
    self.temp.path().join("tools").join("python3")
  }

  pub fn calls_log(&self) -> PathBuf {
    self.temp.path().join("calls.log")
  }

  /// Logged interpreter calls, one per line.
  pub fn calls(&self) -> Vec<String> {
    std::fs::read_to_string(self.calls_log())
      .unwrap_or_default()
      .lines()
      .map(str::to_string)
      .collect()
  }

  #[cfg(unix)]
  fn install_fake_python(&self) {
    use std::os::unix::fs::PermissionsExt;

    let path = self.fake_python();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, FAKE_PYTHON).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  }

  #[cfg(not(unix))]
  fn install_fake_python(&self) {}

  /// Get a pre-configured Command for the ovpack binary.
  ///
  /// Runs in the project directory with the call log redirected into the
  /// temp dir.
  pub fn ovpack_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("ovpack");
    cmd.current_dir(self.root());
    cmd.env("OVPACK_TEST_LOG", self.calls_log());
    cmd.env_remove("OVPACK_TEST_FAIL_PIP");
    cmd.env_remove("GITHUB_REF_NAME");
    cmd.env_remove("SOURCE_DATE_EPOCH");
    cmd.env_remove("RUST_LOG");
    cmd
  }

  /// `ovpack build` for the host platform using the fake interpreter.
  pub fn build_cmd(&self) -> Command {
    let mut cmd = self.ovpack_cmd();
    cmd.arg("build").arg("--python").arg(self.fake_python());
    cmd
  }
}
