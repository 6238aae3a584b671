//! Template content for `ovpack init`.

/// Project file with every key at its default, commented where optional.
pub const PROJECT_TOML_TEMPLATE: &str = r#"# ovpack build configuration

[package]
name = "FreeOverlay"
# Read from pyproject.toml or setup.py when omitted.
# version = "9.0.0"
entry = "python/cyber_watch.py"
assets = []

[paths]
dist = "dist"
work = "build"
search = ["python"]

[python]
venv = ".venv"
requirements = "requirements.txt"
extra_packages = ["pyinstaller"]

[bundler]
hidden_imports = [
  "openvr",
  "numpy",
  "PIL",
  "psutil",
  "pyautogui",
  "mss",
  "OpenGL",
  "glfw",
]
optimize = 2
icon = "icon.ico"
version_file = "version_info.txt"

[bundler.windows]
hidden_imports = ["winsdk"]
"#;

/// POSIX launcher: create the venv on first run, install, start the app.
/// Contains `{venv}`, `{requirements}` and `{entry}` placeholders.
pub const RUN_SH_TEMPLATE: &str = r#"#!/bin/sh
set -e
cd "$(dirname "$0")"

if ! command -v python3 >/dev/null 2>&1; then
  echo "python3 not found; install Python 3.8 or newer" >&2
  exit 1
fi

if [ ! -x "{venv}/bin/python" ]; then
  python3 -m venv "{venv}"
fi

"{venv}/bin/python" -m pip install --disable-pip-version-check -q -r "{requirements}"
exec "{venv}/bin/python" "{entry}" "$@"
"#;

/// Windows launcher, same steps as [`RUN_SH_TEMPLATE`].
pub const RUN_BAT_TEMPLATE: &str = "@echo off\r
setlocal\r
cd /d \"%~dp0\"\r
\r
where python >nul 2>nul\r
if errorlevel 1 (\r
  echo python not found; install Python 3.8 or newer 1>&2\r
  exit /b 1\r
)\r
\r
if not exist \"{venv}\\Scripts\\python.exe\" (\r
  python -m venv \"{venv}\" || exit /b 1\r
)\r
\r
\"{venv}\\Scripts\\python.exe\" -m pip install --disable-pip-version-check -q -r \"{requirements}\" || exit /b 1\r
\"{venv}\\Scripts\\python.exe\" \"{entry}\" %*\r
";
