//! Test utilities for ovpack-lib.
//!
//! Cross-platform shell helpers for tests that spawn real processes, and a
//! recording [`FakeRunner`] that stands in for python, pip and the bundler.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::process::{CommandRunner, Invocation, RunOutput};

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Returns a command that prints `msg` to stderr and exits with `code`.
#[cfg(unix)]
pub fn shell_fail(msg: &str, code: i32) -> (&'static str, Vec<String>) {
  shell_cmd(&format!("echo {} >&2; exit {}", msg, code))
}

#[cfg(windows)]
pub fn shell_fail(msg: &str, code: i32) -> (&'static str, Vec<String>) {
  shell_cmd(&format!("echo {} 1>&2 & exit /b {}", msg, code))
}

/// Which kind of tool an invocation targets, judged by its `-m` module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
  Venv,
  Pip,
  BundlerProbe,
  Bundler,
  Other,
}

pub fn classify(inv: &Invocation) -> Tool {
  match inv.arg_after("-m").and_then(|m| m.to_str()) {
    Some("venv") => Tool::Venv,
    Some("pip") => Tool::Pip,
    Some("PyInstaller") if inv.has_arg("--version") => Tool::BundlerProbe,
    Some("PyInstaller") => Tool::Bundler,
    _ => Tool::Other,
  }
}

/// Records every invocation and simulates the tools' filesystem effects.
///
/// - `-m venv DIR` creates the venv interpreter file
/// - `-m PyInstaller ...` writes `<distpath>/<name>[.exe]`
///
/// Individual tools can be made to fail, or to succeed without output.
#[derive(Debug, Default)]
pub struct FakeRunner {
  pub calls: RefCell<Vec<Invocation>>,
  pub fail: Option<(Tool, i32)>,
  pub missing: Option<Tool>,
  /// Bundler exits 0 but writes nothing.
  pub bundler_no_output: bool,
  /// Suffix the simulated bundler appends (".exe" for Windows targets).
  pub exe_suffix: String,
}

impl FakeRunner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn failing(tool: Tool, code: i32) -> Self {
    Self {
      fail: Some((tool, code)),
      ..Self::default()
    }
  }

  pub fn tools(&self) -> Vec<Tool> {
    self.calls.borrow().iter().map(classify).collect()
  }

  pub fn calls_to(&self, tool: Tool) -> Vec<Invocation> {
    self.calls.borrow().iter().filter(|i| classify(i) == tool).cloned().collect()
  }
}

impl CommandRunner for FakeRunner {
  fn run(&self, inv: &Invocation) -> std::io::Result<RunOutput> {
    self.calls.borrow_mut().push(inv.clone());
    let tool = classify(inv);

    if self.missing == Some(tool) {
      return Err(std::io::Error::new(std::io::ErrorKind::NotFound, "program not found"));
    }
    if let Some((_, code)) = self.fail.filter(|(failing, _)| *failing == tool) {
      return Ok(RunOutput::failed(code, format!("{:?} exploded", tool)));
    }

    match tool {
      Tool::Venv => {
        let dir = PathBuf::from(inv.args.last().cloned().unwrap_or_default());
        let python = crate::platform::venv_interpreter(&dir);
        fs::create_dir_all(python.parent().unwrap())?;
        fs::write(python, "#!fake-python")?;
      }
      Tool::Bundler if !self.bundler_no_output => {
        let dist = PathBuf::from(inv.arg_after("--distpath").unwrap());
        let name = inv.arg_after("--name").unwrap().to_string_lossy().into_owned();
        fs::create_dir_all(&dist)?;
        fs::write(dist.join(format!("{}{}", name, self.exe_suffix)), b"\x7fELF fake overlay binary")?;
      }
      _ => {}
    }

    Ok(RunOutput::ok())
  }
}

/// Lay out a minimal overlay project: entry script, manifest, metadata.
pub fn overlay_project(root: &Path) {
  fs::create_dir_all(root.join("python")).unwrap();
  fs::write(root.join("python/cyber_watch.py"), "print('overlay')\n").unwrap();
  fs::write(root.join("requirements.txt"), "numpy>=1.21\n").unwrap();
  fs::write(root.join("setup.py"), "setup(name=\"FreeOverlay\", version=\"9.0.0\")\n").unwrap();
}
