//! External program execution.
//!
//! Every step that shells out (venv creation, pip, the bundler) goes through
//! [`CommandRunner`], so the pipeline can be driven by a fake in tests and the
//! real [`SystemRunner`] everywhere else. Calls block until the child exits;
//! no timeout is applied.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

/// A fully specified program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub program: PathBuf,
  pub args: Vec<OsString>,
  pub cwd: Option<PathBuf>,
}

impl Invocation {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: None,
    }
  }

  pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
    self.args.push(arg.as_ref().to_os_string());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
  {
    self.args.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
    self
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  /// True if any argument equals `needle`.
  pub fn has_arg(&self, needle: &str) -> bool {
    self.args.iter().any(|a| a == needle)
  }

  /// The argument following `flag`, if present.
  pub fn arg_after(&self, flag: &str) -> Option<&OsStr> {
    let pos = self.args.iter().position(|a| a == flag)?;
    self.args.get(pos + 1).map(OsString::as_os_str)
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program.display())?;
    for arg in &self.args {
      write!(f, " {}", arg.to_string_lossy())?;
    }
    Ok(())
  }
}

/// Outcome of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
  pub success: bool,
  /// Exit code; `None` when terminated by a signal.
  pub code: Option<i32>,
  /// Captured stderr. Empty when stdio is inherited.
  pub stderr: String,
}

impl RunOutput {
  pub fn ok() -> Self {
    Self {
      success: true,
      code: Some(0),
      stderr: String::new(),
    }
  }

  pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
    Self {
      success: false,
      code: Some(code),
      stderr: stderr.into(),
    }
  }

  /// Exit description plus the stderr tail, for error messages.
  pub fn failure_summary(&self) -> String {
    let status = match self.code {
      Some(code) => format!("exit code {}", code),
      None => "terminated by signal".to_string(),
    };
    let tail = self.stderr_tail(5);
    if tail.is_empty() {
      status
    } else {
      format!("{}:\n{}", status, tail)
    }
  }

  /// Last few lines of stderr, for diagnostics.
  pub fn stderr_tail(&self, lines: usize) -> String {
    let all: Vec<&str> = self.stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
  }
}

/// Runs external programs to completion.
pub trait CommandRunner {
  /// Run `invocation` and wait for it.
  ///
  /// # Errors
  ///
  /// Returns an I/O error only if the process could not be spawned (for
  /// example the program does not exist). A non-zero exit is not an error here.
  fn run(&self, invocation: &Invocation) -> std::io::Result<RunOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
  fn run(&self, invocation: &Invocation) -> std::io::Result<RunOutput> {
    (**self).run(invocation)
  }
}

/// Runs commands on the host with `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner {
  /// Capture child output instead of streaming it to the terminal.
  pub quiet: bool,
}

impl SystemRunner {
  pub fn new(quiet: bool) -> Self {
    Self { quiet }
  }
}

impl CommandRunner for SystemRunner {
  fn run(&self, invocation: &Invocation) -> std::io::Result<RunOutput> {
    info!(cmd = %invocation, "executing command");

    let mut command = Command::new(&invocation.program);
    command.args(&invocation.args).stdin(Stdio::null());
    if let Some(cwd) = &invocation.cwd {
      command.current_dir(cwd);
    }

    if !self.quiet {
      let status = command.status()?;
      return Ok(RunOutput {
        success: status.success(),
        code: status.code(),
        stderr: String::new(),
      });
    }

    let output = command.output()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !stdout.trim().is_empty() {
      debug!(stdout = %stdout.trim_end(), "command stdout");
    }
    if !stderr.trim().is_empty() {
      debug!(stderr = %stderr.trim_end(), "command stderr");
    }

    Ok(RunOutput {
      success: output.status.success(),
      code: output.status.code(),
      stderr,
    })
  }
}

/// Resolve `program` the way the OS would when spawning it.
///
/// Bare names are searched on `PATH` (with `.exe` appended on Windows); paths
/// with a separator are returned as-is if they exist.
pub fn which(program: &Path) -> Option<PathBuf> {
  if program.components().count() > 1 {
    return program.is_file().then(|| program.to_path_buf());
  }
  let path_var = std::env::var_os("PATH")?;
  std::env::split_paths(&path_var).find_map(|dir| {
    let candidate = dir.join(program);
    if candidate.is_file() {
      return Some(candidate);
    }
    if cfg!(windows) {
      let exe = candidate.with_extension("exe");
      if exe.is_file() {
        return Some(exe);
      }
    }
    None
  })
}
