//! Shared helpers for library tests.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use ovpack_lib::config::{BuildConfig, ConfigOverrides, ProjectFile};
use ovpack_lib::platform::{Platform, venv_interpreter};
use ovpack_lib::process::{CommandRunner, Invocation, RunOutput};

/// Plays the part of venv, pip and the bundler.
#[derive(Default)]
pub struct ScriptedRunner {
  pub log: RefCell<Vec<String>>,
  /// Module whose invocation exits non-zero.
  pub fail_module: Option<&'static str>,
  pub exe_suffix: &'static str,
}

impl ScriptedRunner {
  pub fn for_platform(platform: Platform) -> Self {
    Self {
      exe_suffix: platform.exe_suffix(),
      ..Self::default()
    }
  }

  pub fn modules(&self) -> Vec<String> {
    self.log.borrow().clone()
  }
}

impl CommandRunner for ScriptedRunner {
  fn run(&self, inv: &Invocation) -> std::io::Result<RunOutput> {
    let module = inv
      .arg_after("-m")
      .map(|m| m.to_string_lossy().into_owned())
      .unwrap_or_default();
    self.log.borrow_mut().push(module.clone());

    if self.fail_module == Some(module.as_str()) {
      return Ok(RunOutput::failed(1, format!("{} failed\n", module)));
    }

    match module.as_str() {
      "venv" => {
        let python = venv_interpreter(Path::new(inv.args.last().unwrap()));
        fs::create_dir_all(python.parent().unwrap())?;
        fs::write(python, "")?;
      }
      "PyInstaller" if !inv.has_arg("--version") => {
        let dist = PathBuf::from(inv.arg_after("--distpath").unwrap());
        let name = inv.arg_after("--name").unwrap().to_string_lossy().into_owned();
        fs::create_dir_all(&dist)?;
        fs::write(dist.join(format!("{}{}", name, self.exe_suffix)), b"overlay")?;
      }
      _ => {}
    }
    Ok(RunOutput::ok())
  }
}

/// Write the overlay sources, manifest and `setup.py` into `root`.
pub fn overlay_project(root: &Path) {
  fs::create_dir_all(root.join("python")).unwrap();
  fs::write(root.join("python").join("cyber_watch.py"), "print('overlay')\n").unwrap();
  fs::write(root.join("requirements.txt"), "numpy>=1.21\nopencv-python\n").unwrap();
  fs::write(root.join("setup.py"), "setup(name='FreeOverlay', version='9.0.0')\n").unwrap();
}

pub fn config(root: &Path, toml: &str, platform: Platform, mtime: Option<u64>) -> BuildConfig {
  let file: ProjectFile = toml::from_str(toml).unwrap();
  BuildConfig::from_parts(
    dunce::canonicalize(root).unwrap(),
    file,
    &ConfigOverrides::default(),
    platform,
    mtime,
  )
  .unwrap()
}
