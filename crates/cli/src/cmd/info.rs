//! Implementation of the `ovpack info` command.
//!
//! Shows the detected host and, when the project configuration resolves, the
//! target and the artifact paths a build would produce.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use ovpack_lib::config::{BuildConfig, ConfigOverrides};
use ovpack_lib::platform::{Arch, Platform, detect, host_triple};
use ovpack_lib::process::which;

use crate::output::{OutputFormat, print_json, print_stat, print_warning};

#[derive(Serialize)]
struct InfoOutput {
  host: HostInfo,
  #[serde(skip_serializing_if = "Option::is_none")]
  config: Option<BuildConfig>,
  #[serde(skip_serializing_if = "Option::is_none")]
  executable: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  archive: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  error: Option<String>,
}

#[derive(Serialize)]
struct HostInfo {
  platform: Platform,
  arch: Arch,
  supported: bool,
}

pub fn cmd_info(project: &Path, overrides: &ConfigOverrides, output: OutputFormat) -> Result<()> {
  let platform = detect();
  let host = HostInfo {
    platform,
    arch: Arch::current(),
    supported: platform.is_supported(),
  };
  let resolved = BuildConfig::resolve(project, overrides);

  if output.is_json() {
    let (config, error) = match resolved {
      Ok(config) => (Some(config), None),
      Err(e) => (None, Some(e.to_string())),
    };
    return print_json(&InfoOutput {
      host,
      executable: config.as_ref().map(BuildConfig::executable_path),
      archive: config.as_ref().and_then(BuildConfig::archive_path),
      config,
      error,
    });
  }

  println!("Host:");
  print_stat("Platform", &host_triple());
  if !host.supported {
    print_warning("This platform has no packaging format; builds will fail");
  }

  let config = match resolved {
    Ok(config) => config,
    Err(e) => {
      print_warning(&format!("Project configuration could not be resolved: {}", e));
      return Ok(());
    }
  };

  println!();
  println!("Project:");
  print_stat("Directory", &config.project_dir.display().to_string());
  print_stat("Product", &config.product_name);
  print_stat("Version", &config.version);
  print_stat("Target", config.platform.label());
  print_stat("Entry point", &config.entry_point.display().to_string());
  print_stat("Manifest", &config.python.manifest.display().to_string());
  let interpreter = match which(&config.python.interpreter) {
    Some(found) => found.display().to_string(),
    None => format!("{} (not found)", config.python.interpreter.display()),
  };
  print_stat("Interpreter", &interpreter);

  println!();
  println!("Artifacts:");
  print_stat("Executable", &config.executable_path().display().to_string());
  match config.archive_path() {
    Some(archive) => print_stat("Archive", &archive.display().to_string()),
    None => print_stat("Archive", "none (unsupported platform)"),
  }
  Ok(())
}
