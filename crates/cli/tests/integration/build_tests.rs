//! Build command integration tests.
//!
//! The stand-in interpreter is a POSIX shell script, so these only run on
//! unix hosts.
#![cfg(unix)]

use std::fs::File;

use flate2::read::GzDecoder;
use predicates::prelude::*;

use super::common::TestEnv;

fn host_archive_name() -> &'static str {
  if cfg!(target_os = "macos") {
    "FreeOverlay-macOS-9.0.0.tar.gz"
  } else {
    "FreeOverlay-Linux-9.0.0.tar.gz"
  }
}

#[test]
fn build_produces_executable_and_archive() {
  let env = TestEnv::overlay();

  env
    .build_cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("Build complete"))
    .stdout(predicate::str::contains(host_archive_name()));

  let exe = env.root().join("dist").join("FreeOverlay");
  assert!(exe.is_file());
  assert!(env.root().join("dist").join(host_archive_name()).is_file());
  assert!(env.root().join(".venv").join("bin").join("python").is_file());
}

#[test]
fn archive_contains_executable_with_exec_bit() {
  let env = TestEnv::overlay();
  env.build_cmd().assert().success();

  let archive = File::open(env.root().join("dist").join(host_archive_name())).unwrap();
  let mut tar = tar::Archive::new(GzDecoder::new(archive));
  let entries: Vec<(String, u32)> = tar
    .entries()
    .unwrap()
    .map(|e| {
      let e = e.unwrap();
      (e.path().unwrap().display().to_string(), e.header().mode().unwrap())
    })
    .collect();

  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].0, "FreeOverlay");
  assert_eq!(entries[0].1 & 0o777, 0o755);
}

#[test]
fn build_runs_tools_in_order() {
  let env = TestEnv::overlay();
  env.build_cmd().assert().success();

  let calls = env.calls();
  let modules: Vec<&str> = calls
    .iter()
    .map(|c| c.split_whitespace().nth(1).unwrap_or_default())
    .collect();
  assert_eq!(modules, ["venv", "pip", "PyInstaller", "PyInstaller"]);
  assert!(calls[1].contains("pyinstaller"));
  assert!(calls[2].ends_with("--version"));
  assert!(calls[3].contains("--onefile"));
}

#[test]
fn rebuild_reuses_venv_and_replaces_archive() {
  let env = TestEnv::overlay();
  env.build_cmd().assert().success();
  let archive = env.root().join("dist").join(host_archive_name());
  std::fs::write(&archive, b"stale").unwrap();

  env.build_cmd().assert().success();

  let venv_calls = env.calls().iter().filter(|c| c.starts_with("-m venv")).count();
  assert_eq!(venv_calls, 1);
  assert_ne!(std::fs::read(&archive).unwrap(), b"stale");
}

#[test]
fn failed_install_stops_before_compile() {
  let env = TestEnv::overlay();

  env
    .build_cmd()
    .env("OVPACK_TEST_FAIL_PIP", "1")
    .assert()
    .failure()
    .stderr(predicate::str::contains("provision"))
    .stderr(predicate::str::contains("No matching distribution"));

  assert!(!env.calls().iter().any(|c| c.contains("PyInstaller")));
  assert!(!env.root().join("dist").exists());
}

#[test]
fn missing_entry_point_fails_in_compile() {
  let env = TestEnv::overlay();
  std::fs::remove_file(env.root().join("python").join("cyber_watch.py")).unwrap();

  env
    .build_cmd()
    .assert()
    .failure()
    .stderr(predicate::str::contains("compile"))
    .stderr(predicate::str::contains("cyber_watch.py"));
}

#[test]
fn skip_provision_uses_base_interpreter() {
  let env = TestEnv::overlay();

  env
    .build_cmd()
    .arg("--skip-provision")
    .assert()
    .success()
    .stderr(predicate::str::contains("Skipping dependency installation"));

  let calls = env.calls();
  assert!(!calls.iter().any(|c| c.starts_with("-m venv") || c.starts_with("-m pip")));
  assert!(env.root().join("dist").join(host_archive_name()).is_file());
}

#[test]
fn json_output_reports_artifacts() {
  let env = TestEnv::overlay();

  let output = env.build_cmd().args(["--output", "json"]).output().unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["version"], "9.0.0");
  let artifacts = report["artifacts"].as_array().unwrap();
  assert_eq!(artifacts.len(), 2);
  assert_eq!(artifacts[0]["kind"], "executable");
  assert_eq!(artifacts[1]["sha256"].as_str().unwrap().len(), 64);
}

#[test]
fn set_version_and_dist_dir_override_names() {
  let env = TestEnv::overlay();

  env
    .build_cmd()
    .args(["--set-version", "9.1.0", "--dist-dir", "out"])
    .assert()
    .success();

  let name = host_archive_name().replace("9.0.0", "9.1.0");
  assert!(env.root().join("out").join(name).is_file());
}

#[test]
fn clean_removes_outputs() {
  let env = TestEnv::overlay();
  env.build_cmd().assert().success();
  assert!(env.root().join("dist").exists());

  env.ovpack_cmd().arg("clean").assert().success();

  assert!(!env.root().join("dist").exists());
  assert!(env.root().join("python").join("cyber_watch.py").exists());
}

#[test]
fn provision_only_installs_requirements() {
  let env = TestEnv::overlay();

  env
    .ovpack_cmd()
    .arg("provision")
    .arg("--python")
    .arg(env.fake_python())
    .assert()
    .success()
    .stdout(predicate::str::contains("Dependencies installed"));

  assert!(!env.calls().iter().any(|c| c.contains("PyInstaller")));
  assert!(!env.root().join("dist").exists());
}
