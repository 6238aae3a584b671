//! Tests for the build pipeline through the public API.

use std::fs::{self, File};
use std::io::Read;

use ovpack_lib::archive::ArchiveFormat;
use ovpack_lib::pipeline::{BuildError, Pipeline, Step, StepEvent};
use ovpack_lib::platform::Platform;
use tempfile::TempDir;

use super::common::{ScriptedRunner, config, overlay_project};

mod linux {
  use super::*;

  #[test]
  fn builds_tarball_named_after_version() {
    let dir = TempDir::new().unwrap();
    overlay_project(dir.path());
    let config = config(dir.path(), "", Platform::Linux, None);
    let runner = ScriptedRunner::for_platform(Platform::Linux);

    let report = Pipeline::new(&config, &runner).run().unwrap();

    assert_eq!(report.archive_format, ArchiveFormat::TarGz);
    let archive = report.archive().unwrap();
    assert_eq!(archive.path.file_name().unwrap(), "FreeOverlay-Linux-9.0.0.tar.gz");
    assert_eq!(runner.modules(), ["venv", "pip", "PyInstaller", "PyInstaller"]);
  }

  #[test]
  fn fixed_mtime_makes_archives_identical() {
    let dir = TempDir::new().unwrap();
    overlay_project(dir.path());
    let config = config(dir.path(), "", Platform::Linux, Some(1_700_000_000));

    let first = Pipeline::new(&config, ScriptedRunner::for_platform(Platform::Linux))
      .run()
      .unwrap();
    let second = Pipeline::new(&config, ScriptedRunner::for_platform(Platform::Linux))
      .run()
      .unwrap();

    assert_eq!(first.archive().unwrap().sha256, second.archive().unwrap().sha256);
  }

  #[test]
  fn assets_are_packed_next_to_executable() {
    let dir = TempDir::new().unwrap();
    overlay_project(dir.path());
    fs::write(dir.path().join("README.md"), "read me\n").unwrap();
    let config = config(dir.path(), "[package]\nassets = [\"README.md\"]\n", Platform::Linux, None);

    let report = Pipeline::new(&config, ScriptedRunner::for_platform(Platform::Linux))
      .run()
      .unwrap();

    let file = File::open(&report.archive().unwrap().path).unwrap();
    let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(file));
    let names: Vec<String> = tar
      .entries()
      .unwrap()
      .map(|e| e.unwrap().path().unwrap().display().to_string())
      .collect();
    assert_eq!(names, ["FreeOverlay", "README.md"]);
  }
}

mod windows {
  use super::*;

  #[test]
  fn builds_zip_with_exe() {
    let dir = TempDir::new().unwrap();
    overlay_project(dir.path());
    let config = config(dir.path(), "", Platform::Windows, None);

    let report = Pipeline::new(&config, ScriptedRunner::for_platform(Platform::Windows))
      .run()
      .unwrap();

    let archive = report.archive().unwrap();
    assert_eq!(archive.path.file_name().unwrap(), "FreeOverlay-Windows-9.0.0.zip");

    let mut zip = zip::ZipArchive::new(File::open(&archive.path).unwrap()).unwrap();
    assert_eq!(zip.len(), 1);
    let mut entry = zip.by_name("FreeOverlay.exe").unwrap();
    let mut body = Vec::new();
    entry.read_to_end(&mut body).unwrap();
    assert_eq!(body, b"overlay");
  }
}

mod failures {
  use super::*;

  #[test]
  fn unknown_platform_stops_after_provisioning() {
    let dir = TempDir::new().unwrap();
    overlay_project(dir.path());
    let config = config(dir.path(), "", Platform::Unknown, None);
    let runner = ScriptedRunner::default();

    let err = Pipeline::new(&config, &runner).run().unwrap_err();

    assert!(matches!(err, BuildError::UnsupportedPlatform(Platform::Unknown)));
    assert_eq!(err.step(), Step::Detect);
    assert!(!runner.modules().iter().any(|m| m == "PyInstaller"));
  }

  #[test]
  fn observer_sees_failed_step() {
    let dir = TempDir::new().unwrap();
    overlay_project(dir.path());
    let config = config(dir.path(), "", Platform::Linux, None);
    let runner = ScriptedRunner {
      fail_module: Some("pip"),
      ..ScriptedRunner::default()
    };
    let mut events = Vec::new();

    let err = Pipeline::new(&config, &runner).run_with(|e| events.push(e)).unwrap_err();

    assert_eq!(err.step(), Step::Provision);
    assert_eq!(events, [StepEvent::Started(Step::Provision), StepEvent::Failed(Step::Provision)]);
    assert!(!dir.path().join("dist").exists());
  }
}
