//! Distributable archives.
//!
//! Windows builds ship as `.zip`, Linux and macOS builds as `.tar.gz`. The
//! executable sits at the archive root with mode `0755`, followed by any
//! auxiliary assets (README, license) by file name.
//!
//! Archives are written to a temporary file in the destination directory and
//! renamed over the final path, so an existing archive of the same name is
//! replaced whole and a failed run never leaves a truncated one behind.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::consts::APP_NAME;
use crate::platform::Platform;

#[derive(Debug, Error)]
pub enum ArchiveError {
  #[error("no archive format is defined for platform '{0}'")]
  UnsupportedPlatform(Platform),

  #[error("file to archive not found: {}", path.display())]
  InputMissing { path: PathBuf },

  #[error("failed to create archive {}: {source}", path.display())]
  ArchiveFailed { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveFormat {
  Zip,
  TarGz,
}

impl ArchiveFormat {
  /// The format conventionally expected on `platform`.
  pub fn for_platform(platform: Platform) -> Option<Self> {
    match platform {
      Platform::Windows => Some(Self::Zip),
      Platform::Linux | Platform::MacOs => Some(Self::TarGz),
      Platform::Unknown => None,
    }
  }

  pub fn extension(&self) -> &'static str {
    match self {
      Self::Zip => "zip",
      Self::TarGz => "tar.gz",
    }
  }
}

/// One file placed at the archive root.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
  pub source: PathBuf,
  pub name: String,
  pub mode: u32,
}

impl ArchiveEntry {
  pub fn executable(source: impl Into<PathBuf>) -> Self {
    Self::with_mode(source, 0o755)
  }

  pub fn file(source: impl Into<PathBuf>) -> Self {
    Self::with_mode(source, 0o644)
  }

  fn with_mode(source: impl Into<PathBuf>, mode: u32) -> Self {
    let source = source.into();
    let name = source
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    Self { source, name, mode }
  }
}

/// What to put in an archive and where.
#[derive(Debug, Clone)]
pub struct ArchiveRequest<'a> {
  pub format: ArchiveFormat,
  pub dest: &'a Path,
  pub entries: Vec<ArchiveEntry>,
  /// Fixed mtime for tar entries; file mtimes are used when `None`.
  pub mtime: Option<u64>,
}

/// Build the archive for `platform` containing `executable` and `assets`.
///
/// The executable must exist. Missing assets, and assets whose file name is
/// already taken by an earlier entry, are skipped with a warning.
pub fn package(
  platform: Platform,
  executable: &Path,
  assets: &[PathBuf],
  dest: &Path,
  mtime: Option<u64>,
) -> Result<PathBuf, ArchiveError> {
  let format = ArchiveFormat::for_platform(platform).ok_or(ArchiveError::UnsupportedPlatform(platform))?;

  if !executable.is_file() {
    return Err(ArchiveError::InputMissing {
      path: executable.to_path_buf(),
    });
  }

  let mut entries = vec![ArchiveEntry::executable(executable)];
  for asset in assets {
    if !asset.is_file() {
      warn!(path = %asset.display(), "asset not found, leaving it out of the archive");
      continue;
    }
    let entry = ArchiveEntry::file(asset);
    if entries.iter().any(|e| e.name == entry.name) {
      warn!(
        path = %asset.display(),
        name = %entry.name,
        "archive already has an entry with this name, skipping asset"
      );
      continue;
    }
    entries.push(entry);
  }

  write_archive(&ArchiveRequest {
    format,
    dest,
    entries,
    mtime,
  })?;
  Ok(dest.to_path_buf())
}

/// Write `request.entries` to `request.dest`, replacing any existing file.
pub fn write_archive(request: &ArchiveRequest<'_>) -> Result<(), ArchiveError> {
  let dest = request.dest;
  let failed = |source: io::Error| ArchiveError::ArchiveFailed {
    path: dest.to_path_buf(),
    source,
  };

  let dir = match dest.parent() {
    Some(p) if !p.as_os_str().is_empty() => p,
    _ => Path::new("."),
  };
  fs::create_dir_all(dir).map_err(failed)?;

  let temp = tempfile::Builder::new()
    .prefix(&format!(".{}-", APP_NAME))
    .suffix(".partial")
    .tempfile_in(dir)
    .map_err(failed)?;

  let file = temp.as_file().try_clone().map_err(failed)?;
  match request.format {
    ArchiveFormat::Zip => write_zip(file, &request.entries),
    ArchiveFormat::TarGz => write_tar_gz(file, &request.entries, request.mtime),
  }
  .map_err(failed)?;

  temp.persist(dest).map_err(|e| failed(e.error))?;

  info!(path = %dest.display(), entries = request.entries.len(), "archive written");
  Ok(())
}

fn write_tar_gz(file: File, entries: &[ArchiveEntry], mtime: Option<u64>) -> io::Result<()> {
  let encoder = GzEncoder::new(BufWriter::new(file), Compression::best());
  let mut builder = tar::Builder::new(encoder);

  for entry in entries {
    let source = File::open(&entry.source)?;
    let metadata = source.metadata()?;

    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_size(metadata.len());
    header.set_mode(entry.mode);
    header.set_mtime(mtime.unwrap_or_else(|| modified_secs(&metadata)));

    debug!(name = %entry.name, size = metadata.len(), "adding tar entry");
    builder.append_data(&mut header, &entry.name, BufReader::new(source))?;
  }

  let encoder = builder.into_inner()?;
  let mut writer = encoder.finish()?;
  writer.flush()?;
  writer.into_inner().map_err(|e| e.into_error())?.sync_all()
}

fn write_zip(file: File, entries: &[ArchiveEntry]) -> io::Result<()> {
  let mut zip = zip::ZipWriter::new(BufWriter::new(file));

  for entry in entries {
    let options = zip::write::SimpleFileOptions::default()
      .compression_method(zip::CompressionMethod::Deflated)
      .unix_permissions(entry.mode);

    debug!(name = %entry.name, "adding zip entry");
    zip.start_file(entry.name.as_str(), options).map_err(io::Error::other)?;
    let mut source = File::open(&entry.source)?;
    io::copy(&mut source, &mut zip)?;
  }

  let mut writer = zip.finish().map_err(io::Error::other)?;
  writer.flush()?;
  writer.into_inner().map_err(|e| e.into_error())?.sync_all()
}

fn modified_secs(metadata: &fs::Metadata) -> u64 {
  metadata
    .modified()
    .ok()
    .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
    .map(|d| d.as_secs())
    .unwrap_or(0)
}
