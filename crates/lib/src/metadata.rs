//! Version lookup from the application's own packaging metadata.
//!
//! The release version lives next to the application, not in `ovpack.toml`,
//! so that the tag, the installed package and the archive names agree. Two
//! sources are understood:
//! - `pyproject.toml`: `[project].version`
//! - `setup.py`: the first `version="..."` keyword argument

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum MetadataError {
  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse {}: {source}", path.display())]
  Parse { path: PathBuf, source: toml::de::Error },

  #[error("no version found in pyproject.toml or setup.py under {}", dir.display())]
  NotFound { dir: PathBuf },
}

#[derive(Debug, Deserialize)]
struct PyProject {
  project: Option<PyProjectTable>,
}

#[derive(Debug, Deserialize)]
struct PyProjectTable {
  version: Option<String>,
}

/// Find the application version in `project_dir`.
///
/// `pyproject.toml` wins over `setup.py` when both declare one.
pub fn read_version(project_dir: &Path) -> Result<String, MetadataError> {
  let pyproject = project_dir.join("pyproject.toml");
  if pyproject.is_file() {
    let content = fs::read_to_string(&pyproject).map_err(|source| MetadataError::Read {
      path: pyproject.clone(),
      source,
    })?;
    let parsed: PyProject = toml::from_str(&content).map_err(|source| MetadataError::Parse {
      path: pyproject.clone(),
      source,
    })?;
    if let Some(version) = parsed.project.and_then(|p| p.version) {
      debug!(path = %pyproject.display(), version, "version from pyproject.toml");
      return Ok(version);
    }
  }

  let setup_py = project_dir.join("setup.py");
  if setup_py.is_file() {
    let content = fs::read_to_string(&setup_py).map_err(|source| MetadataError::Read {
      path: setup_py.clone(),
      source,
    })?;
    if let Some(version) = setup_py_version(&content) {
      debug!(path = %setup_py.display(), version, "version from setup.py");
      return Ok(version);
    }
  }

  Err(MetadataError::NotFound {
    dir: project_dir.to_path_buf(),
  })
}

/// Extract the literal passed as `version=` in a `setup()` call.
///
/// The keyword may open a line or follow `(`, `,` or whitespace, so both the
/// one-line and the one-argument-per-line forms are found. Comments are
/// ignored and longer names such as `version_file` do not match.
fn setup_py_version(source: &str) -> Option<String> {
  source.lines().map(strip_comment).find_map(|line| {
    line.match_indices("version").find_map(|(at, keyword)| {
      let keyword_start = line[..at].chars().next_back().is_none_or(|c| c == '(' || c == ',' || c.is_whitespace());
      if !keyword_start {
        return None;
      }
      version_literal(&line[at + keyword.len()..])
    })
  })
}

/// Parse `= "literal"` (either quote style) at the start of `rest`.
fn version_literal(rest: &str) -> Option<String> {
  let rest = rest.trim_start().strip_prefix('=')?;
  if rest.starts_with('=') {
    return None;
  }
  let rest = rest.trim_start();
  let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
  let literal = &rest[1..];
  let end = literal.find(quote)?;
  let version = literal[..end].trim();
  (!version.is_empty()).then(|| version.to_string())
}

/// Drop a trailing `#` comment. Quotes are not tracked; a `#` inside a
/// version literal is not a valid version anyway.
fn strip_comment(line: &str) -> &str {
  line.split_once('#').map_or(line, |(code, _)| code)
}
