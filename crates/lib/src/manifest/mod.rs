//! Requirements manifest parsing.
//!
//! The manifest is a pip requirements file: one requirement per line, in the
//! form `name[extras] specifier ; marker`. Parsing here only validates the
//! shape and names so a broken manifest fails before anything is installed;
//! resolution is left to pip, which receives the file unchanged.

mod types;

use std::fs;
use std::path::Path;

use tracing::debug;

pub use types::{Manifest, ManifestEntry, ManifestError, Requirement};

impl Manifest {
  /// Read and parse the manifest at `path`.
  ///
  /// # Errors
  ///
  /// `ManifestError::Missing` if the file does not exist, `ManifestError::Invalid`
  /// for the first line that is not a valid requirement.
  pub fn load(path: &Path) -> Result<Self, ManifestError> {
    if !path.is_file() {
      return Err(ManifestError::Missing {
        path: path.to_path_buf(),
      });
    }
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let manifest = Self::parse(&content).map_err(|(line, message)| ManifestError::Invalid {
      path: path.to_path_buf(),
      line,
      message,
    })?;
    debug!(
      path = %path.display(),
      requirements = manifest.requirements().count(),
      "parsed manifest"
    );
    Ok(manifest)
  }

  /// Parse manifest text. Errors carry the 1-based line number.
  pub fn parse(content: &str) -> Result<Self, (usize, String)> {
    let mut entries = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
      let line = strip_comment(raw).trim();
      if line.is_empty() {
        continue;
      }
      if line.starts_with('-') {
        entries.push(ManifestEntry::Option(line.to_string()));
        continue;
      }
      let requirement = parse_requirement(line).map_err(|msg| (idx + 1, msg))?;
      entries.push(ManifestEntry::Requirement(requirement));
    }
    Ok(Self { entries })
  }
}

/// Drop a `#` comment. pip only treats `#` as a comment at line start or after
/// whitespace, so URL fragments like `pkg @ https://x/y#egg=pkg` survive.
fn strip_comment(line: &str) -> &str {
  let bytes = line.as_bytes();
  for (i, b) in bytes.iter().enumerate() {
    if *b == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()) {
      return &line[..i];
    }
  }
  line
}

fn parse_requirement(line: &str) -> Result<Requirement, String> {
  let (req, marker) = match line.split_once(';') {
    Some((req, marker)) => {
      let marker = marker.trim();
      if marker.is_empty() {
        return Err("empty environment marker after ';'".to_string());
      }
      (req.trim(), Some(marker.to_string()))
    }
    None => (line, None),
  };

  let name_end = req
    .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    .unwrap_or(req.len());
  let name = &req[..name_end];
  validate_name(name)?;

  let mut rest = req[name_end..].trim_start();
  let mut extras = Vec::new();
  if let Some(after) = rest.strip_prefix('[') {
    let close = after.find(']').ok_or_else(|| format!("unclosed extras in '{}'", req))?;
    for extra in after[..close].split(',').map(str::trim).filter(|e| !e.is_empty()) {
      validate_name(extra)?;
      extras.push(extra.to_string());
    }
    rest = after[close + 1..].trim_start();
  }

  let version = if rest.is_empty() {
    None
  } else if rest.starts_with(['=', '<', '>', '!', '~', '@', '(']) {
    Some(rest.to_string())
  } else {
    return Err(format!("unexpected '{}' after package name '{}'", rest, name));
  };

  Ok(Requirement {
    name: name.to_string(),
    extras,
    version,
    marker,
  })
}

/// Package names must start and end with a letter or digit.
fn validate_name(name: &str) -> Result<(), String> {
  let valid_edge = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
  if name.is_empty() {
    return Err("missing package name".to_string());
  }
  if !valid_edge(name.chars().next()) || !valid_edge(name.chars().last()) {
    return Err(format!("invalid package name '{}'", name));
  }
  Ok(())
}
