//! Release tag checks.
//!
//! CI publishes a release when a `v<semver>` tag is pushed. The tag and the
//! application's version metadata must agree, otherwise the archives would
//! carry a different version than the release they are attached to.

use semver::Version;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReleaseError {
  #[error("release tag '{0}' must look like v<major>.<minor>.<patch>")]
  MalformedTag(String),

  #[error("version '{version}' is not a semantic version: {reason}")]
  InvalidVersion { version: String, reason: String },

  #[error("release tag '{tag}' does not match version {version}")]
  Mismatch { tag: String, version: String },
}

/// Parse a release tag such as `v9.0.0` or `v1.2.0-rc.1`.
///
/// Branch refs (`refs/tags/v9.0.0`) are accepted and stripped.
pub fn parse_tag(tag: &str) -> Result<Version, ReleaseError> {
  let bare = tag.trim().trim_start_matches("refs/tags/");
  let number = bare
    .strip_prefix('v')
    .ok_or_else(|| ReleaseError::MalformedTag(tag.to_string()))?;
  Version::parse(number).map_err(|_| ReleaseError::MalformedTag(tag.to_string()))
}

/// Check that `tag` names exactly `version`.
pub fn verify_tag(tag: &str, version: &str) -> Result<Version, ReleaseError> {
  let tagged = parse_tag(tag)?;
  let declared = Version::parse(version.trim()).map_err(|e| ReleaseError::InvalidVersion {
    version: version.to_string(),
    reason: e.to_string(),
  })?;
  if tagged != declared {
    return Err(ReleaseError::Mismatch {
      tag: tag.to_string(),
      version: version.to_string(),
    });
  }
  Ok(declared)
}
