//! Artifact naming policy.
//!
//! Output filenames are `<base>_<YYYYMMDD>_<HHMMSS>.parquet` under a stable
//! destination prefix, so an external crawler can discover every artifact of a
//! logical document type in one place. Uniqueness assumes the trigger does not
//! fire more than once per second for the same base name; at sub-second
//! granularity a redelivered event may reuse a name, which mirrors the
//! duplicate-delivery semantics of the upstream trigger and is accepted
//! rather than eliminated.

use chrono::{DateTime, Utc};

/// File extension of every emitted artifact.
pub const ARTIFACT_EXT: &str = "parquet";

/// Derive the artifact base name from a source location: the final path
/// segment with its extension stripped.
pub fn base_name(location: &str) -> &str {
    let file = location.rsplit('/').next().unwrap_or(location);
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    }
}

/// Build the artifact filename for one invocation.
pub fn artifact_filename(base: &str, at: DateTime<Utc>) -> String {
    format!("{base}_{}.{ARTIFACT_EXT}", at.format("%Y%m%d_%H%M%S"))
}

/// Build the full destination path: `<prefix>/<base>_<stamp>.parquet`.
pub fn artifact_path(prefix: &str, base: &str, at: DateTime<Utc>) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        artifact_filename(base, at)
    } else {
        format!("{prefix}/{}", artifact_filename(base, at))
    }
}
