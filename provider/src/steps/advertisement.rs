//! Writes the `security.txt` discovery pointer.

use super::StepOutcome;
use crate::error::{StepError, StepResult};
use crate::fs::Filesystem;
use crate::layout::{WellKnownLayout, provider_metadata_url};
use log::{debug, info};
use std::io;

/// The line advertising the metadata document of `domain`.
///
/// # Examples
///
/// ```
/// use csaf_provider::steps::advertisement_line;
///
/// assert_eq!(
///     advertisement_line("example.org"),
///     "CSAF: example.org/.well-known/csaf/provider-metadata.json\n"
/// );
/// ```
#[must_use]
pub fn advertisement_line(domain: &str) -> String {
    format!("CSAF: {}\n", provider_metadata_url(domain))
}

/// Create `.well-known/security.txt` unless it already exists.
///
/// An existing file is never read or rewritten, even when it advertises a
/// different domain.
///
/// # Errors
///
/// Returns [`StepError::Filesystem`] when the file cannot be inspected or
/// written.
pub fn write_advertisement(
    fs: &dyn Filesystem,
    layout: &WellKnownLayout,
    domain: &str,
) -> StepResult<StepOutcome> {
    let path = layout.security_txt();
    let existing = fs
        .entry_kind(&path)
        .map_err(|source| StepError::filesystem("inspect", &path, source))?;
    if existing.is_some() {
        debug!("{path} already exists");
        return Ok(StepOutcome::AlreadyPresent);
    }

    match fs.create_new_file(&path, advertisement_line(domain).as_bytes()) {
        Ok(()) => {
            info!("wrote {path}");
            Ok(StepOutcome::Created)
        }
        // Another run created the file between the check and the write.
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            debug!("{path} appeared concurrently");
            Ok(StepOutcome::AlreadyPresent)
        }
        Err(source) => Err(StepError::filesystem("write", path, source)),
    }
}
