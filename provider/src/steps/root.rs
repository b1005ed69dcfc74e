//! Ensures the well-known root exists as a directory.

use super::StepOutcome;
use crate::error::{StepError, StepResult};
use crate::fs::{EntryKind, Filesystem};
use crate::layout::WellKnownLayout;
use camino::Utf8Path;
use log::{debug, info};

/// Make sure `.well-known` and `.well-known/csaf` are directories.
///
/// Missing directories are created with their ancestors. Symbolic links to
/// directories are accepted.
///
/// # Errors
///
/// Returns [`StepError::StructuralConflict`] when either path is occupied by
/// something other than a directory, or [`StepError::Filesystem`] when
/// inspection or creation fails.
pub fn ensure_well_known(
    fs: &dyn Filesystem,
    layout: &WellKnownLayout,
) -> StepResult<StepOutcome> {
    ensure_directory(fs, layout.well_known_dir())?;
    ensure_directory(fs, layout.csaf_dir())
}

fn ensure_directory(fs: &dyn Filesystem, path: &Utf8Path) -> StepResult<StepOutcome> {
    let kind = fs
        .entry_kind(path)
        .map_err(|source| StepError::filesystem("inspect", path, source))?;

    match kind {
        Some(EntryKind::Directory) => {
            debug!("{path} already exists");
            Ok(StepOutcome::AlreadyPresent)
        }
        Some(found) => Err(StepError::StructuralConflict {
            path: path.to_owned(),
            found,
        }),
        None => {
            fs.create_dir_all(path)
                .map_err(|source| StepError::filesystem("create directory", path, source))?;
            info!("created directory {path}");
            Ok(StepOutcome::Created)
        }
    }
}
