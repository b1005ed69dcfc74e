//! Individual idempotent provisioning steps.
//!
//! Each step checks the filesystem first and only creates what is missing.
//! Steps never remove or rewrite existing entries, so running them again on
//! a provisioned tree changes nothing.

mod advertisement;
mod classifications;
mod metadata;
mod root;

pub use advertisement::{advertisement_line, write_advertisement};
pub use classifications::link_classifications;
pub use metadata::{MetadataRequest, initialise_metadata};
pub use root::ensure_well_known;

use crate::classification::ClassificationLabel;
use camino::Utf8PathBuf;
use std::fmt;

/// What a step did to the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The artefact was missing and has been created.
    Created,
    /// The artefact already existed and was left untouched.
    AlreadyPresent,
}

impl StepOutcome {
    /// Returns true when the step changed the filesystem.
    #[must_use]
    pub fn is_created(self) -> bool {
        matches!(self, Self::Created)
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::AlreadyPresent => f.write_str("already present"),
        }
    }
}

/// Result of linking one classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    /// The classification the link serves.
    pub label: ClassificationLabel,
    /// The link path inside `.well-known/csaf`.
    pub link: Utf8PathBuf,
    /// The storage directory the link resolves to.
    pub target: Utf8PathBuf,
    /// Whether the link was created by this run.
    pub outcome: StepOutcome,
}
