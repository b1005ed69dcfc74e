//! Error types for CSAF provider provisioning.
//!
//! Configuration problems are reported as [`ConfigError`] before any
//! filesystem work starts. Once provisioning runs, the first failing step
//! aborts the run and is reported as a [`ProvisionError`] naming the step.

use crate::fs::EntryKind;
use crate::keys::KeyLoadError;
use camino::Utf8PathBuf;
use std::fmt;
use thiserror::Error;

/// The ordered steps of a provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvisionStep {
    /// Ensuring `.well-known/csaf` exists as a directory.
    WellKnownRoot,
    /// Linking every non-native classification to a storage directory.
    ClassificationLinks,
    /// Writing `.well-known/security.txt`.
    Advertisement,
    /// Writing the initial `provider-metadata.json`.
    ProviderMetadata,
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WellKnownRoot => "well-known root",
            Self::ClassificationLinks => "classification links",
            Self::Advertisement => "security.txt advertisement",
            Self::ProviderMetadata => "provider metadata",
        };
        f.write_str(name)
    }
}

/// Errors raised by a single provisioning step.
#[derive(Debug, Error)]
pub enum StepError {
    /// A path that must be a directory is occupied by something else.
    #[error("{path} exists but is {found}, expected a directory")]
    StructuralConflict {
        /// The occupied path.
        path: Utf8PathBuf,
        /// What was found at the path.
        found: EntryKind,
    },

    /// An I/O or permission error from the filesystem.
    #[error("failed to {action} {path}: {source}")]
    Filesystem {
        /// The operation that failed, for example `create directory`.
        action: &'static str,
        /// The path the operation was applied to.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The signing key could not be loaded.
    #[error("signing key unavailable: {0}")]
    KeyLoad(#[from] KeyLoadError),

    /// A unique storage directory could not be allocated.
    #[error("could not allocate a storage directory for {label} under {base}: {source}")]
    Allocation {
        /// The storage root the directory was requested under.
        base: Utf8PathBuf,
        /// The classification the directory was meant for.
        label: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The provider metadata document could not be encoded.
    #[error("failed to encode provider metadata: {source}")]
    Serialization {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl StepError {
    pub(crate) fn filesystem(
        action: &'static str,
        path: impl Into<Utf8PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }
}

/// A provisioning run failed at `step`.
#[derive(Debug, Error)]
#[error("provisioning step `{step}` failed: {source}")]
pub struct ProvisionError {
    step: ProvisionStep,
    #[source]
    source: StepError,
}

impl ProvisionError {
    /// Wrap a step failure with the step it happened in.
    #[must_use]
    pub fn new(step: ProvisionStep, source: StepError) -> Self {
        Self { step, source }
    }

    /// Returns the step that failed.
    #[must_use]
    pub fn step(&self) -> ProvisionStep {
        self.step
    }

    /// Returns the step's own error.
    #[must_use]
    pub fn step_error(&self) -> &StepError {
        &self.source
    }

    /// Consume the wrapper and return the step's own error.
    #[must_use]
    pub fn into_step_error(self) -> StepError {
        self.source
    }
}

/// Errors raised while loading or validating the provider configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or has unexpected fields.
    #[error("malformed configuration {path}: {source}")]
    Parse {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// The underlying TOML error.
        #[source]
        source: Box<toml::de::Error>,
    },

    /// A classification label is not usable as a directory name.
    #[error("invalid classification label `{label}`: {reason}")]
    InvalidLabel {
        /// The rejected label as written.
        label: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The configuration parsed but violates a provisioning invariant.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Description of the violated invariant.
        reason: String,
    },
}

/// Top-level error of the `csaf-provider-setup` workflow.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Provisioning failed.
    #[error(transparent)]
    Provision(#[from] ProvisionError),
}

/// Result type alias for a single provisioning step.
pub type StepResult<T> = std::result::Result<T, StepError>;

/// Result type alias using [`ProviderError`].
pub type Result<T> = std::result::Result<T, ProviderError>;
