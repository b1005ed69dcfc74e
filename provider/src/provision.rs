//! The four-step provisioning pipeline.
//!
//! [`Provisioner::run`] ensures the well-known root, links the
//! classifications, writes the `security.txt` advertisement and writes the
//! initial provider metadata, strictly in that order. The first failing step
//! aborts the run; nothing that was already created is rolled back. Because
//! every step only creates what is missing, a failed run can simply be
//! repeated.

use crate::config::ProviderConfig;
use crate::error::{ProvisionError, ProvisionStep, StepError};
use crate::fs::{Filesystem, HostFilesystem};
use crate::keys::{KeyLoader, OpenPgpKeyFile};
use crate::layout::WellKnownLayout;
use crate::steps::{
    LinkOutcome, MetadataRequest, StepOutcome, ensure_well_known, initialise_metadata,
    link_classifications, write_advertisement,
};
use chrono::{DateTime, Utc};
use log::info;

/// What a successful run found or created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Outcome for `.well-known/csaf`.
    pub root: StepOutcome,
    /// Outcome per linked classification, in configuration order.
    pub links: Vec<LinkOutcome>,
    /// Outcome for `security.txt`.
    pub advertisement: StepOutcome,
    /// Outcome for `provider-metadata.json`.
    pub metadata: StepOutcome,
}

impl ProvisionReport {
    /// Number of artefacts created by the run.
    #[must_use]
    pub fn created_count(&self) -> usize {
        [self.root, self.advertisement, self.metadata]
            .into_iter()
            .chain(self.links.iter().map(|link| link.outcome))
            .filter(|outcome| outcome.is_created())
            .count()
    }

    /// Returns true when the run found everything in place.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.created_count() == 0
    }
}

/// Runs the provisioning steps against a filesystem and key loader.
pub struct Provisioner<'a> {
    config: &'a ProviderConfig,
    layout: WellKnownLayout,
    fs: &'a dyn Filesystem,
    keys: &'a dyn KeyLoader,
    now: DateTime<Utc>,
}

impl<'a> Provisioner<'a> {
    /// Prepare a run for `config`.
    #[must_use]
    pub fn new(
        config: &'a ProviderConfig,
        fs: &'a dyn Filesystem,
        keys: &'a dyn KeyLoader,
    ) -> Self {
        Self {
            config,
            layout: WellKnownLayout::new(&config.web),
            fs,
            keys,
            now: Utc::now(),
        }
    }

    /// Use `now` as the metadata timestamp instead of the current time.
    #[must_use]
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Run every step in order.
    ///
    /// # Errors
    ///
    /// Returns a [`ProvisionError`] naming the first step that failed.
    /// Later steps are not attempted.
    pub fn run(&self) -> Result<ProvisionReport, ProvisionError> {
        let root = step(ProvisionStep::WellKnownRoot, || {
            ensure_well_known(self.fs, &self.layout)
        })?;
        let links = step(ProvisionStep::ClassificationLinks, || {
            link_classifications(
                self.fs,
                &self.layout,
                &self.config.folder,
                &self.config.classifications,
            )
        })?;
        let advertisement = step(ProvisionStep::Advertisement, || {
            write_advertisement(self.fs, &self.layout, &self.config.domain)
        })?;
        let metadata = step(ProvisionStep::ProviderMetadata, || {
            let request = MetadataRequest {
                domain: &self.config.domain,
                classifications: &self.config.classifications,
                publisher: &self.config.publisher,
                key_url: &self.config.openpgp_url,
                now: self.now,
            };
            initialise_metadata(self.fs, self.keys, &self.layout, &request)
        })?;

        let report = ProvisionReport {
            root,
            links,
            advertisement,
            metadata,
        };
        info!(
            "provisioned {} ({} artefact(s) created)",
            self.layout.csaf_dir(),
            report.created_count()
        );
        Ok(report)
    }
}

fn step<T>(
    name: ProvisionStep,
    body: impl FnOnce() -> Result<T, StepError>,
) -> Result<T, ProvisionError> {
    body().map_err(|source| ProvisionError::new(name, source))
}

/// Provision the host filesystem using the key file named in `config`.
///
/// # Errors
///
/// Returns a [`ProvisionError`] naming the first step that failed.
pub fn provision(config: &ProviderConfig) -> Result<ProvisionReport, ProvisionError> {
    let keys = OpenPgpKeyFile::new(config.openpgp_public_key.clone());
    Provisioner::new(config, &HostFilesystem, &keys).run()
}

#[cfg(test)]
#[path = "provision_tests.rs"]
mod tests;
