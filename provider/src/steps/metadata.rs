//! Writes the initial `provider-metadata.json`.

use super::StepOutcome;
use crate::atomic::to_json_document;
use crate::classification::ClassificationSet;
use crate::error::{StepError, StepResult};
use crate::fs::Filesystem;
use crate::keys::{KeyLoader, KeyUrlTemplate};
use crate::layout::WellKnownLayout;
use crate::metadata::{ProviderMetadata, Publisher};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::io;

/// Inputs for the initial metadata document.
#[derive(Debug, Clone, Copy)]
pub struct MetadataRequest<'a> {
    /// Public base URL of the provider.
    pub domain: &'a str,
    /// Classifications announced as feeds.
    pub classifications: &'a ClassificationSet,
    /// The publishing organisation.
    pub publisher: &'a Publisher,
    /// Template for the key retrieval URL.
    pub key_url: &'a KeyUrlTemplate,
    /// Timestamp recorded as `last_updated`.
    pub now: DateTime<Utc>,
}

/// Create `provider-metadata.json` unless it already exists.
///
/// The signing key is only loaded when the document has to be written. An
/// existing document is never inspected, so a changed key leaves it as it
/// is.
///
/// # Errors
///
/// Returns [`StepError::KeyLoad`] when the key cannot be loaded,
/// [`StepError::Serialization`] when the document cannot be encoded, or
/// [`StepError::Filesystem`] when the file cannot be inspected or written.
pub fn initialise_metadata(
    fs: &dyn Filesystem,
    keys: &dyn KeyLoader,
    layout: &WellKnownLayout,
    request: &MetadataRequest<'_>,
) -> StepResult<StepOutcome> {
    let path = layout.provider_metadata();
    let existing = fs
        .entry_kind(&path)
        .map_err(|source| StepError::filesystem("inspect", &path, source))?;
    if existing.is_some() {
        debug!("{path} already exists");
        return Ok(StepOutcome::AlreadyPresent);
    }

    let key = keys.load()?;
    debug!("using signing key {} ({})", key.key_id(), key.fingerprint());

    let mut metadata = ProviderMetadata::new_for_domain(
        request.domain,
        request.classifications,
        request.publisher.clone(),
        request.now,
    );
    metadata.set_openpgp_key(key.fingerprint(), request.key_url.render(request.domain, &key));

    let document =
        to_json_document(&metadata).map_err(|source| StepError::Serialization { source })?;

    match fs.write_atomic(&path, &document) {
        Ok(()) => {
            info!("wrote {path}");
            Ok(StepOutcome::Created)
        }
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            debug!("{path} appeared concurrently");
            Ok(StepOutcome::AlreadyPresent)
        }
        Err(source) => Err(StepError::filesystem("write", path, source)),
    }
}
