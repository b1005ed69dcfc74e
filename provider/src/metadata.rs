//! The `provider-metadata.json` document model.
//!
//! Only the subset of the CSAF provider metadata needed for a freshly
//! provisioned provider is modelled. Field order follows the order the
//! document is serialised in.

use crate::classification::{ClassificationLabel, ClassificationSet};
use crate::layout::{feed_url, provider_metadata_url};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Version of the metadata format written by this crate.
pub const METADATA_VERSION: &str = "2.0";

/// Role a CSAF publisher plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderRole {
    /// A plain publisher.
    CsafPublisher,
    /// A provider serving the well-known tree.
    CsafProvider,
    /// A provider that is also trusted to distribute third-party advisories.
    CsafTrustedProvider,
}

/// Category of the publishing organisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublisherCategory {
    /// Coordinates disclosure between parties.
    Coordinator,
    /// Finds vulnerabilities.
    Discoverer,
    /// Anything not covered by the other categories.
    Other,
    /// Translates advisories of other publishers.
    Translator,
    /// Uses the affected products.
    User,
    /// Develops or maintains the affected products.
    Vendor,
}

/// The organisation publishing advisories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Publisher {
    /// Organisation category.
    pub category: PublisherCategory,
    /// Organisation name.
    pub name: String,
    /// URL identifying the organisation's namespace.
    pub namespace: String,
    /// How to reach the organisation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_details: Option<String>,
    /// The authority under which the organisation publishes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuing_authority: Option<String>,
}

/// A ROLIE feed announced for one classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    /// Human-readable feed summary.
    pub summary: String,
    /// Upper-case TLP label of the advisories in the feed.
    pub tlp_label: String,
    /// Absolute feed URL.
    pub url: String,
}

impl Feed {
    /// Describe the feed for `label` served from `domain`.
    #[must_use]
    pub fn for_label(domain: &str, label: &ClassificationLabel) -> Self {
        let tlp = label.tlp_label();
        Self {
            summary: format!("TLP:{tlp} advisories"),
            tlp_label: tlp,
            url: feed_url(domain, label),
        }
    }
}

/// ROLIE-based distribution details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rolie {
    /// Feeds, one per classification.
    pub feeds: Vec<Feed>,
}

/// A distribution channel of the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    /// ROLIE feeds of this distribution.
    pub rolie: Rolie,
}

/// A public OpenPGP key advertised for signature verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPgpKey {
    /// Hexadecimal fingerprint.
    pub fingerprint: String,
    /// Where the key can be retrieved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The provider metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// URL the document is served from.
    pub canonical_url: String,
    /// Distribution channels.
    pub distributions: Vec<Distribution>,
    /// Timestamp of the last change, RFC 3339 in UTC.
    pub last_updated: String,
    /// Whether aggregators may list this provider.
    #[serde(rename = "list_on_CSAF_aggregators")]
    pub list_on_csaf_aggregators: bool,
    /// Metadata format version.
    pub metadata_version: String,
    /// Whether aggregators may mirror this provider.
    #[serde(rename = "mirror_on_CSAF_aggregators")]
    pub mirror_on_csaf_aggregators: bool,
    /// Keys used to sign advisories.
    #[serde(default)]
    pub public_openpgp_keys: Vec<OpenPgpKey>,
    /// The publishing organisation.
    pub publisher: Publisher,
    /// Role of the provider.
    pub role: ProviderRole,
}

impl ProviderMetadata {
    /// Build the initial document for a provider at `domain`.
    ///
    /// Every label in `classifications`, including the native one, gets a
    /// feed entry. No signing key is recorded yet.
    #[must_use]
    pub fn new_for_domain(
        domain: &str,
        classifications: &ClassificationSet,
        publisher: Publisher,
        now: DateTime<Utc>,
    ) -> Self {
        let feeds = classifications
            .iter()
            .map(|label| Feed::for_label(domain, label))
            .collect();

        Self {
            canonical_url: provider_metadata_url(domain),
            distributions: vec![Distribution {
                rolie: Rolie { feeds },
            }],
            last_updated: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            list_on_csaf_aggregators: true,
            metadata_version: METADATA_VERSION.to_owned(),
            mirror_on_csaf_aggregators: true,
            public_openpgp_keys: Vec::new(),
            publisher,
            role: ProviderRole::CsafProvider,
        }
    }

    /// Record the signing key's fingerprint and retrieval URL.
    ///
    /// An entry with the same fingerprint, compared case-insensitively, has
    /// its URL replaced instead of gaining a duplicate.
    pub fn set_openpgp_key(&mut self, fingerprint: &str, url: String) {
        if let Some(existing) = self
            .public_openpgp_keys
            .iter_mut()
            .find(|key| key.fingerprint.eq_ignore_ascii_case(fingerprint))
        {
            existing.url = Some(url);
            return;
        }

        self.public_openpgp_keys.push(OpenPgpKey {
            fingerprint: fingerprint.to_owned(),
            url: Some(url),
        });
    }

    /// All feeds across distributions.
    pub fn feeds(&self) -> impl Iterator<Item = &Feed> {
        self.distributions
            .iter()
            .flat_map(|distribution| distribution.rolie.feeds.iter())
    }
}
