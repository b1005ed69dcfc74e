//! Test support utilities for provider integration tests.
//!
//! Provides temporary web roots, a configuration builder and a fixed
//! signing key so scenarios can run without a real OpenPGP key file.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use camino::{Utf8Path, Utf8PathBuf};
use csaf_provider::classification::{ClassificationLabel, ClassificationSet};
use csaf_provider::config::ProviderConfig;
use csaf_provider::keys::{KeyLoadError, KeyLoader, KeyUrlTemplate, SigningKey};
use csaf_provider::metadata::{Publisher, PublisherCategory};
use tempfile::TempDir;

/// A key loader that always returns the same key.
pub struct FixedKey(pub SigningKey);

impl KeyLoader for FixedKey {
    fn load(&self) -> Result<SigningKey, KeyLoadError> {
        Ok(self.0.clone())
    }
}

/// A temporary directory holding `html/` and `storage/` roots.
pub struct TempTree {
    _temp: TempDir,
    root: Utf8PathBuf,
}

impl TempTree {
    /// Create an empty tree; neither root exists yet.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("failed to create temp dir");
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("non-UTF8 temp path");
        Self { _temp: temp, root }
    }

    /// Root of the temporary directory.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// The web root to provision.
    pub fn web(&self) -> Utf8PathBuf {
        self.root.join("html")
    }

    /// The advisory storage root.
    pub fn storage(&self) -> Utf8PathBuf {
        self.root.join("storage")
    }

    /// Path below `<web>/.well-known`.
    pub fn well_known(&self, relative: &str) -> Utf8PathBuf {
        self.web().join(".well-known").join(relative)
    }

    /// Configuration provisioning this tree for `domain` with the default
    /// classifications.
    pub fn config(&self, domain: &str) -> ProviderConfig {
        let labels = ["amber", "green", "red", "white"]
            .into_iter()
            .map(|name| ClassificationLabel::new(name).expect("valid label"))
            .collect();
        ProviderConfig {
            web: self.web(),
            folder: self.storage(),
            domain: domain.to_owned(),
            classifications: ClassificationSet::new(
                labels,
                ClassificationLabel::new("white").expect("valid label"),
            )
            .expect("valid classification set"),
            openpgp_public_key: self.root.join("openpgp_public.asc"),
            openpgp_url: KeyUrlTemplate::default(),
            publisher: Publisher {
                category: PublisherCategory::Vendor,
                name: "Example Company".to_owned(),
                namespace: "https://example.org".to_owned(),
                contact_details: Some("security@example.org".to_owned()),
                issuing_authority: None,
            },
        }
    }

    /// Read the JSON metadata document, if present.
    pub fn metadata(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(self.well_known("csaf/provider-metadata.json"))
            .expect("failed to read provider metadata");
        serde_json::from_str(&raw).expect("provider metadata is not valid JSON")
    }
}

/// Body of a v4 public key packet with arbitrary key material.
pub fn v4_key_packet_body() -> Vec<u8> {
    let mut body = vec![4, 0x65, 0x00, 0x00, 0x00, 22];
    body.extend_from_slice(&[9, 0x2B, 0x06, 0x01, 0x04, 0x01, 0xDA, 0x47, 0x0F, 0x01]);
    body.extend_from_slice(&[0x01, 0x07, 0x40]);
    body.extend(std::iter::repeat_n(0x5A, 32));
    body
}

/// Wrap `body` in a new-format public key packet and ASCII armour.
pub fn armored_public_key(body: &[u8]) -> String {
    let mut packet = vec![0xC6, u8::try_from(body.len()).expect("short packet body")];
    packet.extend_from_slice(body);
    format!(
        "-----BEGIN PGP PUBLIC KEY BLOCK-----\nComment: test key\n\n{}\n-----END PGP PUBLIC KEY BLOCK-----\n",
        STANDARD.encode(packet)
    )
}
