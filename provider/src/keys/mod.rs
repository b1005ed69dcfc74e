//! Signing key loading.
//!
//! The provider metadata advertises the fingerprint of the OpenPGP key that
//! signs advisories, together with a URL consumers can fetch the key from.
//! This module provides the [`KeyLoader`] seam, the production
//! [`OpenPgpKeyFile`] loader and the [`KeyUrlTemplate`] used to derive the
//! retrieval URL.

pub mod armor;
pub mod openpgp;

use camino::Utf8PathBuf;
use serde::Deserialize;
use std::fmt;

/// Identity of a loaded signing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningKey {
    key_id: String,
    fingerprint: String,
}

impl SigningKey {
    /// Create a key identity from upper- or lower-case hex strings.
    ///
    /// Values are stored in upper case.
    #[must_use]
    pub fn new(key_id: &str, fingerprint: &str) -> Self {
        Self {
            key_id: key_id.to_ascii_uppercase(),
            fingerprint: fingerprint.to_ascii_uppercase(),
        }
    }

    /// The hexadecimal key identifier, without a `0x` prefix.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// The hexadecimal fingerprint, without a `0x` prefix.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Errors arising while loading the signing key.
#[derive(Debug, thiserror::Error)]
pub enum KeyLoadError {
    /// The key file could not be read.
    #[error("failed to read key file {path}: {source}")]
    Read {
        /// Path of the key file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The ASCII armour around the key is damaged.
    #[error("invalid armour in {path}: {source}")]
    Armor {
        /// Path of the key file.
        path: Utf8PathBuf,
        /// Underlying armour error.
        #[source]
        source: armor::ArmorError,
    },

    /// The OpenPGP packets could not be interpreted.
    #[error("invalid OpenPGP key in {path}: {source}")]
    Packet {
        /// Path of the key file.
        path: Utf8PathBuf,
        /// Underlying packet error.
        #[source]
        source: openpgp::PacketError,
    },
}

/// Source of the signing key, enabling test mocking.
#[cfg_attr(test, mockall::automock)]
pub trait KeyLoader {
    /// Load the signing key.
    ///
    /// # Errors
    ///
    /// Returns a [`KeyLoadError`] when no usable key is available.
    fn load(&self) -> Result<SigningKey, KeyLoadError>;
}

/// Loads the key identity from an OpenPGP public key file.
///
/// The file may be ASCII-armoured or binary. Only the primary public key
/// packet is read.
#[derive(Debug, Clone)]
pub struct OpenPgpKeyFile {
    path: Utf8PathBuf,
}

impl OpenPgpKeyFile {
    /// Create a loader for the key stored at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl KeyLoader for OpenPgpKeyFile {
    fn load(&self) -> Result<SigningKey, KeyLoadError> {
        let raw = std::fs::read(&self.path).map_err(|source| KeyLoadError::Read {
            path: self.path.clone(),
            source,
        })?;

        let packets = if armor::is_armored(&raw) {
            armor::decode(&String::from_utf8_lossy(&raw)).map_err(|source| {
                KeyLoadError::Armor {
                    path: self.path.clone(),
                    source,
                }
            })?
        } else {
            raw
        };

        openpgp::identify(&packets).map_err(|source| KeyLoadError::Packet {
            path: self.path.clone(),
            source,
        })
    }
}

/// Template for the URL at which the public key can be retrieved.
///
/// The placeholders `${DOMAIN}`, `${KEY_ID}` and `${FINGERPRINT}` are
/// replaced when rendering. Key id and fingerprint are rendered with a `0x`
/// prefix.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct KeyUrlTemplate(String);

impl KeyUrlTemplate {
    /// Template used when the configuration does not set one.
    pub const DEFAULT: &'static str = "${DOMAIN}/.well-known/csaf/openpgp/${KEY_ID}.asc";

    /// Wrap a template string.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Get the raw template.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render the retrieval URL for `key` served from `domain`.
    ///
    /// # Examples
    ///
    /// ```
    /// use csaf_provider::keys::{KeyUrlTemplate, SigningKey};
    ///
    /// let key = SigningKey::new("ABCD1234", "DEADBEEF");
    /// let url = KeyUrlTemplate::default().render("https://example.org", &key);
    /// assert_eq!(url, "https://example.org/.well-known/csaf/openpgp/0xABCD1234.asc");
    /// ```
    #[must_use]
    pub fn render(&self, domain: &str, key: &SigningKey) -> String {
        self.0
            .replace("${DOMAIN}", domain)
            .replace("${KEY_ID}", &format!("0x{}", key.key_id()))
            .replace("${FINGERPRINT}", &format!("0x{}", key.fingerprint()))
    }
}

impl Default for KeyUrlTemplate {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for KeyUrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
