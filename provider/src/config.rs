//! TOML provider configuration.
//!
//! The configuration names the web root to provision, where advisories are
//! stored, the public domain, the classification labels and the signing key.
//! Values are read with `serde` and `toml`, then validated into a
//! [`ProviderConfig`] before any filesystem work starts.
//!
//! ```toml
//! domain = "https://example.org"
//! openpgp_public_key = "/etc/csaf/openpgp_public.asc"
//!
//! [publisher]
//! category = "vendor"
//! name = "Example Company"
//! namespace = "https://example.org"
//! ```

use crate::classification::{ClassificationLabel, ClassificationSet};
use crate::error::ConfigError;
use crate::keys::KeyUrlTemplate;
use crate::metadata::Publisher;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;

/// Location of the configuration file when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/csaf/provider.toml";

/// Web root used when the configuration does not set `web`.
pub const DEFAULT_WEB_ROOT: &str = "/var/www/html";

/// Advisory storage root used when the configuration does not set `folder`.
pub const DEFAULT_STORAGE_ROOT: &str = "/var/www";

/// Classifications provisioned when the configuration lists none.
pub const DEFAULT_CLASSIFICATIONS: [&str; 4] = ["white", "green", "amber", "red"];

/// Classification served without a storage link by default.
pub const DEFAULT_NATIVE_CLASSIFICATION: &str = "white";

/// The configuration file as written on disk.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default = "default_web_root")]
    web: Utf8PathBuf,
    #[serde(default = "default_storage_root")]
    folder: Utf8PathBuf,
    domain: String,
    #[serde(default = "default_classifications")]
    classifications: Vec<String>,
    #[serde(default = "default_native_classification")]
    native_classification: String,
    openpgp_public_key: Utf8PathBuf,
    #[serde(default)]
    openpgp_url: KeyUrlTemplate,
    publisher: Publisher,
}

fn default_web_root() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_WEB_ROOT)
}

fn default_storage_root() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_STORAGE_ROOT)
}

fn default_classifications() -> Vec<String> {
    DEFAULT_CLASSIFICATIONS.map(str::to_owned).to_vec()
}

fn default_native_classification() -> String {
    DEFAULT_NATIVE_CLASSIFICATION.to_owned()
}

/// Validated provider configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Root of the publicly served web tree.
    pub web: Utf8PathBuf,
    /// Root under which per-classification storage directories are created.
    pub folder: Utf8PathBuf,
    /// Public base URL of the provider, without a trailing slash.
    pub domain: String,
    /// Configured classifications and the native one.
    pub classifications: ClassificationSet,
    /// OpenPGP public key whose fingerprint is advertised.
    pub openpgp_public_key: Utf8PathBuf,
    /// Template for the key retrieval URL.
    pub openpgp_url: KeyUrlTemplate,
    /// The publishing organisation.
    pub publisher: Publisher,
}

impl ProviderConfig {
    /// Read and validate the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, and any
    /// error documented on [`Self::from_toml`].
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        debug!("loading configuration from {path}");
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&source, path)
    }

    /// Parse and validate configuration text; `path` is used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown fields,
    /// [`ConfigError::InvalidLabel`] for unusable classification labels and
    /// [`ConfigError::Invalid`] when a value violates a provisioning
    /// invariant.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use csaf_provider::config::ProviderConfig;
    ///
    /// let source = r#"
    /// domain = "https://example.org/"
    /// openpgp_public_key = "/etc/csaf/openpgp_public.asc"
    ///
    /// [publisher]
    /// category = "vendor"
    /// name = "Example Company"
    /// namespace = "https://example.org"
    /// "#;
    ///
    /// let config = ProviderConfig::from_toml(source, Utf8Path::new("provider.toml"))?;
    /// assert_eq!(config.domain, "https://example.org");
    /// assert_eq!(config.classifications.native().as_str(), "white");
    /// # Ok::<(), csaf_provider::error::ConfigError>(())
    /// ```
    pub fn from_toml(source: &str, path: &Utf8Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(source).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source: Box::new(source),
        })?;
        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self, ConfigError> {
        let domain = raw.domain.trim().trim_end_matches('/').to_owned();
        if domain.is_empty() {
            return Err(invalid("domain must not be empty"));
        }
        if raw.publisher.name.trim().is_empty() {
            return Err(invalid("publisher name must not be empty"));
        }
        if raw.publisher.namespace.trim().is_empty() {
            return Err(invalid("publisher namespace must not be empty"));
        }

        let labels = raw
            .classifications
            .iter()
            .map(|label| ClassificationLabel::new(label))
            .collect::<Result<Vec<_>, _>>()?;
        let native = ClassificationLabel::new(&raw.native_classification)?;
        let classifications = ClassificationSet::new(labels, native)?;

        Ok(Self {
            web: raw.web,
            folder: raw.folder,
            domain,
            classifications,
            openpgp_public_key: raw.openpgp_public_key,
            openpgp_url: raw.openpgp_url,
            publisher: raw.publisher,
        })
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}
