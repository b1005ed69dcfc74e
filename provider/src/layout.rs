//! Paths and URLs of the well-known tree.
//!
//! The tree served by a CSAF provider looks like this:
//!
//! ```text
//! <web>/.well-known/
//!   security.txt
//!   csaf/
//!     provider-metadata.json
//!     <label> -> <folder>/<label>-<suffix>/
//! ```

use crate::classification::ClassificationLabel;
use camino::{Utf8Path, Utf8PathBuf};

/// Name of the outer well-known directory.
pub const WELL_KNOWN_DIRNAME: &str = ".well-known";

/// Name of the nested directory dedicated to CSAF hosting.
pub const CSAF_DIRNAME: &str = "csaf";

/// File name of the discovery pointer.
pub const SECURITY_TXT_FILENAME: &str = "security.txt";

/// File name of the metadata document.
pub const PROVIDER_METADATA_FILENAME: &str = "provider-metadata.json";

/// Resolved locations inside a web root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellKnownLayout {
    well_known: Utf8PathBuf,
    csaf: Utf8PathBuf,
}

impl WellKnownLayout {
    /// Compute the layout below `web_root`.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use csaf_provider::layout::WellKnownLayout;
    ///
    /// let layout = WellKnownLayout::new(Utf8Path::new("/var/www/html"));
    /// assert_eq!(layout.csaf_dir().as_str(), "/var/www/html/.well-known/csaf");
    /// ```
    #[must_use]
    pub fn new(web_root: &Utf8Path) -> Self {
        let well_known = web_root.join(WELL_KNOWN_DIRNAME);
        let csaf = well_known.join(CSAF_DIRNAME);
        Self { well_known, csaf }
    }

    /// The outer `.well-known` directory.
    #[must_use]
    pub fn well_known_dir(&self) -> &Utf8Path {
        &self.well_known
    }

    /// The nested `.well-known/csaf` directory.
    #[must_use]
    pub fn csaf_dir(&self) -> &Utf8Path {
        &self.csaf
    }

    /// Path of `.well-known/security.txt`.
    #[must_use]
    pub fn security_txt(&self) -> Utf8PathBuf {
        self.well_known.join(SECURITY_TXT_FILENAME)
    }

    /// Path of `.well-known/csaf/provider-metadata.json`.
    #[must_use]
    pub fn provider_metadata(&self) -> Utf8PathBuf {
        self.csaf.join(PROVIDER_METADATA_FILENAME)
    }

    /// Path of the storage link for `label`.
    #[must_use]
    pub fn classification_link(&self, label: &ClassificationLabel) -> Utf8PathBuf {
        self.csaf.join(label.as_str())
    }
}

/// Absolute URL of the metadata document for `domain`.
///
/// The domain is used verbatim, so it should carry its scheme and no
/// trailing slash.
#[must_use]
pub fn provider_metadata_url(domain: &str) -> String {
    format!("{domain}/{WELL_KNOWN_DIRNAME}/{CSAF_DIRNAME}/{PROVIDER_METADATA_FILENAME}")
}

/// URL of the ROLIE feed announced for `label`.
#[must_use]
pub fn feed_url(domain: &str, label: &ClassificationLabel) -> String {
    format!(
        "{domain}/{WELL_KNOWN_DIRNAME}/{CSAF_DIRNAME}/{label}/csaf-feed-tlp-{label}.json"
    )
}
