//! Validated TLP classification labels.
//!
//! A [`ClassificationLabel`] names both a directory inside
//! `.well-known/csaf` and a TLP level in the provider metadata, so it must be
//! safe to use as a single path component. A [`ClassificationSet`] adds the
//! configured native label, whose advisories need no storage link.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;

/// A lower-case classification label such as `white` or `amber`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct ClassificationLabel(String);

impl ClassificationLabel {
    /// Validate and normalise a label.
    ///
    /// Upper-case letters are folded to lower case. Labels must be non-empty
    /// and consist of ASCII letters, digits, `-` or `_`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLabel`] when the label cannot be used
    /// as a directory name.
    ///
    /// # Examples
    ///
    /// ```
    /// use csaf_provider::classification::ClassificationLabel;
    ///
    /// let label = ClassificationLabel::new("AMBER")?;
    /// assert_eq!(label.as_str(), "amber");
    /// assert_eq!(label.tlp_label(), "AMBER");
    /// # Ok::<(), csaf_provider::error::ConfigError>(())
    /// ```
    pub fn new(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        let reject = |reason| ConfigError::InvalidLabel {
            label: raw.to_owned(),
            reason,
        };

        if trimmed.is_empty() {
            return Err(reject("label is empty"));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(reject(
                "only ASCII letters, digits, `-` and `_` are allowed",
            ));
        }

        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Get the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The label as it appears in TLP notation, for example `AMBER`.
    #[must_use]
    pub fn tlp_label(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl TryFrom<String> for ClassificationLabel {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The configured classifications together with the native one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationSet {
    labels: Vec<ClassificationLabel>,
    native: ClassificationLabel,
}

impl ClassificationSet {
    /// Build a set, checking that it is non-empty, free of duplicates and
    /// contains the native label.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when any of those invariants fail.
    pub fn new(
        labels: Vec<ClassificationLabel>,
        native: ClassificationLabel,
    ) -> Result<Self, ConfigError> {
        if labels.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "at least one classification must be configured".to_owned(),
            });
        }

        for (position, label) in labels.iter().enumerate() {
            if labels.iter().skip(position + 1).any(|other| other == label) {
                return Err(ConfigError::Invalid {
                    reason: format!("classification `{label}` is listed more than once"),
                });
            }
        }

        if !labels.contains(&native) {
            return Err(ConfigError::Invalid {
                reason: format!("native classification `{native}` is not in the classification list"),
            });
        }

        Ok(Self { labels, native })
    }

    /// All labels, in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassificationLabel> {
        self.labels.iter()
    }

    /// Labels that are served through a storage link, in configuration order.
    pub fn linked(&self) -> impl Iterator<Item = &ClassificationLabel> {
        self.labels.iter().filter(|label| **label != self.native)
    }

    /// The label whose advisories live directly in the web tree.
    #[must_use]
    pub fn native(&self) -> &ClassificationLabel {
        &self.native
    }

    /// Number of configured labels, including the native one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false; a set is never built without labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
