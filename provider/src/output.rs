//! Progress and summary output for the CLI.
//!
//! Everything user-facing goes to stderr, one line at a time. Formatting is
//! kept separate from writing so the text can be tested directly.

use crate::config::ProviderConfig;
use crate::layout::WellKnownLayout;
use crate::provision::ProvisionReport;
use crate::steps::StepOutcome;
use camino::Utf8Path;
use std::io::Write;

/// Write `message` followed by a newline, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}

/// One line per artefact of a finished run.
#[must_use]
pub fn report_lines(report: &ProvisionReport, layout: &WellKnownLayout) -> Vec<String> {
    let mut lines = vec![artefact_line(report.root, layout.csaf_dir())];
    for link in &report.links {
        lines.push(format!(
            "{}: {} -> {}",
            link.outcome, link.link, link.target
        ));
    }
    lines.push(artefact_line(
        report.advertisement,
        &layout.security_txt(),
    ));
    lines.push(artefact_line(report.metadata, &layout.provider_metadata()));
    lines
}

fn artefact_line(outcome: StepOutcome, path: &Utf8Path) -> String {
    format!("{outcome}: {path}")
}

/// Closing line summarising a run.
///
/// # Example
///
/// ```
/// use csaf_provider::output::summary_message;
///
/// assert_eq!(summary_message(0), "CSAF provider tree already up to date");
/// assert_eq!(summary_message(2), "Provisioned CSAF provider tree (2 artefacts created)");
/// ```
#[must_use]
pub fn summary_message(created: usize) -> String {
    match created {
        0 => "CSAF provider tree already up to date".to_owned(),
        1 => "Provisioned CSAF provider tree (1 artefact created)".to_owned(),
        n => format!("Provisioned CSAF provider tree ({n} artefacts created)"),
    }
}

/// Resolved layout shown by `--dry-run`.
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// Path the configuration was read from.
    pub config_path: &'a Utf8Path,
    /// The loaded configuration.
    pub config: &'a ProviderConfig,
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let layout = WellKnownLayout::new(&self.config.web);
        let mut lines = vec![
            "Dry run - no files will be modified".to_owned(),
            String::new(),
            format!("Configuration: {}", self.config_path),
            format!("Domain: {}", self.config.domain),
            format!("Well-known directory: {}", layout.csaf_dir()),
            format!("Advisory storage: {}", self.config.folder),
            format!("Advertisement: {}", layout.security_txt()),
            format!("Provider metadata: {}", layout.provider_metadata()),
            format!("Signing key: {}", self.config.openpgp_public_key),
            format!("Key URL template: {}", self.config.openpgp_url),
            String::new(),
            "Classifications:".to_owned(),
        ];

        let native = self.config.classifications.native();
        for label in self.config.classifications.iter() {
            if label == native {
                lines.push(format!("  - {label} (native, no storage link)"));
            } else {
                lines.push(format!(
                    "  - {label} -> {}",
                    layout.classification_link(label)
                ));
            }
        }

        lines.join("\n")
    }
}
