//! CLI argument definitions for `csaf-provider-setup`.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::config::DEFAULT_CONFIG_PATH;
use camino::Utf8PathBuf;
use clap::Parser;

/// Provision the well-known directory tree of a CSAF provider.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "csaf-provider-setup")]
#[command(version, about)]
#[command(long_about = concat!(
    "Provision the well-known directory tree of a CSAF provider.\n\n",
    "Creates <web>/.well-known/csaf, links every non-native TLP classification ",
    "to its own storage directory, writes <web>/.well-known/security.txt and ",
    "writes an initial provider-metadata.json bound to the OpenPGP signing key.\n\n",
    "Existing files and links are never modified, so the command can be run ",
    "again safely after a partial failure.",
))]
pub struct Cli {
    /// Path of the provider configuration file.
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: Utf8PathBuf,

    /// Show the resolved layout and exit without touching the filesystem.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Utf8PathBuf::from(DEFAULT_CONFIG_PATH),
            dry_run: false,
            verbosity: 0,
            quiet: false,
        }
    }
}

impl Cli {
    /// Log filter directive matching the requested verbosity.
    ///
    /// `RUST_LOG` takes precedence over this value when it is set.
    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
