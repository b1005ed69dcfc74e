//! CSAF provider provisioning library.
//!
//! This crate prepares the directory tree a CSAF provider serves under
//! `/.well-known/csaf`. It is used by the `csaf-provider-setup` CLI binary
//! and can be consumed programmatically for testing or custom deployments.
//!
//! # Modules
//!
//! - [`atomic`] - Atomic, create-once document writes
//! - [`classification`] - Validated TLP classification labels
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - TOML provider configuration
//! - [`error`] - Semantic error types for configuration and provisioning
//! - [`fs`] - Filesystem abstraction used by every provisioning step
//! - [`keys`] - Signing key loading and OpenPGP fingerprints
//! - [`layout`] - Paths and URLs of the well-known tree
//! - [`metadata`] - The `provider-metadata.json` document model
//! - [`output`] - Progress and summary lines for the CLI
//! - [`provision`] - The four-step provisioning pipeline
//! - [`steps`] - Individual idempotent provisioning steps
//! - [`unique_dir`] - Collision-free storage directory allocation

pub mod atomic;
pub mod classification;
pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod keys;
pub mod layout;
pub mod metadata;
pub mod output;
pub mod provision;
pub mod steps;
pub mod unique_dir;
