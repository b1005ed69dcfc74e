//! Tests for CLI parsing and default behaviours.

use super::*;
use rstest::rstest;

#[test]
fn cli_parses_defaults() {
    let cli = Cli::parse_from(["csaf-provider-setup"]);
    assert_eq!(cli, Cli::default());
    assert_eq!(cli.config.as_str(), "/etc/csaf/provider.toml");
    assert!(!cli.dry_run);
    assert_eq!(cli.verbosity, 0);
    assert!(!cli.quiet);
}

#[rstest]
#[case::short(["csaf-provider-setup", "-c", "/srv/csaf/provider.toml"])]
#[case::long(["csaf-provider-setup", "--config", "/srv/csaf/provider.toml"])]
fn cli_parses_config_path(#[case] args: [&str; 3]) {
    let cli = Cli::parse_from(args);
    assert_eq!(cli.config.as_str(), "/srv/csaf/provider.toml");
}

#[test]
fn cli_parses_dry_run() {
    let cli = Cli::parse_from(["csaf-provider-setup", "--dry-run"]);
    assert!(cli.dry_run);
}

#[test]
fn verbose_conflicts_with_quiet() {
    let result = Cli::try_parse_from(["csaf-provider-setup", "-v", "-q"]);
    assert!(result.is_err());
}

#[test]
fn unknown_flags_are_rejected() {
    let result = Cli::try_parse_from(["csaf-provider-setup", "--force"]);
    assert!(result.is_err());
}

#[rstest]
#[case::default(&["csaf-provider-setup"], "warn")]
#[case::verbose(&["csaf-provider-setup", "-v"], "info")]
#[case::very_verbose(&["csaf-provider-setup", "-vv"], "debug")]
#[case::trace(&["csaf-provider-setup", "-vvvv"], "trace")]
#[case::quiet(&["csaf-provider-setup", "--quiet"], "error")]
fn log_filter_follows_verbosity(#[case] args: &[&str], #[case] expected: &str) {
    let cli = Cli::parse_from(args);
    assert_eq!(cli.log_filter(), expected);
}
