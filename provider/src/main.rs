//! `csaf-provider-setup` CLI entrypoint.
//!
//! This binary loads the provider configuration and provisions the
//! well-known directory tree once. Progress and errors are printed to
//! stderr; the exit code is non-zero when configuration or provisioning
//! fails.

use clap::Parser;
use csaf_provider::cli::Cli;
use csaf_provider::config::ProviderConfig;
use csaf_provider::error::Result;
use csaf_provider::layout::WellKnownLayout;
use csaf_provider::output::{DryRunInfo, report_lines, summary_message, write_stderr_line};
use csaf_provider::provision::provision;
use std::io::Write;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Install the stderr log formatter; `RUST_LOG` overrides the CLI level.
fn init_logging(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));

    // An already installed global subscriber is kept.
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .ok();
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let config = ProviderConfig::load(&cli.config)?;

    if cli.dry_run {
        let info = DryRunInfo {
            config_path: &cli.config,
            config: &config,
        };
        write_stderr_line(stderr, info.display_text());
        return Ok(());
    }

    let report = provision(&config)?;

    if !cli.quiet {
        let layout = WellKnownLayout::new(&config.web);
        for line in report_lines(&report, &layout) {
            write_stderr_line(stderr, line);
        }
        write_stderr_line(stderr, "");
        write_stderr_line(stderr, summary_message(report.created_count()));
    }

    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}
