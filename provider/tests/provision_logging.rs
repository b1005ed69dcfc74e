//! Log output of a provisioning run.
//!
//! `logtest` installs a process-wide logger, so this binary holds a single
//! test.

mod support;

use csaf_provider::fs::HostFilesystem;
use csaf_provider::keys::SigningKey;
use csaf_provider::provision::Provisioner;
use log::Level;
use logtest::Logger;
use support::{FixedKey, TempTree};

fn drain(logger: &mut Logger) -> Vec<(Level, String)> {
    let mut records = Vec::new();
    while let Some(record) = logger.pop() {
        records.push((record.level(), record.args().to_string()));
    }
    records
}

#[test]
fn creations_log_at_info_and_skips_at_debug() {
    let mut logger = Logger::start();
    let tree = TempTree::new();
    let config = tree.config("example.org");
    let keys = FixedKey(SigningKey::new("ABCD1234", "DEADBEEF"));

    Provisioner::new(&config, &HostFilesystem, &keys)
        .run()
        .expect("first run");
    let first = drain(&mut logger);

    assert!(
        first
            .iter()
            .any(|(level, message)| *level == Level::Info && message.ends_with("security.txt")),
        "expected an info record for security.txt, got {first:?}"
    );
    assert!(
        first
            .iter()
            .any(|(level, message)| *level == Level::Info && message.starts_with("linked ")),
        "expected info records for links, got {first:?}"
    );

    Provisioner::new(&config, &HostFilesystem, &keys)
        .run()
        .expect("second run");
    let second = drain(&mut logger);

    assert!(
        second
            .iter()
            .filter(|(level, _)| *level == Level::Info)
            .all(|(_, message)| message.starts_with("provisioned ")),
        "second run must not report creations, got {second:?}"
    );
    assert!(
        second
            .iter()
            .any(|(level, message)| *level == Level::Debug && message.contains("already")),
        "expected debug records for skipped steps, got {second:?}"
    );
}
