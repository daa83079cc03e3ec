//! Shared E2E test helpers for `portal` binary tests.

use assert_cmd::cargo::cargo_bin_cmd;
use std::time::Duration;

/// Default timeout for CLI tests.
pub const TIMEOUT_BASIC: Duration = Duration::from_secs(10);

/// Variables the binary reads; cleared so the host environment cannot leak in.
const PORTAL_VARS: &[&str] = &[
    "PORTAL_DEBUG",
    "PORTAL_URL",
    "PORTAL_IDLE_TIMEOUT_SECS",
    "PORTAL_LOGIN_PATH",
    "PORTAL_LOG_LEVEL",
    "PORTAL_PUBLIC_KEY",
    "PORTAL_SERVICE_ROLE_KEY",
    "RUST_LOG",
];

/// Build a Command for the `portal` binary rooted in a fresh project dir.
///
/// Keep the returned guard alive for the test's duration.
pub fn portal_cmd() -> (assert_cmd::Command, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("create temp project dir");
    let mut cmd: assert_cmd::Command = cargo_bin_cmd!("portal");
    cmd.timeout(TIMEOUT_BASIC);
    for var in PORTAL_VARS {
        cmd.env_remove(var);
    }
    cmd.args(["-C", tmp.path().to_str().expect("valid utf8")]);
    (cmd, tmp)
}
