//! E2E tests for the `portal` binary.
//!
//! Results go to stdout; logs and errors go to stderr.

mod common;

use common::portal_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

const SERVICE_KEY: &str = "svc-4c1f9a";

// ─── check-config ──────────────────────────────────────────────────

#[test]
fn check_config_fails_without_keys() {
    let (mut cmd, _guard) = portal_cmd();
    cmd.arg("check-config")
        .assert()
        .failure()
        .stdout(contains("PORTAL_PUBLIC_KEY: missing"))
        .stderr(contains("PORTAL_PUBLIC_KEY"));
}

#[test]
fn check_config_reports_presence_not_values() {
    let (mut cmd, _guard) = portal_cmd();
    cmd.env("PORTAL_PUBLIC_KEY", "pub-123")
        .env("PORTAL_SERVICE_ROLE_KEY", SERVICE_KEY)
        .arg("check-config")
        .assert()
        .success()
        .stdout(contains("PORTAL_SERVICE_ROLE_KEY: present"))
        .stdout(contains(SERVICE_KEY).not())
        .stdout(contains("pub-123").not());
}

#[test]
fn check_config_rejects_bad_env_value() {
    let (mut cmd, _guard) = portal_cmd();
    cmd.env("PORTAL_IDLE_TIMEOUT_SECS", "soon")
        .arg("check-config")
        .assert()
        .failure()
        .stderr(contains("PORTAL_IDLE_TIMEOUT_SECS"));
}

// ─── authorize ─────────────────────────────────────────────────────

#[test]
fn student_cannot_create_scores() {
    let (mut cmd, _guard) = portal_cmd();
    cmd.args([
        "authorize",
        "--role",
        "student",
        "--collection",
        "scores",
        "--operation",
        "create",
    ])
    .assert()
    .success()
    .stdout(contains("\"allow\": false"))
    .stdout(contains("capability"));
}

#[test]
fn teacher_creates_scores_in_own_class_only() {
    let own = "6f1c2a4e-8b7d-4c1e-9a3f-2d5e6f7a8b9c";
    let other = "0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d";

    let (mut cmd, _guard) = portal_cmd();
    cmd.args([
        "authorize", "--role", "teacher", "--status", "active", "--classes", own,
        "--collection", "scores", "--operation", "create", "--row",
    ])
    .arg(format!("class_id={own}"))
    .assert()
    .success()
    .stdout(contains("\"allow\": true"));

    let (mut cmd, _guard) = portal_cmd();
    cmd.args([
        "authorize", "--role", "teacher", "--classes", own, "--collection", "scores",
        "--operation", "create", "--row",
    ])
    .arg(format!("class_id={other}"))
    .assert()
    .success()
    .stdout(contains("\"allow\": false"))
    .stdout(contains("out_of_scope"));
}

#[test]
fn on_leave_teacher_denied_write() {
    let (mut cmd, _guard) = portal_cmd();
    cmd.args([
        "authorize", "--role", "teacher", "--status", "on leave", "--collection", "settings",
        "--operation", "update",
    ])
    .assert()
    .success()
    .stdout(contains("on_leave"));
}

#[test]
fn unknown_collection_is_usage_error() {
    let (mut cmd, _guard) = portal_cmd();
    cmd.args([
        "authorize", "--role", "admin", "--collection", "grades", "--operation", "read",
    ])
    .assert()
    .failure()
    .stderr(contains("grades"));
}

// ─── feeds ─────────────────────────────────────────────────────────

fn write_fixture(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("fixture.json");
    std::fs::write(
        &path,
        r#"{
            "news": [
                { "id": "old", "published_at": "2026-01-01T00:00:00Z" },
                { "id": "new", "published_at": "2026-09-01T00:00:00Z" }
            ],
            "gallery": [
                { "id": "g1", "spotlight": false },
                { "id": "g2", "spotlight": true, "created_at": "2026-03-01T00:00:00Z" }
            ]
        }"#,
    )
    .expect("write fixture");
    path
}

#[test]
fn feeds_fail_closed_without_service_key() {
    let (mut cmd, guard) = portal_cmd();
    let fixture = write_fixture(guard.path());
    cmd.args(["feeds", "--data"])
        .arg(&fixture)
        .arg("news")
        .assert()
        .failure()
        .stderr(contains("PORTAL_SERVICE_ROLE_KEY"));
}

#[test]
fn news_feed_newest_first() {
    let (mut cmd, guard) = portal_cmd();
    let fixture = write_fixture(guard.path());
    let output = cmd
        .env("PORTAL_SERVICE_ROLE_KEY", SERVICE_KEY)
        .args(["feeds", "--limit", "1", "--data"])
        .arg(&fixture)
        .arg("news")
        .output()
        .expect("run portal");

    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(rows.as_array().map(Vec::len), Some(1));
    assert_eq!(rows[0]["id"], "new");
    assert!(!String::from_utf8_lossy(&output.stderr).contains(SERVICE_KEY));
}

#[test]
fn gallery_only_spotlighted() {
    let (mut cmd, guard) = portal_cmd();
    let fixture = write_fixture(guard.path());
    cmd.env("PORTAL_SERVICE_ROLE_KEY", SERVICE_KEY)
        .args(["feeds", "--data"])
        .arg(&fixture)
        .arg("gallery")
        .assert()
        .success()
        .stdout(contains("g2"))
        .stdout(contains("g1").not());
}

// ─── session ───────────────────────────────────────────────────────

#[test]
fn session_logout_redirects_to_login() {
    let (mut cmd, _guard) = portal_cmd();
    cmd.args(["session", "--idle-secs", "60"])
        .write_stdin("mousedown\nkeypress\nlogout\n")
        .assert()
        .success()
        .stdout(contains("session started"))
        .stdout(contains("redirect: /login\n"))
        .stdout(contains("state: logged_out"));
}

#[test]
fn session_detaches_on_eof() {
    let (mut cmd, _guard) = portal_cmd();
    cmd.args(["session", "--role", "student"])
        .write_stdin("scroll\n")
        .assert()
        .success()
        .stdout(contains("session detached"))
        .stdout(contains("redirect").not());
}

#[test]
fn session_rejects_anonymous() {
    let (mut cmd, _guard) = portal_cmd();
    cmd.args(["session", "--role", "nobody"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(contains("authentication required"));
}
