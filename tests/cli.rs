use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn ctxconf(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ctxconf").unwrap();
    // Keep user settings out of the way
    cmd.current_dir(dir.path())
        .env("CTXCONF_CONFIG", dir.path().join("no-settings.toml"))
        .env("XDG_CONFIG_HOME", dir.path())
        .env_remove("RUST_LOG");
    cmd
}

fn base(dir: &TempDir) -> PathBuf {
    write(
        dir.path(),
        "base.toml",
        r#"
mode = "fast"

[ranges]
0-10 = "x"
10-20 = "y"
"#,
    )
}

#[test]
fn test_get_point() {
    let dir = TempDir::new().unwrap();
    let base = base(&dir);
    ctxconf(&dir)
        .arg("--layer")
        .arg(&base)
        .args(["get", "ranges", "5"])
        .assert()
        .success()
        .stdout("\"x\"\n");
}

#[test]
fn test_get_span_prints_segments() {
    let dir = TempDir::new().unwrap();
    let base = base(&dir);
    ctxconf(&dir)
        .arg("--layer")
        .arg(&base)
        .args(["get", "ranges", "5:15"])
        .assert()
        .success()
        .stdout("[[5,10,\"x\"],[10,15,\"y\"]]\n");
}

#[test]
fn test_missing_point_fails() {
    let dir = TempDir::new().unwrap();
    let base = base(&dir);
    ctxconf(&dir)
        .arg("--layer")
        .arg(&base)
        .args(["get", "ranges", "25"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No value found for key 25"));
}

#[test]
fn test_set_paints_and_saves() {
    let dir = TempDir::new().unwrap();
    let base = base(&dir);
    ctxconf(&dir)
        .arg("--layer")
        .arg(&base)
        .args(["set", "ranges", "3-7", "--value", "\"z\""])
        .assert()
        .success();

    ctxconf(&dir)
        .arg("--layer")
        .arg(&base)
        .args(["snapshot", "ranges"])
        .assert()
        .success()
        .stdout("[[0,3,\"x\"],[3,7,\"z\"],[7,10,\"x\"],[10,20,\"y\"]]\n");
}

#[test]
fn test_overlay_layer_overrides_and_delegates() {
    let dir = TempDir::new().unwrap();
    let base = base(&dir);
    let site = write(dir.path(), "site.json", r#"{"mode": "careful"}"#);

    ctxconf(&dir)
        .arg("-L")
        .arg(&base)
        .arg("-L")
        .arg(&site)
        .args(["get", "mode"])
        .assert()
        .success()
        .stdout("\"careful\"\n");

    ctxconf(&dir)
        .arg("-L")
        .arg(&base)
        .arg("-L")
        .arg(&site)
        .args(["delete", "ranges", "0-10"])
        .assert()
        .success();

    let site_after = fs::read_to_string(&site).unwrap();
    assert!(!site_after.contains("ranges"));
    let base_after = fs::read_to_string(&base).unwrap();
    assert!(!base_after.contains("0-10"));
    assert!(base_after.contains("10-20"));
}

#[test]
fn test_keys_lists_nested_ranges() {
    let dir = TempDir::new().unwrap();
    let base = base(&dir);
    ctxconf(&dir)
        .arg("--layer")
        .arg(&base)
        .args(["keys", "ranges"])
        .assert()
        .success()
        .stdout("(0, 10)\n(10, 20)\n");
}

#[test]
fn test_unbounded_stepped_read_fails_at_first_gap() {
    let dir = TempDir::new().unwrap();
    let base = base(&dir);
    ctxconf(&dir)
        .arg("--layer")
        .arg(&base)
        .args(["get", "ranges", "0:9223372036854775807:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No value found for key 20"));
}

#[test]
fn test_emptied_ranges_can_be_painted_again() {
    let dir = TempDir::new().unwrap();
    let base = base(&dir);
    ctxconf(&dir)
        .arg("--layer")
        .arg(&base)
        .args(["delete", "ranges", "0:100"])
        .assert()
        .success();

    ctxconf(&dir)
        .arg("--layer")
        .arg(&base)
        .args(["set", "ranges", "0-10", "--value", "\"z\""])
        .assert()
        .success();

    ctxconf(&dir)
        .arg("--layer")
        .arg(&base)
        .args(["snapshot", "ranges"])
        .assert()
        .success()
        .stdout("[[0,10,\"z\"]]\n");
}

#[test]
fn test_requires_a_layer() {
    let dir = TempDir::new().unwrap();
    ctxconf(&dir)
        .args(["get", "mode"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No configuration documents given"));
}
