//! Integration tests driving the `mmv` binary with relative patterns inside a temp dir.
//! The user's config is hidden by pointing the config home at the temp dir, and
//! stdin is closed so no question can block.

use assert_cmd::assert::OutputAssertExt; // bring .assert() into scope
use assert_cmd::cargo;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

fn mmv(dir: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("mmv"));
    cmd.current_dir(dir)
        .env_remove("MMV_CONFIG")
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("HOME", dir)
        .stdin(Stdio::null());
    cmd
}

#[test]
fn moves_matching_files() {
    let td = TempDir::new().unwrap();
    td.child("a.txt").write_str("a").unwrap();
    td.child("b.txt").write_str("b").unwrap();

    mmv(td.path()).args(["*.txt", "#1.bak"]).assert().success().stdout("");

    td.child("a.bak").assert("a");
    td.child("b.bak").assert("b");
    td.child("a.txt").assert(predicate::path::missing());
}

#[test]
fn verbose_reports_each_step() {
    let td = TempDir::new().unwrap();
    td.child("a.txt").write_str("a").unwrap();

    mmv(td.path())
        .args(["-v", "*.txt", "#1.bak"])
        .assert()
        .success()
        .stdout("a.txt -> a.bak : done\n");
}

#[test]
fn dry_run_prints_plan_only() {
    let td = TempDir::new().unwrap();
    td.child("a.txt").write_str("a").unwrap();
    td.child("b.txt").write_str("b").unwrap();

    mmv(td.path())
        .args(["-n", "*.txt", "#1.bak"])
        .assert()
        .success()
        .stdout("a.txt -> a.bak\nb.txt -> b.bak\n");
    td.child("a.txt").assert(predicate::path::exists());
    td.child("a.bak").assert(predicate::path::missing());
}

#[test]
fn conflicting_flags_fail() {
    let td = TempDir::new().unwrap();
    td.child("a.txt").write_str("a").unwrap();

    mmv(td.path())
        .args(["-c", "-l", "*.txt", "#1.bak"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("at most one mode option"));
    td.child("a.bak").assert(predicate::path::missing());
}

#[test]
fn invalid_reference_fails() {
    let td = TempDir::new().unwrap();
    td.child("a.txt").write_str("a").unwrap();

    mmv(td.path())
        .args(["*.txt", "#2.bak"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("mmv: to pattern contains invalid glob reference #2"));
}

#[test]
fn no_matches_fails() {
    let td = TempDir::new().unwrap();
    mmv(td.path())
        .args(["*.none", "#1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no matches"));
}

#[test]
fn missing_patterns_is_a_usage_error() {
    let td = TempDir::new().unwrap();
    mmv(td.path()).arg("*.txt").assert().code(2);
}

#[test]
fn existing_destination_without_terminal_is_refused() {
    let td = TempDir::new().unwrap();
    td.child("a.txt").write_str("new").unwrap();
    td.child("a.bak").write_str("old").unwrap();

    mmv(td.path())
        .args(["*.txt", "#1.bak"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("a.bak already exists"));
    td.child("a.bak").assert("old");

    mmv(td.path()).args(["-d", "*.txt", "#1.bak"]).assert().success();
    td.child("a.bak").assert("new");
}

#[test]
fn collisions_are_listed() {
    let td = TempDir::new().unwrap();
    td.child("a1").write_str("1").unwrap();
    td.child("a2").write_str("2").unwrap();

    mmv(td.path())
        .args(["a?", "b"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(
            predicate::str::contains("mmv: destination conflict: a1, a2 -> b\n")
                .and(predicate::str::contains("same \"to\" name")),
        );
}

#[test]
fn short_h_matches_hidden_files() {
    let td = TempDir::new().unwrap();
    td.child(".a.txt").write_str("h").unwrap();

    mmv(td.path()).args(["*.txt", "#1.bak"]).assert().code(1);
    mmv(td.path()).args(["-h", "*.txt", "#1.bak"]).assert().success();
    td.child(".a.bak").assert("h");
}

#[test]
fn print_config_succeeds() {
    let td = TempDir::new().unwrap();
    mmv(td.path())
        .arg("--print-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("config.xml"));
}

#[cfg(unix)]
#[test]
fn invoked_as_mcp_copies() {
    let td = TempDir::new().unwrap();
    let mcp = td.path().join("mcp");
    fs::copy(cargo::cargo_bin!("mmv"), &mcp).unwrap();
    td.child("a.txt").write_str("a").unwrap();

    let mut cmd = Command::new(&mcp);
    cmd.current_dir(td.path())
        .env_remove("MMV_CONFIG")
        .env("XDG_CONFIG_HOME", td.path().join(".config"))
        .stdin(Stdio::null())
        .args(["*.txt", "#1.bak"]);
    cmd.assert().success();

    td.child("a.txt").assert("a");
    td.child("a.bak").assert("a");
}
