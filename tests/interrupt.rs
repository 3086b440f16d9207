//! The shutdown flag is process-wide, so these run in their own test binary and serially.

use serial_test::serial;
use std::fs;
use tempfile::tempdir;

use mmv::run::run;
use mmv::{shutdown, Config, MmvError, Outcome, ScriptedPrompter};

#[test]
#[serial]
fn interrupt_before_first_step_changes_nothing() {
    let td = tempdir().unwrap();
    fs::write(td.path().join("ab"), "first").unwrap();
    fs::write(td.path().join("ba"), "second").unwrap();

    shutdown::request();
    let report = run(
        &Config::default(),
        &format!("{}/??", td.path().display()),
        &format!("{}/#2#1", td.path().display()),
        &mut ScriptedPrompter::default(),
    )
    .unwrap();
    shutdown::reset();

    assert_eq!(report.outcome, Outcome::Interrupted);
    assert_eq!(report.completed, 0);
    assert_eq!(fs::read_to_string(td.path().join("ab")).unwrap(), "first");
    assert!(matches!(report.into_result(), Err(MmvError::Interrupted)));
    assert_eq!(MmvError::Interrupted.code(), mmv::EXIT_INTERRUPTED);
}

#[test]
#[serial]
fn reset_allows_the_next_run() {
    shutdown::request();
    shutdown::reset();
    assert!(!shutdown::is_requested());

    let td = tempdir().unwrap();
    fs::write(td.path().join("a.txt"), "a").unwrap();
    let report = run(
        &Config::default(),
        &format!("{}/*.txt", td.path().display()),
        &format!("{}/#1.bak", td.path().display()),
        &mut ScriptedPrompter::default(),
    )
    .unwrap();
    assert_eq!(report.outcome, Outcome::Completed);
}
