//! Integration tests for the tally binary.
//!
//! These tests verify end-to-end behavior including:
//! - Profile setup and goal locking
//! - Diary logging and live totals
//! - Day advancement and closed-day history
//! - CSV export

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("tally"))
}

/// Run setup with a standard metric profile: BMR 1780, TDEE 2136
fn run_setup(data_dir: &std::path::Path) {
    cli()
        .arg("setup")
        .arg("--data-dir")
        .arg(data_dir)
        .args(["--name", "Sam"])
        .args(["--sex", "male"])
        .args(["--birth-date", "1995-01-01"])
        .args(["--weight", "80"])
        .args(["--height-cm", "180"])
        .args(["--activity", "sedentary"])
        .arg("--metric")
        .assert()
        .success();
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Daily calorie and weight ledger"));
}

#[test]
fn test_setup_creates_profile_and_opens_day() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("setup")
        .arg("--data-dir")
        .arg(&data_dir)
        .args(["--name", "Sam"])
        .args(["--sex", "male"])
        .args(["--birth-date", "1995-01-01"])
        .args(["--weight", "80"])
        .args(["--height-cm", "180"])
        .arg("--metric")
        .args(["--rate", "-0.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile saved"))
        .stdout(predicate::str::contains("1586"));

    // Verify documents were created
    assert!(data_dir.join("profile.json").exists());
    assert!(data_dir.join("days").exists());

    let profile_json = fs::read_to_string(data_dir.join("profile.json")).unwrap();
    assert!(profile_json.contains("\"name\":\"Sam\""));
}

#[test]
fn test_status_without_profile_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("status")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure();
}

#[test]
fn test_food_logging_updates_totals() {
    let temp_dir = setup_test_dir();
    run_setup(temp_dir.path());

    cli()
        .arg("food")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .args(["Lunch", "500"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged food"));

    cli()
        .arg("status")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("500/2136"));
}

#[test]
fn test_workout_subtracts_from_intake() {
    let temp_dir = setup_test_dir();
    run_setup(temp_dir.path());

    cli()
        .arg("food")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .args(["Dinner", "800"])
        .assert()
        .success();

    cli()
        .arg("workout")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .args(["Run", "200"])
        .assert()
        .success()
        .stdout(predicate::str::contains("600/2136"));
}

#[test]
fn test_water_conversion_into_display_unit() {
    let temp_dir = setup_test_dir();
    run_setup(temp_dir.path());

    // 1/2 gal is ~64 fl oz in the default display unit
    cli()
        .arg("water")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .args(["1/2", "gal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("64.0"));

    cli()
        .arg("water")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .args(["16", "fl", "oz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("80.0"));
}

#[test]
fn test_weigh_in_reports_average() {
    let temp_dir = setup_test_dir();
    run_setup(temp_dir.path());

    cli()
        .arg("weigh")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("80")
        .assert()
        .success();

    cli()
        .arg("weigh")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("82")
        .assert()
        .success()
        .stdout(predicate::str::contains("81.0 kg"));
}

#[test]
fn test_advance_closes_day_and_history_shows_it() {
    let temp_dir = setup_test_dir();
    run_setup(temp_dir.path());

    cli()
        .arg("food")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .args(["Lunch", "500"])
        .assert()
        .success();

    cli()
        .arg("advance")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("UNDER"));

    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("500"))
        .stdout(predicate::str::contains("UNDER"));
}

#[test]
fn test_goal_locked_after_advance_despite_same_day_edits() {
    let temp_dir = setup_test_dir();
    run_setup(temp_dir.path());

    // Overeat, then advance: the closed day reads OVER
    cli()
        .arg("food")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .args(["Buffet", "9000"])
        .assert()
        .success();

    cli()
        .arg("advance")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("OVER"));

    // Mutating the closed day is rejected; only the new open day accepts
    cli()
        .arg("status")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0/2136"));
}

#[test]
fn test_multi_day_advance_builds_streak() {
    let temp_dir = setup_test_dir();
    run_setup(temp_dir.path());

    cli()
        .arg("advance")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .args(["--days", "3"])
        .assert()
        .success();

    cli()
        .arg("status")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Streak: 3"));
}

#[test]
fn test_export_writes_csv() {
    let temp_dir = setup_test_dir();
    run_setup(temp_dir.path());

    cli()
        .arg("advance")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    let out = temp_dir.path().join("history.csv");
    cli()
        .arg("export")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 closed days"));

    let contents = fs::read_to_string(&out).unwrap();
    assert!(contents.contains("calorie_goal"));
    assert!(contents.contains("pass"));
}

#[test]
fn test_remove_entry_by_id() {
    let temp_dir = setup_test_dir();
    run_setup(temp_dir.path());

    let output = cli()
        .arg("food")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .args(["Snack", "300"])
        .output()
        .expect("Failed to run food command");
    let stdout = String::from_utf8(output.stdout).unwrap();

    // The id is printed in parentheses
    let id = stdout
        .split('(')
        .nth(1)
        .and_then(|s| s.split(')').next())
        .expect("Expected entry id in output")
        .to_string();

    cli()
        .arg("remove")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg(&id)
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed diary entry"));

    cli()
        .arg("status")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0/2136"));
}
