use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_check_reports_errors() {
    let dir = tempdir().unwrap();
    let page = dir.path().join("Example_page.wiki");
    fs::write(&page, "Intro\n<ref name>x</ref>\n").unwrap();

    let mut cmd = cargo_bin_cmd!("wikilint");
    cmd.current_dir(dir.path())
        .args(["--color", "never", "check"])
        .arg(&page)
        .assert()
        .code(1)
        .stdout(predicate::str::contains(":2:1:"))
        .stdout(predicate::str::contains("[CW104]"))
        .stdout(predicate::str::contains("\"<ref>\" [auto]"));
}

#[test]
fn test_check_clean_file() {
    let dir = tempdir().unwrap();
    let page = dir.path().join("Clean.wiki");
    fs::write(&page, "<ref name=\"a\">x</ref>\n").unwrap();

    let mut cmd = cargo_bin_cmd!("wikilint");
    cmd.current_dir(dir.path())
        .args(["--color", "never", "check"])
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains("No errors found"));
}

#[test]
fn test_check_json_output() {
    let dir = tempdir().unwrap();
    let page = dir.path().join("page.wiki");
    fs::write(&page, "{{T|a=x<br>}}").unwrap();

    let mut cmd = cargo_bin_cmd!("wikilint");
    let output = cmd
        .current_dir(dir.path())
        .args(["check", "--title", "Some page", "--output", "json"])
        .arg(&page)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports[0]["page"], "Some page");
    assert_eq!(reports[0]["errors"][0]["rule"], 59);
    assert_eq!(reports[0]["errors"][0]["results"][0]["begin"], 7);
}

#[test]
fn test_fix_writes_file() {
    let dir = tempdir().unwrap();
    let page = dir.path().join("page.wiki");
    fs::write(&page, "{{T|a=x<br>}}<ref name=\"abc>y</ref>").unwrap();

    let mut cmd = cargo_bin_cmd!("wikilint");
    cmd.current_dir(dir.path())
        .args(["--color", "never", "fix"])
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 1 file(s) modified"));
    assert_eq!(
        fs::read_to_string(&page).unwrap(),
        "{{T|a=x}}<ref name=\"abc\">y</ref>"
    );
}

#[test]
fn test_fix_dry_run_and_manual_review() {
    let dir = tempdir().unwrap();
    let page = dir.path().join("Manual.wiki");
    let contents = "<ref name=abc\">y</ref>";
    fs::write(&page, contents).unwrap();

    let mut cmd = cargo_bin_cmd!("wikilint");
    cmd.current_dir(dir.path())
        .args(["--color", "never", "fix", "--dry-run"])
        .arg(&page)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Needs manual review:"))
        .stdout(predicate::str::contains("Manual"));
    assert_eq!(fs::read_to_string(&page).unwrap(), contents);
}

#[test]
fn test_rules_and_init() {
    let dir = tempdir().unwrap();

    let mut cmd = cargo_bin_cmd!("wikilint");
    cmd.current_dir(dir.path())
        .args(["--color", "never", "rules"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CW059"))
        .stdout(predicate::str::contains("ignore-templates (optional, multiple)"))
        .stdout(predicate::str::contains("CW104"));

    let mut cmd = cargo_bin_cmd!("wikilint");
    cmd.current_dir(dir.path()).arg("init").assert().success();
    assert!(dir.path().join("wikilint.toml").exists());

    let mut cmd = cargo_bin_cmd!("wikilint");
    cmd.current_dir(dir.path()).arg("init").assert().code(2);
}

#[test]
fn test_missing_config_is_tool_error() {
    let dir = tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("wikilint");
    cmd.current_dir(dir.path())
        .args(["--config", "absent.toml", "rules"])
        .assert()
        .code(2);
}

#[test]
fn test_bot_only_rule_is_left_to_bot_fix() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("wikilint.toml");
    fs::write(&config, "[wiki.CW104]\nprio = 0\nbot = true\n").unwrap();
    let page = dir.path().join("page.wiki");
    fs::write(&page, "<ref name>x</ref>").unwrap();

    let mut cmd = cargo_bin_cmd!("wikilint");
    cmd.current_dir(dir.path())
        .args(["--color", "never", "check"])
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains("No errors found"));

    let mut cmd = cargo_bin_cmd!("wikilint");
    cmd.current_dir(dir.path())
        .args(["--color", "never", "fix"])
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 of 1 file(s) modified"));

    let mut cmd = cargo_bin_cmd!("wikilint");
    cmd.current_dir(dir.path())
        .args(["--color", "never", "fix", "--mode", "bot"])
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 1 file(s) modified"));
    assert_eq!(fs::read_to_string(&page).unwrap(), "<ref>x</ref>");
}

#[test]
fn test_check_shows_warning_level() {
    let dir = tempdir().unwrap();
    let page = dir.path().join("page.wiki");
    fs::write(&page, "{{T|a=x<br clear=\"all\">}}").unwrap();

    let mut cmd = cargo_bin_cmd!("wikilint");
    cmd.current_dir(dir.path())
        .args(["--color", "never", "check"])
        .arg(&page)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[CW059] warning:"))
        .stdout(predicate::str::contains("[manual]"));
}
