use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `twinsim` invocation isolated from the caller's environment and config.
fn twinsim(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("twinsim").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("TWINSIM_PLATFORM")
        .env_remove("TWINSIM_TIMEOUT_MS")
        .env_remove("ANDROID_HOME")
        .env_remove("ANDROID_SDK_ROOT")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(home: &TempDir, json: &str) {
    let dir = home.path().join(".twinsim");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.json"), json).unwrap();
}

#[test]
fn test_help_exits_zero() {
    let home = TempDir::new().unwrap();
    twinsim(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("twinsim"))
        .stdout(predicate::str::contains("press-key"));
}

#[test]
fn test_dry_run_press_key_android() {
    let home = TempDir::new().unwrap();
    twinsim(&home)
        .args(["-p", "android", "--dry-run", "press-key", "4"])
        .assert()
        .success()
        .stdout("adb shell input keyevent 4\n");
}

#[test]
fn test_dry_run_boot_ios_prints_each_step() {
    let home = TempDir::new().unwrap();
    twinsim(&home)
        .args(["-p", "ios", "--dry-run", "boot", "A1B2"])
        .assert()
        .success()
        .stdout("idb kill\nidb boot A1B2\nidb connect A1B2\nopen -a Simulator\n");
}

#[test]
fn test_dry_run_input_android_encodes_spaces() {
    let home = TempDir::new().unwrap();
    twinsim(&home)
        .args(["-p", "android", "--dry-run", "input", "hello world"])
        .assert()
        .success()
        .stdout(predicate::str::contains("input text hello%sworld"));
}

#[test]
fn test_platform_from_env() {
    let home = TempDir::new().unwrap();
    twinsim(&home)
        .env("TWINSIM_PLATFORM", "IOS")
        .args(["--dry-run", "tap", "10", "20"])
        .assert()
        .success()
        .stdout("idb ui tap 10 20\n");
}

#[test]
fn test_dry_run_json_plan() {
    let home = TempDir::new().unwrap();
    let assert = twinsim(&home)
        .args(["-p", "ios", "--format", "json", "--dry-run", "connect", "A1B2"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["action"], "connectSimulator");
    assert_eq!(value["platform"], "ios");
    assert_eq!(value["steps"].as_array().unwrap().len(), 2);
    assert_eq!(value["command"], "idb kill && idb connect A1B2");
}

#[test]
fn test_unknown_platform_exits_two() {
    let home = TempDir::new().unwrap();
    twinsim(&home)
        .args(["-p", "blackberry", "tap", "1", "2"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown platform 'blackberry'"));
}

#[test]
fn test_missing_platform_exits_two() {
    let home = TempDir::new().unwrap();
    twinsim(&home)
        .args(["tap", "1", "2"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--platform"));
}

#[test]
fn test_blank_app_id_exits_two() {
    let home = TempDir::new().unwrap();
    twinsim(&home)
        .args(["-p", "android", "--dry-run", "start-app", ""])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("appId must not be empty"));
}

#[test]
fn test_input_with_newline_exits_two() {
    let home = TempDir::new().unwrap();
    twinsim(&home)
        .args(["-p", "android", "--dry-run", "input", "hi\nreboot"])
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("control characters"));
}

#[test]
fn test_json_error_goes_to_stdout() {
    let home = TempDir::new().unwrap();
    let assert = twinsim(&home)
        .args(["-p", "windows", "--format", "json", "available"])
        .assert()
        .code(2);

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["success"], false);
    assert!(value["error"].as_str().unwrap().contains("windows"));
}

#[test]
fn test_actions_lists_every_action() {
    let home = TempDir::new().unwrap();
    let assert = twinsim(&home).arg("actions").assert().success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let names: Vec<&str> = stdout.lines().collect();
    assert_eq!(names.len(), 12);
    assert!(names.contains(&"screenshot"));
    assert!(names.contains(&"getOpenSimulatorId"));
    assert!(names.contains(&"pressKey"));
}

// Commands below really run through /bin/sh but never reach a platform tool.

#[test]
fn test_connect_android_runs_and_prints_true() {
    let home = TempDir::new().unwrap();
    twinsim(&home)
        .args(["-p", "android", "--quiet", "connect", "emulator-5554"])
        .assert()
        .success()
        .stdout("true\n");
}

#[test]
fn test_boolean_check_reports_false_when_tool_missing() {
    let home = TempDir::new().unwrap();
    write_config(&home, r#"{"tools":{"adb":"/nonexistent/adb"}}"#);

    twinsim(&home)
        .args(["-p", "android", "--quiet", "is-installed", "com.example"])
        .assert()
        .success()
        .stdout("false\n");
}

#[test]
fn test_missing_tool_exits_one() {
    let home = TempDir::new().unwrap();
    write_config(&home, r#"{"tools":{"adb":"/nonexistent/adb"}}"#);

    twinsim(&home)
        .args(["-p", "android", "tap", "1", "2"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Tool not found"));
}

#[test]
fn test_config_init_writes_file() {
    let home = TempDir::new().unwrap();
    let assert = twinsim(&home)
        .args(["--timeout-ms", "0", "config", "--init"])
        .assert()
        .success();

    assert!(home.path().join(".twinsim/config.json").exists());

    // Printed config reflects the flag override, not the file.
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(value["command_timeout_ms"].is_null());
    assert_eq!(value["tools"]["adb"], "adb");
}
