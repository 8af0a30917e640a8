use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use assert_cmd::Command;
use tempfile::tempdir;

// Minimal config for the simulated plant; a fast poll keeps serve runs short.
fn write_config(dir: &tempfile::TempDir, extra: &str) -> PathBuf {
    let toml = format!(
        r#"
[runner]
poll_hz = 200
drain_polls = 2000

[sim]
initial_position = 50.0

{extra}
"#
    );
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn fader(cfg: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("fader").unwrap();
    cmd.arg("--log-level").arg("error").arg("--config").arg(cfg);
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["seek", "--level", "70"], 0, "settled", "stdout")]
#[case(&["seek", "--level", "3"], 0, "seek 3: settled", "stdout")]
#[case(&["self-check"], 0, "self-check ok", "stdout")]
#[case(&["seek"], 2, "required", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    let mut cmd = fader(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn serve_answers_get_state_without_echoing_host_moves() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    fader(&cfg)
        .arg("serve")
        .write_stdin("GetState\nL80\n")
        .assert()
        .success()
        .stdout(predicate::eq("L50\n"));
}

#[rstest]
fn serve_reports_clamped_level_back_to_host() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    fader(&cfg)
        .arg("serve")
        .write_stdin("L150\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("LT100"));
}

#[rstest]
fn serve_ignores_garbage_lines() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    fader(&cfg)
        .arg("serve")
        .write_stdin("hello\nLxyz\nGetState\n")
        .assert()
        .success()
        .stdout(predicate::eq("L50\n"));
}

#[rstest]
#[case("[seek]\ntolerance = 0.0\n", "seek.tolerance")]
#[case("[drive]\nmin_speed = 200\nmax_speed = 100\n", "drive.min_speed")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation")]
fn invalid_config_exits_with_code_2(#[case] extra: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, extra);
    fader(&cfg)
        .arg("self-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains(needle));
}

#[rstest]
fn malformed_toml_is_explained() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "[seek]\ntolerance = \"wide\"\n");
    fader(&cfg)
        .arg("self-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not valid TOML"));
}

#[rstest]
fn missing_config_file_is_reported() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("nope.toml");
    fader(&cfg)
        .arg("self-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Could not read the config file"));
}

#[rstest]
fn adc_fault_bubbles_as_json_error() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    let out = fader(&cfg)
        .arg("--json")
        .arg("seek")
        .arg("--level")
        .arg("20")
        .env("FADER_TEST_SIM_FAULT", "1")
        .assert()
        .code(3)
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8_lossy(&out);
    let line = stderr
        .lines()
        .find(|l| l.contains("\"reason\""))
        .unwrap_or_else(|| panic!("no JSON error line; stderr was: {stderr}"));
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["reason"], "HardwareFault");
    assert_eq!(v["exit_code"], 3);
    assert!(v["message"].as_str().unwrap().contains("no conversion result"));
}

#[rstest]
fn seek_json_reports_outcome_and_position() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    let out = fader(&cfg)
        .arg("--json")
        .arg("seek")
        .arg("--level")
        .arg("95")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8_lossy(&out);
    let line = stdout
        .lines()
        .find(|l| l.contains("\"outcome\""))
        .unwrap_or_else(|| panic!("no JSON line; stdout was: {stdout}"));
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["outcome"], "settled");
    assert_eq!(v["target"], 95);
    let pos = v["position"].as_f64().unwrap();
    assert!((pos - 95.0).abs() <= 1.0, "position {pos}");
}

#[rstest]
fn log_file_is_created_when_configured() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("logs").join("fader.log");
    let extra = format!(
        "[logging]\nfile = {:?}\nlevel = \"debug\"\n",
        log.display().to_string()
    );
    let cfg = write_config(&dir, &extra);
    fader(&cfg).arg("self-check").assert().success();
    assert!(log.exists(), "expected {} to exist", log.display());
}
