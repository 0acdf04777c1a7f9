use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_config(dir: &tempfile::TempDir, toml: &str) -> PathBuf {
    let path = dir.path().join("teleop.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn teleop() -> Command {
    let mut cmd = Command::cargo_bin("teleop").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["health"], 0, "OK", "stdout")]
#[case(&["self-check"], 0, "OK", "stdout")]
#[case(&["drive", "--scenario", "idle", "--duration-s", "1"], 0, "drive complete", "stdout")]
#[case(&["drive", "--scenario", "step-turn"], 0, "final pose", "stdout")]
#[case(&["drive", "--scenario", "donuts"], 2, "unknown scenario", "stderr")]
#[case(&["drive", "--duration-s=-1"], 2, "duration_s must be >= 0", "stderr")]
#[case(&["filter", "--cutoff-hz", "0.9", "--quality", "0.5"], 0, "peak", "stdout")]
#[case(&["filter", "--cutoff-hz", "0"], 2, "could not be designed", "stderr")]
#[case(&["filter"], 2, "required", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let mut cmd = teleop();
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
#[case("[loop]\nrate_hz = 0.0\n", "loop.rate_hz must be > 0")]
#[case("[loop]\nrate_hz = 1e-30\n", "too low for a tick period")]
#[case("[forward]\nfilter = { cutoff_hz = -1.0 }\n", "forward.filter.cutoff_hz must be > 0")]
#[case("[loop]\nrate_hz = \"fast\"\n", "Configuration rejected")]
fn invalid_config_exits_with_config_code(#[case] toml: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, toml);
    teleop()
        .arg("--config")
        .arg(&cfg)
        .args(["drive", "--scenario", "idle"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(needle));
}

#[test]
fn missing_config_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    teleop()
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg("health")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("read config"));
}

#[test]
fn config_values_reach_the_drive() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "[loop]\nrate_hz = 10.0\n\n[forward]\nmax = 2.0\n");
    teleop()
        .arg("--config")
        .arg(&cfg)
        .args(["drive", "--scenario", "full-throttle", "--duration-s", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ticks=20"));
}

#[test]
fn drives_from_a_script_csv() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("stick.csv");
    let mut f = fs::File::create(&script).unwrap();
    writeln!(f, "t_s,forward,lateral,yaw").unwrap();
    writeln!(f, "0.0,0.0,0.0,0.0").unwrap();
    writeln!(f, "0.5,1.0,0.0,0.5").unwrap();

    teleop()
        .arg("drive")
        .arg("--script")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("stick.csv"));
}

#[test]
fn cli_reports_bad_script_header() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("stick.csv");
    let mut f = fs::File::create(&script).unwrap();
    writeln!(f, "time,x,y,z").unwrap();
    writeln!(f, "0.0,0.0,0.0,0.0").unwrap();

    teleop()
        .arg("drive")
        .arg("--script")
        .arg(&script)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("must have headers"));
}

#[test]
fn scenario_and_script_conflict() {
    teleop()
        .args(["drive", "--scenario", "idle", "--script", "x.csv"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn telemetry_csv_is_written() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("telemetry.csv");
    teleop()
        .args(["drive", "--scenario", "slalom", "--duration-s", "1"])
        .arg("--telemetry-csv")
        .arg(&out)
        .assert()
        .success();

    let text = fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("t_s,dt_s,xd_req,xd_unfilt,xd_d,yd_req,yd_unfilt,yd_d,rzd_req,rzd_unfilt,rzd_d"));
    let rows = lines.count();
    assert!((30..=31).contains(&rows), "rows {rows}");
}

#[test]
fn telemetry_csv_shows_request_ahead_of_shaped_command() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("ramp.csv");
    teleop()
        .args(["drive", "--scenario", "full-throttle", "--duration-s", "2"])
        .arg("--telemetry-csv")
        .arg(&out)
        .assert()
        .success();

    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let headers = rdr.headers().unwrap().clone();
    let col = |name: &str| headers.iter().position(|h| h == name).unwrap();
    let (req, unfilt, shaped) = (col("xd_req"), col("xd_unfilt"), col("xd_d"));

    let mut leading = 0;
    for record in rdr.records() {
        let record = record.unwrap();
        let v = |i: usize| record[i].parse::<f64>().unwrap();
        assert!(v(unfilt) <= v(req) + 1e-9, "slew passed the request: {record:?}");
        assert!(v(shaped) <= v(unfilt) + 1e-9, "filter passed the slew: {record:?}");
        if v(req) - v(shaped) > 1.0 {
            leading += 1;
        }
    }
    // Stick goes full forward at 0.5 s; the shaped command ramps at 1.5 m/s²
    assert!(leading > 30, "request led on only {leading} rows");
}

#[test]
fn log_file_receives_json_lines() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("teleop.log");
    let cfg = write_config(
        &dir,
        &format!(
            "[logging]\nfile = \"{}\"\nlevel = \"info\"\n",
            log.display().to_string().replace('\\', "\\\\")
        ),
    );
    teleop()
        .arg("--config")
        .arg(&cfg)
        .args(["drive", "--scenario", "idle", "--duration-s", "0.5"])
        .assert()
        .success();

    let text = fs::read_to_string(&log).unwrap();
    assert!(text.contains("drive finished"), "log: {text}");
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        serde_json::from_str::<serde_json::Value>(line).expect("JSON line");
    }
}
