use rstest::rstest;
use teleop_config::load_toml;

const FULL: &str = r#"
[loop]
rate_hz = 50.0

[input]
deadband = 0.15
lateral_deadband = 0.05
xd_full_scale = 6.0
yd_full_scale = 0.4
rzd_full_scale = 0.8

[forward]
min = -2.0
max = 6.0
slew_limit = 2.0
min_slew_limit = 0.5
min_slew_vel = 5.0
filter = { cutoff_hz = 1.2, quality = 0.7 }

[lateral]
min = -0.4
max = 0.4
slew_limit = 1.0

[yaw]
min = -0.8
max = 0.8
slew_limit = 1.0
roll_limit_rad = 0.3

[yaw.filter]
cutoff_hz = 2.5

[joystick]
x_axis = 1
y_axis = 0
rz_axis = 2
lbump = 4
rbump = 5
x_inv = false

[arena]
width_m = 40.0
height_m = 30.0

[telemetry]
history = 250

[logging]
level = "debug"
rotation = "daily"
"#;

#[test]
fn full_document_parses_and_validates() {
    let cfg = load_toml(FULL).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.control_loop.rate_hz, 50.0);
    assert_eq!(cfg.input.deadband, 0.15);
    let yaw_filter = cfg.yaw.filter.expect("yaw filter");
    assert_eq!(yaw_filter.cutoff_hz, 2.5);
    assert_eq!(yaw_filter.quality, None);
    let js = cfg.joystick.expect("joystick override");
    assert!(!js.x_inv);
    assert!(!js.y_inv);
    assert!(js.rz_inv);
    assert_eq!(cfg.telemetry.history, 250);
    assert_eq!(cfg.logging.rotation.as_deref(), Some("daily"));
}

#[rstest]
#[case("[loop]\nrate_hz = 0.0\n", "loop.rate_hz must be > 0")]
#[case("[loop]\nrate_hz = -30.0\n", "loop.rate_hz must be > 0")]
#[case("[loop]\nrate_hz = 1e-30\n", "loop.rate_hz is too low for a tick period")]
#[case("[input]\ndeadband = 1.0\n", "input.deadband must be in")]
#[case("[input]\nlateral_deadband = -0.1\n", "input.lateral_deadband must be in")]
#[case("[input]\nxd_full_scale = inf\n", "input.xd_full_scale must be finite")]
#[case("[forward]\nslew_limit = -1.0\n", "forward.slew_limit must be >= 0")]
#[case("[forward]\nmin_slew_limit = -0.5\n", "forward.min_slew_limit must be >= 0")]
#[case("[forward]\nmin_slew_vel = -7.0\n", "forward.min_slew_vel must be >= 0")]
#[case("[forward]\nfilter = { cutoff_hz = 0.0 }\n", "forward.filter.cutoff_hz must be > 0")]
#[case("[yaw]\nfilter = { cutoff_hz = 3.0, quality = 0.0 }\n", "yaw.filter.quality must be > 0")]
#[case("[lateral]\nslew_limit = -0.1\n", "lateral.slew_limit must be >= 0")]
#[case("[yaw]\nslew_limit = -0.1\n", "yaw.slew_limit must be >= 0")]
#[case("[arena]\nwidth_m = 0.0\n", "arena.width_m must be > 0")]
#[case("[arena]\nheight_m = -1.0\n", "arena.height_m must be > 0")]
#[case("[telemetry]\nhistory = 0\n", "telemetry.history must be >= 1")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation must be one of never, daily, hourly")]
#[case(
    "[joystick]\nx_axis = 1\ny_axis = 1\nrz_axis = 0\nlbump = 4\nrbump = 5\n",
    "must be distinct"
)]
fn rejects_out_of_range_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(needle),
        "expected '{needle}' in '{err}'"
    );
}

#[test]
fn inverted_channel_limits_are_not_validated() {
    let cfg = load_toml("[lateral]\nmin = 1.0\nmax = -1.0\n").expect("parse TOML");
    cfg.validate().expect("min/max ordering is the caller's concern");
}

#[test]
fn disabled_filter_still_needs_a_cutoff_to_parse() {
    let err = load_toml("[forward.filter]\nenabled = false\n").expect_err("cutoff_hz required");
    assert!(format!("{err}").contains("cutoff_hz"));
}

#[test]
fn unknown_types_fail_to_parse() {
    assert!(load_toml("[loop]\nrate_hz = \"fast\"\n").is_err());
}

#[test]
fn shipped_sample_config_matches_defaults() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../etc/teleop.toml");
    let text = std::fs::read_to_string(&path).expect("read etc/teleop.toml");
    let cfg = load_toml(&text).expect("sample parses");
    cfg.validate().expect("sample is valid");

    let defaults = load_toml("").expect("empty parses");
    assert_eq!(cfg.control_loop.rate_hz, defaults.control_loop.rate_hz);
    assert_eq!(cfg.forward.max, defaults.forward.max);
    assert!((cfg.yaw.slew_limit - defaults.yaw.slew_limit).abs() < 1e-12);
    assert!((cfg.arena.width_m - defaults.arena.width_m).abs() < 1e-9);
    assert_eq!(cfg.telemetry.history, defaults.telemetry.history);
    assert_eq!(cfg.logging.rotation.as_deref(), Some("never"));
}
