use fader_config::load_toml;
use rstest::rstest;

#[rstest]
#[case("[drive]\nmin_speed = 200\nmax_speed = 150\n", "drive.min_speed must be <= drive.max_speed")]
#[case("[drive]\nmax_speed = 0\nmin_speed = 0\n", "drive.max_speed must be > 0")]
#[case("[gains]\nconservative = { kp = -0.2 }\n", "gains.conservative.kp")]
#[case("[seek]\ntolerance = 0.0\n", "seek.tolerance must be > 0")]
#[case("[seek]\nfine_approach = 0.5\n", "seek.fine_approach must be > seek.tolerance")]
#[case("[seek]\nescape_distance = 3.0\n", "seek.escape_distance must be >= seek.fine_approach")]
#[case("[seek]\nmax_iterations = 0\n", "seek.max_iterations must be >= 1")]
#[case("[endpoints]\nzone = 60.0\n", "endpoints.zone")]
#[case("[endpoints]\nlow_waypoint = 8\n", "endpoints.low_waypoint")]
#[case("[endpoints]\nhigh_waypoint = 95\n", "endpoints.high_waypoint")]
#[case("[gesture]\nhold_interval_ms = 0\n", "gesture.hold_interval_ms must be >= 1")]
#[case("[sync]\nwindow = 0\n", "sync.window must be >= 1")]
#[case("[sync]\nhysteresis = -1.0\n", "sync.hysteresis must be >= 0")]
#[case("[sensor]\nraw_min = 100\nraw_max = 100\n", "sensor.raw_max must be > sensor.raw_min")]
#[case("[sensor]\ndead_low = 96.0\ndead_high = 3.0\n", "sensor.dead_low")]
#[case("[runner]\npoll_hz = 0\n", "runner.poll_hz must be > 0")]
#[case("[sim]\ncoast = 1.5\n", "sim.coast must be in [0.0, 1.0]")]
fn rejects_bad_values(#[case] toml: &str, #[case] expected: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(expected),
        "expected {expected:?} in {err}"
    );
}

#[test]
fn accepts_full_firmware_profile() {
    let toml = r#"
[gains]
aggressive = { kp = 1.0, ki = 0.0, kd = 0.0 }
conservative = { kp = 0.2, ki = 0.0, kd = 0.0 }

[drive]
min_speed = 30
max_speed = 150

[seek]
tolerance = 1.0
fine_approach = 5.0
escape_distance = 10.0
settle_ms = 10

[endpoints]
zone = 10.0
low_waypoint = 12
high_waypoint = 88

[gesture]
debounce_ms = 20
click_interval_ms = 500
hold_interval_ms = 750
drift_limit = 2.0

[sync]
window = 20
hysteresis = 0.625

[sensor]
raw_min = 0
raw_max = 1000
dead_low = 3.0
dead_high = 96.0
invert = true

[touch]
threshold = 40
active_below = true

[runner]
poll_hz = 20

[logging]
level = "debug"
rotation = "daily"
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config");
    assert_eq!(cfg.sensor.raw_max, 1000);
    assert!(cfg.sensor.invert);
    assert_eq!(cfg.runner.poll_hz, 20);
    assert_eq!(cfg.logging.rotation.as_deref(), Some("daily"));
}

#[test]
fn unknown_types_fail_to_parse() {
    assert!(load_toml("[drive]\nmin_speed = \"fast\"\n").is_err());
    assert!(load_toml("[drive]\nmax_speed = 300\n").is_err());
}

#[test]
fn loads_from_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fader.toml");
    std::fs::write(&path, "[runner]\npoll_hz = 100\n").expect("write");
    let text = std::fs::read_to_string(&path).expect("read");
    let cfg = load_toml(&text).expect("parse");
    cfg.validate().expect("valid");
    assert_eq!(cfg.runner.poll_hz, 100);
}

#[test]
fn shipped_config_is_stock_tuning() {
    let cfg = fader_config::load_toml(include_str!("../../etc/fader_config.toml")).unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.gains, fader_config::Config::default().gains);
    assert_eq!(cfg.seek, fader_config::Config::default().seek);
    assert_eq!(cfg.sim, fader_config::Config::default().sim);
    assert_eq!(cfg.logging.rotation.as_deref(), Some("never"));
}
