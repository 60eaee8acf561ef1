use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_match_reference_timing() {
    let settings = Settings::default();
    let sim = settings.simulator_config();
    assert_eq!(sim.interval, Duration::from_millis(3500));
    assert_eq!(sim.settle_delay, Duration::from_secs(1));
    assert_eq!(sim.timeout, None);
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
api_url = "https://applywise.example.com/api/v1"
access_token = "file-token"
stage_interval_ms = 500
analysis_timeout_secs = 90
"#,
    )
    .expect("valid file");

    assert_eq!(settings.api_url, "https://applywise.example.com/api/v1");
    assert_eq!(settings.access_token.as_deref(), Some("file-token"));
    assert_eq!(settings.stage_interval_ms, 500);
    assert_eq!(settings.settle_delay_ms, 1000);
    assert_eq!(
        settings.simulator_config().timeout,
        Some(Duration::from_secs(90))
    );
}

#[test]
fn zero_timeout_means_wait_forever() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "analysis_timeout_secs = 0").expect("valid file");
    assert_eq!(settings.analysis_timeout_secs, None);
}

#[test]
fn unknown_keys_are_rejected() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "api_urll = \"typo\"").is_err());
}

#[test]
fn app_prefixed_env_wins_over_short_names() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        lookup_from(&[
            ("APPLYWISE_API_URL", "http://short.example"),
            ("APP__API_URL", "http://prefixed.example"),
            ("APPLYWISE_ACCESS_TOKEN", "  env-token "),
        ]),
    );
    assert_eq!(settings.api_url, "http://prefixed.example");
    assert_eq!(settings.access_token.as_deref(), Some("env-token"));
}

#[test]
fn unparseable_numbers_keep_previous_value() {
    let mut settings = Settings::default();
    settings.stage_interval_ms = 750;
    apply_env(
        &mut settings,
        lookup_from(&[
            ("APP__STAGE_INTERVAL_MS", "fast"),
            ("APP__SETTLE_DELAY_MS", " 250 "),
            ("APP__ANALYSIS_TIMEOUT_SECS", "-1"),
        ]),
    );
    assert_eq!(settings.stage_interval_ms, 750);
    assert_eq!(settings.settle_delay_ms, 250);
    assert_eq!(settings.analysis_timeout_secs, None);
}

#[test]
fn explicit_config_path_must_exist() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let missing = env::temp_dir().join(format!("applywise_missing_{suffix}.toml"));

    let err = load_settings(Some(&missing)).expect_err("missing explicit file");
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn explicit_config_file_is_loaded() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("applywise_config_{suffix}.toml"));
    fs::write(&path, "settle_delay_ms = 42\n").expect("write config");

    let settings = load_settings(Some(&path)).expect("load");
    assert_eq!(settings.settle_delay_ms, 42);

    fs::remove_file(path).expect("cleanup");
}
