use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::SimulatorConfig;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "applywise.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub access_token: Option<String>,
    pub stage_interval_ms: u64,
    pub settle_delay_ms: u64,
    /// `None` waits for the analysis service indefinitely.
    pub analysis_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000/api/v1".into(),
            access_token: None,
            stage_interval_ms: 3500,
            settle_delay_ms: 1000,
            analysis_timeout_secs: None,
        }
    }
}

impl Settings {
    pub fn simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig {
            interval: Duration::from_millis(self.stage_interval_ms),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            timeout: self.analysis_timeout_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    access_token: Option<String>,
    stage_interval_ms: Option<u64>,
    settle_delay_ms: Option<u64>,
    analysis_timeout_secs: Option<u64>,
}

/// Defaults, then the TOML file, then environment variables.
///
/// A missing default file is fine; a missing file named with `--config` is not.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, explicit) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound && !explicit => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.access_token {
        settings.access_token = non_empty(v);
    }
    if let Some(v) = file_cfg.stage_interval_ms {
        settings.stage_interval_ms = v;
    }
    if let Some(v) = file_cfg.settle_delay_ms {
        settings.settle_delay_ms = v;
    }
    if let Some(v) = file_cfg.analysis_timeout_secs {
        settings.analysis_timeout_secs = (v > 0).then_some(v);
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("APPLYWISE_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = lookup("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = lookup("APPLYWISE_ACCESS_TOKEN") {
        settings.access_token = non_empty(v);
    }
    if let Some(v) = lookup("APP__ACCESS_TOKEN") {
        settings.access_token = non_empty(v);
    }

    if let Some(v) = lookup("APP__STAGE_INTERVAL_MS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.stage_interval_ms = parsed;
        }
    }
    if let Some(v) = lookup("APP__SETTLE_DELAY_MS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.settle_delay_ms = parsed;
        }
    }
    if let Some(v) = lookup("APP__ANALYSIS_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.analysis_timeout_secs = (parsed > 0).then_some(parsed);
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
