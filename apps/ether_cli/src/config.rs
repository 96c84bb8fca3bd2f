use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use flow_core::FlowTimings;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

const DEFAULT_CONFIG_FILE: &str = "ether.toml";
const ENV_PREFIX: &str = "APP__";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_filter: String,
    pub timings: FlowTimings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "info".into(),
            timings: FlowTimings::default(),
        }
    }
}

/// Defaults, then `ether.toml` (or the explicit `--config` file), then
/// `APP__*` environment variables.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match explicit {
        Some(path) => read_file(path)?,
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if path.exists() {
                read_file(&path)?
            } else {
                Settings::default()
            }
        }
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn read_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    parse_settings(&raw).with_context(|| format!("invalid config file '{}'", path.display()))
}

fn parse_settings(raw: &str) -> anyhow::Result<Settings> {
    Ok(toml::from_str(raw)?)
}

/// Overrides single timing fields from `APP__<FIELD>` variables, for example
/// `APP__UPI_LAUNCH_MS=500`. Values that do not parse are skipped.
pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(filter) = lookup("APP__LOG_FILTER") {
        settings.log_filter = filter;
    }

    let Ok(Value::Object(mut fields)) = serde_json::to_value(&settings.timings) else {
        return;
    };

    let mut changed = false;
    for (name, current) in fields.iter_mut() {
        let key = format!("{ENV_PREFIX}{}", name.to_ascii_uppercase());
        let Some(raw) = lookup(&key) else {
            continue;
        };
        match parse_like(current, raw.trim()) {
            Some(value) => {
                *current = value;
                changed = true;
            }
            None => warn!(%key, value = %raw, "ignoring invalid timing override"),
        }
    }

    if !changed {
        return;
    }
    match serde_json::from_value(Value::Object(fields)) {
        Ok(timings) => settings.timings = timings,
        Err(err) => warn!(error = %err, "ignoring timing overrides"),
    }
}

fn parse_like(current: &Value, raw: &str) -> Option<Value> {
    if current.is_u64() {
        raw.parse::<u64>().ok().map(Value::from)
    } else {
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(Value::from)
    }
}
