use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::capabilities::CapabilitiesChangeNotificationMode;

pub const CONFIG_FILE_NAME: &str = "huddle_config.json";

const DEFAULT_PARTICIPANTS_THROTTLE_MS: u64 = 1250;
const DEFAULT_SPEAKERS_THROTTLE_MS: u64 = 500;
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Tunables for the middleware. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiddlewareConfig {
    pub participants_throttle_ms: u64,
    pub dominant_speakers_throttle_ms: u64,
    pub event_capacity: usize,
    pub capabilities_change_notification_mode: CapabilitiesChangeNotificationMode,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            participants_throttle_ms: DEFAULT_PARTICIPANTS_THROTTLE_MS,
            dominant_speakers_throttle_ms: DEFAULT_SPEAKERS_THROTTLE_MS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            capabilities_change_notification_mode: CapabilitiesChangeNotificationMode::default(),
        }
    }
}

impl MiddlewareConfig {
    pub fn participants_throttle(&self) -> Duration {
        Duration::from_millis(self.participants_throttle_ms)
    }

    pub fn dominant_speakers_throttle(&self) -> Duration {
        Duration::from_millis(self.dominant_speakers_throttle_ms)
    }

    /// Env vars win over the file so a run can be tuned without editing it.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        self.participants_throttle_ms = parse_u64_var(
            var("HUDDLE_PARTICIPANTS_THROTTLE_MS"),
            self.participants_throttle_ms,
        );
        self.dominant_speakers_throttle_ms = parse_u64_var(
            var("HUDDLE_SPEAKERS_THROTTLE_MS"),
            self.dominant_speakers_throttle_ms,
        );
        self
    }
}

/// Reads `<data_dir>/huddle_config.json`. A missing or broken file falls back
/// to defaults; env overrides apply either way.
pub fn load_middleware_config(data_dir: impl AsRef<Path>) -> MiddlewareConfig {
    load_config_or_default(data_dir.as_ref()).with_env_overrides()
}

fn load_config_or_default(data_dir: &Path) -> MiddlewareConfig {
    let path = data_dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return MiddlewareConfig::default();
    }
    match read_config_file(&path) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "invalid middleware config; using defaults");
            MiddlewareConfig::default()
        }
    }
}

fn read_config_file(path: &Path) -> anyhow::Result<MiddlewareConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

fn parse_u64_var(value: Option<String>, default: u64) -> u64 {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
