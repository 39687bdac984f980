use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use svckit::config::{ApiConfig, ObservabilityConfig};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub api: ApiConfig,
    pub dashboard: DashboardSettings,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// Primary list refresh period for the active page.
    pub poll_interval_secs: u64,
    pub toast_ms: u64,
    /// Screening confirmations carry an id the operator may want to copy.
    pub screening_toast_ms: u64,
    pub recent_requests: usize,
    pub tick_ms: u64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            toast_ms: 3_000,
            screening_toast_ms: 5_000,
            recent_requests: 5,
            tick_ms: 100,
        }
    }
}

impl DashboardSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn toast_ttl(&self) -> Duration {
        Duration::from_millis(self.toast_ms)
    }

    pub fn screening_toast_ttl(&self) -> Duration {
        Duration::from_millis(self.screening_toast_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(10))
    }
}

/// Loads settings from an optional file plus `BANK_DASH_*` environment overrides,
/// e.g. `BANK_DASH_API__BASE_URL=http://bank:5000`.
pub fn load_config(path: Option<&str>) -> Result<DashConfig> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::with_name(path).required(false));
    }
    let config = builder
        .add_source(Environment::with_prefix("BANK_DASH").prefix_separator("_").separator("__"))
        .build()?;

    let config: DashConfig = config.try_deserialize()?;
    config.api.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_sources() {
        let config = load_config(None).unwrap();
        assert_eq!(config.dashboard.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.dashboard.recent_requests, 5);
        assert_eq!(config.api.base_url, "http://localhost:5000");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("bank-dash-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dash.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[api]\nbase_url = \"http://bank.internal:8080\"\n\n[dashboard]\npoll_interval_secs = 10").unwrap();

        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.api.base_url, "http://bank.internal:8080");
        assert_eq!(config.dashboard.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.dashboard.toast_ms, 3_000);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_env_override_uses_single_underscore_prefix() {
        std::env::set_var("BANK_DASH_OBSERVABILITY__LOG_FILE", "/tmp/bank-dash-env.log");
        let config = load_config(None).unwrap();
        std::env::remove_var("BANK_DASH_OBSERVABILITY__LOG_FILE");

        assert_eq!(config.observability.log_file, "/tmp/bank-dash-env.log");
    }
}
