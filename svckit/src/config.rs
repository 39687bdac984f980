use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::BankError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), BankError> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(BankError::Config(format!(
                "api.base_url must be an http(s) origin, got '{}'",
                self.base_url
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(BankError::Config("api.request_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_file: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "bank_dash=info,svckit=info".to_string(),
            log_file: "bank-dash.log".to_string(),
        }
    }
}
