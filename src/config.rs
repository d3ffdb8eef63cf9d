use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    /// Simulated transfer backend (mock-api)
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "./logs".to_string(),
            log_file: "bridge.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
            orchestrator: OrchestratorConfig::default(),
            simulator: SimulatorConfig::default(),
        }
    }
}

/// Transaction orchestrator settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Transfer backend endpoint (POST)
    pub backend_url: String,
    pub request_timeout_ms: u64,
    /// How long RETRYING is shown before resubmitting
    pub retry_delay_ms: u64,
    /// Simulated confirmation delay after the backend accepts
    pub confirmation_delay_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8787/api/bridge/transfer".to_string(),
            request_timeout_ms: 30_000,
            retry_delay_ms: 1_000,
            confirmation_delay_ms: 3_000,
        }
    }
}

impl OrchestratorConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn confirmation_delay(&self) -> Duration {
        Duration::from_millis(self.confirmation_delay_ms)
    }
}

/// Simulated transfer backend settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SimulatorConfig {
    pub host: String,
    pub port: u16,
    /// Response delay is drawn uniformly from [min_delay_ms, max_delay_ms]
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Probability in [0, 1] that a well-formed request is declined
    pub failure_rate: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
            min_delay_ms: 1_000,
            max_delay_ms: 3_000,
            failure_rate: 0.1,
        }
    }
}

impl AppConfig {
    /// Load `config/<env>.yaml`
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        Self::from_file(&format!("config/{}.yaml", env))
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }
}
