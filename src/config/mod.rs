//! Configuration for the monitoring core
//!
//! Deployments configure the core from a YAML file, with environment
//! variables overriding individual fields. Every section has working
//! defaults so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::utils::error::{MonitorError, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Health sampling settings
    #[serde(default)]
    pub sampling: SamplingConfig,
    /// Alert notification settings
    #[serde(default)]
    pub alerting: AlertingConfig,
    /// Cache backend settings
    #[serde(default)]
    pub cache: CacheConfig,
    /// Scaling advisor settings
    #[serde(default)]
    pub scaling: ScalingConfig,
}

/// Health sampling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Seconds between background sampling cycles
    #[serde(default = "default_sample_interval")]
    pub interval_secs: u64,
    /// Organizations the background task samples
    #[serde(default)]
    pub organizations: Vec<String>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_sample_interval(),
            organizations: Vec::new(),
        }
    }
}

/// Alert notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertingConfig {
    /// Whether the email channel is constructed
    #[serde(default = "default_true")]
    pub email_enabled: bool,
    /// Recipients for the email channel
    #[serde(default)]
    pub email_recipients: Vec<String>,
    /// Webhook endpoint; the webhook channel is constructed when set
    #[serde(default)]
    pub webhook_url: Option<String>,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            email_enabled: true,
            email_recipients: Vec::new(),
            webhook_url: None,
        }
    }
}

/// Which cache backend to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    /// Dashmap-backed in-process cache
    Memory,
    /// Moka-backed cache
    Moka,
}

/// Cache backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Backend implementation, selected at construction time
    #[serde(default = "default_cache_backend")]
    pub backend: CacheBackendKind,
    /// Entry ceiling for the moka backend
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            max_entries: default_cache_max_entries(),
        }
    }
}

/// Scaling advisor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingConfig {
    /// Instance ceiling
    #[serde(default = "default_max_instances")]
    pub max_instances: u32,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            max_instances: default_max_instances(),
        }
    }
}

fn default_sample_interval() -> u64 {
    30
}
fn default_true() -> bool {
    true
}
fn default_cache_backend() -> CacheBackendKind {
    CacheBackendKind::Memory
}
fn default_cache_max_entries() -> u64 {
    10_000
}
fn default_max_instances() -> u32 {
    10
}

impl MonitorConfig {
    /// Load configuration from a YAML file and apply env overrides
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| MonitorError::Config(format!("failed to read config file: {}", e)))?;

        let mut config: MonitorConfig = serde_yaml::from_str(&content)?;
        config.apply_env();
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Build a configuration from defaults plus env overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("PULSE_SAMPLE_INTERVAL_SECS") {
            if let Ok(secs) = v.parse() {
                self.sampling.interval_secs = secs;
            }
        }
        if let Ok(v) = std::env::var("PULSE_MAX_INSTANCES") {
            if let Ok(max) = v.parse() {
                self.scaling.max_instances = max;
            }
        }
        if let Ok(v) = std::env::var("PULSE_WEBHOOK_URL") {
            if !v.is_empty() {
                self.alerting.webhook_url = Some(v);
            }
        }
    }

    /// Reject configurations the core cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.sampling.interval_secs == 0 {
            return Err(MonitorError::Config(
                "sampling.interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.scaling.max_instances == 0 {
            return Err(MonitorError::Config(
                "scaling.max_instances must be at least 1".to_string(),
            ));
        }
        if self.cache.max_entries == 0 {
            return Err(MonitorError::Config(
                "cache.max_entries must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sampling.interval_secs, 30);
        assert_eq!(config.cache.backend, CacheBackendKind::Memory);
        assert_eq!(config.scaling.max_instances, 10);
        assert!(config.alerting.email_enabled);
    }

    #[test]
    fn test_empty_yaml_is_valid() {
        let config: MonitorConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config: MonitorConfig =
            serde_yaml::from_str("sampling:\n  interval_secs: 0\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(MonitorError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_from_file_parses_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "sampling:\n  interval_secs: 15\n  organizations: [org-1]\ncache:\n  backend: moka\nscaling:\n  max_instances: 4\n"
        )
        .unwrap();

        let config = MonitorConfig::from_file(file.path()).await.unwrap();
        assert_eq!(config.sampling.interval_secs, 15);
        assert_eq!(config.sampling.organizations, vec!["org-1".to_string()]);
        assert_eq!(config.cache.backend, CacheBackendKind::Moka);
        assert_eq!(config.scaling.max_instances, 4);
    }

    #[tokio::test]
    async fn test_from_file_missing_is_config_error() {
        let err = MonitorConfig::from_file("/nonexistent/pulse.yaml")
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::Config(_)));
    }
}
