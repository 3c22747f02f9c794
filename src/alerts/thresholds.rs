//! Per-organization alert threshold configuration

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Warning/critical thresholds and SLA targets for one organization
///
/// One active version per organization; updates replace fields in place and
/// no history is retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// CPU warning threshold, percent
    pub cpu_warning: f64,
    /// CPU critical threshold, percent
    pub cpu_critical: f64,
    /// Memory warning threshold, percent
    pub memory_warning: f64,
    /// Memory critical threshold, percent
    pub memory_critical: f64,
    /// Response time warning threshold, milliseconds
    pub response_time_warning: f64,
    /// Response time critical threshold, milliseconds
    pub response_time_critical: f64,
    /// Uptime SLA target, percent
    pub uptime_target: f64,
    /// Response time SLA target, milliseconds
    pub response_time_target: f64,
    /// Whether email notifications are enabled
    pub email_notifications: bool,
    /// Whether webhook notifications are enabled
    pub webhook_notifications: bool,
    /// Whether Slack notifications are enabled
    pub slack_notifications: bool,
    /// Notification recipients
    pub notification_recipients: Vec<String>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            cpu_warning: 80.0,
            cpu_critical: 95.0,
            memory_warning: 80.0,
            memory_critical: 95.0,
            response_time_warning: 1000.0,
            response_time_critical: 5000.0,
            uptime_target: 99.99,
            response_time_target: 100.0,
            email_notifications: true,
            webhook_notifications: false,
            slack_notifications: false,
            notification_recipients: Vec::new(),
        }
    }
}

/// Partial threshold update; only present fields are merged
///
/// Unknown fields in the incoming payload are ignored by deserialization
/// rather than rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdUpdate {
    pub cpu_warning: Option<f64>,
    pub cpu_critical: Option<f64>,
    pub memory_warning: Option<f64>,
    pub memory_critical: Option<f64>,
    pub response_time_warning: Option<f64>,
    pub response_time_critical: Option<f64>,
    pub uptime_target: Option<f64>,
    pub response_time_target: Option<f64>,
    pub email_notifications: Option<bool>,
    pub webhook_notifications: Option<bool>,
    pub slack_notifications: Option<bool>,
    pub notification_recipients: Option<Vec<String>>,
}

impl ThresholdConfig {
    /// Merge the present fields of `update` into this config
    pub fn apply(&mut self, update: &ThresholdUpdate) {
        if let Some(v) = update.cpu_warning {
            self.cpu_warning = v;
        }
        if let Some(v) = update.cpu_critical {
            self.cpu_critical = v;
        }
        if let Some(v) = update.memory_warning {
            self.memory_warning = v;
        }
        if let Some(v) = update.memory_critical {
            self.memory_critical = v;
        }
        if let Some(v) = update.response_time_warning {
            self.response_time_warning = v;
        }
        if let Some(v) = update.response_time_critical {
            self.response_time_critical = v;
        }
        if let Some(v) = update.uptime_target {
            self.uptime_target = v;
        }
        if let Some(v) = update.response_time_target {
            self.response_time_target = v;
        }
        if let Some(v) = update.email_notifications {
            self.email_notifications = v;
        }
        if let Some(v) = update.webhook_notifications {
            self.webhook_notifications = v;
        }
        if let Some(v) = update.slack_notifications {
            self.slack_notifications = v;
        }
        if let Some(v) = &update.notification_recipients {
            self.notification_recipients = v.clone();
        }
    }
}

/// In-process store for per-organization threshold configs
///
/// Organizations without an explicit config fall back to the hard-coded
/// defaults. Durable persistence of configs belongs to the external
/// persistence collaborator.
#[derive(Debug, Default)]
pub struct ThresholdStore {
    configs: DashMap<String, ThresholdConfig>,
}

impl ThresholdStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Config for the organization, or the defaults if none was set
    pub fn get(&self, organization_id: &str) -> ThresholdConfig {
        self.configs
            .get(organization_id)
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Merge a partial update into the organization's config
    ///
    /// Creates the config from defaults first if the organization had none.
    pub fn update(&self, organization_id: &str, update: &ThresholdUpdate) -> ThresholdConfig {
        let mut entry = self
            .configs
            .entry(organization_id.to_string())
            .or_default();
        entry.apply(update);
        debug!(org = organization_id, "threshold config updated");
        entry.clone()
    }
}
