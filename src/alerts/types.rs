//! Type definitions for alerts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Alert severity levels, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
    Emergency,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Info => write!(f, "info"),
            AlertSeverity::Warning => write!(f, "warning"),
            AlertSeverity::Critical => write!(f, "critical"),
            AlertSeverity::Emergency => write!(f, "emergency"),
        }
    }
}

/// Alert lifecycle status
///
/// Created as `Active`, moved to `Acknowledged` by a user action, then
/// `Resolved` by a user action or the condition clearing. Acknowledged and
/// resolved rows are retained for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertStatus::Active => write!(f, "active"),
            AlertStatus::Acknowledged => write!(f, "acknowledged"),
            AlertStatus::Resolved => write!(f, "resolved"),
        }
    }
}

/// A raised alert
///
/// Invariant: at most one active alert exists per
/// (alert_type, severity, source, organization_id) tuple. Repeated breaches
/// update `current_value` and `message` on the existing row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Alert id
    pub id: String,
    /// Alert kind, e.g. `cpu_usage`
    pub alert_type: String,
    /// Severity tier the breach landed in
    pub severity: AlertSeverity,
    /// Short human-readable title
    pub title: String,
    /// Detail message, updated on repeated breaches
    pub message: String,
    /// Lifecycle status
    pub status: AlertStatus,
    /// Component that raised the alert
    pub source: String,
    /// Metric the threshold applies to
    pub metric_name: String,
    /// Threshold that was breached
    pub threshold_value: f64,
    /// Latest observed value
    pub current_value: f64,
    /// Who acknowledged the alert
    pub acknowledged_by: Option<String>,
    /// When the alert was acknowledged
    pub acknowledged_at: Option<DateTime<Utc>>,
    /// When the alert was resolved
    pub resolved_at: Option<DateTime<Utc>>,
    /// Whether a notification was delivered for the initial breach
    pub notification_sent: bool,
    /// Channels the notification was addressed to
    pub notification_channels: Vec<String>,
    /// Owning organization
    pub organization_id: String,
    /// When the alert was first raised
    pub created_at: DateTime<Utc>,
}

/// Dedup key identifying the single allowed active alert
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    /// Alert kind
    pub alert_type: String,
    /// Severity tier
    pub severity: AlertSeverity,
    /// Raising component
    pub source: String,
    /// Owning organization
    pub organization_id: String,
}

/// Filter for alert listing queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertFilter {
    /// Owning organization
    pub organization_id: String,
    /// Restrict to a lifecycle status
    pub status: Option<AlertStatus>,
    /// Restrict to a severity tier
    pub severity: Option<AlertSeverity>,
    /// Restrict to an alert kind
    pub alert_type: Option<String>,
    /// Page size, clamped to 100
    pub limit: Option<usize>,
    /// Page offset
    pub offset: Option<usize>,
}

impl AlertFilter {
    /// Maximum page size for alert listings
    pub const MAX_LIMIT: usize = 100;

    /// Filter for all alerts of one organization
    pub fn for_org(organization_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            ..Default::default()
        }
    }

    /// Effective page size after clamping
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(Self::MAX_LIMIT).min(Self::MAX_LIMIT)
    }

    /// Effective page offset
    pub fn effective_offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }

    /// Whether the alert matches every set criterion
    pub fn matches(&self, alert: &Alert) -> bool {
        alert.organization_id == self.organization_id
            && self.status.is_none_or(|s| alert.status == s)
            && self.severity.is_none_or(|s| alert.severity == s)
            && self
                .alert_type
                .as_ref()
                .is_none_or(|t| &alert.alert_type == t)
    }
}

/// Alert statistics counters
#[derive(Debug, Default, Clone, Serialize)]
pub struct AlertStats {
    /// Total alerts raised
    pub total_alerts: u64,
    /// Alerts by severity
    pub alerts_by_severity: HashMap<String, u64>,
    /// Alerts by source
    pub alerts_by_source: HashMap<String, u64>,
    /// Failed notifications
    pub failed_notifications: u64,
    /// Last alert timestamp
    pub last_alert: Option<DateTime<Utc>>,
}
