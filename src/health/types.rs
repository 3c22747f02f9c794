//! Type definitions for health sampling

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall status derived from a health snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// All resource gauges below their warning tier
    Healthy,
    /// At least one resource gauge above 80
    Warning,
    /// At least one resource gauge above 95
    Critical,
    /// Every probe source failed during collection
    Error,
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthState::Healthy => write!(f, "healthy"),
            HealthState::Warning => write!(f, "warning"),
            HealthState::Critical => write!(f, "critical"),
            HealthState::Error => write!(f, "error"),
        }
    }
}

/// Point-in-time system health snapshot
///
/// Immutable once created; one per collection cycle. Resource gauges are on
/// a 0-100 scale, response times in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// CPU utilization percentage
    pub cpu_usage: f64,
    /// Memory utilization percentage
    pub memory_usage: f64,
    /// Disk utilization percentage
    pub disk_usage: f64,
    /// Network latency estimate in milliseconds
    pub network_latency: f64,
    /// Mean API response time over the trailing window, in milliseconds
    pub response_time: f64,
    /// Derived overall status
    pub status: HealthState,
    /// Seconds since the sampler was constructed
    pub uptime_seconds: u64,
    /// Active connection count reported by the gateway
    pub active_connections: u64,
    /// Error rate over the trailing window, capped at 100.0
    pub error_rate: f64,
    /// Mean requests per second over the trailing minute
    pub throughput: f64,
    /// When the snapshot was collected
    pub recorded_at: DateTime<Utc>,
    /// Owning organization, if the sample was org-scoped
    pub organization_id: Option<String>,
}

impl HealthSnapshot {
    /// Derive the overall status from the three resource gauges.
    ///
    /// Highest severity wins: any gauge above 95 is critical, any above 80
    /// is warning, otherwise healthy.
    pub fn derive_status(cpu: f64, memory: f64, disk: f64) -> HealthState {
        if cpu > 95.0 || memory > 95.0 || disk > 95.0 {
            HealthState::Critical
        } else if cpu > 80.0 || memory > 80.0 || disk > 80.0 {
            HealthState::Warning
        } else {
            HealthState::Healthy
        }
    }
}
