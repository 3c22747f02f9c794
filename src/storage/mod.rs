//! Persistence collaborator for the monitoring core
//!
//! The core treats persistence as a generic append/query store. Snapshots,
//! metric points, and SLA rows are append-only; alerts and incidents are the
//! only mutable rows. Implementations must surface their own failures as
//! [`MonitorError::StoreUnavailable`](crate::utils::error::MonitorError) and
//! never fabricate data to mask them.

mod memory;

pub use memory::InMemoryMetricStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::alerts::types::{Alert, AlertFilter, AlertKey};
use crate::health::types::HealthSnapshot;
use crate::incidents::Incident;
use crate::metrics::types::MetricPoint;
use crate::sla::SlaMetric;
use crate::utils::error::Result;

/// Time range for metric and snapshot queries
#[derive(Debug, Clone, Copy)]
pub struct TimeRange {
    /// Inclusive start
    pub from: DateTime<Utc>,
    /// Exclusive end
    pub to: DateTime<Utc>,
}

impl TimeRange {
    /// Range covering the trailing `duration` up to now
    pub fn trailing(duration: chrono::Duration) -> Self {
        let to = Utc::now();
        Self {
            from: to - duration,
            to,
        }
    }

    /// Whether the instant falls inside the range
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.from && at < self.to
    }
}

/// Append/query store for monitoring data
#[async_trait]
pub trait MetricStore: Send + Sync + std::fmt::Debug {
    /// Append a health snapshot
    async fn insert_snapshot(&self, snapshot: &HealthSnapshot) -> Result<()>;

    /// Health snapshots for an organization within a time range
    async fn snapshots_in_range(
        &self,
        organization_id: Option<&str>,
        range: TimeRange,
    ) -> Result<Vec<HealthSnapshot>>;

    /// Append a metric point
    async fn insert_metric(&self, point: &MetricPoint) -> Result<()>;

    /// Metric points by name for an organization within a time range
    async fn metrics_in_range(
        &self,
        metric_name: &str,
        organization_id: Option<&str>,
        range: TimeRange,
    ) -> Result<Vec<MetricPoint>>;

    /// Append a new alert row
    async fn insert_alert(&self, alert: &Alert) -> Result<()>;

    /// Replace an existing alert row by id
    async fn update_alert(&self, alert: &Alert) -> Result<()>;

    /// The single active alert for a dedup key, if one exists
    async fn find_active_alert(&self, key: &AlertKey) -> Result<Option<Alert>>;

    /// Alert by id within an organization
    async fn get_alert(&self, id: &str, organization_id: &str) -> Result<Option<Alert>>;

    /// Alerts matching a filter, newest first, with limit/offset applied
    async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>>;

    /// Append an SLA metric row
    async fn insert_sla_metric(&self, metric: &SlaMetric) -> Result<()>;

    /// SLA rows for an organization, newest first
    async fn list_sla_metrics(&self, organization_id: &str) -> Result<Vec<SlaMetric>>;

    /// Append a new incident row
    async fn insert_incident(&self, incident: &Incident) -> Result<()>;

    /// Replace an existing incident row by id
    async fn update_incident(&self, incident: &Incident) -> Result<()>;

    /// Incident by id within an organization
    async fn get_incident(&self, id: &str, organization_id: &str) -> Result<Option<Incident>>;

    /// Incidents for an organization, newest first
    async fn list_incidents(&self, organization_id: &str) -> Result<Vec<Incident>>;
}
