//! In-memory metric store
//!
//! Reference implementation of [`MetricStore`] backing tests and single-node
//! deployments. Tables are plain vectors behind a `parking_lot::RwLock`;
//! every query is a scan, which is fine at the row counts a single gateway
//! produces between retention sweeps.

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::{MetricStore, TimeRange};
use crate::alerts::types::{Alert, AlertFilter, AlertKey, AlertStatus};
use crate::health::types::HealthSnapshot;
use crate::incidents::Incident;
use crate::metrics::types::MetricPoint;
use crate::sla::SlaMetric;
use crate::utils::error::{MonitorError, Result};

#[derive(Debug, Default)]
struct Tables {
    snapshots: Vec<HealthSnapshot>,
    metrics: Vec<MetricPoint>,
    alerts: Vec<Alert>,
    sla_metrics: Vec<SlaMetric>,
    incidents: Vec<Incident>,
}

/// Vector-backed [`MetricStore`]
#[derive(Debug, Default)]
pub struct InMemoryMetricStore {
    tables: RwLock<Tables>,
}

impl InMemoryMetricStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored metric points, for tests and diagnostics
    pub fn metric_count(&self) -> usize {
        self.tables.read().metrics.len()
    }

    /// Number of stored alert rows, for tests and diagnostics
    pub fn alert_count(&self) -> usize {
        self.tables.read().alerts.len()
    }
}

fn org_matches(row_org: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted {
        Some(org) => row_org == Some(org),
        None => true,
    }
}

#[async_trait]
impl MetricStore for InMemoryMetricStore {
    async fn insert_snapshot(&self, snapshot: &HealthSnapshot) -> Result<()> {
        self.tables.write().snapshots.push(snapshot.clone());
        Ok(())
    }

    async fn snapshots_in_range(
        &self,
        organization_id: Option<&str>,
        range: TimeRange,
    ) -> Result<Vec<HealthSnapshot>> {
        let tables = self.tables.read();
        Ok(tables
            .snapshots
            .iter()
            .filter(|s| {
                range.contains(s.recorded_at)
                    && org_matches(s.organization_id.as_deref(), organization_id)
            })
            .cloned()
            .collect())
    }

    async fn insert_metric(&self, point: &MetricPoint) -> Result<()> {
        self.tables.write().metrics.push(point.clone());
        Ok(())
    }

    async fn metrics_in_range(
        &self,
        metric_name: &str,
        organization_id: Option<&str>,
        range: TimeRange,
    ) -> Result<Vec<MetricPoint>> {
        let tables = self.tables.read();
        Ok(tables
            .metrics
            .iter()
            .filter(|p| {
                p.metric_name == metric_name
                    && range.contains(p.recorded_at)
                    && org_matches(p.organization_id.as_deref(), organization_id)
            })
            .cloned()
            .collect())
    }

    async fn insert_alert(&self, alert: &Alert) -> Result<()> {
        debug!(alert_id = %alert.id, alert_type = %alert.alert_type, "inserting alert");
        self.tables.write().alerts.push(alert.clone());
        Ok(())
    }

    async fn update_alert(&self, alert: &Alert) -> Result<()> {
        let mut tables = self.tables.write();
        let row = tables
            .alerts
            .iter_mut()
            .find(|a| a.id == alert.id)
            .ok_or_else(|| {
                MonitorError::StoreUnavailable(format!(
                    "alert row `{}` vanished during update",
                    alert.id
                ))
            })?;
        *row = alert.clone();
        Ok(())
    }

    async fn find_active_alert(&self, key: &AlertKey) -> Result<Option<Alert>> {
        let tables = self.tables.read();
        Ok(tables
            .alerts
            .iter()
            .find(|a| {
                a.status == AlertStatus::Active
                    && a.alert_type == key.alert_type
                    && a.severity == key.severity
                    && a.source == key.source
                    && a.organization_id == key.organization_id
            })
            .cloned())
    }

    async fn get_alert(&self, id: &str, organization_id: &str) -> Result<Option<Alert>> {
        let tables = self.tables.read();
        Ok(tables
            .alerts
            .iter()
            .find(|a| a.id == id && a.organization_id == organization_id)
            .cloned())
    }

    async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>> {
        let tables = self.tables.read();
        let mut matching: Vec<Alert> = tables
            .alerts
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching
            .into_iter()
            .skip(filter.effective_offset())
            .take(filter.effective_limit())
            .collect())
    }

    async fn insert_sla_metric(&self, metric: &SlaMetric) -> Result<()> {
        self.tables.write().sla_metrics.push(metric.clone());
        Ok(())
    }

    async fn list_sla_metrics(&self, organization_id: &str) -> Result<Vec<SlaMetric>> {
        let tables = self.tables.read();
        let mut rows: Vec<SlaMetric> = tables
            .sla_metrics
            .iter()
            .filter(|m| m.organization_id == organization_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(rows)
    }

    async fn insert_incident(&self, incident: &Incident) -> Result<()> {
        self.tables.write().incidents.push(incident.clone());
        Ok(())
    }

    async fn update_incident(&self, incident: &Incident) -> Result<()> {
        let mut tables = self.tables.write();
        let row = tables
            .incidents
            .iter_mut()
            .find(|i| i.id == incident.id)
            .ok_or_else(|| {
                MonitorError::StoreUnavailable(format!(
                    "incident row `{}` vanished during update",
                    incident.id
                ))
            })?;
        *row = incident.clone();
        Ok(())
    }

    async fn get_incident(&self, id: &str, organization_id: &str) -> Result<Option<Incident>> {
        let tables = self.tables.read();
        Ok(tables
            .incidents
            .iter()
            .find(|i| i.id == id && i.organization_id == organization_id)
            .cloned())
    }

    async fn list_incidents(&self, organization_id: &str) -> Result<Vec<Incident>> {
        let tables = self.tables.read();
        let mut rows: Vec<Incident> = tables
            .incidents
            .iter()
            .filter(|i| i.organization_id == organization_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.detected_at.cmp(&a.detected_at));
        Ok(rows)
    }
}
