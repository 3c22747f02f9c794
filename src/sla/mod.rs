//! SLA compliance tracking
//!
//! Evaluates uptime and response-time SLAs per organization against the
//! targets in its threshold config, producing one immutable row per SLA per
//! evaluation period.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::alerts::ThresholdStore;
use crate::health::types::HealthState;
use crate::storage::{MetricStore, TimeRange};
use crate::utils::error::Result;

/// Compliance standing of an SLA for one period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaStatus {
    Compliant,
    AtRisk,
    NonCompliant,
}

/// One SLA evaluation row; immutable once the period closes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaMetric {
    /// SLA name, e.g. `uptime`
    pub sla_name: String,
    /// Target the SLA is measured against
    pub sla_target: f64,
    /// Period length in seconds
    pub sla_period: i64,
    /// Measured value for the period
    pub current_value: f64,
    /// How close the measurement is to the target, capped at 100
    pub compliance_percentage: f64,
    /// Compliance standing
    pub status: SlaStatus,
    /// Start of the evaluated period
    pub period_start: DateTime<Utc>,
    /// End of the evaluated period
    pub period_end: DateTime<Utc>,
    /// When the row was produced
    pub recorded_at: DateTime<Utc>,
    /// Owning organization
    pub organization_id: String,
}

/// Margin below the uptime target that still counts as at-risk, in
/// percentage points
const UPTIME_AT_RISK_MARGIN: f64 = 1.0;
/// Response time at-risk band as a multiple of the target
const RESPONSE_TIME_AT_RISK_FACTOR: f64 = 1.5;

fn uptime_status(current: f64, target: f64) -> SlaStatus {
    if current >= target {
        SlaStatus::Compliant
    } else if current >= target - UPTIME_AT_RISK_MARGIN {
        SlaStatus::AtRisk
    } else {
        SlaStatus::NonCompliant
    }
}

fn response_time_status(current: f64, target: f64) -> SlaStatus {
    if current <= target {
        SlaStatus::Compliant
    } else if current <= target * RESPONSE_TIME_AT_RISK_FACTOR {
        SlaStatus::AtRisk
    } else {
        SlaStatus::NonCompliant
    }
}

/// Evaluates and records SLA compliance per organization
#[derive(Debug)]
pub struct SlaTracker {
    store: Arc<dyn MetricStore>,
    thresholds: Arc<ThresholdStore>,
}

impl SlaTracker {
    /// Create a tracker over the given store and threshold configs
    pub fn new(store: Arc<dyn MetricStore>, thresholds: Arc<ThresholdStore>) -> Self {
        Self { store, thresholds }
    }

    /// Evaluate the organization's SLAs over the trailing period
    ///
    /// Produces an uptime row (share of non-critical, non-error snapshots)
    /// and a response-time row (mean `api_response_time`). Periods with no
    /// observations count as meeting the target: absence of data is not an
    /// outage.
    pub async fn evaluate(
        &self,
        organization_id: &str,
        period: ChronoDuration,
    ) -> Result<Vec<SlaMetric>> {
        let config = self.thresholds.get(organization_id);
        let range = TimeRange::trailing(period);
        let now = Utc::now();

        let snapshots = self
            .store
            .snapshots_in_range(Some(organization_id), range)
            .await?;
        let uptime = if snapshots.is_empty() {
            100.0
        } else {
            let up = snapshots
                .iter()
                .filter(|s| !matches!(s.status, HealthState::Critical | HealthState::Error))
                .count();
            up as f64 / snapshots.len() as f64 * 100.0
        };

        let response_times = self
            .store
            .metrics_in_range("api_response_time", Some(organization_id), range)
            .await?;
        let mean_response = if response_times.is_empty() {
            0.0
        } else {
            response_times.iter().map(|p| p.value).sum::<f64>() / response_times.len() as f64
        };

        let rows = vec![
            SlaMetric {
                sla_name: "uptime".to_string(),
                sla_target: config.uptime_target,
                sla_period: period.num_seconds(),
                current_value: uptime,
                compliance_percentage: (uptime / config.uptime_target * 100.0).min(100.0),
                status: uptime_status(uptime, config.uptime_target),
                period_start: range.from,
                period_end: range.to,
                recorded_at: now,
                organization_id: organization_id.to_string(),
            },
            SlaMetric {
                sla_name: "response_time".to_string(),
                sla_target: config.response_time_target,
                sla_period: period.num_seconds(),
                current_value: mean_response,
                compliance_percentage: if mean_response <= 0.0 {
                    100.0
                } else {
                    (config.response_time_target / mean_response * 100.0).min(100.0)
                },
                status: response_time_status(mean_response, config.response_time_target),
                period_start: range.from,
                period_end: range.to,
                recorded_at: now,
                organization_id: organization_id.to_string(),
            },
        ];

        for row in &rows {
            self.store.insert_sla_metric(row).await?;
        }
        debug!(org = organization_id, rows = rows.len(), "sla evaluation recorded");
        Ok(rows)
    }

    /// Recorded SLA rows for the organization, newest first
    pub async fn history(&self, organization_id: &str) -> Result<Vec<SlaMetric>> {
        self.store.list_sla_metrics(organization_id).await
    }
}
