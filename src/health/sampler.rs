//! Point-in-time health sampling
//!
//! The sampler combines host probes with rolling-window reads from the
//! metric store, derives an overall status, persists the snapshot, and hands
//! it to the alert engine. Window reads happen before any lock is taken; the
//! alert engine acquires its per-organization lock internally around the
//! dedup step only.

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use super::probe::HostProbe;
use super::types::{HealthSnapshot, HealthState};
use crate::alerts::{AlertEngine, ThresholdStore};
use crate::metrics::types::MetricPoint;
use crate::storage::{MetricStore, TimeRange};
use crate::utils::error::Result;

/// Defaults used when a rolling window holds no points
pub mod defaults {
    /// Mean `api_response_time` fallback, milliseconds
    pub const RESPONSE_TIME_MS: f64 = 100.0;
    /// `api_errors` fallback
    pub const ERROR_RATE: f64 = 0.0;
    /// `requests_per_second` fallback
    pub const THROUGHPUT_RPS: f64 = 10.0;
    /// `network_latency` fallback, milliseconds
    pub const NETWORK_LATENCY_MS: f64 = 10.0;
}

const ERROR_RATE_CAP: f64 = 100.0;

/// Gathers health snapshots and feeds them to the alert engine
#[derive(Debug)]
pub struct HealthSampler {
    store: Arc<dyn MetricStore>,
    probe: Arc<dyn HostProbe>,
    engine: Arc<AlertEngine>,
    thresholds: Arc<ThresholdStore>,
    started_at: Instant,
}

fn mean(points: &[MetricPoint]) -> Option<f64> {
    if points.is_empty() {
        None
    } else {
        Some(points.iter().map(|p| p.value).sum::<f64>() / points.len() as f64)
    }
}

impl HealthSampler {
    /// Create a sampler over the given collaborators
    pub fn new(
        store: Arc<dyn MetricStore>,
        probe: Arc<dyn HostProbe>,
        engine: Arc<AlertEngine>,
        thresholds: Arc<ThresholdStore>,
    ) -> Self {
        Self {
            store,
            probe,
            engine,
            thresholds,
            started_at: Instant::now(),
        }
    }

    /// Collect one snapshot for the organization
    ///
    /// Individual probe or empty-window failures degrade to documented
    /// defaults; only when every host gauge is unavailable is the snapshot
    /// tagged with status `error`. The snapshot is persisted and then
    /// evaluated for alerts either way. Store failures propagate.
    pub async fn sample(&self, organization_id: &str) -> Result<HealthSnapshot> {
        let five_min = TimeRange::trailing(ChronoDuration::minutes(5));
        let one_min = TimeRange::trailing(ChronoDuration::minutes(1));
        let org = Some(organization_id);

        // Window reads first, no locks held.
        let response_times = self
            .store
            .metrics_in_range("api_response_time", org, five_min)
            .await?;
        let errors = self.store.metrics_in_range("api_errors", org, five_min).await?;
        let rps = self
            .store
            .metrics_in_range("requests_per_second", org, one_min)
            .await?;
        let latencies = self
            .store
            .metrics_in_range("network_latency", org, five_min)
            .await?;
        let connections = self
            .store
            .metrics_in_range("active_connections", org, five_min)
            .await?;

        let response_time = mean(&response_times).unwrap_or(defaults::RESPONSE_TIME_MS);
        let error_rate = if errors.is_empty() {
            defaults::ERROR_RATE
        } else {
            errors
                .iter()
                .map(|p| p.value)
                .sum::<f64>()
                .min(ERROR_RATE_CAP)
        };
        let throughput = mean(&rps).unwrap_or(defaults::THROUGHPUT_RPS);
        let network_latency = mean(&latencies).unwrap_or(defaults::NETWORK_LATENCY_MS);
        let active_connections = connections
            .iter()
            .max_by_key(|p| p.recorded_at)
            .map(|p| p.value.max(0.0) as u64)
            .unwrap_or(0);

        let cpu = self.probe.cpu_percent();
        let memory = self.probe.memory_percent();
        let disk = self.probe.disk_percent();
        let all_probes_down = cpu.is_none() && memory.is_none() && disk.is_none();
        if all_probes_down {
            warn!(org = organization_id, "every host probe failed, tagging snapshot as error");
        }

        let cpu = cpu.unwrap_or(0.0);
        let memory = memory.unwrap_or(0.0);
        let disk = disk.unwrap_or(0.0);

        let status = if all_probes_down {
            HealthState::Error
        } else {
            HealthSnapshot::derive_status(cpu, memory, disk)
        };

        let snapshot = HealthSnapshot {
            cpu_usage: cpu,
            memory_usage: memory,
            disk_usage: disk,
            network_latency,
            response_time,
            status,
            uptime_seconds: self.started_at.elapsed().as_secs(),
            active_connections,
            error_rate,
            throughput,
            recorded_at: Utc::now(),
            organization_id: Some(organization_id.to_string()),
        };

        self.store.insert_snapshot(&snapshot).await?;
        debug!(
            org = organization_id,
            status = %snapshot.status,
            cpu = snapshot.cpu_usage,
            response_time = snapshot.response_time,
            "health snapshot recorded"
        );

        let config = self.thresholds.get(organization_id);
        self.engine
            .evaluate(&snapshot, &config, organization_id)
            .await?;

        Ok(snapshot)
    }
}
