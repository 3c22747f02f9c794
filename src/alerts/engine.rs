//! Threshold evaluation and alert lifecycle
//!
//! The engine evaluates health snapshots against per-organization threshold
//! configs, raising deduplicated alerts, and owns the acknowledge/resolve
//! lifecycle. The dedup invariant — at most one active alert per
//! (alert_type, severity, source, organization) — is enforced under a
//! per-organization lock held only around the find-then-write step, never
//! across metric reads or notification delivery.

use chrono::Utc;
use dashmap::DashMap;
use futures::future::join_all;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::notify::{Notifier, dispatch};
use super::thresholds::ThresholdConfig;
use super::types::{Alert, AlertFilter, AlertKey, AlertSeverity, AlertStats, AlertStatus};
use crate::health::types::HealthSnapshot;
use crate::storage::MetricStore;
use crate::utils::error::{MonitorError, Result};

/// Source recorded on alerts raised by snapshot evaluation
pub const ALERT_SOURCE: &str = "health_sampler";

/// A metric family whose value breached a threshold tier
#[derive(Debug, Clone)]
struct Breach {
    alert_type: &'static str,
    metric_name: &'static str,
    unit: &'static str,
    severity: AlertSeverity,
    threshold: f64,
    value: f64,
}

impl Breach {
    fn title(&self) -> String {
        format!(
            "{} {}",
            match self.severity {
                AlertSeverity::Critical => "Critical",
                _ => "High",
            },
            self.metric_name.replace('_', " ")
        )
    }

    fn message(&self) -> String {
        format!(
            "{} at {:.1}{} exceeds the {} threshold of {:.1}{}",
            self.metric_name.replace('_', " "),
            self.value,
            self.unit,
            self.severity,
            self.threshold,
            self.unit,
        )
    }
}

/// Two-tier check for one metric family. Critical wins over warning; a value
/// at or below the warning tier produces nothing for this cycle.
fn check_family(
    alert_type: &'static str,
    metric_name: &'static str,
    unit: &'static str,
    value: f64,
    warning: f64,
    critical: f64,
) -> Option<Breach> {
    let (severity, threshold) = if value > critical {
        (AlertSeverity::Critical, critical)
    } else if value > warning {
        (AlertSeverity::Warning, warning)
    } else {
        return None;
    };
    Some(Breach {
        alert_type,
        metric_name,
        unit,
        severity,
        threshold,
        value,
    })
}

/// Alert engine: threshold evaluation, dedup, and lifecycle operations
#[derive(Debug)]
pub struct AlertEngine {
    store: Arc<dyn MetricStore>,
    notifiers: Vec<Box<dyn Notifier>>,
    /// One lock per organization so the find-then-write dedup step is atomic
    org_locks: DashMap<String, Arc<Mutex<()>>>,
    stats: RwLock<AlertStats>,
}

impl AlertEngine {
    /// Create an engine over the given store and notification channels
    pub fn new(store: Arc<dyn MetricStore>, notifiers: Vec<Box<dyn Notifier>>) -> Self {
        Self {
            store,
            notifiers,
            org_locks: DashMap::new(),
            stats: RwLock::new(AlertStats::default()),
        }
    }

    fn org_lock(&self, organization_id: &str) -> Arc<Mutex<()>> {
        self.org_locks
            .entry(organization_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Evaluate a snapshot against the organization's thresholds
    ///
    /// Families are independent; each of cpu, memory, and response time can
    /// raise its own alert in the same cycle. Returns the alerts raised or
    /// updated.
    pub async fn evaluate(
        &self,
        snapshot: &HealthSnapshot,
        config: &ThresholdConfig,
        organization_id: &str,
    ) -> Result<Vec<Alert>> {
        let breaches: Vec<Breach> = [
            check_family(
                "cpu_usage",
                "cpu_usage",
                "%",
                snapshot.cpu_usage,
                config.cpu_warning,
                config.cpu_critical,
            ),
            check_family(
                "memory_usage",
                "memory_usage",
                "%",
                snapshot.memory_usage,
                config.memory_warning,
                config.memory_critical,
            ),
            check_family(
                "response_time",
                "response_time",
                "ms",
                snapshot.response_time,
                config.response_time_warning,
                config.response_time_critical,
            ),
        ]
        .into_iter()
        .flatten()
        .collect();

        if breaches.is_empty() {
            return Ok(Vec::new());
        }

        // Dedup check-and-write happens under the per-org lock; the fresh
        // alerts are collected and notified after the lock is released.
        let mut touched = Vec::new();
        let mut fresh = Vec::new();
        {
            let lock = self.org_lock(organization_id);
            let _guard = lock.lock().await;

            for breach in &breaches {
                let key = AlertKey {
                    alert_type: breach.alert_type.to_string(),
                    severity: breach.severity,
                    source: ALERT_SOURCE.to_string(),
                    organization_id: organization_id.to_string(),
                };

                if let Some(mut existing) = self.store.find_active_alert(&key).await? {
                    existing.current_value = breach.value;
                    existing.message = breach.message();
                    self.store.update_alert(&existing).await?;
                    debug!(
                        alert_id = %existing.id,
                        value = breach.value,
                        "updated active alert in place"
                    );
                    touched.push(existing);
                } else {
                    let alert = Alert {
                        id: uuid::Uuid::new_v4().to_string(),
                        alert_type: breach.alert_type.to_string(),
                        severity: breach.severity,
                        title: breach.title(),
                        message: breach.message(),
                        status: AlertStatus::Active,
                        source: ALERT_SOURCE.to_string(),
                        metric_name: breach.metric_name.to_string(),
                        threshold_value: breach.threshold,
                        current_value: breach.value,
                        acknowledged_by: None,
                        acknowledged_at: None,
                        resolved_at: None,
                        notification_sent: false,
                        notification_channels: vec!["email".to_string()],
                        organization_id: organization_id.to_string(),
                        created_at: Utc::now(),
                    };
                    self.store.insert_alert(&alert).await?;
                    info!(
                        alert_id = %alert.id,
                        severity = %alert.severity,
                        org = organization_id,
                        "raised alert: {}",
                        alert.title
                    );
                    self.record_raise(&alert);
                    fresh.push(alert);
                }
            }
        }

        // Best-effort delivery for fresh alerts only; repeated breaches do
        // not re-send. Delivery happens outside the lock.
        let deliveries = join_all(fresh.iter().map(|a| dispatch(&self.notifiers, a))).await;
        let outcomes: Vec<(Alert, bool)> = fresh.into_iter().zip(deliveries).collect();
        for (_, delivered) in &outcomes {
            if !delivered {
                self.stats.write().failed_notifications += 1;
            }
        }

        if !outcomes.is_empty() {
            // Re-read under the org lock so stamping notification_sent does
            // not clobber a concurrent in-place breach update.
            let lock = self.org_lock(organization_id);
            let _guard = lock.lock().await;
            for (alert, delivered) in outcomes {
                match self.store.get_alert(&alert.id, organization_id).await? {
                    Some(mut current) => {
                        current.notification_sent = delivered;
                        self.store.update_alert(&current).await?;
                        touched.push(current);
                    }
                    None => touched.push(alert),
                }
            }
        }

        Ok(touched)
    }

    /// Acknowledge an active alert
    ///
    /// Fails with `NotFound` unless an active alert with this id exists for
    /// the organization.
    pub async fn acknowledge(
        &self,
        alert_id: &str,
        actor_id: &str,
        organization_id: &str,
    ) -> Result<Alert> {
        let mut alert = self
            .store
            .get_alert(alert_id, organization_id)
            .await?
            .filter(|a| a.status == AlertStatus::Active)
            .ok_or_else(|| MonitorError::not_found("active alert", alert_id))?;

        alert.status = AlertStatus::Acknowledged;
        alert.acknowledged_by = Some(actor_id.to_string());
        alert.acknowledged_at = Some(Utc::now());
        self.store.update_alert(&alert).await?;
        info!(alert_id, actor = actor_id, "alert acknowledged");
        Ok(alert)
    }

    /// Resolve an alert from the active or acknowledged state
    ///
    /// Resolving an alert that is already resolved, or that does not exist
    /// for the organization, returns `NotFound`.
    pub async fn resolve(&self, alert_id: &str, organization_id: &str) -> Result<Alert> {
        let mut alert = self
            .store
            .get_alert(alert_id, organization_id)
            .await?
            .filter(|a| {
                matches!(a.status, AlertStatus::Active | AlertStatus::Acknowledged)
            })
            .ok_or_else(|| MonitorError::not_found("unresolved alert", alert_id))?;

        alert.status = AlertStatus::Resolved;
        alert.resolved_at = Some(Utc::now());
        self.store.update_alert(&alert).await?;
        info!(alert_id, "alert resolved");
        Ok(alert)
    }

    /// Alerts matching the filter, newest first
    pub async fn list(&self, filter: &AlertFilter) -> Result<Vec<Alert>> {
        self.store.list_alerts(filter).await
    }

    /// Counter snapshot
    pub fn stats(&self) -> AlertStats {
        self.stats.read().clone()
    }

    fn record_raise(&self, alert: &Alert) {
        let mut stats = self.stats.write();
        stats.total_alerts += 1;
        *stats
            .alerts_by_severity
            .entry(alert.severity.to_string())
            .or_insert(0) += 1;
        *stats
            .alerts_by_source
            .entry(alert.source.clone())
            .or_insert(0) += 1;
        stats.last_alert = Some(alert.created_at);
    }
}
