//! Monitoring system facade
//!
//! One `MonitoringSystem` exists per deployment, built from injected
//! collaborators; there is no process-wide default instance. The facade
//! exposes the operation contracts the HTTP layer maps onto and owns the
//! background sampling task.

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::alerts::{
    Alert, AlertEngine, AlertFilter, AlertSeverity, AlertStats, EmailNotifier, Notifier,
    ThresholdConfig, ThresholdStore, ThresholdUpdate, WebhookNotifier,
};
use crate::cache::{CacheBackend, InMemoryCache, MokaCache};
use crate::config::{CacheBackendKind, MonitorConfig};
use crate::health::{HealthSampler, HealthSnapshot, HostProbe, SysinfoProbe};
use crate::incidents::{Incident, IncidentStatus, IncidentTracker, NewIncident};
use crate::metrics::{
    MetricPoint, MetricType, PerformanceSummary, QueryOptimizationReport, ScoreAggregator,
};
use crate::scaling::{
    AdvisorStatus, ScalingAdvisor, ScalingEvent, ScalingMetrics, ScalingRecommendation,
};
use crate::sla::{SlaMetric, SlaTracker};
use crate::storage::{MetricStore, TimeRange};
use crate::utils::error::{MonitorError, Result};

/// Default aggregation window for summaries and reports
pub const DEFAULT_SUMMARY_WINDOW_HOURS: i64 = 24;

/// Request to record one metric point
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RecordMetricRequest {
    /// Metric name; required
    pub metric_name: String,
    /// Metric kind; gauges when unspecified
    pub metric_type: Option<MetricType>,
    /// Observed value; required, must be finite
    pub value: f64,
    /// Unit of the value; required
    pub unit: String,
    /// Endpoint the observation was made on
    pub endpoint: Option<String>,
    /// HTTP method of the observation
    pub method: Option<String>,
    /// User the observation is attributed to
    pub user_id: Option<String>,
    /// Owning organization
    pub organization_id: Option<String>,
}

/// Scalability analysis result
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScalabilityReport {
    /// Metric values the analysis ran on
    pub metrics: ScalingMetrics,
    /// Recommendations produced
    pub recommendations: Vec<ScalingRecommendation>,
    /// Scaling event history, oldest first
    pub history: Vec<ScalingEvent>,
    /// Advisor status snapshot
    pub advisor_status: AdvisorStatus,
}

/// Monitoring system facade: one per deployment
#[derive(Clone)]
pub struct MonitoringSystem {
    config: Arc<MonitorConfig>,
    store: Arc<dyn MetricStore>,
    cache: Arc<dyn CacheBackend>,
    thresholds: Arc<ThresholdStore>,
    engine: Arc<AlertEngine>,
    sampler: Arc<HealthSampler>,
    aggregator: Arc<ScoreAggregator>,
    advisor: Arc<ScalingAdvisor>,
    sla: Arc<SlaTracker>,
    incidents: Arc<IncidentTracker>,
    active: Arc<AtomicBool>,
}

impl std::fmt::Debug for MonitoringSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitoringSystem")
            .field("active", &self.active.load(Ordering::Acquire))
            .finish()
    }
}

impl MonitoringSystem {
    /// Create a system with the configured cache backend, notification
    /// channels, and the sysinfo host probe
    pub fn new(config: MonitorConfig, store: Arc<dyn MetricStore>) -> Result<Self> {
        let cache: Arc<dyn CacheBackend> = match config.cache.backend {
            CacheBackendKind::Memory => Arc::new(InMemoryCache::new()),
            CacheBackendKind::Moka => Arc::new(MokaCache::new(config.cache.max_entries)),
        };

        let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();
        if config.alerting.email_enabled {
            notifiers.push(Box::new(EmailNotifier::new(
                config.alerting.email_recipients.clone(),
                AlertSeverity::Info,
            )));
        }
        if let Some(url) = &config.alerting.webhook_url {
            notifiers.push(Box::new(WebhookNotifier::new(
                url.clone(),
                AlertSeverity::Warning,
            )));
        }

        Self::with_parts(config, store, cache, Arc::new(SysinfoProbe::new()), notifiers)
    }

    /// Create a system from explicit parts
    ///
    /// Deployments that bring their own cache, probe, or channels inject
    /// them here; tests use it for deterministic probes.
    pub fn with_parts(
        config: MonitorConfig,
        store: Arc<dyn MetricStore>,
        cache: Arc<dyn CacheBackend>,
        probe: Arc<dyn HostProbe>,
        notifiers: Vec<Box<dyn Notifier>>,
    ) -> Result<Self> {
        config.validate()?;
        info!("Initializing monitoring system");

        let config = Arc::new(config);
        let thresholds = Arc::new(ThresholdStore::new());
        let engine = Arc::new(AlertEngine::new(store.clone(), notifiers));
        let sampler = Arc::new(HealthSampler::new(
            store.clone(),
            probe,
            engine.clone(),
            thresholds.clone(),
        ));
        let aggregator = Arc::new(ScoreAggregator::new(store.clone(), cache.clone()));
        let advisor = Arc::new(ScalingAdvisor::new(config.scaling.max_instances));
        let sla = Arc::new(SlaTracker::new(store.clone(), thresholds.clone()));
        let incidents = Arc::new(IncidentTracker::new(store.clone()));

        Ok(Self {
            config,
            store,
            cache,
            thresholds,
            engine,
            sampler,
            aggregator,
            advisor,
            sla,
            incidents,
            active: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Start the background sampling task
    pub fn start(&self) {
        if self.active.swap(true, Ordering::AcqRel) {
            return;
        }
        info!(
            interval_secs = self.config.sampling.interval_secs,
            orgs = self.config.sampling.organizations.len(),
            "starting background health sampling"
        );

        let system = self.clone();
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(system.config.sampling.interval_secs));
            loop {
                interval.tick().await;
                if !system.active.load(Ordering::Acquire) {
                    break;
                }
                for org in &system.config.sampling.organizations {
                    if let Err(e) = system.collect_health(org).await {
                        error!(org = %org, "background health sample failed: {}", e);
                    }
                }
            }
        });
    }

    /// Stop the background sampling task
    pub fn stop(&self) {
        info!("stopping background health sampling");
        self.active.store(false, Ordering::Release);
    }

    /// Whether the background task is running
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Collect a health snapshot for the organization
    ///
    /// Persists the snapshot and evaluates it for alerts as a side effect.
    pub async fn collect_health(&self, organization_id: &str) -> Result<HealthSnapshot> {
        self.sampler.sample(organization_id).await
    }

    /// Record one metric point
    pub async fn record_metric(&self, request: RecordMetricRequest) -> Result<()> {
        if request.metric_name.trim().is_empty() {
            return Err(MonitorError::invalid_field(
                "metric_name",
                "must not be empty",
            ));
        }
        if request.unit.trim().is_empty() {
            return Err(MonitorError::invalid_field("unit", "must not be empty"));
        }
        if !request.value.is_finite() {
            return Err(MonitorError::invalid_field(
                "value",
                "must be a finite number",
            ));
        }

        let point = MetricPoint {
            metric_name: request.metric_name,
            metric_type: request.metric_type.unwrap_or(MetricType::Gauge),
            value: request.value,
            unit: request.unit,
            endpoint: request.endpoint,
            method: request.method,
            user_id: request.user_id,
            organization_id: request.organization_id,
            recorded_at: Utc::now(),
        };
        self.store.insert_metric(&point).await
    }

    /// Alerts matching the filter, newest first
    pub async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>> {
        self.engine.list(filter).await
    }

    /// Acknowledge an active alert
    pub async fn acknowledge_alert(
        &self,
        alert_id: &str,
        actor_id: &str,
        organization_id: &str,
    ) -> Result<Alert> {
        self.engine
            .acknowledge(alert_id, actor_id, organization_id)
            .await
    }

    /// Resolve an active or acknowledged alert
    pub async fn resolve_alert(&self, alert_id: &str, organization_id: &str) -> Result<Alert> {
        self.engine.resolve(alert_id, organization_id).await
    }

    /// Alert counters
    pub fn alert_stats(&self) -> AlertStats {
        self.engine.stats()
    }

    /// Threshold config for the organization, or the defaults
    pub fn threshold_config(&self, organization_id: &str) -> ThresholdConfig {
        self.thresholds.get(organization_id)
    }

    /// Merge a partial threshold update for the organization
    pub fn update_threshold_config(
        &self,
        organization_id: &str,
        update: &ThresholdUpdate,
    ) -> ThresholdConfig {
        self.thresholds.update(organization_id, update)
    }

    /// Analyze current metrics into scaling recommendations
    ///
    /// The analysis runs on the most recent snapshot in the trailing five
    /// minutes; with no snapshot it falls back to the sampler defaults so an
    /// idle deployment still gets a coherent report.
    pub async fn analyze_scalability(&self, organization_id: &str) -> Result<ScalabilityReport> {
        let range = TimeRange::trailing(ChronoDuration::minutes(5));
        let snapshots = self
            .store
            .snapshots_in_range(Some(organization_id), range)
            .await?;
        let latest = snapshots.iter().max_by_key(|s| s.recorded_at);

        let metrics = match latest {
            Some(s) => ScalingMetrics {
                cpu_usage: s.cpu_usage,
                memory_usage: s.memory_usage,
                response_time: s.response_time,
            },
            None => ScalingMetrics {
                cpu_usage: 0.0,
                memory_usage: 0.0,
                response_time: crate::health::sampler::defaults::RESPONSE_TIME_MS,
            },
        };

        let recommendations = self.advisor.analyze(&metrics);
        debug!(
            org = organization_id,
            recommendations = recommendations.len(),
            "scalability analysis complete"
        );
        Ok(ScalabilityReport {
            metrics,
            recommendations,
            history: self.advisor.history(),
            advisor_status: self.advisor.status(),
        })
    }

    /// Set whether recommendations should be acted on automatically
    pub fn toggle_auto_scaling(&self, enabled: bool) -> bool {
        self.advisor.toggle_auto_scaling(enabled)
    }

    /// Merge recognized scaling threshold keys; unknown keys are ignored
    pub fn set_scaling_thresholds(
        &self,
        updates: &std::collections::HashMap<String, f64>,
    ) -> std::collections::HashMap<String, f64> {
        self.advisor.set_thresholds(updates)
    }

    /// Apply a simulated scaling event
    pub fn simulate_scaling(&self, event_type: &str, count: u32) -> (ScalingEvent, u32) {
        self.advisor.simulate_event(event_type, count)
    }

    /// Optimization score over the window
    pub async fn optimization_score(
        &self,
        organization_id: &str,
        window: Option<ChronoDuration>,
    ) -> Result<f64> {
        self.aggregator
            .optimization_score(Some(organization_id), self.window_or_default(window))
            .await
    }

    /// Performance summary over the window (24 h default)
    pub async fn performance_summary(
        &self,
        organization_id: &str,
        window: Option<ChronoDuration>,
    ) -> Result<PerformanceSummary> {
        self.aggregator
            .performance_summary(Some(organization_id), self.window_or_default(window))
            .await
    }

    /// Query optimization report over the window (24 h default)
    pub async fn query_optimization_report(
        &self,
        organization_id: &str,
        window: Option<ChronoDuration>,
    ) -> Result<QueryOptimizationReport> {
        self.aggregator
            .query_optimization_report(Some(organization_id), self.window_or_default(window))
            .await
    }

    /// Evaluate and record SLA compliance over the trailing period
    pub async fn sla_compliance(
        &self,
        organization_id: &str,
        period: Option<ChronoDuration>,
    ) -> Result<Vec<SlaMetric>> {
        self.sla
            .evaluate(organization_id, self.window_or_default(period))
            .await
    }

    /// Open an incident
    pub async fn open_incident(&self, incident: NewIncident) -> Result<Incident> {
        self.incidents.open(incident).await
    }

    /// Advance an incident to a later lifecycle state
    pub async fn transition_incident(
        &self,
        id: &str,
        organization_id: &str,
        status: IncidentStatus,
        actor_id: Option<&str>,
        resolution: Option<String>,
    ) -> Result<Incident> {
        self.incidents
            .transition(id, organization_id, status, actor_id, resolution)
            .await
    }

    /// Incidents for the organization, optionally filtered by status
    pub async fn list_incidents(
        &self,
        organization_id: &str,
        status: Option<IncidentStatus>,
    ) -> Result<Vec<Incident>> {
        self.incidents.list(organization_id, status).await
    }

    /// Cache layer counters
    pub fn cache_stats(&self) -> crate::cache::CacheStats {
        self.cache.stats()
    }

    fn window_or_default(&self, window: Option<ChronoDuration>) -> ChronoDuration {
        window.unwrap_or_else(|| ChronoDuration::hours(DEFAULT_SUMMARY_WINDOW_HOURS))
    }
}
