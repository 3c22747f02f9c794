//! Shared test infrastructure

use std::sync::Arc;

use gateway_pulse::alerts::{AlertSeverity, EmailNotifier, Notifier};
use gateway_pulse::cache::InMemoryCache;
use gateway_pulse::health::HostProbe;
use gateway_pulse::storage::InMemoryMetricStore;
use gateway_pulse::{MetricType, MonitorConfig, MonitoringSystem, RecordMetricRequest};

/// Initialize test logging once; respects `RUST_LOG`
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Host probe returning fixed gauges
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
}

impl FixedProbe {
    /// Probe reporting an idle host
    pub fn idle() -> Self {
        Self {
            cpu: 10.0,
            memory: 20.0,
            disk: 30.0,
        }
    }
}

impl HostProbe for FixedProbe {
    fn cpu_percent(&self) -> Option<f64> {
        Some(self.cpu)
    }
    fn memory_percent(&self) -> Option<f64> {
        Some(self.memory)
    }
    fn disk_percent(&self) -> Option<f64> {
        Some(self.disk)
    }
}

/// A monitoring system over an in-memory store with a deterministic probe
pub fn system_with_probe(probe: FixedProbe) -> (MonitoringSystem, Arc<InMemoryMetricStore>) {
    let store = Arc::new(InMemoryMetricStore::new());
    let notifiers: Vec<Box<dyn Notifier>> = vec![Box::new(EmailNotifier::new(
        vec!["ops@example.com".to_string()],
        AlertSeverity::Info,
    ))];
    let system = MonitoringSystem::with_parts(
        MonitorConfig::default(),
        store.clone(),
        Arc::new(InMemoryCache::new()),
        Arc::new(probe),
        notifiers,
    )
    .expect("default config is valid");
    (system, store)
}

/// Record a gauge metric for `org-1` through the facade
pub async fn record_gauge(system: &MonitoringSystem, name: &str, value: f64) {
    system
        .record_metric(RecordMetricRequest {
            metric_name: name.to_string(),
            metric_type: Some(MetricType::Gauge),
            value,
            unit: "ms".to_string(),
            endpoint: None,
            method: None,
            user_id: None,
            organization_id: Some("org-1".to_string()),
        })
        .await
        .expect("metric recording succeeds");
}
