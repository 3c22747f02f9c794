//! # gateway-pulse
//!
//! Monitoring core for a multi-tenant LLM gateway. The crate samples host
//! health, records performance metrics, evaluates them against configurable
//! thresholds, raises deduplicated alerts, tracks SLA compliance and
//! incidents, and produces advisory scaling recommendations.
//!
//! ## Features
//!
//! - **Health sampling**: host gauges via sysinfo plus rolling-window
//!   metrics with a fixed status derivation
//! - **Threshold alerting**: two-tier (warning/critical) evaluation with at
//!   most one active alert per condition and organization
//! - **Aggregation**: optimization scores, performance summaries, and query
//!   optimization reports over stored metrics
//! - **SLA and incident tracking**: per-period compliance rows and a
//!   monotonic incident lifecycle
//! - **Advisory scaling**: recommendations and simulated events over an
//!   instance-count state machine; nothing is actuated
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gateway_pulse::{MonitorConfig, MonitoringSystem};
//! use gateway_pulse::storage::InMemoryMetricStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryMetricStore::new());
//!     let system = MonitoringSystem::new(MonitorConfig::default(), store)?;
//!
//!     system.start();
//!     let snapshot = system.collect_health("org-1").await?;
//!     println!("status: {}", snapshot.status);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod alerts;
pub mod cache;
pub mod config;
pub mod health;
pub mod incidents;
pub mod metrics;
pub mod scaling;
pub mod sla;
pub mod storage;
mod system;
pub mod utils;

// Re-export main types
pub use config::MonitorConfig;
pub use system::{MonitoringSystem, RecordMetricRequest, ScalabilityReport};
pub use utils::error::{MonitorError, Result};

pub use alerts::{
    Alert, AlertEngine, AlertFilter, AlertSeverity, AlertStatus, ThresholdConfig,
    ThresholdUpdate,
};
pub use health::{HealthSampler, HealthSnapshot, HealthState};
pub use incidents::{Incident, IncidentStatus, NewIncident};
pub use metrics::{MetricPoint, MetricType, PerformanceSummary, QueryOptimizationReport};
pub use scaling::{ScalingAdvisor, ScalingEvent, ScalingMetrics, ScalingRecommendation};
pub use sla::{SlaMetric, SlaStatus};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
        assert_eq!(NAME, env!("CARGO_PKG_NAME"));
    }
}
