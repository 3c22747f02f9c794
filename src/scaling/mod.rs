//! Advisory scaling over the deployment's instance count
//!
//! The advisor is a state machine over the current instance count. It only
//! recommends: acting on a recommendation (or on the auto-scaling flag) is
//! the caller's concern, and simulated events exist so operators can
//! rehearse capacity changes. One advisor instance exists per deployment;
//! every mutation is a read-modify-write serialized behind the internal
//! lock.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Instance floor; the advisor never recommends going below one instance
pub const MIN_INSTANCES: u32 = 1;

const SCALE_UP: &str = "scale_up";
const SCALE_DOWN: &str = "scale_down";

/// Low-water marks for the scale-down rule
const CPU_IDLE: f64 = 30.0;
const MEMORY_IDLE: f64 = 30.0;
const RESPONSE_TIME_IDLE: f64 = 200.0;

/// Current metric values fed into an analysis pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingMetrics {
    /// CPU utilization percentage
    pub cpu_usage: f64,
    /// Memory utilization percentage
    pub memory_usage: f64,
    /// Mean response time in milliseconds
    pub response_time: f64,
}

/// Direction of a recommendation or simulated event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingAction {
    ScaleUp,
    ScaleDown,
}

/// A single scaling recommendation; advisory only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingRecommendation {
    /// Direction to move the instance count
    pub action: ScalingAction,
    /// Metric family that triggered the recommendation
    pub metric: String,
    /// Observed value of that metric
    pub observed: f64,
    /// Threshold tier that was crossed
    pub threshold: f64,
    /// Instance count the advisor held when recommending
    pub current_instances: u32,
    /// Instance count the advisor recommends moving to
    pub recommended_instances: u32,
    /// Operator-facing reason
    pub reason: String,
}

/// A recorded scaling event, real or simulated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingEvent {
    /// Event type as requested by the caller
    pub event_type: String,
    /// Instance delta requested
    pub instances: u32,
    /// Instance count after the event was applied
    pub new_total: u32,
    /// When the event was recorded
    pub timestamp: DateTime<Utc>,
}

/// Advisor status snapshot for reporting surfaces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorStatus {
    /// Current instance count
    pub current_instances: u32,
    /// Instance ceiling
    pub max_instances: u32,
    /// Whether callers should act on recommendations automatically
    pub auto_scaling_enabled: bool,
    /// Current threshold map
    pub thresholds: HashMap<String, f64>,
}

#[derive(Debug)]
struct AdvisorState {
    current_instances: u32,
    max_instances: u32,
    auto_scaling_enabled: bool,
    thresholds: HashMap<String, f64>,
    history: Vec<ScalingEvent>,
}

fn seeded_thresholds() -> HashMap<String, f64> {
    HashMap::from([
        ("cpu_high".to_string(), 80.0),
        ("cpu_critical".to_string(), 95.0),
        ("memory_high".to_string(), 80.0),
        ("memory_critical".to_string(), 95.0),
        ("response_time_high".to_string(), 1000.0),
        ("response_time_critical".to_string(), 5000.0),
        ("concurrent_users_high".to_string(), 1000.0),
        ("concurrent_users_critical".to_string(), 5000.0),
    ])
}

/// Stateful scaling advisor; one instance per deployment
#[derive(Debug)]
pub struct ScalingAdvisor {
    state: RwLock<AdvisorState>,
}

impl ScalingAdvisor {
    /// Create an advisor starting at one instance with the given ceiling
    pub fn new(max_instances: u32) -> Self {
        Self::with_instances(MIN_INSTANCES, max_instances)
    }

    /// Create an advisor at a specific starting instance count
    pub fn with_instances(current_instances: u32, max_instances: u32) -> Self {
        let max_instances = max_instances.max(MIN_INSTANCES);
        Self {
            state: RwLock::new(AdvisorState {
                current_instances: current_instances.clamp(MIN_INSTANCES, max_instances),
                max_instances,
                auto_scaling_enabled: false,
                thresholds: seeded_thresholds(),
                history: Vec::new(),
            }),
        }
    }

    /// Evaluate current metrics into scaling recommendations
    ///
    /// The cpu, memory, and response-time families are checked
    /// independently; several can recommend a scale-up in the same call. A
    /// scale-down is only recommended when all three metrics sit below their
    /// low-water marks simultaneously and more than one instance is running.
    pub fn analyze(&self, metrics: &ScalingMetrics) -> Vec<ScalingRecommendation> {
        let state = self.state.read();
        let mut recommendations = Vec::new();

        let families = [
            ("cpu", metrics.cpu_usage, "cpu_high", "cpu_critical"),
            (
                "memory",
                metrics.memory_usage,
                "memory_high",
                "memory_critical",
            ),
            (
                "response_time",
                metrics.response_time,
                "response_time_high",
                "response_time_critical",
            ),
        ];

        for (family, observed, high_key, critical_key) in families {
            let high = state.thresholds[high_key];
            let critical = state.thresholds[critical_key];
            let (step, threshold, tier) = if observed > critical {
                (2, critical, "critical")
            } else if observed > high {
                (1, high, "high")
            } else {
                continue;
            };
            let recommended =
                (state.current_instances + step).min(state.max_instances);
            recommendations.push(ScalingRecommendation {
                action: ScalingAction::ScaleUp,
                metric: family.to_string(),
                observed,
                threshold,
                current_instances: state.current_instances,
                recommended_instances: recommended,
                reason: format!(
                    "{} at {:.1} exceeds the {} threshold of {:.1}",
                    family, observed, tier, threshold
                ),
            });
        }

        if metrics.cpu_usage < CPU_IDLE
            && metrics.memory_usage < MEMORY_IDLE
            && metrics.response_time < RESPONSE_TIME_IDLE
            && state.current_instances > MIN_INSTANCES
        {
            recommendations.push(ScalingRecommendation {
                action: ScalingAction::ScaleDown,
                metric: "all".to_string(),
                observed: metrics.cpu_usage,
                threshold: CPU_IDLE,
                current_instances: state.current_instances,
                recommended_instances: state.current_instances - 1,
                reason: format!(
                    "cpu {:.1}, memory {:.1}, and response time {:.0}ms are all idle",
                    metrics.cpu_usage, metrics.memory_usage, metrics.response_time
                ),
            });
        }

        debug!(
            count = recommendations.len(),
            instances = state.current_instances,
            "scaling analysis complete"
        );
        recommendations
    }

    /// Merge recognized threshold keys into the map
    ///
    /// Keys absent from the seeded map are silently ignored rather than
    /// rejected; this is the intended contract even though it masks typos,
    /// and stricter validation is a candidate change for a future revision.
    /// Returns the full threshold map after the merge.
    pub fn set_thresholds(&self, updates: &HashMap<String, f64>) -> HashMap<String, f64> {
        let mut state = self.state.write();
        for (key, value) in updates {
            if let Some(slot) = state.thresholds.get_mut(key) {
                *slot = *value;
            }
        }
        state.thresholds.clone()
    }

    /// Apply a simulated scaling event
    ///
    /// Deltas are capped at the instance ceiling and floored at one
    /// instance. An unrecognized event type is accepted as a recorded no-op
    /// that still returns success; the instance count is unchanged.
    pub fn simulate_event(&self, event_type: &str, count: u32) -> (ScalingEvent, u32) {
        let mut state = self.state.write();
        let new_total = match event_type {
            SCALE_UP => (state.current_instances + count).min(state.max_instances),
            SCALE_DOWN => state
                .current_instances
                .saturating_sub(count)
                .max(MIN_INSTANCES),
            _ => state.current_instances,
        };
        state.current_instances = new_total;

        let event = ScalingEvent {
            event_type: event_type.to_string(),
            instances: count,
            new_total,
            timestamp: Utc::now(),
        };
        state.history.push(event.clone());
        info!(
            event_type,
            count, new_total, "scaling event recorded"
        );
        (event, new_total)
    }

    /// Set whether callers should act on recommendations automatically
    pub fn toggle_auto_scaling(&self, enabled: bool) -> bool {
        self.state.write().auto_scaling_enabled = enabled;
        enabled
    }

    /// Ordered scaling event history, oldest first
    pub fn history(&self) -> Vec<ScalingEvent> {
        self.state.read().history.clone()
    }

    /// Status snapshot
    pub fn status(&self) -> AdvisorStatus {
        let state = self.state.read();
        AdvisorStatus {
            current_instances: state.current_instances,
            max_instances: state.max_instances,
            auto_scaling_enabled: state.auto_scaling_enabled,
            thresholds: state.thresholds.clone(),
        }
    }
}
