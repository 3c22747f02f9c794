//! Type definitions for metric points and aggregation outputs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::cache::CacheStats;

/// Kind of a recorded metric point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Instantaneous value, latest wins
    Gauge,
    /// Monotonic count per observation
    Counter,
    /// Distribution sample
    Histogram,
}

/// A single recorded performance metric
///
/// Immutable and append-only; points are never updated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricPoint {
    /// Metric name, e.g. `api_response_time`
    pub metric_name: String,
    /// Metric kind
    pub metric_type: MetricType,
    /// Observed value
    pub value: f64,
    /// Unit of the value, e.g. `ms`
    pub unit: String,
    /// Endpoint the observation was made on
    pub endpoint: Option<String>,
    /// HTTP method of the observation
    pub method: Option<String>,
    /// User the observation is attributed to
    pub user_id: Option<String>,
    /// Owning organization
    pub organization_id: Option<String>,
    /// When the observation was made
    pub recorded_at: DateTime<Utc>,
}

/// Aggregated performance summary over a rolling window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Number of observed requests (one response-time point per request)
    pub total_requests: u64,
    /// Mean response time in milliseconds
    pub avg_response_time: f64,
    /// Minimum response time in milliseconds
    pub min_response_time: f64,
    /// Maximum response time in milliseconds
    pub max_response_time: f64,
    /// Mean of `api_errors` points over the window
    pub error_rate: f64,
    /// Cache layer statistics at summary time
    pub cache_stats: CacheStats,
    /// Optimization score for the same window
    pub optimization_score: f64,
    /// Start of the window
    pub window_start: DateTime<Utc>,
    /// End of the window
    pub window_end: DateTime<Utc>,
}

/// Per-endpoint query statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointQueryStats {
    /// Endpoint the queries ran against
    pub endpoint: String,
    /// Number of `query_duration` observations
    pub count: u64,
    /// Mean duration in milliseconds
    pub avg_duration: f64,
    /// Maximum duration in milliseconds
    pub max_duration: f64,
}

/// Priority of an optimization recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    Low,
    Medium,
    High,
}

/// Descriptive optimization recommendation; never an executed action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationRecommendation {
    /// Recommendation kind, e.g. `slow_queries`
    pub rec_type: String,
    /// How urgent the recommendation is
    pub priority: RecommendationPriority,
    /// Short human-readable title
    pub title: String,
    /// What was observed
    pub description: String,
    /// Suggested operator action
    pub action: String,
    /// Expected impact of taking the action
    pub impact: String,
}

/// Query optimization report over a rolling window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOptimizationReport {
    /// `query_duration` points above the slow threshold
    pub slow_queries: Vec<MetricPoint>,
    /// Per-endpoint stats for all `query_duration` points
    pub endpoint_stats: HashMap<String, EndpointQueryStats>,
    /// Window-wide mean query duration in milliseconds
    pub avg_query_duration: f64,
    /// Generated recommendations
    pub recommendations: Vec<OptimizationRecommendation>,
    /// Start of the window
    pub window_start: DateTime<Utc>,
    /// End of the window
    pub window_end: DateTime<Utc>,
}
