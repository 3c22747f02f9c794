//! Derived summaries over stored metrics
//!
//! The aggregator reads rolling windows from the metric store and computes
//! the optimization score, performance summaries, and query optimization
//! reports. Summaries are cached briefly so dashboard polling does not
//! rescan the store on every request.

use chrono::Duration as ChronoDuration;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::types::{
    EndpointQueryStats, MetricPoint, OptimizationRecommendation, PerformanceSummary,
    QueryOptimizationReport, RecommendationPriority,
};
use crate::cache::CacheBackend;
use crate::storage::{MetricStore, TimeRange};
use crate::utils::error::Result;

/// Score reported when the window holds no response-time points
pub const NEUTRAL_SCORE: f64 = 75.0;

const SLOW_QUERY_MS: f64 = 1000.0;
const HOT_ENDPOINT_COUNT: u64 = 1000;
const HIGH_AVG_QUERY_MS: f64 = 500.0;
const SUMMARY_CACHE_TTL: Duration = Duration::from_secs(60);

/// Map a mean response time in milliseconds onto the 0-100 score scale
fn score_for_mean(mean_ms: f64) -> f64 {
    if mean_ms < 100.0 {
        95.0
    } else if mean_ms < 200.0 {
        85.0
    } else if mean_ms < 500.0 {
        70.0
    } else if mean_ms < 1000.0 {
        50.0
    } else {
        25.0
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0u64;
    for v in values {
        sum += v;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

/// Computes derived summaries from stored metrics
#[derive(Debug)]
pub struct ScoreAggregator {
    store: Arc<dyn MetricStore>,
    cache: Arc<dyn CacheBackend>,
}

impl ScoreAggregator {
    /// Create an aggregator over the given store and cache
    pub fn new(store: Arc<dyn MetricStore>, cache: Arc<dyn CacheBackend>) -> Self {
        Self { store, cache }
    }

    /// Optimization score over the window, in [0, 100]
    ///
    /// A window with no response-time points scores [`NEUTRAL_SCORE`]; the
    /// absence of data is not an error.
    pub async fn optimization_score(
        &self,
        organization_id: Option<&str>,
        window: ChronoDuration,
    ) -> Result<f64> {
        let range = TimeRange::trailing(window);
        let points = self
            .store
            .metrics_in_range("api_response_time", organization_id, range)
            .await?;
        Ok(match mean(points.iter().map(|p| p.value)) {
            Some(mean_ms) => score_for_mean(mean_ms),
            None => NEUTRAL_SCORE,
        })
    }

    /// Performance summary over the window (default 24 h at the facade)
    ///
    /// Cached for sixty seconds per (organization, window) pair.
    pub async fn performance_summary(
        &self,
        organization_id: Option<&str>,
        window: ChronoDuration,
    ) -> Result<PerformanceSummary> {
        let cache_key = format!(
            "perf_summary:{}:{}",
            organization_id.unwrap_or("all"),
            window.num_seconds()
        );
        if let Some(cached) = self.cache.get(&cache_key).await? {
            if let Ok(summary) = serde_json::from_value::<PerformanceSummary>(cached) {
                debug!(key = %cache_key, "performance summary served from cache");
                return Ok(summary);
            }
        }

        let range = TimeRange::trailing(window);
        let response_times = self
            .store
            .metrics_in_range("api_response_time", organization_id, range)
            .await?;
        let errors = self
            .store
            .metrics_in_range("api_errors", organization_id, range)
            .await?;

        let values: Vec<f64> = response_times.iter().map(|p| p.value).collect();
        let avg = mean(values.iter().copied()).unwrap_or(0.0);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let summary = PerformanceSummary {
            total_requests: values.len() as u64,
            avg_response_time: avg,
            min_response_time: if values.is_empty() { 0.0 } else { min },
            max_response_time: if values.is_empty() { 0.0 } else { max },
            error_rate: mean(errors.iter().map(|p| p.value)).unwrap_or(0.0),
            cache_stats: self.cache.stats(),
            optimization_score: if values.is_empty() {
                NEUTRAL_SCORE
            } else {
                score_for_mean(avg)
            },
            window_start: range.from,
            window_end: range.to,
        };

        self.cache
            .set_with_ttl(
                &cache_key,
                serde_json::to_value(&summary)?,
                SUMMARY_CACHE_TTL,
            )
            .await?;
        Ok(summary)
    }

    /// Query optimization report over the window (default 24 h at the facade)
    pub async fn query_optimization_report(
        &self,
        organization_id: Option<&str>,
        window: ChronoDuration,
    ) -> Result<QueryOptimizationReport> {
        let range = TimeRange::trailing(window);
        let queries = self
            .store
            .metrics_in_range("query_duration", organization_id, range)
            .await?;

        let slow_queries: Vec<MetricPoint> = queries
            .iter()
            .filter(|p| p.value > SLOW_QUERY_MS)
            .cloned()
            .collect();

        let mut endpoint_stats: HashMap<String, EndpointQueryStats> = HashMap::new();
        for point in &queries {
            let endpoint = point.endpoint.clone().unwrap_or_else(|| "unknown".to_string());
            let stats = endpoint_stats
                .entry(endpoint.clone())
                .or_insert_with(|| EndpointQueryStats {
                    endpoint,
                    count: 0,
                    avg_duration: 0.0,
                    max_duration: 0.0,
                });
            // running mean keeps a single pass over the points
            stats.avg_duration =
                (stats.avg_duration * stats.count as f64 + point.value) / (stats.count + 1) as f64;
            stats.count += 1;
            stats.max_duration = stats.max_duration.max(point.value);
        }

        let avg_query_duration = mean(queries.iter().map(|p| p.value)).unwrap_or(0.0);

        let mut recommendations = Vec::new();
        if !slow_queries.is_empty() {
            recommendations.push(OptimizationRecommendation {
                rec_type: "slow_queries".to_string(),
                priority: RecommendationPriority::High,
                title: "Optimize slow queries".to_string(),
                description: format!(
                    "{} queries exceeded {}ms in the window",
                    slow_queries.len(),
                    SLOW_QUERY_MS
                ),
                action: "Add indexes or rewrite the slowest queries".to_string(),
                impact: "Reduces tail latency on the affected endpoints".to_string(),
            });
        }
        if let Some(busiest) = endpoint_stats.values().max_by_key(|s| s.count) {
            if busiest.count > HOT_ENDPOINT_COUNT {
                recommendations.push(OptimizationRecommendation {
                    rec_type: "caching".to_string(),
                    priority: RecommendationPriority::Medium,
                    title: "Add caching".to_string(),
                    description: format!(
                        "endpoint {} served {} queries in the window",
                        busiest.endpoint, busiest.count
                    ),
                    action: "Cache repeated reads on the hottest endpoint".to_string(),
                    impact: "Cuts repeated query load on the store".to_string(),
                });
            }
        }
        if avg_query_duration > HIGH_AVG_QUERY_MS {
            recommendations.push(OptimizationRecommendation {
                rec_type: "general".to_string(),
                priority: RecommendationPriority::Medium,
                title: "General query optimization".to_string(),
                description: format!(
                    "window-wide average query duration is {:.0}ms",
                    avg_query_duration
                ),
                action: "Review query plans and connection pool sizing".to_string(),
                impact: "Improves average response time across endpoints".to_string(),
            });
        }

        Ok(QueryOptimizationReport {
            slow_queries,
            endpoint_stats,
            avg_query_duration,
            recommendations,
            window_start: range.from,
            window_end: range.to,
        })
    }
}
