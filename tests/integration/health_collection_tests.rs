//! Health collection integration tests
//!
//! End-to-end flows from recorded metrics through `collect_health` to the
//! alerts they raise.

#[cfg(test)]
mod tests {
    use crate::common::{FixedProbe, record_gauge, system_with_probe};
    use gateway_pulse::alerts::AlertFilter;
    use gateway_pulse::{AlertSeverity, AlertStatus, HealthState};

    /// Five 2000ms response-time points within the window must surface as a
    /// ~2000ms response time and raise a warning-tier response-time alert
    /// under the default thresholds (2000 > 1000 warning, < 5000 critical).
    #[tokio::test]
    async fn test_slow_responses_raise_warning_alert() {
        crate::common::init_tracing();
        let (system, _store) = system_with_probe(FixedProbe::idle());

        for _ in 0..5 {
            record_gauge(&system, "api_response_time", 2000.0).await;
        }

        let snapshot = system.collect_health("org-1").await.unwrap();
        assert!((snapshot.response_time - 2000.0).abs() < f64::EPSILON);
        // resource gauges are idle, so the snapshot status stays healthy
        assert_eq!(snapshot.status, HealthState::Healthy);

        let alerts = system
            .list_alerts(&AlertFilter::for_org("org-1"))
            .await
            .unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, "response_time");
        assert_eq!(alerts[0].severity, AlertSeverity::Warning);
        assert_eq!(alerts[0].status, AlertStatus::Active);
        assert!((alerts[0].current_value - 2000.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_cpu_critical_snapshot_status() {
        let (system, _store) = system_with_probe(FixedProbe {
            cpu: 96.0,
            memory: 50.0,
            disk: 50.0,
        });

        let snapshot = system.collect_health("org-1").await.unwrap();
        assert_eq!(snapshot.status, HealthState::Critical);
    }

    #[tokio::test]
    async fn test_warning_band_snapshot_status() {
        let (system, _store) = system_with_probe(FixedProbe {
            cpu: 85.0,
            memory: 40.0,
            disk: 40.0,
        });

        let snapshot = system.collect_health("org-1").await.unwrap();
        assert_eq!(snapshot.status, HealthState::Warning);
    }

    #[tokio::test]
    async fn test_defaults_used_for_empty_windows() {
        let (system, _store) = system_with_probe(FixedProbe::idle());

        let snapshot = system.collect_health("org-1").await.unwrap();
        assert_eq!(snapshot.response_time, 100.0);
        assert_eq!(snapshot.error_rate, 0.0);
        assert_eq!(snapshot.throughput, 10.0);
    }

    #[tokio::test]
    async fn test_repeated_collection_deduplicates_alerts() {
        let (system, store) = system_with_probe(FixedProbe {
            cpu: 97.0,
            memory: 10.0,
            disk: 10.0,
        });

        for _ in 0..4 {
            system.collect_health("org-1").await.unwrap();
        }

        // four breaching cycles, one active alert row
        assert_eq!(store.alert_count(), 1);
        let alerts = system
            .list_alerts(&AlertFilter::for_org("org-1"))
            .await
            .unwrap();
        assert_eq!(alerts[0].current_value, 97.0);
    }

    #[tokio::test]
    async fn test_custom_thresholds_drive_evaluation() {
        let (system, _store) = system_with_probe(FixedProbe {
            cpu: 70.0,
            memory: 10.0,
            disk: 10.0,
        });

        // tighten the cpu warning tier below the probe value
        let update = gateway_pulse::ThresholdUpdate {
            cpu_warning: Some(60.0),
            ..Default::default()
        };
        system.update_threshold_config("org-1", &update);

        system.collect_health("org-1").await.unwrap();
        let alerts = system
            .list_alerts(&AlertFilter::for_org("org-1"))
            .await
            .unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, "cpu_usage");
        assert_eq!(alerts[0].threshold_value, 60.0);
    }
}
