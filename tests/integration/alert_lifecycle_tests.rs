//! Alert lifecycle integration tests

#[cfg(test)]
mod tests {
    use crate::common::{FixedProbe, system_with_probe};
    use gateway_pulse::alerts::AlertFilter;
    use gateway_pulse::{AlertSeverity, AlertStatus, MonitorError};

    async fn raise_one_alert() -> (gateway_pulse::MonitoringSystem, String) {
        let (system, _store) = system_with_probe(FixedProbe {
            cpu: 85.0,
            memory: 10.0,
            disk: 10.0,
        });
        system.collect_health("org-1").await.unwrap();
        let alerts = system
            .list_alerts(&AlertFilter::for_org("org-1"))
            .await
            .unwrap();
        let id = alerts[0].id.clone();
        (system, id)
    }

    #[tokio::test]
    async fn test_acknowledge_then_resolve_flow() {
        let (system, id) = raise_one_alert().await;

        let acked = system.acknowledge_alert(&id, "user-1", "org-1").await.unwrap();
        assert_eq!(acked.status, AlertStatus::Acknowledged);
        assert_eq!(acked.acknowledged_by.as_deref(), Some("user-1"));

        let resolved = system.resolve_alert(&id, "org-1").await.unwrap();
        assert_eq!(resolved.status, AlertStatus::Resolved);
        assert!(resolved.resolved_at.is_some());
    }

    #[tokio::test]
    async fn test_resolve_directly_from_active() {
        let (system, id) = raise_one_alert().await;
        let resolved = system.resolve_alert(&id, "org-1").await.unwrap();
        assert_eq!(resolved.status, AlertStatus::Resolved);
    }

    #[tokio::test]
    async fn test_acknowledge_nonexistent_returns_not_found() {
        let (system, _store) = system_with_probe(FixedProbe::idle());
        let err = system
            .acknowledge_alert("no-such-alert", "user-1", "org-1")
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_resolved_returns_not_found() {
        let (system, id) = raise_one_alert().await;
        system.resolve_alert(&id, "org-1").await.unwrap();

        let err = system.resolve_alert(&id, "org-1").await.unwrap_err();
        assert!(matches!(err, MonitorError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_resolved_alert_retained_for_audit() {
        let (system, id) = raise_one_alert().await;
        system.resolve_alert(&id, "org-1").await.unwrap();

        let filter = AlertFilter {
            status: Some(AlertStatus::Resolved),
            ..AlertFilter::for_org("org-1")
        };
        let resolved = system.list_alerts(&filter).await.unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, id);
    }

    #[tokio::test]
    async fn test_condition_rebreach_after_resolve_opens_new_alert() {
        let (system, id) = raise_one_alert().await;
        system.resolve_alert(&id, "org-1").await.unwrap();

        // the condition persists, so the next cycle opens a fresh active row
        system.collect_health("org-1").await.unwrap();
        let active = system
            .list_alerts(&AlertFilter {
                status: Some(AlertStatus::Active),
                ..AlertFilter::for_org("org-1")
            })
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_ne!(active[0].id, id);
    }

    #[tokio::test]
    async fn test_list_filters_by_severity_and_type() {
        let (system, _store) = system_with_probe(FixedProbe {
            cpu: 97.0,
            memory: 85.0,
            disk: 10.0,
        });
        system.collect_health("org-1").await.unwrap();

        let critical = system
            .list_alerts(&AlertFilter {
                severity: Some(AlertSeverity::Critical),
                ..AlertFilter::for_org("org-1")
            })
            .await
            .unwrap();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].alert_type, "cpu_usage");

        let memory = system
            .list_alerts(&AlertFilter {
                alert_type: Some("memory_usage".to_string()),
                ..AlertFilter::for_org("org-1")
            })
            .await
            .unwrap();
        assert_eq!(memory.len(), 1);
        assert_eq!(memory[0].severity, AlertSeverity::Warning);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let (system, _store) = system_with_probe(FixedProbe {
            cpu: 97.0,
            memory: 85.0,
            disk: 10.0,
        });
        system.collect_health("org-1").await.unwrap();

        let page = system
            .list_alerts(&AlertFilter {
                limit: Some(1),
                ..AlertFilter::for_org("org-1")
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);

        let rest = system
            .list_alerts(&AlertFilter {
                limit: Some(1),
                offset: Some(1),
                ..AlertFilter::for_org("org-1")
            })
            .await
            .unwrap();
        assert_eq!(rest.len(), 1);
        assert_ne!(page[0].id, rest[0].id);
    }
}
