//! SLA compliance and incident flow integration tests

#[cfg(test)]
mod tests {
    use crate::common::{FixedProbe, record_gauge, system_with_probe};
    use chrono::Duration as ChronoDuration;
    use gateway_pulse::incidents::{ImpactLevel, IncidentPriority, IncidentSeverity};
    use gateway_pulse::{IncidentStatus, MonitorError, NewIncident, SlaStatus};

    fn incident_for(org: &str) -> NewIncident {
        NewIncident {
            incident_type: "latency".to_string(),
            severity: IncidentSeverity::High,
            title: "Completions latency regression".to_string(),
            description: "p95 doubled after the last deploy".to_string(),
            priority: IncidentPriority::High,
            affected_services: vec!["completions".to_string()],
            impact_level: ImpactLevel::Moderate,
            organization_id: org.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sla_rows_recorded_per_period() {
        let (system, _store) = system_with_probe(FixedProbe::idle());
        system.collect_health("org-1").await.unwrap();
        record_gauge(&system, "api_response_time", 80.0).await;

        let rows = system
            .sla_compliance("org-1", Some(ChronoDuration::hours(1)))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);

        let uptime = rows.iter().find(|r| r.sla_name == "uptime").unwrap();
        assert_eq!(uptime.status, SlaStatus::Compliant);
        assert_eq!(uptime.sla_target, 99.99);

        let response = rows.iter().find(|r| r.sla_name == "response_time").unwrap();
        assert_eq!(response.status, SlaStatus::Compliant);
        assert_eq!(response.current_value, 80.0);
    }

    #[tokio::test]
    async fn test_slow_responses_break_response_time_sla() {
        let (system, _store) = system_with_probe(FixedProbe::idle());
        for _ in 0..3 {
            record_gauge(&system, "api_response_time", 400.0).await;
        }

        let rows = system
            .sla_compliance("org-1", Some(ChronoDuration::hours(1)))
            .await
            .unwrap();
        let response = rows.iter().find(|r| r.sla_name == "response_time").unwrap();
        // 400ms against the default 100ms target is beyond the at-risk band
        assert_eq!(response.status, SlaStatus::NonCompliant);
        assert_eq!(response.compliance_percentage, 25.0);
    }

    #[tokio::test]
    async fn test_incident_full_lifecycle_through_facade() {
        let (system, _store) = system_with_probe(FixedProbe::idle());
        let incident = system.open_incident(incident_for("org-1")).await.unwrap();
        assert_eq!(incident.status, IncidentStatus::Open);

        let incident = system
            .transition_incident(
                &incident.id,
                "org-1",
                IncidentStatus::Investigating,
                Some("user-1"),
                None,
            )
            .await
            .unwrap();
        let incident = system
            .transition_incident(
                &incident.id,
                "org-1",
                IncidentStatus::Resolved,
                Some("user-1"),
                Some("reverted the deploy".to_string()),
            )
            .await
            .unwrap();
        let incident = system
            .transition_incident(&incident.id, "org-1", IncidentStatus::Closed, None, None)
            .await
            .unwrap();
        assert_eq!(incident.status, IncidentStatus::Closed);
        assert_eq!(incident.resolution.as_deref(), Some("reverted the deploy"));
    }

    #[tokio::test]
    async fn test_incident_backward_transition_rejected() {
        let (system, _store) = system_with_probe(FixedProbe::idle());
        let incident = system.open_incident(incident_for("org-1")).await.unwrap();
        system
            .transition_incident(
                &incident.id,
                "org-1",
                IncidentStatus::Investigating,
                None,
                None,
            )
            .await
            .unwrap();

        let err = system
            .transition_incident(&incident.id, "org-1", IncidentStatus::Open, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::InvalidField { .. }));
    }

    #[tokio::test]
    async fn test_incidents_scoped_to_organization() {
        let (system, _store) = system_with_probe(FixedProbe::idle());
        system.open_incident(incident_for("org-1")).await.unwrap();
        system.open_incident(incident_for("org-2")).await.unwrap();

        let org1 = system.list_incidents("org-1", None).await.unwrap();
        assert_eq!(org1.len(), 1);
        assert_eq!(org1[0].organization_id, "org-1");
    }
}
