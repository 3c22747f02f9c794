//! Scaling advisor integration tests

#[cfg(test)]
mod tests {
    use crate::common::{FixedProbe, system_with_probe};
    use gateway_pulse::scaling::ScalingAction;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_simulated_events_accumulate_in_history() {
        let (system, _store) = system_with_probe(FixedProbe::idle());

        let (_, total) = system.simulate_scaling("scale_up", 3);
        assert_eq!(total, 4);
        let (_, total) = system.simulate_scaling("scale_down", 5);
        assert_eq!(total, 1);

        let report = system.analyze_scalability("org-1").await.unwrap();
        assert_eq!(report.history.len(), 2);
        assert_eq!(report.advisor_status.current_instances, 1);
    }

    #[tokio::test]
    async fn test_scale_up_capped_at_configured_max() {
        let (system, _store) = system_with_probe(FixedProbe::idle());
        // default ceiling is 10
        let (_, total) = system.simulate_scaling("scale_up", 50);
        assert_eq!(total, 10);
    }

    #[tokio::test]
    async fn test_set_thresholds_ignores_unknown_keys() {
        let (system, _store) = system_with_probe(FixedProbe::idle());
        let thresholds = system.set_scaling_thresholds(&HashMap::from([
            ("cpu_high".to_string(), 70.0),
            ("bogus_key".to_string(), 1.0),
        ]));
        assert_eq!(thresholds["cpu_high"], 70.0);
        assert!(!thresholds.contains_key("bogus_key"));
        assert_eq!(thresholds.len(), 8);
    }

    #[tokio::test]
    async fn test_analysis_uses_latest_snapshot() {
        let (system, _store) = system_with_probe(FixedProbe {
            cpu: 96.0,
            memory: 10.0,
            disk: 10.0,
        });
        system.collect_health("org-1").await.unwrap();

        let report = system.analyze_scalability("org-1").await.unwrap();
        assert_eq!(report.metrics.cpu_usage, 96.0);
        let up: Vec<_> = report
            .recommendations
            .iter()
            .filter(|r| r.action == ScalingAction::ScaleUp)
            .collect();
        assert_eq!(up.len(), 1);
        // critical tier asks for +2 from a single instance
        assert_eq!(up[0].recommended_instances, 3);
    }

    #[tokio::test]
    async fn test_idle_deployment_with_headroom_scales_down() {
        let (system, _store) = system_with_probe(FixedProbe {
            cpu: 10.0,
            memory: 10.0,
            disk: 10.0,
        });
        system.simulate_scaling("scale_up", 2);
        system.collect_health("org-1").await.unwrap();

        let report = system.analyze_scalability("org-1").await.unwrap();
        // idle host: response time default 100ms, cpu and memory near zero
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(report.recommendations[0].action, ScalingAction::ScaleDown);
        assert_eq!(report.recommendations[0].recommended_instances, 2);
    }

    #[tokio::test]
    async fn test_toggle_auto_scaling_reflected_in_status() {
        let (system, _store) = system_with_probe(FixedProbe::idle());
        assert!(!system.analyze_scalability("org-1").await.unwrap().advisor_status.auto_scaling_enabled);
        system.toggle_auto_scaling(true);
        assert!(system.analyze_scalability("org-1").await.unwrap().advisor_status.auto_scaling_enabled);
    }
}
