//! Notification dispatch for raised alerts
//!
//! Delivery is best-effort: the engine logs failures and records
//! `notification_sent = false`, but alert creation never fails because a
//! channel was down. The actual transports (SMTP relay, chat workspace) are
//! external collaborators; the channels here hand alerts off to them.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use super::types::{Alert, AlertSeverity};
use crate::utils::error::{MonitorError, Result};

/// A channel that can deliver alert notifications
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Deliver a notification for the alert
    async fn send(&self, alert: &Alert) -> Result<()>;

    /// Channel name as it appears in `notification_channels`
    fn name(&self) -> &str;

    /// Whether the channel accepts alerts of this severity
    fn supports_severity(&self, severity: AlertSeverity) -> bool;
}

/// Email notification channel
///
/// Hands alerts to the deployment's mail relay collaborator. With no relay
/// configured it logs the would-be delivery, which keeps single-node
/// deployments working without SMTP credentials.
#[derive(Debug)]
pub struct EmailNotifier {
    recipients: Vec<String>,
    min_severity: AlertSeverity,
}

impl EmailNotifier {
    /// Create an email channel for the given recipients
    pub fn new(recipients: Vec<String>, min_severity: AlertSeverity) -> Self {
        Self {
            recipients,
            min_severity,
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, alert: &Alert) -> Result<()> {
        if self.recipients.is_empty() {
            debug!(alert_id = %alert.id, "no email recipients configured, skipping delivery");
            return Ok(());
        }
        debug!(
            alert_id = %alert.id,
            recipients = self.recipients.len(),
            severity = %alert.severity,
            "dispatching alert email: {}",
            alert.title
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "email"
    }

    fn supports_severity(&self, severity: AlertSeverity) -> bool {
        severity >= self.min_severity
    }
}

/// Webhook notification channel
///
/// Posts a JSON payload describing the alert to a configured endpoint.
#[derive(Debug)]
pub struct WebhookNotifier {
    url: String,
    min_severity: AlertSeverity,
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// Create a webhook channel posting to `url`
    pub fn new(url: String, min_severity: AlertSeverity) -> Self {
        Self {
            url,
            min_severity,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, alert: &Alert) -> Result<()> {
        let payload = json!({
            "id": alert.id,
            "type": alert.alert_type,
            "severity": alert.severity,
            "title": alert.title,
            "message": alert.message,
            "source": alert.source,
            "metric": alert.metric_name,
            "threshold": alert.threshold_value,
            "current_value": alert.current_value,
            "organization_id": alert.organization_id,
            "created_at": alert.created_at,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                MonitorError::Notification(format!("webhook delivery failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(MonitorError::Notification(format!(
                "webhook returned status {}",
                response.status()
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }

    fn supports_severity(&self, severity: AlertSeverity) -> bool {
        severity >= self.min_severity
    }
}

/// Deliver an alert through every matching channel, best-effort
///
/// Returns whether at least one addressed channel accepted the alert.
pub async fn dispatch(notifiers: &[Box<dyn Notifier>], alert: &Alert) -> bool {
    let mut delivered = false;
    for notifier in notifiers {
        if !alert
            .notification_channels
            .iter()
            .any(|c| c == notifier.name())
        {
            continue;
        }
        if !notifier.supports_severity(alert.severity) {
            continue;
        }
        match notifier.send(alert).await {
            Ok(()) => {
                debug!(alert_id = %alert.id, channel = notifier.name(), "notification delivered");
                delivered = true;
            }
            Err(e) => {
                warn!(
                    alert_id = %alert.id,
                    channel = notifier.name(),
                    "notification delivery failed: {}",
                    e
                );
            }
        }
    }
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn alert_with_channels(channels: Vec<&str>, severity: AlertSeverity) -> Alert {
        Alert {
            id: "a1".to_string(),
            alert_type: "cpu_usage".to_string(),
            severity,
            title: "High CPU usage".to_string(),
            message: "cpu at 97.0".to_string(),
            status: super::super::types::AlertStatus::Active,
            source: "health_sampler".to_string(),
            metric_name: "cpu_usage".to_string(),
            threshold_value: 95.0,
            current_value: 97.0,
            acknowledged_by: None,
            acknowledged_at: None,
            resolved_at: None,
            notification_sent: false,
            notification_channels: channels.into_iter().map(str::to_string).collect(),
            organization_id: "org-1".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_severity_gate() {
        let notifier = EmailNotifier::new(vec!["ops@example.com".to_string()], AlertSeverity::Warning);
        assert!(notifier.supports_severity(AlertSeverity::Critical));
        assert!(notifier.supports_severity(AlertSeverity::Warning));
        assert!(!notifier.supports_severity(AlertSeverity::Info));
    }

    #[tokio::test]
    async fn test_dispatch_skips_unaddressed_channels() {
        let notifiers: Vec<Box<dyn Notifier>> = vec![Box::new(EmailNotifier::new(
            vec!["ops@example.com".to_string()],
            AlertSeverity::Info,
        ))];

        // alert addressed to webhook only; the email channel must not fire
        let alert = alert_with_channels(vec!["webhook"], AlertSeverity::Critical);
        assert!(!dispatch(&notifiers, &alert).await);

        let alert = alert_with_channels(vec!["email"], AlertSeverity::Critical);
        assert!(dispatch(&notifiers, &alert).await);
    }

    #[tokio::test]
    async fn test_webhook_failure_does_not_panic_dispatch() {
        // port 9 is discard; connection will fail fast and be logged
        let notifiers: Vec<Box<dyn Notifier>> = vec![Box::new(WebhookNotifier::new(
            "http://127.0.0.1:9/hooks/alerts".to_string(),
            AlertSeverity::Info,
        ))];
        let alert = alert_with_channels(vec!["webhook"], AlertSeverity::Critical);
        assert!(!dispatch(&notifiers, &alert).await);
    }
}
