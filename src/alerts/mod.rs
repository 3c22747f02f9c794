//! Alerting: threshold evaluation, dedup, lifecycle, and notification

pub mod engine;
pub mod notify;
pub mod thresholds;
pub mod types;

pub use engine::{ALERT_SOURCE, AlertEngine};
pub use notify::{EmailNotifier, Notifier, WebhookNotifier};
pub use thresholds::{ThresholdConfig, ThresholdStore, ThresholdUpdate};
pub use types::{Alert, AlertFilter, AlertKey, AlertSeverity, AlertStats, AlertStatus};
