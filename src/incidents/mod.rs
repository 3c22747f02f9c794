//! Incident tracking
//!
//! Incidents are opened manually (escalation policies live outside this
//! core) and advance through a monotonic lifecycle:
//! open → investigating → resolved → closed. Forward jumps are allowed,
//! backward transitions are rejected; reopening is not modeled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::storage::MetricStore;
use crate::utils::error::{MonitorError, Result};

/// Incident severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Incident priority for triage ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Breadth of user impact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Minimal,
    Moderate,
    Significant,
    Severe,
}

/// Incident lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Open,
    Investigating,
    Resolved,
    Closed,
}

impl IncidentStatus {
    fn rank(self) -> u8 {
        match self {
            IncidentStatus::Open => 0,
            IncidentStatus::Investigating => 1,
            IncidentStatus::Resolved => 2,
            IncidentStatus::Closed => 3,
        }
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IncidentStatus::Open => write!(f, "open"),
            IncidentStatus::Investigating => write!(f, "investigating"),
            IncidentStatus::Resolved => write!(f, "resolved"),
            IncidentStatus::Closed => write!(f, "closed"),
        }
    }
}

/// A tracked incident
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    /// Incident id
    pub id: String,
    /// Incident kind, e.g. `availability`
    pub incident_type: String,
    /// Severity
    pub severity: IncidentSeverity,
    /// Short title
    pub title: String,
    /// Narrative description
    pub description: String,
    /// Lifecycle status
    pub status: IncidentStatus,
    /// Triage priority
    pub priority: IncidentPriority,
    /// Services the incident affects
    pub affected_services: Vec<String>,
    /// Breadth of impact
    pub impact_level: ImpactLevel,
    /// Root cause, once known
    pub root_cause: Option<String>,
    /// Resolution description, required to resolve
    pub resolution: Option<String>,
    /// Who resolved the incident
    pub resolved_by: Option<String>,
    /// When the incident was resolved
    pub resolved_at: Option<DateTime<Utc>>,
    /// When the incident was detected
    pub detected_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
    /// Owning organization
    pub organization_id: String,
}

/// Fields needed to open an incident
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIncident {
    pub incident_type: String,
    pub severity: IncidentSeverity,
    pub title: String,
    pub description: String,
    pub priority: IncidentPriority,
    pub affected_services: Vec<String>,
    pub impact_level: ImpactLevel,
    pub organization_id: String,
}

/// Opens incidents and enforces lifecycle transitions
#[derive(Debug)]
pub struct IncidentTracker {
    store: Arc<dyn MetricStore>,
}

impl IncidentTracker {
    /// Create a tracker over the given store
    pub fn new(store: Arc<dyn MetricStore>) -> Self {
        Self { store }
    }

    /// Open a new incident in the `Open` state
    pub async fn open(&self, new: NewIncident) -> Result<Incident> {
        if new.title.trim().is_empty() {
            return Err(MonitorError::invalid_field("title", "must not be empty"));
        }
        let now = Utc::now();
        let incident = Incident {
            id: uuid::Uuid::new_v4().to_string(),
            incident_type: new.incident_type,
            severity: new.severity,
            title: new.title,
            description: new.description,
            status: IncidentStatus::Open,
            priority: new.priority,
            affected_services: new.affected_services,
            impact_level: new.impact_level,
            root_cause: None,
            resolution: None,
            resolved_by: None,
            resolved_at: None,
            detected_at: now,
            updated_at: now,
            organization_id: new.organization_id,
        };
        self.store.insert_incident(&incident).await?;
        info!(incident_id = %incident.id, severity = ?incident.severity, "incident opened");
        Ok(incident)
    }

    /// Advance an incident to a later lifecycle state
    ///
    /// Moving to `Resolved` requires a resolution text and stamps the
    /// resolver. Backward or same-state transitions are rejected.
    pub async fn transition(
        &self,
        id: &str,
        organization_id: &str,
        new_status: IncidentStatus,
        actor_id: Option<&str>,
        resolution: Option<String>,
    ) -> Result<Incident> {
        let mut incident = self
            .store
            .get_incident(id, organization_id)
            .await?
            .ok_or_else(|| MonitorError::not_found("incident", id))?;

        if new_status.rank() <= incident.status.rank() {
            return Err(MonitorError::invalid_field(
                "status",
                format!(
                    "cannot move incident from `{}` to `{}`",
                    incident.status, new_status
                ),
            ));
        }

        if new_status == IncidentStatus::Resolved {
            let resolution = resolution
                .filter(|r| !r.trim().is_empty())
                .ok_or_else(|| {
                    MonitorError::invalid_field("resolution", "required to resolve an incident")
                })?;
            incident.resolution = Some(resolution);
            incident.resolved_by = actor_id.map(str::to_string);
            incident.resolved_at = Some(Utc::now());
        }

        incident.status = new_status;
        incident.updated_at = Utc::now();
        self.store.update_incident(&incident).await?;
        info!(incident_id = id, status = %new_status, "incident transitioned");
        Ok(incident)
    }

    /// Record the root cause on an incident
    pub async fn set_root_cause(
        &self,
        id: &str,
        organization_id: &str,
        root_cause: String,
    ) -> Result<Incident> {
        let mut incident = self
            .store
            .get_incident(id, organization_id)
            .await?
            .ok_or_else(|| MonitorError::not_found("incident", id))?;
        incident.root_cause = Some(root_cause);
        incident.updated_at = Utc::now();
        self.store.update_incident(&incident).await?;
        Ok(incident)
    }

    /// Incidents for the organization, newest first, optionally by status
    pub async fn list(
        &self,
        organization_id: &str,
        status: Option<IncidentStatus>,
    ) -> Result<Vec<Incident>> {
        let incidents = self.store.list_incidents(organization_id).await?;
        Ok(match status {
            Some(s) => incidents.into_iter().filter(|i| i.status == s).collect(),
            None => incidents,
        })
    }
}
