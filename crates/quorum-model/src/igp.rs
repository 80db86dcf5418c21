//! Income-generating projects (IGPs).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quorum_core::{Record, RecordId};

/// Cache scope for IGP views.
pub const SCOPE: &str = "igps";

/// Lifecycle of an income-generating project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IgpStatus {
    Active,
    Closed,
}

/// A council project that raises funds (food stalls, merch, raffles).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Igp {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    /// Running total raised by the project. Zero until sales are posted.
    pub funds_raised: f64,
    pub status: IgpStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Igp {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Fields supplied when opening an IGP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIgp {
    pub name: String,
    pub description: String,
}

impl NewIgp {
    /// Placeholder row for an optimistic create: active, counters zeroed.
    pub fn placeholder(&self, id: RecordId, now: DateTime<Utc>) -> Igp {
        Igp {
            id,
            name: self.name.clone(),
            description: self.description.clone(),
            funds_raised: 0.0,
            status: IgpStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Shallow-merge patch for an IGP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IgpPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funds_raised: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IgpStatus>,
}

impl IgpPatch {
    /// Apply the patch onto a cached row, refreshing `updated_at`.
    pub fn apply(&self, row: &mut Igp, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            row.name = name.clone();
        }
        if let Some(description) = &self.description {
            row.description = description.clone();
        }
        if let Some(funds_raised) = self.funds_raised {
            row.funds_raised = funds_raised;
        }
        if let Some(status) = self.status {
            row.status = status;
        }
        row.touch(now);
    }
}
