//! Violation fines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quorum_core::{Record, RecordId};

/// Cache scope for violation views.
pub const SCOPE: &str = "violations";

/// Payment state of a violation fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationStatus {
    Unpaid,
    Paid,
    Waived,
}

/// A fined violation of council rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub id: RecordId,
    pub student_name: String,
    pub offense: String,
    pub fine_amount: f64,
    pub status: ViolationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Violation {
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

/// Fields supplied when recording a violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewViolation {
    pub student_name: String,
    pub offense: String,
    pub fine_amount: f64,
}

impl NewViolation {
    /// Placeholder row for an optimistic create: fine starts unpaid.
    pub fn placeholder(&self, id: RecordId, now: DateTime<Utc>) -> Violation {
        Violation {
            id,
            student_name: self.student_name.clone(),
            offense: self.offense.clone(),
            fine_amount: self.fine_amount,
            status: ViolationStatus::Unpaid,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Shallow-merge patch for a violation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offense: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fine_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ViolationStatus>,
}

impl ViolationPatch {
    /// Apply the patch onto a cached row, refreshing `updated_at`.
    pub fn apply(&self, row: &mut Violation, now: DateTime<Utc>) {
        if let Some(offense) = &self.offense {
            row.offense = offense.clone();
        }
        if let Some(fine_amount) = self.fine_amount {
            row.fine_amount = fine_amount;
        }
        if let Some(status) = self.status {
            row.status = status;
        }
        row.touch(now);
    }
}
