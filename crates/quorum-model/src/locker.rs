//! Locker rentals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quorum_core::{Record, RecordId};

/// Cache scope for locker-rental views.
pub const SCOPE: &str = "locker-rentals";

/// Occupancy state of a rented locker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockerStatus {
    /// Rental application filed, payment not yet confirmed.
    Pending,
    /// Paid and in use.
    Occupied,
    /// Returned to the available pool.
    Released,
}

impl std::fmt::Display for LockerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Occupied => write!(f, "occupied"),
            Self::Released => write!(f, "released"),
        }
    }
}

/// One locker rental by a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockerRental {
    pub id: RecordId,
    pub locker_number: u32,
    pub renter_name: String,
    pub status: LockerStatus,
    pub rented_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for LockerRental {
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

/// Fields supplied when filing a locker rental.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLockerRental {
    pub locker_number: u32,
    pub renter_name: String,
}

impl NewLockerRental {
    /// Placeholder row for an optimistic create: pending until payment
    /// is confirmed.
    pub fn placeholder(&self, id: RecordId, now: DateTime<Utc>) -> LockerRental {
        LockerRental {
            id,
            locker_number: self.locker_number,
            renter_name: self.renter_name.clone(),
            status: LockerStatus::Pending,
            rented_at: now,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Shallow-merge patch for a locker rental.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockerRentalPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renter_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LockerStatus>,
}

impl LockerRentalPatch {
    /// Apply the patch onto a cached row, refreshing `updated_at`.
    pub fn apply(&self, row: &mut LockerRental, now: DateTime<Utc>) {
        if let Some(renter_name) = &self.renter_name {
            row.renter_name = renter_name.clone();
        }
        if let Some(status) = self.status {
            row.status = status;
        }
        row.touch(now);
    }
}
