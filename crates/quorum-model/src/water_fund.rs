//! Water-fund collection periods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quorum_core::{Record, RecordId};

/// Cache scope for water-fund views.
pub const SCOPE: &str = "water-funds";

/// One collection period of the shared water fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterFund {
    pub id: RecordId,
    /// Human-readable period label, e.g. "2025-09" or "Week 3".
    pub period: String,
    pub collected: f64,
    pub spent: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WaterFund {
    /// Remaining balance for the period.
    pub fn balance(&self) -> f64 {
        self.collected - self.spent
    }
}

impl Record for WaterFund {
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

/// Fields supplied when opening a collection period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWaterFund {
    pub period: String,
}

impl NewWaterFund {
    /// Placeholder row for an optimistic create: counters zeroed.
    pub fn placeholder(&self, id: RecordId, now: DateTime<Utc>) -> WaterFund {
        WaterFund {
            id,
            period: self.period.clone(),
            collected: 0.0,
            spent: 0.0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Shallow-merge patch for a water fund.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterFundPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collected: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spent: Option<f64>,
}

impl WaterFundPatch {
    /// Apply the patch onto a cached row, refreshing `updated_at`.
    pub fn apply(&self, row: &mut WaterFund, now: DateTime<Utc>) {
        if let Some(period) = &self.period {
            row.period = period.clone();
        }
        if let Some(collected) = self.collected {
            row.collected = collected;
        }
        if let Some(spent) = self.spent {
            row.spent = spent;
        }
        row.touch(now);
    }
}
